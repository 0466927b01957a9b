pub mod app;
pub mod components;
pub mod dom;

pub use app::App;
