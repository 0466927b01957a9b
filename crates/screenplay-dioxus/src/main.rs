use dioxus::prelude::*;
use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;

mod ui;

use screenplay_config::Config;
use ui::App;

/// Settings resolved once in `main`, read by the root component
static SETTINGS: OnceLock<Config> = OnceLock::new();

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("screenplay-editor starting up!");

    let args: Vec<String> = env::args().collect();
    let config_arg = match args.len() {
        1 => None,
        2 => Some(PathBuf::from(&args[1])),
        _ => {
            let program_name = args
                .first()
                .cloned()
                .unwrap_or_else(|| "screenplay-dioxus".to_string());
            eprintln!("Usage: {program_name} [config-file]");
            process::exit(1);
        }
    };

    let config_path = config_arg.clone().unwrap_or_else(Config::config_path);
    log::info!("Config path: {}", config_path.display());

    let config = match Config::load_or_default(config_arg.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Config load failed: {e}");
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    log::info!(
        "New documents open with a {} block",
        config.editor.opening_block
    );

    if SETTINGS.set(config).is_err() {
        log::warn!("Settings were already initialised");
    }

    log::info!("About to launch Dioxus app for desktop");
    dioxus::LaunchBuilder::desktop()
        .with_cfg(make_window_config())
        .launch(app_root);
}

fn app_root() -> Element {
    let config = SETTINGS.get().cloned().unwrap_or_default();

    rsx! {
        App { config: config }
    }
}

fn make_window_config() -> dioxus::desktop::Config {
    use dioxus::desktop::{Config, WindowBuilder};

    let window = WindowBuilder::new()
        .with_title("screenplay-editor")
        .with_always_on_top(false);

    Config::default().with_window(window)
}
