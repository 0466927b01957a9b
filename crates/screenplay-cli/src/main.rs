use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use screenplay_config::Config;
use screenplay_engine::{BlockType, Size};
use std::{env, io::stdout, path::PathBuf, process};

mod app;

use app::{App, wrap_chars};

fn main() -> Result<()> {
    // The screen belongs to the editor, so logs only go to stderr on request
    if env::var_os("RUST_LOG").is_some() {
        env_logger::init();
    }

    let args: Vec<String> = env::args().collect();
    let program_name = args
        .first()
        .cloned()
        .unwrap_or_else(|| "screenplay-cli".to_string());
    let init_config = args.iter().skip(1).any(|arg| arg == "--init-config");
    let paths: Vec<&String> = args
        .iter()
        .skip(1)
        .filter(|arg| *arg != "--init-config")
        .collect();

    let config_arg = match paths.as_slice() {
        [] => None,
        [path] => Some(PathBuf::from(path.as_str())),
        _ => {
            eprintln!("Usage: {program_name} [--init-config] [config-file]");
            process::exit(1);
        }
    };

    if init_config {
        let config_path = match &config_arg {
            Some(path) => Config::expand_path(path).unwrap_or_else(|| path.clone()),
            None => Config::config_path(),
        };
        Config::default().save_to_path(&config_path)?;
        println!("Wrote default config to {}", config_path.display());
        return Ok(());
    }

    let config = match Config::load_or_default(config_arg.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {program_name} [--init-config] [config-file]");
            process::exit(1);
        }
    };
    log::info!("Starting with a {} block", config.editor.opening_block);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        // A block created by the last key is only focusable once drawn
        if app.settle_focus() {
            continue;
        }

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key_event(key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn block_style(block_type: BlockType) -> Style {
    match block_type {
        BlockType::SceneHeading => Style::default().add_modifier(Modifier::BOLD),
        BlockType::Character => Style::default().fg(Color::Cyan),
        BlockType::Parenthetical => Style::default().add_modifier(Modifier::ITALIC),
        BlockType::Transition => Style::default().fg(Color::Magenta),
        BlockType::Action | BlockType::Dialogue => Style::default(),
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let frame = f.area();
    let page = Block::default().borders(Borders::ALL).title("Screenplay");
    let inner = page.inner(chunks[0]);
    f.render_widget(page, chunks[0]);

    app.relayout(
        inner,
        Size::new(f64::from(frame.width), f64::from(frame.height)),
    );

    let focused = app.editor().focused();
    for layout in app.layout() {
        let Some(block) = app.editor().document().block(layout.id) else {
            continue;
        };
        let rows = if block.content.is_empty() {
            let style = if focused == Some(block.id) {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Gray)
            };
            vec![Span::styled(block.block_type.placeholder_label(), style)]
        } else {
            wrap_chars(&block.content, layout.width)
                .into_iter()
                .map(|row| Span::styled(row, block_style(block.block_type)))
                .collect()
        };

        for (line, row) in rows.into_iter().enumerate() {
            let y = layout.y + line as i32;
            if y < i32::from(inner.y) || y >= i32::from(inner.bottom()) {
                continue;
            }
            let area = Rect::new(layout.x, y as u16, layout.width, 1).intersection(inner);
            f.render_widget(Line::from(row), area);
        }
    }

    if let Some(position) = app.screen_cursor(inner) {
        f.set_cursor_position(position);
    }

    if let Some((area, view)) = app.popup_area() {
        let area = area.intersection(frame);
        let items: Vec<ListItem> = view
            .options
            .iter()
            .map(|option| ListItem::new(Line::from(Span::raw(option.clone()))))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
        let mut state = ListState::default();
        state.select(Some(view.highlighted));

        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut state);
    }

    // Instructions
    let block_type = focused
        .and_then(|id| app.editor().document().block(id))
        .map(|block| block.block_type.placeholder_label())
        .unwrap_or_default();
    let help_text = Line::from(vec![
        Span::styled(format!("{block_type} "), Style::default().fg(Color::Yellow)),
        Span::raw("| Ctrl+Q: Quit | "),
        Span::raw("Enter: New block | "),
        Span::raw("Tab: Change type | "),
        Span::raw("↑/↓: Move between blocks"),
    ]);

    f.render_widget(Paragraph::new(vec![help_text]), chunks[1]);
}
