mod api;
mod app;
mod config;
mod refresh;
mod theme;
mod types;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use api::SiteClient;
use app::App;
use config::Config;
use refresh::Lifecycle;
use types::*;

/// Terminal dashboard for fuel site pricing, market position and tank levels.
#[derive(Parser, Debug)]
#[command(name = "forecourt", version, about)]
struct Cli {
    /// Base URL of the site API (overridden by FORECOURT_API_BASE).
    #[arg(long)]
    api_base: Option<String>,

    /// Theme name: dark, dark-orange, solarized-dark, light, no-color.
    #[arg(long)]
    theme: Option<String>,

    /// Seconds between automatic refreshes (minimum 60).
    #[arg(long)]
    refresh_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(secs) = cli.refresh_secs {
        config.refresh_interval_secs = secs;
    }
    if let Some(ref name) = cli.theme {
        if !theme::THEME_NAMES.contains(&name.as_str()) {
            anyhow::bail!(
                "Unknown theme '{}'; expected one of: {}",
                name,
                theme::THEME_NAMES.join(", ")
            );
        }
        config.theme = name.clone();
    }
    config.clamp();

    let api_base = config.resolve_api_base(cli.api_base.as_deref());
    let client = SiteClient::new(&api_base);
    let theme = theme::by_name(&config.theme);
    let mut app = App::new(config, client, theme);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        let msg = format!("Fatal: {}", e);
        app::log_error(&msg);
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);

    app.mount().await;

    loop {
        terminal.draw(|f| ui::draw(f, &*app))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::FocusGained => {
                    app.handle_lifecycle(Lifecycle::Active).await;
                }
                Event::FocusLost => {
                    app.handle_lifecycle(Lifecycle::Background).await;
                }
                Event::Key(key) => {
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c')
                    {
                        app.quit = true;
                    }

                    match app.input_mode {
                        InputMode::StrategyMenu => match key.code {
                            KeyCode::Esc | KeyCode::Char('q') => {
                                app.close_strategy_menu();
                            }
                            KeyCode::Char('j') | KeyCode::Down => {
                                app.menu_next();
                            }
                            KeyCode::Char('k') | KeyCode::Up => {
                                app.menu_prev();
                            }
                            KeyCode::Enter => {
                                app.choose_strategy().await;
                            }
                            _ => {}
                        },
                        InputMode::Normal => match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
                            KeyCode::Tab => {
                                app.next_tab().await;
                            }
                            KeyCode::Char(c @ '1'..='9') => {
                                let idx = c as usize - '1' as usize;
                                app.select_tab(idx).await;
                            }
                            KeyCode::Char('r') => {
                                app.refresh_active().await;
                            }
                            KeyCode::Char('s') => {
                                app.sync_active().await;
                            }
                            KeyCode::Char('p') | KeyCode::Enter => {
                                app.open_strategy_menu();
                            }
                            _ => {}
                        },
                    }
                }
                _ => {}
            }
        }

        if app.quit {
            break;
        }
    }

    Ok(())
}
