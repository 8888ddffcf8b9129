mod app;
mod cache;
mod config;
mod logging;
mod pet;
mod pet_client;
mod setup;
mod views;
mod widgets;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use app::{App, ListRefresh, SubmitRequest, SubmitSuccess};
use pet::StoredPet;
use pet_client::{PetClient, SubmitError};

/// Screen to open on launch.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StartMode {
    Home,
    NewPet,
    EditPet(String),
}

enum BackgroundMessage {
    PetsListed {
        generation: u64,
        result: std::result::Result<Vec<StoredPet>, String>,
    },
    PetFetched {
        id: String,
        result: std::result::Result<StoredPet, String>,
    },
    SubmitFinished {
        token: u64,
        result: std::result::Result<SubmitSuccess, SubmitError>,
    },
}

fn spawn_list_refresh(tx: &UnboundedSender<BackgroundMessage>, client: &PetClient, generation: u64) {
    let tx = tx.clone();
    let client = client.clone();
    tokio::spawn(async move {
        let result = client.list_pets().await.map_err(|e| format!("{:#}", e));
        let _ = tx.send(BackgroundMessage::PetsListed { generation, result });
    });
}

fn spawn_pet_fetch(tx: &UnboundedSender<BackgroundMessage>, client: &PetClient, id: String) {
    let tx = tx.clone();
    let client = client.clone();
    tokio::spawn(async move {
        let result = client.fetch_pet(&id).await.map_err(|e| format!("{:#}", e));
        let _ = tx.send(BackgroundMessage::PetFetched { id, result });
    });
}

fn spawn_submit(
    tx: &UnboundedSender<BackgroundMessage>,
    client: &PetClient,
    token: u64,
    request: SubmitRequest,
) {
    let tx = tx.clone();
    let client = client.clone();
    tokio::spawn(async move {
        let result = match request {
            SubmitRequest::Create(record) => {
                tracing::info!(name = %record.name, "creating pet");
                client
                    .create_pet(&record)
                    .await
                    .map(|_| SubmitSuccess::Created)
            }
            SubmitRequest::Update { id, record } => {
                tracing::info!(%id, name = %record.name, "updating pet");
                client
                    .update_pet(&id, &record)
                    .await
                    .map(|data| SubmitSuccess::Updated { id, data })
            }
        };
        let _ = tx.send(BackgroundMessage::SubmitFinished { token, result });
    });
}

fn refresh_list(app: &mut App, tx: &UnboundedSender<BackgroundMessage>, client: &PetClient) {
    if let Some(generation) = app.begin_list_refresh() {
        spawn_list_refresh(tx, client, generation);
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> std::result::Result<StartMode, String> {
    let args: Vec<String> = args.into_iter().collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => Ok(StartMode::Home),
        ["new"] => Ok(StartMode::NewPet),
        ["edit", id] if !id.is_empty() => Ok(StartMode::EditPet(id.to_string())),
        ["edit"] => Err("edit requires a pet id".to_string()),
        [other, ..] => Err(format!("unknown argument: {}", other)),
    }
}

fn print_help() {
    println!("petform");
    println!("  petform            Browse pets");
    println!("  petform new        Add a pet");
    println!("  petform edit <id>  Edit the pet with the given id");
    println!("  -h, --help         Show this help");
}

#[tokio::main]
async fn main() -> Result<()> {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    if raw_args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        return Ok(());
    }
    let start = match parse_args(raw_args) {
        Ok(start) => start,
        Err(e) => {
            eprintln!("petform: {}", e);
            print_help();
            std::process::exit(2);
        }
    };

    let existing_config = config::load_config()?;
    let cache_dir = cache::cache_dir()?;
    let level = existing_config
        .as_ref()
        .map(|c| c.log.level.clone())
        .unwrap_or_else(|| "info".to_string());
    if let Err(e) = logging::init(&cache_dir, &level) {
        eprintln!("petform: logging disabled: {:#}", e);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = match existing_config {
        Some(config) => Ok(config),
        None => setup::run_setup(&mut terminal),
    };
    let result = match result {
        Ok(config) => run(&mut terminal, &config, cache_dir, start).await,
        Err(e) => Err(e),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %format!("{:#}", e), "petform exited with error");
    }
    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &config::AppConfig,
    cache_dir: PathBuf,
    start: StartMode,
) -> Result<()> {
    tracing::info!(base_url = %config.api.base_url, ?start, "petform starting");
    let client = PetClient::new(&config.api.base_url);
    let mut app = App::new();
    let (bg_tx, mut bg_rx) = tokio::sync::mpsc::unbounded_channel();

    // Render the last known list immediately, then refresh in the background.
    if let Some(snapshot) = cache::load_snapshot(&cache_dir) {
        app.replace_cache(snapshot.cache);
        app.loading = false;
        app.cache_stale_age_secs = Some(snapshot.age_secs);
    }
    refresh_list(&mut app, &bg_tx, &client);

    match start {
        StartMode::Home => {}
        StartMode::NewPet => app.open_new_form(),
        StartMode::EditPet(id) => {
            app.begin_edit_fetch(&id);
            spawn_pet_fetch(&bg_tx, &client, id);
        }
    }

    loop {
        while let Ok(message) = bg_rx.try_recv() {
            match message {
                BackgroundMessage::PetsListed { generation, result } => {
                    if app.apply_pet_list(generation, result) == ListRefresh::Applied {
                        if let Err(e) = cache::save_snapshot(&cache_dir, &app.cache) {
                            app.flash = Some(format!("Cache snapshot write failed: {}", e));
                        }
                    }
                }
                BackgroundMessage::PetFetched { id, result } => {
                    app.apply_fetched_pet(&id, result);
                }
                BackgroundMessage::SubmitFinished { token, result } => {
                    let updated = matches!(result, Ok(SubmitSuccess::Updated { .. }));
                    let succeeded = result.is_ok();
                    let navigated = app.finish_submit(token, result);
                    if updated {
                        if let Err(e) = cache::save_snapshot(&cache_dir, &app.cache) {
                            app.flash = Some(format!("Cache snapshot write failed: {}", e));
                        }
                    }
                    if navigated {
                        tracing::info!("submit succeeded, returning home");
                        refresh_list(&mut app, &bg_tx, &client);
                    } else if succeeded {
                        tracing::info!("submit landed after the form was closed");
                    }
                }
            }
        }
        if app.refresh_queued {
            refresh_list(&mut app, &bg_tx, &client);
        }

        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(120))? {
            if let Event::Key(key) = event::read()? {
                // Clear flash on any keypress
                app.flash = None;

                if app.show_keybindings {
                    handle_keybindings_keys(&mut app, key.code);
                } else if app.is_form_open() {
                    handle_form_keys(&mut app, key.code, &bg_tx, &client);
                } else {
                    handle_home_keys(&mut app, key.code, &bg_tx, &client);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn format_age_minutes(age_secs: u64) -> String {
    let mins = age_secs / 60;
    if mins == 0 {
        "<1m".to_string()
    } else {
        format!("{}m", mins)
    }
}

fn ui(f: &mut ratatui::Frame, app: &App) {
    use ratatui::layout::{Constraint, Direction, Layout};
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Paragraph};

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let title = Paragraph::new(" Pets ")
        .block(Block::default().borders(Borders::ALL).title(" petform "))
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(title, chunks[0]);

    if app.loading {
        let loading = Paragraph::new("Loading...").block(Block::default().borders(Borders::ALL));
        f.render_widget(loading, chunks[1]);
    } else {
        views::home::render(f, chunks[1], app);
    }

    // Status bar
    let status_text = if let Some(ref flash) = app.flash {
        Span::styled(flash.as_str(), Style::default().fg(Color::Red))
    } else if app.form.as_ref().map(|form| form.is_submitting()).unwrap_or(false) {
        Span::styled(" Submitting...", Style::default().fg(Color::Yellow))
    } else if let Some(ref id) = app.pending_edit {
        Span::styled(
            format!(" Loading pet {}...", id),
            Style::default().fg(Color::Yellow),
        )
    } else {
        let sync_state = if app.list_refreshing { "syncing" } else { "ready" };
        let freshness_state = app
            .cache_stale_age_secs
            .map(|age| format!("stale {}", format_age_minutes(age)))
            .unwrap_or_else(|| "fresh".to_string());
        Span::styled(
            format!(
                " j/k: navigate  n: new  Enter: edit  r: refresh  ?: keys  q: quit  list:{} ({}) ",
                sync_state, freshness_state
            ),
            Style::default().fg(Color::DarkGray),
        )
    };
    f.render_widget(Paragraph::new(Line::from(status_text)), chunks[2]);

    if app.is_form_open() {
        widgets::pet_form::render(f, app);
    }
    if app.show_keybindings {
        widgets::keybindings_help::render(f);
    }
}

fn handle_keybindings_keys(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => app.close_keybindings(),
        _ => {}
    }
}

fn handle_form_keys(
    app: &mut App,
    key: KeyCode,
    bg_tx: &UnboundedSender<BackgroundMessage>,
    client: &PetClient,
) {
    if key == KeyCode::Esc {
        app.navigate_home();
        return;
    }
    if key == KeyCode::Enter {
        if let Some((token, request)) = app.submit_form() {
            spawn_submit(bg_tx, client, token, request);
        }
        return;
    }

    let Some(form) = app.form.as_mut() else {
        return;
    };
    match key {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.type_char(c),
        _ => {}
    }
}

fn handle_home_keys(
    app: &mut App,
    key: KeyCode,
    bg_tx: &UnboundedSender<BackgroundMessage>,
    client: &PetClient,
) {
    match key {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.move_selection_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection_up(),
        KeyCode::Char('?') => app.toggle_keybindings(),
        KeyCode::Char('n') => app.open_new_form(),
        KeyCode::Enter | KeyCode::Char('e') => {
            if let Some(id) = app.selected_pet_id() {
                if !app.open_edit_form(&id) {
                    app.flash = Some(format!("Pet {} is no longer cached", id));
                }
            }
        }
        KeyCode::Char('r') => {
            refresh_list(app, bg_tx, client);
            app.flash = Some("Refreshing pets...".to_string());
        }
        _ => {}
    }
}
