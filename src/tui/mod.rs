//! Terminal client for networked play.

mod app;
mod ui;

use connect_four::{ClientEvent, ClientSessionAgent};
use anyhow::Result;
use app::App;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

/// Log file used while the terminal is in raw mode.
const LOG_FILE: &str = "connect_four_tui.log";

/// Connects to the relay server and runs the terminal client.
pub async fn run_tui(server_address: String) -> Result<()> {
    // Log to a file so tracing output does not draw over the board
    let log_file = std::fs::File::create(LOG_FILE)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,connect_four=debug")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(server = %server_address, "Starting terminal client");

    let agent = match ClientSessionAgent::connect(server_address.as_str()).await {
        Ok(agent) => agent,
        Err(e) => {
            error!(error = %e, "Failed to connect to server");
            return Err(anyhow::anyhow!("Failed to connect to {}: {}", server_address, e));
        }
    };

    let (move_tx, move_rx) = mpsc::channel(1);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let agent_task = tokio::spawn(agent.run(move_rx, event_tx));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, move_tx, event_rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if agent_task.is_finished() {
        match agent_task.await {
            Ok(Ok(verdict)) => println!("{}", verdict),
            Ok(Err(e)) => eprintln!("Error: {}", e),
            Err(e) => error!(error = %e, "Client task failed"),
        }
    } else {
        agent_task.abort();
    }

    if let Err(err) = res {
        error!(error = ?err, "Terminal loop error");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Draws, forwards key presses and applies agent events until the user quits.
#[instrument(skip_all)]
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    moves: mpsc::Sender<usize>,
    mut events: mpsc::UnboundedReceiver<ClientEvent>,
) -> Result<()> {
    let mut app = App::new();

    loop {
        while let Ok(event) = events.try_recv() {
            app.handle_event(event);
        }

        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        info!("User quit");
                        return Ok(());
                    }
                    KeyCode::Left => app.move_left(),
                    KeyCode::Right => app.move_right(),
                    KeyCode::Char(c) if c.is_ascii_digit() => {
                        let accepted = c
                            .to_digit(10)
                            .is_some_and(|label| app.select_label(label as usize));
                        if accepted {
                            send_commit(&mut app, &moves);
                        }
                    }
                    KeyCode::Enter | KeyCode::Char(' ') => send_commit(&mut app, &moves),
                    _ => {}
                }
            }
        }

        tokio::task::yield_now().await;
    }
}

fn send_commit(app: &mut App, moves: &mpsc::Sender<usize>) {
    if let Some(column) = app.commit() {
        debug!(column, "Sending column to agent");
        if let Err(err) = moves.try_send(column) {
            error!(error = %err, "Agent is not accepting moves");
        }
    }
}
