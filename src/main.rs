//! matchdeck - terminal client for a swipe-and-connect matching service.
//!
//! Shows the candidate feed as a deck of cards, the received connection
//! requests with paging, and the accepted connections.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};

use matchdeck::application::{App, ChannelTrigger, Command, CommandRunner, Engines, SwipeGesture, SwipeTrigger};
use matchdeck::infrastructure::{logging, Config, Gateway, HttpGateway};
use matchdeck::presentation::{render_ui, InputHandler, DECK_DEPTH};

const TICK: Duration = Duration::from_millis(100);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("invalid configuration")?;
    logging::init(&config.log_file)
        .with_context(|| format!("could not open log file {}", config.log_file.display()))?;
    info!(base_url = %config.base_url, "starting");

    let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(&config).context("could not build HTTP client")?);
    let engines = Engines::new(gateway);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::default();
    let res = run_app(&mut terminal, &mut app, &engines).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "terminal loop failed");
        println!("{err:?}");
    }
    info!("bye");

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, engines: &Engines) -> anyhow::Result<()> {
    let (gesture_tx, mut gesture_rx) = mpsc::unbounded_channel::<SwipeGesture>();
    let runner = CommandRunner::start(engines.clone());
    runner.run(vec![Command::Mount(app.screen)]);

    loop {
        // Button presses come back here as gestures, like a drag would.
        while let Ok(gesture) = gesture_rx.try_recv() {
            runner.run(vec![Command::Swipe {
                candidate_id: gesture.candidate_id,
                direction: gesture.direction,
            }]);
        }

        for notice in engines.requests.take_notices().await {
            app.show_notice(notice);
        }

        let snapshot = engines.snapshot().await;
        app.clamp_selection(snapshot.request_rows());

        let tx = gesture_tx.clone();
        engines
            .feed
            .sync_handles(&snapshot.visible_cards(DECK_DEPTH), move |_| -> Arc<dyn SwipeTrigger> {
                Arc::new(ChannelTrigger::new(tx.clone()))
            })
            .await;

        terminal.draw(|f| render_ui(f, app, &snapshot))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let commands = InputHandler::handle_key_event(app, &snapshot, key.code, key.modifiers);
                    runner.run(commands);
                }
            }
        }

        if app.should_quit {
            runner.run(vec![Command::Unmount(app.screen)]);
            if tokio::time::timeout(SHUTDOWN_GRACE, runner.flush()).await.is_err() {
                info!("lifecycle commands still pending at exit");
            }
            return Ok(());
        }
    }
}
