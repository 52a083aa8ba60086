use std::collections::VecDeque;
use std::io::{self, stdout};
use std::panic;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, prelude::*};
use tokio::sync::mpsc;
use tracing::info;

use space_empire::api::GameApi;
use space_empire::app::{App, Completion, Executor, ProjectionTicker, perform};
use space_empire::config::{Config, init_tracing};
use space_empire::store::{GameState, LocalStorage};
use space_empire::ui::{
    self,
    dump::{dump_resources, dump_tree},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(&config)?;

    let api = GameApi::new(&config.api_url, config.access_token.as_deref(), config.timeout())?;
    let storage = LocalStorage::open(&config.data_dir)?;
    let state = GameState::new(config.start(), config.user_id(), storage);
    let app = App::new(state, config.warp_seconds);
    info!(api = %api.base_url(), start = %config.start(), dump = config.dump, "client starting");

    if config.dump {
        return run_dump(app, &api).await;
    }
    run_tui(app, api, &config).await
}

/// Loads the start coordinate to quiescence, prints it and exits.
async fn run_dump(mut app: App, api: &GameApi) -> anyhow::Result<()> {
    let mut queue: VecDeque<_> = app.start().into();
    while let Some(effect) = queue.pop_front() {
        let completion = perform(api, effect).await;
        queue.extend(app.apply(completion));
    }
    app.apply(Completion::Tick);

    if let Some(err) = app.state.entity.error() {
        anyhow::bail!("loading system at {}: {err}", app.coordinate());
    }
    let view = app.tree().context("server returned no system")?;
    print!("{}", dump_tree(&view));
    if let Some(resources) = app.projected_resources() {
        print!("{}", dump_resources(&resources));
    }
    Ok(())
}

async fn run_tui(mut app: App, api: GameApi, config: &Config) -> anyhow::Result<()> {
    let (completions_tx, mut completions_rx) = mpsc::unbounded_channel();
    let executor = Executor::new(api, completions_tx.clone());
    let ticker = ProjectionTicker::start(config.tick(), completions_tx);
    executor.run_all(app.start());

    let ctrl_c_task = tokio::spawn(async {
        let _ = tokio::signal::ctrl_c().await;
    });

    // TUI Setup
    let mut terminal = init_terminal()?;
    let mut term_guard = TerminalGuard::new();
    panic::set_hook(Box::new(|info| {
        let _ = restore_terminal();
        eprintln!("panic: {info}");
    }));

    while !app.should_quit() {
        while let Ok(completion) = completions_rx.try_recv() {
            executor.run_all(app.apply(completion));
        }

        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    break;
                }
                executor.run_all(app.handle_key(key.code));
            }
        }

        if ctrl_c_task.is_finished() {
            break;
        }
    }

    // Shutdown
    drop(ticker);
    ctrl_c_task.abort();
    restore_terminal()?;
    term_guard.disarm();
    info!("client stopped");

    Ok(())
}

fn init_terminal() -> io::Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Ensures terminal is restored on panic/early-return.
struct TerminalGuard {
    armed: bool,
}

impl TerminalGuard {
    fn new() -> Self {
        Self { armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = restore_terminal();
        }
    }
}
