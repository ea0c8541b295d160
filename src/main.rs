//! Terminal duel-tetris runner (default binary).
//!
//! Reads `DUEL_TETRIS_*` configuration, builds a session (one board or two linked
//! boards), then runs the frame loop: pull a snapshot per board, draw, route key events
//! until the frame deadline, synthesize stale key releases, tick.
//!
//! Status lines go to stdout only outside raw mode.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::ControlFlow;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};

use duel_tetris::config::Config;
use duel_tetris::core::{EventListener, GameLoop, GameSnapshot, Replay, Session};
use duel_tetris::event_log::EventLog;
use duel_tetris::input::{KeyInput, Routed};
use duel_tetris::term::{FrameBuffer, SessionView, TerminalRenderer, Viewport};
use duel_tetris::types::{EngineEvent, Player, TICK_MS};

const FRAME: Duration = Duration::from_millis(TICK_MS as u64);

type SharedLog = Rc<RefCell<EventLog<BufWriter<File>>>>;

fn main() -> Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    let seed = config.seed_or_clock();

    let mut session = Session::new(config.mode, seed);
    let event_log = match &config.event_log_path {
        Some(path) => Some((path.clone(), open_event_log(path, &mut session)?)),
        None => None,
    };
    if config.record_path.is_some() {
        session.start_recording();
    }
    println!(
        "[duel-tetris] mode={} seed={}",
        session.mode().as_str(),
        seed
    );

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut session, &config);

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Some((path, log)) = &event_log {
        close_event_log(path, log)?;
    }
    result?;

    report(&session);
    if let (Some(path), Some(replay)) = (&config.record_path, session.take_recording()) {
        save_replay(path, &replay)?;
        println!(
            "[duel-tetris] replay saved to {} ({} steps)",
            path.display(),
            replay.steps.len()
        );
    }
    Ok(())
}

fn run(term: &mut TerminalRenderer, session: &mut Session, config: &Config) -> Result<()> {
    let mut keys = KeyInput::new(
        config.layout(),
        config.key_release_timeout(term.key_release_events()),
    );
    let mut game_loop = GameLoop::new(config.step_mode());
    let view = SessionView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snapshots = vec![GameSnapshot::default(); session.engines().len()];

    game_loop.frame(Instant::now(), session);

    loop {
        for (snapshot, engine) in snapshots.iter_mut().zip(session.engines()) {
            engine.snapshot_into(snapshot);
        }
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        view.render_into(&snapshots, viewport, &mut fb);
        term.draw_swap(&mut fb, &view.regions(snapshots.len(), viewport))?;

        // Input until the frame deadline, or until the next fixed step is due.
        let deadline = Instant::now() + game_loop.until_next_step().unwrap_or(FRAME);
        while let Some(timeout) = deadline.checked_duration_since(Instant::now()) {
            if !event::poll(timeout)? {
                break;
            }
            match event::read()? {
                Event::Key(key) => {
                    if let Some(routed) = keys.handle(key, Instant::now()) {
                        if dispatch(routed, session, &mut keys).is_break() {
                            return Ok(());
                        }
                    }
                }
                Event::Resize(..) => term.invalidate(),
                Event::FocusLost => release_held(session, &mut keys),
                _ => {}
            }
        }

        let now = Instant::now();
        for routed in keys.expire(now) {
            if dispatch(routed, session, &mut keys).is_break() {
                return Ok(());
            }
        }
        game_loop.frame(now, session);
    }
}

fn dispatch(routed: Routed, session: &mut Session, keys: &mut KeyInput) -> ControlFlow<()> {
    match routed {
        Routed::Command(player, command) => session.apply(player, command),
        Routed::StartAll => session.start_all(),
        Routed::PauseAll => {
            release_held(session, keys);
            session.toggle_pause_all();
        }
        Routed::RestartAll => {
            release_held(session, keys);
            session.restart_all();
        }
        Routed::Quit => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

fn release_held(session: &mut Session, keys: &mut KeyInput) {
    for routed in keys.release_all() {
        if let Routed::Command(player, command) = routed {
            session.apply(player, command);
        }
    }
}

fn report(session: &Session) {
    for (&player, engine) in session.players().iter().zip(session.engines()) {
        println!(
            "[duel-tetris] {} score={} level={} lines={}{}",
            player.tag(),
            engine.score(),
            engine.level(),
            engine.lines(),
            if engine.is_game_over() { " (game over)" } else { "" }
        );
    }
    if let Some(winner) = session.winner() {
        println!("[duel-tetris] winner: {}", winner.tag());
    }
}

/// The session owns its listeners, so the log is shared to read its error state back.
fn open_event_log(path: &Path, session: &mut Session) -> Result<SharedLog> {
    let log = EventLog::create(path)
        .with_context(|| format!("opening event log {}", path.display()))?;
    let log = Rc::new(RefCell::new(log));
    let sink = Rc::clone(&log);
    session.subscribe(move |player: Player, event: EngineEvent| {
        sink.borrow_mut().on_event(player, event)
    });
    Ok(log)
}

fn close_event_log(path: &Path, log: &SharedLog) -> Result<()> {
    log.borrow_mut()
        .finish()
        .with_context(|| format!("writing event log {}", path.display()))
}

fn save_replay(path: &Path, replay: &Replay) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating replay {}", path.display()))?;
    let mut out = BufWriter::new(file);
    replay
        .to_writer(&mut out)
        .with_context(|| format!("writing replay {}", path.display()))?;
    out.flush()?;
    Ok(())
}
