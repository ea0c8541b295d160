//! Headless replay runner.
//!
//! Usage: `replay <replay.json>`
//!
//! Plays a recorded session against fresh engines and prints a JSON summary (final
//! score, level, lines and board rows per player, plus event counts) to stdout.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use serde_json::json;

use duel_tetris::core::{Engine, Replay, Session};
use duel_tetris::types::{Block, EngineEvent, Player};

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    locks: u32,
    garbage_sent: u32,
    garbage_received: u32,
}

fn main() -> Result<()> {
    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: replay <replay.json>");
    };

    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let replay = Replay::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;

    let counts = Rc::new(RefCell::new([Counts::default(); 2]));
    let mut session = Session::new(replay.mode, replay.seed);
    let sink = Rc::clone(&counts);
    session.subscribe(move |player: Player, event: EngineEvent| {
        let mut counts = sink.borrow_mut();
        let c = &mut counts[player.index()];
        match event {
            EngineEvent::Lock => c.locks += 1,
            EngineEvent::GarbageSent { lines } => c.garbage_sent += lines as u32,
            EngineEvent::GarbageReceived { lines } => c.garbage_received += lines as u32,
            _ => {}
        }
    });
    replay.run_into(&mut session);

    let counts = *counts.borrow();
    let players: Vec<_> = session
        .players()
        .iter()
        .zip(session.engines())
        .map(|(&player, engine)| {
            let c = counts[player.index()];
            json!({
                "player": player.tag(),
                "score": engine.score(),
                "level": engine.level(),
                "lines": engine.lines(),
                "gameOver": engine.is_game_over(),
                "locks": c.locks,
                "garbageSent": c.garbage_sent,
                "garbageReceived": c.garbage_received,
                "board": board_rows(engine),
            })
        })
        .collect();

    let summary = json!({
        "mode": replay.mode,
        "seed": replay.seed,
        "steps": replay.steps.len(),
        "durationMs": replay.duration_ms(),
        "players": players,
        "winner": session.winner().map(Player::tag),
    });
    serde_json::to_writer_pretty(io::stdout().lock(), &summary)?;
    println!();
    Ok(())
}

/// Board rows top to bottom: `.` empty, `#` garbage, piece letters for locked cells.
fn board_rows(engine: &Engine) -> Vec<String> {
    engine
        .board()
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    None => ".",
                    Some(Block::Garbage) => "#",
                    Some(Block::Piece(kind)) => kind.letter(),
                })
                .collect()
        })
        .collect()
}
