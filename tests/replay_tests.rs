//! Replay tests - recording through the game loop, files on disk, the replay binary

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::rc::Rc;

use duel_tetris::core::{EventListener, GameLoop, Mode, Replay, ReplayStep, Session, StepMode};
use duel_tetris::event_log::EventLog;
use duel_tetris::types::{EngineEvent, InputCommand, Player};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("duel-tetris-{}-{name}", std::process::id()))
}

/// A short versus game driven through a fixed-step loop with uneven frames.
fn recorded_game(seed: u64) -> (Session, Replay) {
    let mut session = Session::versus(seed);
    session.start_recording();
    session.start_all();

    let mut game_loop = GameLoop::new(StepMode::Fixed { step_ms: 16 });
    for frame in 0..400u32 {
        let player = if frame % 3 == 0 { Player::Two } else { Player::One };
        match frame % 11 {
            0 => session.apply(player, InputCommand::PressLeft),
            2 => session.apply(player, InputCommand::ReleaseLeft),
            4 => session.apply(player, InputCommand::RotateCcw),
            6 => session.apply(player, InputCommand::PressRight),
            7 => session.apply(player, InputCommand::ReleaseRight),
            9 => session.apply(player, InputCommand::HardDrop),
            _ => {}
        }
        game_loop.advance(10 + frame % 13, &mut session);
    }

    let replay = session.take_recording().unwrap();
    (session, replay)
}

#[test]
fn test_game_loop_ticks_are_recorded() {
    let (_, replay) = recorded_game(5);
    assert_eq!(replay.mode, Mode::Versus);
    assert_eq!(replay.seed, 5);
    assert_eq!(replay.steps.first(), Some(&ReplayStep::StartAll));
    assert!(replay
        .steps
        .iter()
        .filter_map(|s| match s {
            ReplayStep::Tick { dt_ms } => Some(*dt_ms),
            _ => None,
        })
        .all(|dt| dt == 16));
}

#[test]
fn test_replay_file_round_trip_reproduces_boards() {
    let (live, replay) = recorded_game(8);
    let path = temp_path("round-trip.json");

    replay.to_writer(fs::File::create(&path).unwrap()).unwrap();
    let loaded = Replay::from_reader(fs::File::open(&path).unwrap()).unwrap();
    fs::remove_file(&path).ok();

    let rerun = loaded.run();
    for player in Player::ALL {
        assert_eq!(
            rerun.engine(player).unwrap().snapshot(),
            live.engine(player).unwrap().snapshot(),
            "{player:?}"
        );
    }
}

#[test]
fn test_restart_replays_deterministically() {
    let mut replay = Replay::new(Mode::Solo, 3);
    replay.push(ReplayStep::StartAll);
    for _ in 0..5 {
        replay.push(ReplayStep::Input {
            player: Player::One,
            command: InputCommand::HardDrop,
        });
    }
    replay.push(ReplayStep::RestartAll);
    replay.push(ReplayStep::Tick { dt_ms: 1000 });

    let a = replay.run();
    let b = replay.run();
    let a = a.engine(Player::One).unwrap();
    assert_eq!(a.snapshot(), b.engine(Player::One).unwrap().snapshot());
    assert_eq!(a.score(), 0);
    assert_eq!(a.board().occupied_count(), 0);
}

#[test]
fn test_event_log_file() {
    let path = temp_path("events.log");
    fs::remove_file(&path).ok();

    let log = Rc::new(RefCell::new(EventLog::create(&path).unwrap()));
    let sink = Rc::clone(&log);
    let mut session = Session::versus(13);
    session.subscribe(move |player: Player, event: EngineEvent| {
        sink.borrow_mut().on_event(player, event)
    });
    session.start_all();
    session.apply(Player::One, InputCommand::HardDrop);
    session.apply(Player::Two, InputCommand::RotateCw);

    // Session still alive: lines reach the file only through finish().
    log.borrow_mut().finish().unwrap();
    assert!(log.borrow().error().is_none());

    let text = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).ok();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(&lines[..2], ["[p1] drop", "[p1] lock"]);
    assert!(lines
        .iter()
        .all(|l| l.starts_with("[p1] ") || l.starts_with("[p2] ")));
}

#[test]
fn test_replay_binary_prints_summary() {
    let (live, replay) = recorded_game(21);
    let path = temp_path("summary.json");
    replay.to_writer(fs::File::create(&path).unwrap()).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_replay"))
        .arg(&path)
        .output()
        .unwrap();
    fs::remove_file(&path).ok();
    assert!(output.status.success(), "{output:?}");

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["mode"], "versus");
    assert_eq!(summary["seed"], 21);
    assert_eq!(summary["steps"], replay.steps.len());
    assert_eq!(summary["durationMs"], replay.duration_ms());

    let players = summary["players"].as_array().unwrap();
    assert_eq!(players.len(), 2);
    for (entry, player) in players.iter().zip(Player::ALL) {
        let engine = live.engine(player).unwrap();
        assert_eq!(entry["player"], player.tag());
        assert_eq!(entry["score"], engine.score());
        assert_eq!(entry["lines"], engine.lines());
        assert_eq!(entry["board"].as_array().map(Vec::len), Some(20));
    }
}

#[test]
fn test_replay_binary_rejects_missing_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_replay"))
        .arg(temp_path("does-not-exist.json"))
        .output()
        .unwrap();
    assert!(!output.status.success());
}
