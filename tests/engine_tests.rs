//! Engine tests - lifecycle, timing, locking and scoring through the public API

use duel_tetris::core::scoring::{
    calculate_level, calculate_line_clear_score, drop_interval_ms, garbage_for_clear,
    soft_drop_interval_ms,
};
use duel_tetris::core::{Board, Engine, Phase};
use duel_tetris::types::{
    Block, EngineEvent, HorizontalDir, InputCommand, PieceKind, RotateDir,
};

fn seed_for_first(kind: PieceKind) -> u64 {
    (0..)
        .find(|&seed| Engine::new(seed).next() == kind)
        .unwrap_or(0)
}

fn started_with(kind: PieceKind, board: Board) -> Engine {
    let mut engine = Engine::with_board(seed_for_first(kind), board);
    engine.start();
    engine.drain_events().for_each(drop);
    engine
}

fn x(engine: &Engine) -> i8 {
    engine.active().map(|p| p.x).unwrap_or(i8::MIN)
}

fn y(engine: &Engine) -> i8 {
    engine.active().map(|p| p.y).unwrap_or(i8::MIN)
}

/// Board whose two top rows are blocked where every piece spawns.
fn blocked_spawn_board() -> Board {
    let mut board = Board::new();
    for y in 0..2 {
        for x in 3..=6 {
            board.set_cell(x, y, Some(Block::Garbage));
        }
    }
    board
}

#[test]
fn test_scoring_tables() {
    assert_eq!(calculate_line_clear_score(0, 5).total, 0);
    let tetris = calculate_line_clear_score(4, 2);
    assert_eq!(tetris.line_bonus, 1600);
    assert_eq!(tetris.per_line_bonus, 80);
    assert_eq!(tetris.total, 1680);

    assert_eq!(calculate_level(0), 1);
    assert_eq!(calculate_level(9), 1);
    assert_eq!(calculate_level(10), 2);
    assert_eq!(calculate_level(35), 4);

    let intervals: Vec<u32> = (1..=11).map(drop_interval_ms).collect();
    assert_eq!(
        intervals,
        [1000, 800, 650, 500, 400, 320, 250, 200, 160, 120, 120]
    );

    assert_eq!(soft_drop_interval_ms(1000), 100);
    assert_eq!(soft_drop_interval_ms(120), 20);

    assert_eq!(garbage_for_clear(0), 0);
    assert_eq!(garbage_for_clear(1), 0);
    assert_eq!(garbage_for_clear(4), 3);
}

#[test]
fn test_start_is_once_only() {
    let mut engine = Engine::new(7);
    assert_eq!(engine.phase(), Phase::Idle);
    engine.start();
    assert_eq!(engine.phase(), Phase::Falling);
    let active = engine.active();
    engine.start();
    assert_eq!(engine.active(), active);
}

#[test]
fn test_das_and_arr_through_ticks() {
    let mut engine = started_with(PieceKind::T, Board::new());
    assert_eq!(x(&engine), 3);

    engine.apply(InputCommand::PressRight);
    assert_eq!(x(&engine), 4);

    engine.tick(149);
    assert_eq!(x(&engine), 4, "still inside DAS");
    engine.tick(1);
    assert_eq!(x(&engine), 4, "DAS reached, no ARR yet");
    engine.tick(50);
    assert_eq!(x(&engine), 5);
    engine.tick(100);
    assert_eq!(x(&engine), 7);

    // T is three wide: column 7 is the last origin that fits.
    engine.tick(500);
    assert_eq!(x(&engine), 7);
    assert_eq!(engine.held_direction(), Some(HorizontalDir::Right));

    engine.apply(InputCommand::ReleaseRight);
    assert_eq!(engine.held_direction(), None);
}

#[test]
fn test_gravity_and_soft_drop() {
    let mut engine = started_with(PieceKind::O, Board::new());
    assert_eq!(y(&engine), 0);

    engine.tick(999);
    assert_eq!(y(&engine), 0);
    engine.tick(1);
    assert_eq!(y(&engine), 1);

    engine.apply(InputCommand::PressDown);
    assert_eq!(y(&engine), 2, "immediate step on press");
    assert_eq!(engine.effective_interval_ms(), 100);
    engine.tick(100);
    assert_eq!(y(&engine), 3);

    engine.apply(InputCommand::ReleaseDown);
    assert_eq!(engine.effective_interval_ms(), 1000);
    engine.tick(100);
    assert_eq!(y(&engine), 3);
}

#[test]
fn test_single_clear() {
    let mut engine = started_with(PieceKind::I, Board::from_rows(&["###....###"]));
    engine.apply(InputCommand::HardDrop);

    let events: Vec<EngineEvent> = engine.drain_events().collect();
    assert_eq!(
        events,
        [
            EngineEvent::Drop,
            EngineEvent::Lock,
            EngineEvent::LineClear { count: 1 }
        ]
    );
    assert_eq!(engine.score(), 110);
    assert_eq!(engine.lines(), 1);
    assert_eq!(engine.board().occupied_count(), 0);
    assert_eq!(engine.phase(), Phase::Falling);
}

#[test]
fn test_four_row_clear_sends_three() {
    let rows = ["#########."; 4];
    let mut engine = started_with(PieceKind::I, Board::from_rows(&rows));

    assert!(engine.rotate(RotateDir::Cw));
    for _ in 0..4 {
        engine.apply(InputCommand::PressRight);
        engine.apply(InputCommand::ReleaseRight);
    }
    engine.apply(InputCommand::HardDrop);

    let events: Vec<EngineEvent> = engine.drain_events().collect();
    assert!(events.ends_with(&[
        EngineEvent::Drop,
        EngineEvent::Lock,
        EngineEvent::LineClear { count: 4 },
        EngineEvent::GarbageSent { lines: 3 },
    ]));
    assert_eq!(engine.score(), 840);
    assert_eq!(engine.board().occupied_count(), 0);
}

#[test]
fn test_game_over_latch() {
    let mut engine = Engine::with_board(3, blocked_spawn_board());
    engine.start();

    assert!(engine.is_game_over());
    assert!(!engine.is_running());
    assert_eq!(engine.drain_events().collect::<Vec<_>>(), [EngineEvent::GameOver]);

    let before = engine.snapshot();
    engine.tick(5_000);
    for command in InputCommand::ALL {
        if command != InputCommand::Restart {
            engine.apply(command);
        }
    }
    engine.add_garbage(4);

    assert_eq!(engine.snapshot(), before);
    assert!(engine.pending_events().is_empty());
    assert_eq!(engine.phase(), Phase::GameOver);
}

#[test]
fn test_restart_after_game_over() {
    let mut engine = Engine::with_board(3, blocked_spawn_board());
    engine.start();
    assert!(engine.is_game_over());

    engine.restart();
    assert!(engine.is_running());
    assert!(!engine.is_game_over());
    assert_eq!(engine.board().occupied_count(), 0);
    assert_eq!(engine.score(), 0);
}

#[test]
fn test_pause_freezes_everything_but_resume() {
    let mut engine = started_with(PieceKind::S, Board::new());
    engine.apply(InputCommand::TogglePause);
    assert!(engine.is_paused());

    let before = engine.snapshot();
    engine.tick(10_000);
    engine.apply(InputCommand::PressLeft);
    engine.apply(InputCommand::HardDrop);
    engine.apply(InputCommand::RotateCw);
    assert_eq!(engine.snapshot(), before);

    engine.apply(InputCommand::TogglePause);
    assert!(!engine.is_paused());
    engine.tick(1000);
    assert_eq!(y(&engine), 1);
}

#[test]
fn test_garbage_does_not_move_active_piece() {
    let mut engine = started_with(PieceKind::L, Board::new());
    let active = engine.active();

    engine.add_garbage(2);
    assert_eq!(engine.active(), active);
    assert_eq!(
        engine.drain_events().collect::<Vec<_>>(),
        [EngineEvent::GarbageReceived { lines: 2 }]
    );
    assert!(engine.board().row(19).iter().filter(|c| c.is_none()).count() == 1);
}

#[test]
fn test_ghost_row_matches_hard_drop() {
    let mut engine = started_with(PieceKind::J, Board::from_rows(&["#####.....", "#####....."]));
    let ghost = engine.ghost_y();
    let kind = engine.active().map(|p| p.kind);

    engine.apply(InputCommand::HardDrop);
    let board = engine.board();
    // J North spans rows y and y + 1 at columns 3..=5.
    let ghost = ghost.unwrap();
    assert_eq!(
        board.cell_at(3, ghost),
        Some(kind.map(Block::Piece))
    );
    assert_eq!(board.cell_at(5, ghost + 1), Some(kind.map(Block::Piece)));
}
