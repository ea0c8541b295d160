//! Input tests - key events routed into a versus session

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use duel_tetris::core::Session;
use duel_tetris::input::{KeyInput, Layout, Routed};
use duel_tetris::types::{InputCommand, Player};

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
}

fn repeat(code: KeyCode) -> KeyEvent {
    KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Repeat)
}

fn release(code: KeyCode) -> KeyEvent {
    KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release)
}

fn route(session: &mut Session, routed: Routed) {
    match routed {
        Routed::Command(player, command) => session.apply(player, command),
        Routed::StartAll => session.start_all(),
        Routed::PauseAll => session.toggle_pause_all(),
        Routed::RestartAll => session.restart_all(),
        Routed::Quit => {}
    }
}

#[test]
fn test_press_repeat_release_cycle() {
    let mut keys = KeyInput::new(Layout::Versus, None);
    let t0 = Instant::now();

    assert_eq!(
        keys.handle(press(KeyCode::Char('a')), t0),
        Some(Routed::Command(Player::One, InputCommand::PressLeft))
    );
    assert_eq!(keys.handle(repeat(KeyCode::Char('a')), t0), None);
    assert_eq!(
        keys.handle(release(KeyCode::Char('a')), t0),
        Some(Routed::Command(Player::One, InputCommand::ReleaseLeft))
    );
    assert_eq!(keys.handle(release(KeyCode::Char('a')), t0), None);
}

#[test]
fn test_repeat_never_refires_one_shots() {
    let mut keys = KeyInput::new(Layout::Versus, None);
    let t0 = Instant::now();

    assert_eq!(
        keys.handle(press(KeyCode::Enter), t0),
        Some(Routed::Command(Player::Two, InputCommand::HardDrop))
    );
    assert_eq!(keys.handle(repeat(KeyCode::Enter), t0), None);
    assert_eq!(keys.handle(repeat(KeyCode::Up), t0), None);
}

#[test]
fn test_global_keys_fire_on_press_only() {
    let mut keys = KeyInput::default();
    let t0 = Instant::now();

    assert_eq!(keys.handle(press(KeyCode::Char('g')), t0), Some(Routed::StartAll));
    assert_eq!(keys.handle(release(KeyCode::Char('g')), t0), None);
    assert_eq!(keys.handle(press(KeyCode::Char('p')), t0), Some(Routed::PauseAll));
    assert_eq!(keys.handle(press(KeyCode::Char('r')), t0), Some(Routed::RestartAll));
    assert_eq!(keys.handle(press(KeyCode::Esc), t0), Some(Routed::Quit));
    assert_eq!(
        keys.handle(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            t0
        ),
        Some(Routed::Quit)
    );
    assert_eq!(keys.handle(press(KeyCode::F(5)), t0), None);
}

#[test]
fn test_stale_keys_are_released() {
    let mut keys = KeyInput::new(Layout::Versus, Some(Duration::from_millis(150)));
    let t0 = Instant::now();

    keys.handle(press(KeyCode::Left), t0);
    keys.handle(press(KeyCode::Char('s')), t0 + Duration::from_millis(100));
    // Auto-repeat keeps the arrow alive.
    keys.handle(press(KeyCode::Left), t0 + Duration::from_millis(120));

    assert!(keys.expire(t0 + Duration::from_millis(200)).is_empty());
    assert_eq!(
        keys.expire(t0 + Duration::from_millis(251)).as_slice(),
        &[Routed::Command(Player::One, InputCommand::ReleaseDown)]
    );
    assert_eq!(
        keys.expire(t0 + Duration::from_millis(271)).as_slice(),
        &[Routed::Command(Player::Two, InputCommand::ReleaseLeft)]
    );
}

#[test]
fn test_release_all_covers_both_players() {
    let mut keys = KeyInput::new(Layout::Versus, None);
    let t0 = Instant::now();
    keys.handle(press(KeyCode::Char('d')), t0);
    keys.handle(press(KeyCode::Down), t0);

    let released = keys.release_all();
    assert!(released.contains(&Routed::Command(Player::One, InputCommand::ReleaseRight)));
    assert!(released.contains(&Routed::Command(Player::Two, InputCommand::ReleaseDown)));
    assert_eq!(released.len(), 2);
}

#[test]
fn test_keys_drive_only_their_own_board() {
    let mut session = Session::versus(21);
    let mut keys = KeyInput::new(Layout::Versus, None);
    let t0 = Instant::now();

    let start = keys.handle(press(KeyCode::Char('g')), t0).unwrap();
    route(&mut session, start);

    let x = |session: &Session, player| {
        session
            .engine(player)
            .and_then(|e| e.active())
            .map(|p| p.x)
    };
    let one_before = x(&session, Player::One);
    let two_before = x(&session, Player::Two);

    let routed = keys.handle(press(KeyCode::Left), t0).unwrap();
    route(&mut session, routed);

    assert_eq!(x(&session, Player::One), one_before);
    assert_eq!(x(&session, Player::Two), two_before.map(|x| x - 1));
}

#[test]
fn test_solo_layout_routes_arrows_to_player_one() {
    let mut keys = KeyInput::new(Layout::Solo, None);
    assert_eq!(
        keys.handle(press(KeyCode::Left), Instant::now()),
        Some(Routed::Command(Player::One, InputCommand::PressLeft))
    );
    assert_eq!(keys.layout(), Layout::Solo);
}
