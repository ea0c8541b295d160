//! Append-only event log.
//!
//! One line per engine event, tagged with the board it came from:
//!
//! ```text
//! [p1] lock
//! [p1] line_clear 3
//! [p1] garbage_sent 2
//! [p2] garbage_received 2
//! ```
//!
//! The game runs in raw mode, so this is where in-game diagnostics go instead of stderr.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::core::EventListener;
use crate::types::{EngineEvent, Player};

/// Format one log line (without the trailing newline).
pub fn format_line(player: Player, event: EngineEvent) -> String {
    let tag = player.tag();
    let name = event.as_str();
    match event {
        EngineEvent::LineClear { count } => format!("[{tag}] {name} {count}"),
        EngineEvent::GarbageSent { lines } | EngineEvent::GarbageReceived { lines } => {
            format!("[{tag}] {name} {lines}")
        }
        _ => format!("[{tag}] {name}"),
    }
}

pub struct EventLog<W: Write> {
    out: W,
    /// First write error; later events are dropped.
    error: Option<io::Error>,
}

impl EventLog<BufWriter<File>> {
    /// Open `path` for appending, creating it if needed.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> EventLog<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Flush buffered lines. Reports the first write error if one was swallowed earlier.
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()
    }
}

impl<W: Write> EventListener for EventLog<W> {
    fn on_event(&mut self, player: Player, event: EngineEvent) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.out, "{}", format_line(player, event)) {
            self.error = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        assert_eq!(format_line(Player::One, EngineEvent::Lock), "[p1] lock");
        assert_eq!(
            format_line(Player::One, EngineEvent::LineClear { count: 3 }),
            "[p1] line_clear 3"
        );
        assert_eq!(
            format_line(Player::Two, EngineEvent::GarbageReceived { lines: 2 }),
            "[p2] garbage_received 2"
        );
        assert_eq!(format_line(Player::Two, EngineEvent::GameOver), "[p2] game_over");
    }

    #[test]
    fn test_listener_writes_lines() {
        let mut log = EventLog::new(Vec::new());
        log.on_event(Player::One, EngineEvent::Drop);
        log.on_event(Player::One, EngineEvent::GarbageSent { lines: 1 });

        assert!(log.error().is_none());
        let text = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(text, "[p1] drop\n[p1] garbage_sent 1\n");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_first_error_is_kept() {
        let mut log = EventLog::new(Broken);
        log.on_event(Player::One, EngineEvent::Move);
        log.on_event(Player::One, EngineEvent::Rotate);
        assert_eq!(log.error().map(|e| e.to_string()), Some("disk full".into()));

        let err = log.finish().unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert!(log.error().is_none());
    }

    /// Accepts writes, refuses to flush.
    struct StuckFlush(Vec<u8>);

    impl Write for StuckFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "flush failed"))
        }
    }

    #[test]
    fn test_finish_reports_flush_error() {
        let mut log = EventLog::new(StuckFlush(Vec::new()));
        log.on_event(Player::Two, EngineEvent::Lock);
        assert!(log.error().is_none());
        assert_eq!(log.finish().unwrap_err().to_string(), "flush failed");
    }

    #[test]
    fn test_finish_flushes_buffered_lines() {
        let mut log = EventLog::new(BufWriter::new(Vec::new()));
        log.on_event(Player::One, EngineEvent::GameOver);
        log.finish().unwrap();

        let out = log.into_inner();
        assert!(out.buffer().is_empty());
        assert_eq!(out.get_ref(), b"[p1] game_over\n");
    }
}
