//! Runtime configuration from environment variables.
//!
//! | variable                     | meaning                                          |
//! |------------------------------|--------------------------------------------------|
//! | `DUEL_TETRIS_MODE`           | `solo` or `versus` (default `versus`)            |
//! | `DUEL_TETRIS_SEED`           | session seed (default: derived from the clock)   |
//! | `DUEL_TETRIS_FIXED_STEP_MS`  | run the loop in fixed steps of this many ms      |
//! | `DUEL_TETRIS_RECORD`         | write a replay of the session to this path       |
//! | `DUEL_TETRIS_EVENT_LOG`      | append engine events to this file                |
//! | `DUEL_TETRIS_KEY_RELEASE_MS` | held-key timeout; `0` disables auto-release      |
//!
//! Empty values count as unset.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::core::{Mode, StepMode};
use crate::input::{Layout, DEFAULT_KEY_RELEASE_TIMEOUT_MS};

pub const ENV_MODE: &str = "DUEL_TETRIS_MODE";
pub const ENV_SEED: &str = "DUEL_TETRIS_SEED";
pub const ENV_FIXED_STEP_MS: &str = "DUEL_TETRIS_FIXED_STEP_MS";
pub const ENV_RECORD: &str = "DUEL_TETRIS_RECORD";
pub const ENV_EVENT_LOG: &str = "DUEL_TETRIS_EVENT_LOG";
pub const ENV_KEY_RELEASE_MS: &str = "DUEL_TETRIS_KEY_RELEASE_MS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: unknown mode {value:?}, expected \"solo\" or \"versus\"")]
    InvalidMode { var: &'static str, value: String },
    #[error("{var}: {value:?} is not a valid non-negative integer")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var}: must be greater than zero")]
    Zero { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub mode: Mode,
    pub seed: Option<u64>,
    pub fixed_step_ms: Option<u32>,
    pub record_path: Option<PathBuf>,
    pub event_log_path: Option<PathBuf>,
    /// `None` picks a timeout based on whether the terminal reports key releases.
    pub key_release_ms: Option<u32>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Parse from any variable source; `lookup` returns `None` for unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mode = match get(ENV_MODE) {
            Some(value) => Mode::from_str(&value).ok_or(ConfigError::InvalidMode {
                var: ENV_MODE,
                value,
            })?,
            None => Mode::default(),
        };

        let seed = get(ENV_SEED)
            .map(|v| parse_number::<u64>(ENV_SEED, v))
            .transpose()?;

        let fixed_step_ms = get(ENV_FIXED_STEP_MS)
            .map(|v| parse_number::<u32>(ENV_FIXED_STEP_MS, v))
            .transpose()?;
        if fixed_step_ms == Some(0) {
            return Err(ConfigError::Zero {
                var: ENV_FIXED_STEP_MS,
            });
        }

        let key_release_ms = get(ENV_KEY_RELEASE_MS)
            .map(|v| parse_number::<u32>(ENV_KEY_RELEASE_MS, v))
            .transpose()?;

        Ok(Self {
            mode,
            seed,
            fixed_step_ms,
            record_path: get(ENV_RECORD).map(PathBuf::from),
            event_log_path: get(ENV_EVENT_LOG).map(PathBuf::from),
            key_release_ms,
        })
    }

    /// Configured seed, or one taken from the wall clock.
    pub fn seed_or_clock(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }

    pub fn step_mode(&self) -> StepMode {
        match self.fixed_step_ms {
            Some(step_ms) => StepMode::Fixed { step_ms },
            None => StepMode::Variable,
        }
    }

    pub fn layout(&self) -> Layout {
        match self.mode {
            Mode::Solo => Layout::Solo,
            Mode::Versus => Layout::Versus,
        }
    }

    /// Held-key timeout for a terminal that does (or does not) report key releases.
    pub fn key_release_timeout(&self, terminal_reports_release: bool) -> Option<Duration> {
        let ms = match self.key_release_ms {
            Some(0) => return None,
            Some(ms) => ms,
            None if terminal_reports_release => return None,
            None => DEFAULT_KEY_RELEASE_TIMEOUT_MS,
        };
        Some(Duration::from_millis(ms as u64))
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { var, value })
}
