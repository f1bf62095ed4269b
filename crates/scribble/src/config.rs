//! Server configuration, read from `SCRIBBLE_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use scribble_room::{RoomConfig, WordBank};

use crate::ScribbleError;

pub const DEFAULT_BIND: &str = "0.0.0.0:3001";
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);
/// Shortest accepted idle timeout.
pub const MIN_IDLE_TIMEOUT: Duration = Duration::from_millis(250);
/// Pings per idle timeout, so one lost pong doesn't drop a client.
const PINGS_PER_TIMEOUT: u32 = 4;

/// Everything needed to start a [`ScribbleServer`](crate::ScribbleServer).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    /// Applied to every room.
    pub room: RoomConfig,
    /// A connection that sends nothing for this long is dropped. The
    /// server pings every client well within it, so only dead peers are.
    pub idle_timeout: Duration,
    /// Newline-separated word list. The built-in list is used when unset.
    pub words_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            room: RoomConfig::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            words_file: None,
        }
    }
}

impl ServerConfig {
    /// Reads the process environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SCRIBBLE_BIND` | `0.0.0.0:3001` |
    /// | `SCRIBBLE_TURN_TICKS` | 60 |
    /// | `SCRIBBLE_PAUSE_TICKS` | 3 |
    /// | `SCRIBBLE_TICK_MS` | 1000 |
    /// | `SCRIBBLE_IDLE_TIMEOUT_SECS` | 300 |
    /// | `SCRIBBLE_WORDS_FILE` | built-in list |
    ///
    /// # Errors
    /// [`ScribbleError::Config`] if a numeric variable doesn't parse.
    pub fn from_env() -> Result<Self, ScribbleError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ScribbleError> {
        let mut config = Self::default();

        if let Some(addr) = lookup("SCRIBBLE_BIND") {
            config.bind_addr = addr;
        }
        if let Some(raw) = lookup("SCRIBBLE_TURN_TICKS") {
            config.room.turn_ticks = parse_var("SCRIBBLE_TURN_TICKS", &raw)?;
        }
        if let Some(raw) = lookup("SCRIBBLE_PAUSE_TICKS") {
            config.room.pause_ticks = parse_var("SCRIBBLE_PAUSE_TICKS", &raw)?;
        }
        if let Some(raw) = lookup("SCRIBBLE_TICK_MS") {
            config.room.tick_interval = Duration::from_millis(parse_var("SCRIBBLE_TICK_MS", &raw)?);
        }
        if let Some(raw) = lookup("SCRIBBLE_IDLE_TIMEOUT_SECS") {
            config.idle_timeout = Duration::from_secs(parse_var("SCRIBBLE_IDLE_TIMEOUT_SECS", &raw)?);
        }
        config.words_file = lookup("SCRIBBLE_WORDS_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    /// Clamps `idle_timeout` to at least [`MIN_IDLE_TIMEOUT`].
    pub fn validated(mut self) -> Self {
        if self.idle_timeout < MIN_IDLE_TIMEOUT {
            tracing::warn!(
                requested = ?self.idle_timeout,
                min = ?MIN_IDLE_TIMEOUT,
                "idle timeout below minimum, clamping"
            );
            self.idle_timeout = MIN_IDLE_TIMEOUT;
        }
        self
    }

    /// How often an otherwise quiet connection is pinged.
    pub fn keepalive_interval(&self) -> Duration {
        self.idle_timeout / PINGS_PER_TIMEOUT
    }

    /// Builds the word bank: the configured file, or the built-in list.
    ///
    /// # Errors
    /// [`ScribbleError::Config`] if the file can't be read, or
    /// [`ScribbleError::Room`] if it holds no words.
    pub fn load_words(&self) -> Result<WordBank, ScribbleError> {
        let Some(path) = &self.words_file else {
            return Ok(WordBank::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| ScribbleError::Config(format!("{}: {e}", path.display())))?;
        let bank = WordBank::from_text(&text)?;
        tracing::info!(path = %path.display(), words = bank.len(), "word list loaded");
        Ok(bank)
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T, ScribbleError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ScribbleError::Config(format!("{key}={raw:?}: {e}")))
}
