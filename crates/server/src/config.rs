use std::env;
use std::str::FromStr;
use std::time::Duration;

use trainer_core::TrainerConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub auto_play_delay_ms: u64,
    pub reveal_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Missing or unparsable values fall back to
    /// the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: FromStr>(value: Option<String>, default: T) -> T {
            value.and_then(|v| v.parse().ok()).unwrap_or(default)
        }

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(lookup("PORT"), 8000),
            auto_play_delay_ms: parsed(lookup("TRAINER_AUTO_PLAY_DELAY_MS"), 500),
            reveal_delay_ms: parsed(lookup("TRAINER_REVEAL_DELAY_MS"), 500),
        }
    }

    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig {
            auto_play_delay: Duration::from_millis(self.auto_play_delay_ms),
            reveal_delay: Duration::from_millis(self.reveal_delay_ms),
        }
    }
}
