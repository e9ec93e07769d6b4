use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub max_file_size: usize,
    pub session_ttl: Duration,
    pub publish: PublishTiming,
}

/// Delay applied after each mocked publishing step: `base + [0, jitter)`.
#[derive(Debug, Clone, Copy)]
pub struct PublishTiming {
    pub step_delay: Duration,
    pub step_jitter: Duration,
}

impl PublishTiming {
    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            step_delay: Duration::ZERO,
            step_jitter: Duration::ZERO,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_file_size: default_max_file_size(),
            session_ttl: Duration::from_secs(3 * 60 * 60),
            publish: PublishTiming {
                step_delay: Duration::from_millis(1000),
                step_jitter: Duration::from_millis(1000),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let defaults = Config::default();

        let bind_addr = env_or("BIND_ADDR", defaults.bind_addr)?;
        let max_file_size = env_or("MAX_FILE_SIZE", defaults.max_file_size)?;
        let session_ttl = env_or("SESSION_TTL_SECS", defaults.session_ttl.as_secs())
            .map(Duration::from_secs)?;
        let step_delay = env_or("PUBLISH_STEP_DELAY_MS", defaults.publish.step_delay.as_millis() as u64)
            .map(Duration::from_millis)?;
        let step_jitter = env_or("PUBLISH_STEP_JITTER_MS", defaults.publish.step_jitter.as_millis() as u64)
            .map(Duration::from_millis)?;

        Ok(Config {
            bind_addr,
            max_file_size,
            session_ttl,
            publish: PublishTiming { step_delay, step_jitter },
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Failed to parse {}={:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

pub fn load_config() -> Result<Config> {
    let config = Config::from_env()?;
    tracing::info!(
        "Loaded config: bind_addr={}, max_file_size={}B, session_ttl={:?}",
        config.bind_addr,
        config.max_file_size,
        config.session_ttl
    );
    Ok(config)
}
