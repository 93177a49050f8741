use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};

/// Requests per second and burst allowed on booking-creation routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub per_second: u64,
    pub burst: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Default deadline for one unit of work
    pub tx_deadline: Duration,
    /// Apply pending migrations at start-up
    pub run_migrations: bool,
    /// `None` disables rate limiting
    pub booking_rate_limit: Option<RateLimit>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let per_second: u64 = parse_or(&lookup, "BOOKING_RATE_PER_SECOND", 5)?;
        let burst: u32 = parse_or(&lookup, "BOOKING_RATE_BURST", 10)?;

        Ok(Self {
            database_url,
            port: parse_or(&lookup, "PORT", 8080)?,
            tx_deadline: Duration::from_millis(parse_or(&lookup, "TX_DEADLINE_MS", 5000)?),
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true)?,
            booking_rate_limit: (per_second > 0 && burst > 0)
                .then_some(RateLimit { per_second, burst }),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid value for {}: '{}' ({})", key, raw, e)),
        _ => Ok(default),
    }
}
