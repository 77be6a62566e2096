//! PLEG tuning knobs.

use std::env;
use std::time::Duration;

pub const DEFAULT_RELIST_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 10;

const RELIST_INTERVAL_ENV: &str = "PLEG_RELIST_INTERVAL_SECS";
const EVENT_CHANNEL_CAPACITY_ENV: &str = "PLEG_EVENT_CHANNEL_CAPACITY";

/// Tuning knobs for the PLEG.
///
/// A shorter relist interval detects state changes sooner at the cost of more
/// runtime probing; the channel capacity bounds how far event production can
/// run ahead of the executor before the relist task blocks.
#[derive(Debug, Clone)]
pub struct PlegConfig {
    /// Interval between consecutive relist cycles.
    pub relist_interval: Duration,
    /// Capacity of the outbound event channel.
    pub event_channel_capacity: usize,
}

impl Default for PlegConfig {
    fn default() -> Self {
        Self {
            relist_interval: DEFAULT_RELIST_INTERVAL,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl PlegConfig {
    /// Builds the config from `PLEG_RELIST_INTERVAL_SECS` and
    /// `PLEG_EVENT_CHANNEL_CAPACITY`, falling back to the defaults for unset
    /// or unparsable values.
    pub fn from_env() -> Self {
        Self {
            relist_interval: parse_interval(env::var(RELIST_INTERVAL_ENV).ok()),
            event_channel_capacity: parse_capacity(env::var(EVENT_CHANNEL_CAPACITY_ENV).ok()),
        }
    }
}

fn parse_interval(raw: Option<String>) -> Duration {
    raw.and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RELIST_INTERVAL)
}

fn parse_capacity(raw: Option<String>) -> usize {
    raw.and_then(|v| v.parse::<usize>().ok())
        .filter(|cap| *cap > 0)
        .unwrap_or(DEFAULT_EVENT_CHANNEL_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_knobs() {
        let config = PlegConfig::default();
        assert_eq!(config.relist_interval, Duration::from_secs(10));
        assert_eq!(config.event_channel_capacity, 10);
    }

    #[test]
    fn interval_parses_seconds_and_rejects_garbage() {
        assert_eq!(
            parse_interval(Some("3".to_string())),
            Duration::from_secs(3)
        );
        assert_eq!(parse_interval(Some("0".to_string())), DEFAULT_RELIST_INTERVAL);
        assert_eq!(
            parse_interval(Some("soon".to_string())),
            DEFAULT_RELIST_INTERVAL
        );
        assert_eq!(parse_interval(None), DEFAULT_RELIST_INTERVAL);
    }

    #[test]
    fn capacity_rejects_zero_and_garbage() {
        assert_eq!(parse_capacity(Some("32".to_string())), 32);
        assert_eq!(
            parse_capacity(Some("0".to_string())),
            DEFAULT_EVENT_CHANNEL_CAPACITY
        );
        assert_eq!(
            parse_capacity(Some("many".to_string())),
            DEFAULT_EVENT_CHANNEL_CAPACITY
        );
        assert_eq!(parse_capacity(None), DEFAULT_EVENT_CHANNEL_CAPACITY);
    }
}
