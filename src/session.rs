//! Session close configuration for the Good-For-Day pruner.
//!
//! The close is a local wall-clock time, 16:00 by default, with a small
//! slack added to the computed wait so the pruner never wakes just before
//! the boundary.

use std::time::Duration;

use chrono::{DateTime, Duration as TimeDelta, Local, NaiveTime, TimeZone};

/// When the trading session ends and Good-For-Day orders are cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Local wall-clock close time
    pub close: NaiveTime,
    /// Added to every computed wait to avoid racing the boundary
    pub slack: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            close: NaiveTime::from_hms_opt(16, 0, 0).expect("valid close time"),
            slack: Duration::from_millis(100),
        }
    }
}

impl SessionConfig {
    /// Session closing at `close` local time with the default slack.
    pub fn new(close: NaiveTime) -> Self {
        Self {
            close,
            ..Self::default()
        }
    }

    /// Wall-clock wait from `now` until the next close, plus slack.
    ///
    /// If `now` is already at or past today's close, the target is
    /// tomorrow's. On a DST gap that swallows the close time, the hour
    /// after it is used.
    pub fn until_next_close(&self, now: DateTime<Local>) -> Duration {
        let mut date = now.date_naive();
        if now.time() >= self.close {
            date = date.succ_opt().expect("calendar overflow");
        }

        let naive = date.and_time(self.close);
        let target = Local
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| {
                Local
                    .from_local_datetime(&(naive + TimeDelta::hours(1)))
                    .earliest()
            })
            .expect("resolvable local close time");

        (target - now).to_std().unwrap_or(Duration::ZERO) + self.slack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_later_today() {
        let config = SessionConfig::default();
        let now = Local::now();
        let close_in_two_hours = SessionConfig::new((now + TimeDelta::hours(2)).time());

        let wait = close_in_two_hours.until_next_close(now);
        let two_hours = Duration::from_secs(2 * 3600);
        assert!(wait >= two_hours.saturating_sub(Duration::from_secs(2)));
        assert!(wait <= two_hours + Duration::from_secs(2));
        assert_eq!(config.slack, Duration::from_millis(100));
    }

    #[test]
    fn test_past_close_targets_tomorrow() {
        let now = Local::now();
        let closed_an_hour_ago = SessionConfig::new((now - TimeDelta::hours(1)).time());

        let wait = closed_an_hour_ago.until_next_close(now);
        // 23 hours away, give or take a DST transition.
        assert!(wait >= Duration::from_secs(21 * 3600));
        assert!(wait <= Duration::from_secs(25 * 3600));
    }

    #[test]
    fn test_wait_includes_slack() {
        let now = Local::now();
        let config = SessionConfig {
            close: (now + TimeDelta::seconds(1)).time(),
            slack: Duration::from_millis(100),
        };

        let wait = config.until_next_close(now);
        assert!(wait >= Duration::from_millis(100));
        assert!(wait <= Duration::from_secs(2) + Duration::from_millis(100));
    }
}
