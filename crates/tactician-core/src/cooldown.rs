//! Free-tier cooldown gate

use chrono::{DateTime, Duration, Utc};
use tactician_api::Account;

/// Minimum interval between counted runs of a non-premium account
pub const COOLDOWN_HOURS: i64 = 24;

pub fn window() -> Duration {
    Duration::hours(COOLDOWN_HOURS)
}

/// Result of the pre-run check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownVerdict {
    Runnable,
    Blocked { until: DateTime<Utc> },
}

/// Premium accounts and accounts that never ran are always runnable
pub fn check(account: &Account, now: DateTime<Utc>) -> CooldownVerdict {
    if account.is_premium {
        return CooldownVerdict::Runnable;
    }

    match account.last_run {
        Some(last_run) => {
            let until = last_run + window();
            if now < until {
                CooldownVerdict::Blocked { until }
            } else {
                CooldownVerdict::Runnable
            }
        }
        None => CooldownVerdict::Runnable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn account(last_run: Option<DateTime<Utc>>, is_premium: bool) -> Account {
        let mut account = Account::with_token("t");
        account.last_run = last_run;
        account.is_premium = is_premium;
        account
    }

    #[test]
    fn test_never_run_is_runnable() {
        assert_eq!(check(&account(None, false), Utc::now()), CooldownVerdict::Runnable);
    }

    #[test]
    fn test_blocked_for_exactly_one_window() {
        let last = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let a = account(Some(last), false);

        assert_eq!(
            check(&a, last + Duration::hours(23)),
            CooldownVerdict::Blocked {
                until: last + Duration::hours(24)
            }
        );
        assert_eq!(check(&a, last + Duration::hours(24)), CooldownVerdict::Runnable);
    }

    #[test]
    fn test_premium_is_exempt() {
        let now = Utc::now();
        assert_eq!(
            check(&account(Some(now), true), now),
            CooldownVerdict::Runnable
        );
    }
}
