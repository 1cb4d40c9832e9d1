use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as Unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Countdown breakdown for display next to the claim button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLeft {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeLeft {
    pub fn from_secs(total: u64) -> Self {
        Self {
            days: total / (24 * 60 * 60),
            hours: (total % (24 * 60 * 60)) / (60 * 60),
            minutes: (total % (60 * 60)) / 60,
            seconds: total % 60,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaks_down_a_full_cooldown() {
        let left = TimeLeft::from_secs(82800);
        assert_eq!(
            left,
            TimeLeft {
                days: 0,
                hours: 23,
                minutes: 0,
                seconds: 0
            }
        );
    }

    #[test]
    fn breaks_down_mixed_components() {
        let left = TimeLeft::from_secs(90061);
        assert_eq!(
            left,
            TimeLeft {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1
            }
        );
    }

    #[test]
    fn zero_is_zero() {
        assert!(TimeLeft::from_secs(0).is_zero());
        assert!(!TimeLeft::from_secs(1).is_zero());
    }
}
