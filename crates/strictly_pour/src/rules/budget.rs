//! Move and time budget accounting.

use crate::session::Remaining;

/// Spends one move. Returns the new counter and whether it is exhausted.
pub fn spend_move(remaining: Remaining<u32>) -> (Remaining<u32>, bool) {
    match remaining {
        Remaining::Unlimited => (Remaining::Unlimited, false),
        Remaining::Limited(left) => {
            let left = left.saturating_sub(1);
            (Remaining::Limited(left), left == 0)
        }
    }
}

/// Spends `elapsed` seconds. Returns the new counter, clamped at zero, and
/// whether it is exhausted.
pub fn spend_time(remaining: Remaining<f64>, elapsed: f64) -> (Remaining<f64>, bool) {
    match remaining {
        Remaining::Unlimited => (Remaining::Unlimited, false),
        Remaining::Limited(left) => {
            let left = left - elapsed;
            (Remaining::Limited(left.max(0.0)), left <= 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_never_exhausts() {
        assert_eq!(spend_move(Remaining::Unlimited), (Remaining::Unlimited, false));
        assert_eq!(
            spend_time(Remaining::Unlimited, 1e9),
            (Remaining::Unlimited, false)
        );
    }

    #[test]
    fn test_last_move_exhausts() {
        assert_eq!(spend_move(Remaining::Limited(2)), (Remaining::Limited(1), false));
        assert_eq!(spend_move(Remaining::Limited(1)), (Remaining::Limited(0), true));
    }

    #[test]
    fn test_time_clamps_at_zero() {
        assert_eq!(
            spend_time(Remaining::Limited(1.5), 1.0),
            (Remaining::Limited(0.5), false)
        );
        assert_eq!(
            spend_time(Remaining::Limited(0.5), 2.0),
            (Remaining::Limited(0.0), true)
        );
        assert_eq!(
            spend_time(Remaining::Limited(1.0), 1.0),
            (Remaining::Limited(0.0), true)
        );
    }
}
