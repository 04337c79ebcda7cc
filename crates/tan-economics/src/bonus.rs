// crates/tan-economics/src/bonus.rs
//
// One-time bonus multiplier window shared by all pools.
//
// Blocks strictly before `end_block` accrue `multiplier` reward units each;
// blocks at or after it accrue exactly one. A settlement range that straddles
// the cutoff is split into the two segments. Without an end block the window
// never closes and the multiplier scales every block.

use serde::{Deserialize, Serialize};

/// Default multiplier: no bonus.
pub const DEFAULT_BONUS_MULTIPLIER: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusWindow {
    pub multiplier: u64,
    /// First block past the bonus. `None` keeps the window open.
    pub end_block: Option<u64>,
}

impl Default for BonusWindow {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_BONUS_MULTIPLIER,
            end_block: None,
        }
    }
}

impl BonusWindow {
    pub fn new(multiplier: u64, end_block: Option<u64>) -> Self {
        Self {
            multiplier,
            end_block,
        }
    }

    /// Reward units accrued over the block range `[from, to)`.
    ///
    /// # Example
    /// ```
    /// use tan_economics::bonus::BonusWindow;
    /// let window = BonusWindow::new(3, Some(100));
    /// assert_eq!(window.effective_multiplier(90, 110), 10 * 3 + 10);
    /// ```
    pub fn effective_multiplier(&self, from: u64, to: u64) -> u128 {
        if to <= from {
            return 0;
        }
        let m = self.multiplier as u128;
        let Some(end) = self.end_block else {
            return (to - from) as u128 * m;
        };
        if to <= end {
            (to - from) as u128 * m
        } else if from >= end {
            (to - from) as u128
        } else {
            (end - from) as u128 * m + (to - end) as u128
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_plain_block_count() {
        let window = BonusWindow::default();
        assert_eq!(window.effective_multiplier(10, 25), 15);
    }

    #[test]
    fn test_open_window_scales_every_block() {
        let window = BonusWindow::new(4, None);
        assert_eq!(window.effective_multiplier(0, 10), 40);
        assert_eq!(window.effective_multiplier(u64::MAX - 5, u64::MAX), 20);
        assert_eq!(BonusWindow::new(0, None).effective_multiplier(10, 25), 0);
    }

    #[test]
    fn test_empty_or_reversed_range() {
        let window = BonusWindow::new(10, Some(100));
        assert_eq!(window.effective_multiplier(50, 50), 0);
        assert_eq!(window.effective_multiplier(60, 50), 0);
    }

    #[test]
    fn test_inside_window() {
        let window = BonusWindow::new(10, Some(100));
        assert_eq!(window.effective_multiplier(0, 100), 1000);
    }

    #[test]
    fn test_after_window() {
        let window = BonusWindow::new(10, Some(100));
        assert_eq!(window.effective_multiplier(100, 130), 30);
    }

    #[test]
    fn test_straddling_range_is_split() {
        let window = BonusWindow::new(10, Some(100));
        assert_eq!(window.effective_multiplier(95, 105), 5 * 10 + 5);
    }

    #[test]
    fn test_zero_multiplier_stops_bonus_segment_only() {
        let window = BonusWindow::new(0, Some(100));
        assert_eq!(window.effective_multiplier(0, 100), 0);
        assert_eq!(window.effective_multiplier(90, 110), 10);
    }
}
