use std::fmt::{self, Display, Formatter};

use crate::store::Occupancy;

/* ---------- */

/// Stock level of the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    /// Nearly empty.
    Low,
    /// Neither nearly empty nor nearly full.
    Normal,
    /// Nearly full.
    High,
}

impl StockLevel {
    /// Returns whether this level should raise an alert.
    #[inline]
    pub fn is_alert(self) -> bool {
        self != Self::Normal
    }
}

impl Display for StockLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
        })
    }
}

/* ---------- */

/// The bounds used to classify the combined occupancy of both lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    low: usize,
    high: usize,
}

impl Thresholds {
    /// Thresholds for the default ten-slot store.
    pub const DEFAULT: Self = Self::new(1, 9);

    /// `low` and `high` are both inclusive.
    #[inline]
    pub const fn new(low: usize, high: usize) -> Self {
        Self { low, high }
    }

    /// Scales the default thresholds to another capacity: low at one item, high one short of full.
    #[inline]
    pub fn for_capacity(capacity: usize) -> Self {
        Self::new(1, capacity.saturating_sub(1).max(2))
    }

    /// Classifies `occupancy`. Pure, the low bound wins when both match.
    pub fn classify(&self, occupancy: Occupancy) -> StockLevel {
        let total = occupancy.total();

        if total <= self.low {
            StockLevel::Low
        } else if total >= self.high {
            StockLevel::High
        } else {
            StockLevel::Normal
        }
    }
}

impl Default for Thresholds {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Classifies lane counts against the default thresholds.
#[inline]
pub fn classify(normal: usize, urgent: usize) -> StockLevel {
    Thresholds::DEFAULT.classify(Occupancy { normal, urgent })
}

/* ---------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        assert_eq!(classify(0, 0), StockLevel::Low);
        assert_eq!(classify(0, 1), StockLevel::Low);
        assert_eq!(classify(1, 0), StockLevel::Low);
        assert_eq!(classify(3, 2), StockLevel::Normal);
        assert_eq!(classify(2, 0), StockLevel::Normal);
        assert_eq!(classify(8, 0), StockLevel::Normal);
        assert_eq!(classify(5, 4), StockLevel::High);
        assert_eq!(classify(0, 10), StockLevel::High);
    }

    #[test]
    fn scaled_thresholds() {
        assert_eq!(Thresholds::for_capacity(10), Thresholds::DEFAULT);

        let small = Thresholds::for_capacity(3);
        assert_eq!(small.classify(Occupancy { normal: 1, urgent: 0 }), StockLevel::Low);
        assert_eq!(small.classify(Occupancy { normal: 1, urgent: 1 }), StockLevel::High);
    }

    #[test]
    fn only_extremes_alert() {
        assert!(StockLevel::Low.is_alert());
        assert!(StockLevel::High.is_alert());
        assert!(!StockLevel::Normal.is_alert());
    }
}
