//! Logic levels and edge selection
//!
//! The link clock is reported to the receiver as edge events; the
//! platform decides how (pin-change interrupt, EXTI line, polling).

/// Logic level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Which transitions an edge source reports (`register_edge_interrupt`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
    /// Pin-change style: every transition
    Any,
}

impl Edge {
    /// Whether a transition that ends at `level` is reported
    pub fn matches(self, level: Level) -> bool {
        match self {
            Edge::Rising => level == Level::High,
            Edge::Falling => level == Level::Low,
            Edge::Any => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_matches() {
        assert!(Edge::Rising.matches(Level::High));
        assert!(!Edge::Rising.matches(Level::Low));
        assert!(Edge::Falling.matches(Level::Low));
        assert!(Edge::Any.matches(Level::Low));
        assert!(Edge::Any.matches(Level::High));
    }
}
