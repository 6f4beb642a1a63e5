//! Running state of the risk pool during a calculation

/// Baseline risk pool every calculation starts from
pub const BASELINE_RISK: f64 = 100.0;

/// Remaining risk and accumulated absolute reduction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskPool {
    /// Risk still in the pool (percentage points of the original 100)
    pub remaining_risk: f64,

    /// Absolute reduction accumulated so far
    pub cumulative_arr: f64,
}

impl RiskPool {
    pub fn new() -> Self {
        Self {
            remaining_risk: BASELINE_RISK,
            cumulative_arr: 0.0,
        }
    }

    /// Apply a relative reduction (percent of what remains)
    /// Returns the absolute reduction taken out of the pool
    pub fn apply(&mut self, relative_reduction: f64) -> f64 {
        let reduced = self.remaining_risk * (relative_reduction / 100.0);
        self.cumulative_arr += reduced;
        self.remaining_risk -= reduced;
        reduced
    }
}

impl Default for RiskPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reductions_compose_multiplicatively() {
        let mut pool = RiskPool::new();

        assert_relative_eq!(pool.apply(50.0), 50.0);
        assert_relative_eq!(pool.apply(50.0), 25.0);
        assert_relative_eq!(pool.remaining_risk, 25.0);
        assert_relative_eq!(pool.cumulative_arr, 75.0);
    }

    #[test]
    fn test_zero_reduction_leaves_pool_unchanged() {
        let mut pool = RiskPool::new();
        assert_eq!(pool.apply(0.0), 0.0);
        assert_eq!(pool, RiskPool::new());
    }

    #[test]
    fn test_stacking_never_exceeds_baseline() {
        let mut pool = RiskPool::new();
        for _ in 0..50 {
            pool.apply(20.0);
        }
        assert!(pool.cumulative_arr < BASELINE_RISK);
        assert!(pool.remaining_risk > 0.0);
        assert_relative_eq!(pool.cumulative_arr + pool.remaining_risk, BASELINE_RISK, epsilon = 1e-9);
    }
}
