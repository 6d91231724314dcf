//! Status classification thresholds, keyed by operation family.

use crate::domain::benchmark::{BenchmarkStatus, OperationFamily};

/// Average-duration bounds (seconds) for one operation family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    /// Averages strictly below this are `Fast`.
    pub fast_below: f64,
    /// Averages strictly above this are `Slow`.
    pub slow_above: f64,
}

impl Threshold {
    pub fn classify(&self, average_secs: f64) -> BenchmarkStatus {
        if average_secs < self.fast_below {
            BenchmarkStatus::Fast
        } else if average_secs > self.slow_above {
            BenchmarkStatus::Slow
        } else {
            BenchmarkStatus::Good
        }
    }
}

/// Fixed threshold table. Every family has an entry; adding a family
/// without one is a compile error.
pub fn threshold_for(family: OperationFamily) -> Threshold {
    let (fast_below, slow_above) = match family {
        OperationFamily::Lint => (2.0, 10.0),
        OperationFamily::Format => (1.0, 5.0),
        OperationFamily::TypeCheck => (5.0, 30.0),
        OperationFamily::Configure => (10.0, 60.0),
        OperationFamily::Build => (60.0, 300.0),
        OperationFamily::IncrementalBuild => (5.0, 30.0),
        OperationFamily::Test => (10.0, 60.0),
        OperationFamily::Install => (30.0, 180.0),
    };
    Threshold {
        fast_below,
        slow_above,
    }
}

/// Classify an average duration for a family.
pub fn classify(family: OperationFamily, average_secs: f64) -> BenchmarkStatus {
    threshold_for(family).classify(average_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lint_thresholds() {
        assert_eq!(classify(OperationFamily::Lint, 1.0), BenchmarkStatus::Fast);
        assert_eq!(classify(OperationFamily::Lint, 2.0), BenchmarkStatus::Good);
        assert_eq!(classify(OperationFamily::Lint, 10.0), BenchmarkStatus::Good);
        assert_eq!(classify(OperationFamily::Lint, 10.5), BenchmarkStatus::Slow);
    }

    #[test]
    fn test_build_thresholds() {
        assert_eq!(classify(OperationFamily::Build, 59.9), BenchmarkStatus::Fast);
        assert_eq!(classify(OperationFamily::Build, 120.0), BenchmarkStatus::Good);
        assert_eq!(classify(OperationFamily::Build, 301.0), BenchmarkStatus::Slow);
    }

    #[test]
    fn test_every_family_has_ordered_bounds() {
        for family in OperationFamily::ALL {
            let t = threshold_for(family);
            assert!(
                t.fast_below < t.slow_above,
                "{} has inverted bounds",
                family.as_str()
            );
        }
    }
}
