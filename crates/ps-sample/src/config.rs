/// Execution strategy for a sampling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// Fill the output stack on the calling thread.
    Sequential,
    /// Split the output into disjoint origin-row blocks and fill them on the
    /// rayon thread pool.
    #[cfg(feature = "rayon")]
    WorkerPool,
}

/// Knobs shared by `sample2d` and `sample3d`.
///
/// `strict_checks` never relaxes shape validation; rejected inputs fail the
/// same way on both settings and produce bit-identical stacks otherwise. It
/// only selects the inner copy loops: bounds-checked slice copies when set,
/// raw-pointer copies relying on the validated plan when cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleConfig {
    pub strict_checks: bool,
    pub execution: Execution,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            strict_checks: true,
            execution: Execution::Sequential,
        }
    }
}

impl SampleConfig {
    /// Default configuration with the inner bounds checks elided.
    pub fn relaxed() -> Self {
        Self {
            strict_checks: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Execution, SampleConfig};

    #[test]
    fn default_is_strict_and_sequential() {
        let cfg = SampleConfig::default();
        assert!(cfg.strict_checks);
        assert_eq!(cfg.execution, Execution::Sequential);
    }

    #[test]
    fn relaxed_only_clears_strict_checks() {
        let cfg = SampleConfig::relaxed();
        assert!(!cfg.strict_checks);
        assert_eq!(cfg.execution, Execution::Sequential);
    }
}
