/// How [crate::TuplesOperations::remove_duplicates] eliminates identical rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistinctStrategy {
    /// Sorts unsorted input and drops consecutive duplicates. The result is sorted.
    #[default]
    Sort,
    /// Remembers every emitted row in a hash set. Keeps the input order.
    Hash,
}

/// Holds the tunable parameters of [crate::TuplesOperations].
#[derive(Debug, Clone, PartialEq)]
pub struct TuplesConfig {
    /// The base of the geometric decay that weights the terms of the row-count estimate used
    /// for ordering join operands. Larger values trust bound prefixes more.
    prefix_weight_decay: f64,
    /// The [DistinctStrategy] used for duplicate elimination.
    distinct_strategy: DistinctStrategy,
}

impl TuplesConfig {
    /// Creates a new [TuplesConfig] with the default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the decay base of the row-count estimate.
    ///
    /// The default value is 10.
    #[must_use]
    pub fn with_prefix_weight_decay(mut self, prefix_weight_decay: f64) -> Self {
        self.prefix_weight_decay = prefix_weight_decay;
        self
    }

    /// Sets the [DistinctStrategy].
    ///
    /// The default is [DistinctStrategy::Sort].
    #[must_use]
    pub fn with_distinct_strategy(mut self, distinct_strategy: DistinctStrategy) -> Self {
        self.distinct_strategy = distinct_strategy;
        self
    }

    pub fn prefix_weight_decay(&self) -> f64 {
        self.prefix_weight_decay
    }

    pub fn distinct_strategy(&self) -> DistinctStrategy {
        self.distinct_strategy
    }
}

impl Default for TuplesConfig {
    fn default() -> Self {
        Self {
            prefix_weight_decay: 10.0,
            distinct_strategy: DistinctStrategy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = TuplesConfig::new()
            .with_prefix_weight_decay(4.0)
            .with_distinct_strategy(DistinctStrategy::Hash);
        assert_eq!(config.prefix_weight_decay(), 4.0);
        assert_eq!(config.distinct_strategy(), DistinctStrategy::Hash);
        assert_eq!(TuplesConfig::default().prefix_weight_decay(), 10.0);
    }
}
