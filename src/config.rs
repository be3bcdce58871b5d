//! Construction-time tuning for `ChainHashMap`.

/// Slot count a map starts with unless configured otherwise.
pub const INITIAL_CAPACITY: usize = 128;

/// Occupancy fraction at which the map doubles its slot count.
pub const FILL_RATE: f64 = 0.6;

/// Map configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Initial number of bucket slots, must be a power of two
    pub initial_capacity: usize,

    /// Fill rate in `(0, 1]`
    pub fill_rate: f64,

    /// Upper bound on overflow chain nodes, `None` for unbounded
    pub node_budget: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: INITIAL_CAPACITY,
            fill_rate: FILL_RATE,
            node_budget: None,
        }
    }
}

impl Config {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial slot count.
    ///
    /// Defaults to 128.
    ///
    /// # Panics
    ///
    /// Map construction panics if the value is not a power of two.
    #[must_use]
    pub fn initial_capacity(mut self, slots: usize) -> Self {
        self.initial_capacity = slots;
        self
    }

    /// Sets the fill rate that triggers a resize.
    ///
    /// Lower values trade memory for shorter chains.
    ///
    /// Defaults to 0.6.
    #[must_use]
    pub fn fill_rate(mut self, ratio: f64) -> Self {
        self.fill_rate = ratio;
        self
    }

    /// Caps the number of chain nodes the map may allocate.
    ///
    /// Once exhausted, `put` calls that would need a new chain node fail
    /// with [`crate::TableError::NodeBudgetExhausted`]. Rehashing ignores
    /// the budget.
    #[must_use]
    pub fn node_budget(mut self, nodes: usize) -> Self {
        self.node_budget = Some(nodes);
        self
    }

    pub(crate) fn validate(&self) {
        assert!(
            self.initial_capacity.is_power_of_two(),
            "initial capacity must be a power of two, got {}",
            self.initial_capacity
        );
        assert!(
            self.fill_rate > 0.0 && self.fill_rate <= 1.0,
            "fill rate must be in (0, 1], got {}",
            self.fill_rate
        );
    }

    /// Live count at which a map of `capacity` slots grows.
    pub(crate) fn growth_threshold(&self, capacity: usize) -> usize {
        ((capacity as f64 * self.fill_rate) as usize).max(1)
    }
}
