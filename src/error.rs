use std::collections::TryReserveError;

/// Errors reported by `ChainHashMap` construction and insertion
#[derive(Debug)]
pub enum TableError {
    /// The bucket array could not be allocated
    Alloc(TryReserveError),

    /// The configured chain-node budget is used up
    NodeBudgetExhausted {
        /// Configured number of chain nodes
        budget: usize,
    },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alloc(e) => write!(f, "bucket allocation failed: {e}"),
            Self::NodeBudgetExhausted { budget } => {
                write!(f, "chain node budget of {budget} exhausted")
            }
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Alloc(e) => Some(e),
            Self::NodeBudgetExhausted { .. } => None,
        }
    }
}

impl From<TryReserveError> for TableError {
    fn from(value: TryReserveError) -> Self {
        Self::Alloc(value)
    }
}

/// A rejected `put`: the caller's key and value are handed back untouched.
pub struct PutError<K, V> {
    pub key: K,
    pub value: V,
    pub cause: TableError,
}

impl<K, V> PutError<K, V> {
    /// Splits the error into the rejected pair.
    pub fn into_inner(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> std::fmt::Debug for PutError<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PutError")
            .field("cause", &self.cause)
            .finish_non_exhaustive()
    }
}

impl<K, V> std::fmt::Display for PutError<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "put rejected: {}", self.cause)
    }
}

impl<K, V> std::error::Error for PutError<K, V> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}
