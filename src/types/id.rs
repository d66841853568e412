//! Identifier types for runtime entities.

use core::fmt;

/// Identifier of a deferred value, unique within its runtime.
///
/// Ids are handed out in creation order, so they double as a stable ordering
/// for diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeferredId(u64);

impl DeferredId {
    /// Creates an id from a raw counter value (internal use).
    #[must_use]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Creates an id for testing purposes.
    #[doc(hidden)]
    #[must_use]
    pub const fn new_for_test(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for DeferredId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeferredId({})", self.0)
    }
}

impl fmt::Display for DeferredId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting() {
        let id = DeferredId::new_for_test(12);
        assert_eq!(id.to_string(), "D12");
        assert_eq!(format!("{id:?}"), "DeferredId(12)");
        assert_eq!(id.as_u64(), 12);
    }

    #[test]
    fn ordering_follows_creation() {
        assert!(DeferredId::from_raw(1) < DeferredId::from_raw(2));
    }
}
