//! Store configuration.

use crate::types::UserId;

/// Largest first id a store accepts.
///
/// Leaves half of the id space for allocation, so the counter cannot run
/// out in practice.
pub const MAX_FIRST_ID: u64 = u64::MAX / 2;

/// Configuration for creating an [`EntityStore`](crate::EntityStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of users to reserve map capacity for.
    pub initial_capacity: usize,

    /// First id handed out by the store, within `1..=MAX_FIRST_ID`.
    ///
    /// Out-of-range values set directly on this field are clamped when the
    /// store is built.
    pub first_id: UserId,

    /// Whether operations update the statistics counters.
    pub track_stats: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            first_id: UserId::new(1),
            track_stats: true,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial map capacity.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the first id to allocate.
    ///
    /// Zero is bumped to one and values above [`MAX_FIRST_ID`] are clamped
    /// to it.
    #[must_use]
    pub const fn first_id(mut self, id: u64) -> Self {
        self.first_id = UserId::new(clamp_first_id(id));
        self
    }

    pub(crate) const fn effective_first_id(&self) -> UserId {
        UserId::new(clamp_first_id(self.first_id.as_u64()))
    }

    /// Sets whether statistics are recorded.
    #[must_use]
    pub const fn track_stats(mut self, value: bool) -> Self {
        self.track_stats = value;
        self
    }
}

const fn clamp_first_id(id: u64) -> u64 {
    if id == 0 {
        1
    } else if id > MAX_FIRST_ID {
        MAX_FIRST_ID
    } else {
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.initial_capacity, 0);
        assert_eq!(config.first_id, UserId::new(1));
        assert!(config.track_stats);
    }

    #[test]
    fn builder_pattern() {
        let config = StoreConfig::new()
            .initial_capacity(128)
            .first_id(100)
            .track_stats(false);

        assert_eq!(config.initial_capacity, 128);
        assert_eq!(config.first_id, UserId::new(100));
        assert!(!config.track_stats);
    }

    #[test]
    fn zero_first_id_is_bumped() {
        let config = StoreConfig::new().first_id(0);
        assert_eq!(config.first_id, UserId::new(1));
    }

    #[test]
    fn oversized_first_id_is_clamped() {
        let config = StoreConfig::new().first_id(u64::MAX);
        assert_eq!(config.first_id, UserId::new(MAX_FIRST_ID));

        let raw = StoreConfig {
            first_id: UserId::new(u64::MAX),
            ..StoreConfig::default()
        };
        assert_eq!(raw.effective_first_id(), UserId::new(MAX_FIRST_ID));
    }
}
