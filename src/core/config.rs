//! # Registry configuration.
//!
//! Provides [`Config`], the settings consumed by [`Builder`](crate::Builder).
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → clamped to 1 (a delivery queue always holds at least one item)

/// Registry configuration.
///
/// ## Field semantics
/// - `queue_capacity`: per-event delivery queue size for
///   [`WorkerObservable`](crate::WorkerObservable) (min 1). Ignored by
///   [`Observable`](crate::Observable), which dispatches inline.
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of each per-event delivery queue.
    ///
    /// A publish waits (asynchronously) while the queue of its event is full;
    /// nothing is dropped.
    pub queue_capacity: usize,
}

impl Config {
    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `queue_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_clamped() {
        let cfg = Config { queue_capacity: 0 };
        assert_eq!(cfg.queue_capacity_clamped(), 1);
        assert_eq!(Config::default().queue_capacity_clamped(), 1024);
    }
}
