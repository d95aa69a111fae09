use std::num::NonZeroUsize;
use std::thread;

/// What happens to the remaining tasks after one fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Run every task and report all failures at the end.
    #[default]
    BestEffort,
    /// Cancel on the first failure; later tasks are skipped.
    FailFast,
}

/// Sizing and behavior of one [`Dispatcher`](crate::Dispatcher).
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Upper bound on worker threads. `None` uses all available parallelism.
    pub max_workers: Option<usize>,
    /// Capacity of the bounded task channel.
    pub channel_capacity: usize,
    pub failure_policy: FailurePolicy,
}

impl DispatchConfig {
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

    /// `min(max_workers, available_parallelism)`, never less than one.
    pub fn worker_count(&self) -> usize {
        let available = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        self.max_workers
            .map_or(available, |max| max.min(available))
            .max(1)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            channel_capacity: Self::DEFAULT_CHANNEL_CAPACITY,
            failure_policy: FailurePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_is_bounded() {
        let available = thread::available_parallelism().unwrap().get();
        let cfg = |max| DispatchConfig {
            max_workers: max,
            ..DispatchConfig::default()
        };
        assert_eq!(cfg(None).worker_count(), available);
        assert_eq!(cfg(Some(0)).worker_count(), 1);
        assert_eq!(cfg(Some(1)).worker_count(), 1);
        assert_eq!(cfg(Some(usize::MAX)).worker_count(), available);
    }

    #[test]
    fn best_effort_by_default() {
        assert_eq!(DispatchConfig::default().failure_policy, FailurePolicy::BestEffort);
    }
}
