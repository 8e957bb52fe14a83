/// The epoch number beyond which training halts unless validation improves.
///
/// Starts at the configured minimum number of epochs. Every new best
/// validation loss at epoch `e` proposes `2 * e`; the target only ever grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarlyStopTarget {
    target: usize,
}

impl EarlyStopTarget {
    /// Negative minimums behave like zero: training stops before epoch 1.
    pub fn new(min_epochs: i64) -> Self {
        Self {
            target: min_epochs.max(0) as usize,
        }
    }

    pub fn get(&self) -> usize {
        self.target
    }

    pub fn should_stop(&self, epoch: usize) -> bool {
        epoch > self.target
    }

    /// Records a new best validation loss at `epoch`. Returns the new target
    /// if it was raised.
    pub fn observe_best(&mut self, epoch: usize) -> Option<usize> {
        let candidate = epoch.saturating_mul(2);
        if candidate > self.target {
            self.target = candidate;
            Some(candidate)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_target() {
        let target = EarlyStopTarget::new(1);
        assert!(!target.should_stop(1));
        assert!(target.should_stop(2));
    }

    #[test]
    fn test_negative_min_epochs_stops_immediately() {
        let target = EarlyStopTarget::new(-5);
        assert_eq!(target.get(), 0);
        assert!(target.should_stop(1));
    }

    #[test]
    fn test_target_never_decreases() {
        let mut target = EarlyStopTarget::new(20);
        assert_eq!(target.observe_best(3), None);
        assert_eq!(target.get(), 20);
        assert_eq!(target.observe_best(11), Some(22));
        assert_eq!(target.observe_best(11), None);
        assert_eq!(target.observe_best(15), Some(30));
        assert_eq!(target.get(), 30);
    }

    #[test]
    fn test_equal_candidate_does_not_update() {
        let mut target = EarlyStopTarget::new(10);
        assert_eq!(target.observe_best(5), None);
        assert_eq!(target.get(), 10);
    }
}
