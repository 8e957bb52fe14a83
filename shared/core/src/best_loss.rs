use crate::LossVector;

/// Lowest validation loss seen so far, compared on [`LossVector::total`].
///
/// Losses from passes without data never count as an improvement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestValidationLoss {
    best: Option<f64>,
}

impl BestValidationLoss {
    pub fn new() -> Self {
        Self { best: None }
    }

    /// Resumes from a previously recorded best. Non-positive scores mean
    /// nothing has been recorded yet.
    pub fn resume(best_score: f64) -> Self {
        Self {
            best: (best_score > 0.0).then_some(best_score),
        }
    }

    pub fn get(&self) -> Option<f64> {
        self.best
    }

    pub fn update(&mut self, loss: &LossVector) -> bool {
        if !loss.has_data() {
            return false;
        }
        let total = loss.total();
        match self.best {
            Some(best) if total >= best => false,
            _ => {
                self.best = Some(total);
                true
            }
        }
    }
}

impl Default for BestValidationLoss {
    fn default() -> Self {
        Self::new()
    }
}
