use crate::RunnerError;
use anyhow::Result;
use noteml_core::LossVector;
use noteml_data_provider::Batch;
use std::path::Path;

/// Losses of one batch, plus whatever else the model wants to report.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput<E> {
    pub losses: Vec<f64>,
    pub extra: E,
}

/// What a model family plugs into the epoch loop.
///
/// Only [`Runner::run_batch`] is required. Every hook defaults to doing
/// nothing, and [`Runner::is_new_best_val_loss`] defaults to never
/// improving, which leaves early stopping to the minimum epoch count.
pub trait Runner {
    type Extra;

    fn run_batch(&mut self, batch: &Batch, train: bool) -> Result<BatchOutput<Self::Extra>>;

    /// Whether `loss` is the best validation loss so far. `loss` may come
    /// from an empty split; check [`LossVector::has_data`].
    fn is_new_best_val_loss(&mut self, _loss: &LossVector) -> bool {
        false
    }

    /// `None` marks the test pass after training.
    fn start_epoch(&mut self, _epoch: Option<usize>) -> Result<()> {
        Ok(())
    }

    /// `None` marks the test pass after training.
    fn finish_epoch(&mut self, _epoch: Option<usize>) -> Result<()> {
        Ok(())
    }

    fn save_model(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn loss_str(&self, loss: &LossVector) -> String {
        loss.to_string()
    }

    fn verbose_output(&mut self, _step: usize, _losses: &[f64], _extra: &Self::Extra, _train: bool) {
    }

    fn output(&mut self, _step: usize, _losses: &[f64], _extra: &Self::Extra, _train: bool) {}

    fn visualize(&mut self, _verbose: bool) -> Result<()> {
        Err(RunnerError::NotImplemented("visualize").into())
    }
}
