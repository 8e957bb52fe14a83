use crate::{BatchOutput, Runner};
use anyhow::{Context, Result};
use noteml_config::Config;
use noteml_core::{BestValidationLoss, LossVector};
use noteml_data_provider::Batch;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};
use tracing::{info, trace};

/// Per-batch details reported by [`DummyRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DummyExtra {
    pub notes: usize,
}

/// What [`DummyRunner::save_model`] writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DummyCheckpoint {
    pub global_step: u64,
    pub best_loss: Option<f64>,
    pub epochs_finished: usize,
}

/// A model family without a model. Its loss decays with the number of
/// batches trained on, so validation keeps improving for a while and then
/// flattens out.
#[derive(Debug)]
pub struct DummyRunner {
    best: BestValidationLoss,
    trained_batches: u64,
    epochs_finished: usize,
    delay: Option<Duration>,
}

impl DummyRunner {
    pub fn new(config: &Config) -> Self {
        Self {
            best: BestValidationLoss::resume(config.options.best_score),
            trained_batches: 0,
            epochs_finished: 0,
            delay: None,
        }
    }

    /// Sleep this long in every batch to simulate work.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn best_loss(&self) -> Option<f64> {
        self.best.get()
    }

    pub fn trained_batches(&self) -> u64 {
        self.trained_batches
    }

    pub fn epochs_finished(&self) -> usize {
        self.epochs_finished
    }

    fn current_loss(&self) -> f64 {
        let loss = 0.25 + 0.75 / (1.0 + self.trained_batches as f64 / 16.0);
        (loss * 1000.0).round() / 1000.0
    }
}

impl Runner for DummyRunner {
    type Extra = DummyExtra;

    fn run_batch(&mut self, batch: &Batch, train: bool) -> Result<BatchOutput<DummyExtra>> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if train {
            self.trained_batches += 1;
        }
        let labels: usize = batch.labels.iter().map(Vec::len).sum();
        let density = if batch.is_empty() {
            0.0
        } else {
            labels as f64 / batch.len() as f64
        };
        Ok(BatchOutput {
            losses: vec![self.current_loss(), density],
            extra: DummyExtra { notes: batch.len() },
        })
    }

    fn is_new_best_val_loss(&mut self, loss: &LossVector) -> bool {
        self.best.update(loss)
    }

    fn finish_epoch(&mut self, epoch: Option<usize>) -> Result<()> {
        if epoch.is_some() {
            self.epochs_finished += 1;
        }
        Ok(())
    }

    fn save_model(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let checkpoint = DummyCheckpoint {
            global_step: self.trained_batches,
            best_loss: self.best.get(),
            epochs_finished: self.epochs_finished,
        };
        fs::write(path, serde_json::to_vec_pretty(&checkpoint)?)?;
        info!("Saved checkpoint to {}", path.display());
        Ok(())
    }

    fn loss_str(&self, loss: &LossVector) -> String {
        match loss.values() {
            [total, density, ..] => format!("{total:.4} (label density {density:.2})"),
            _ => loss.to_string(),
        }
    }

    fn verbose_output(&mut self, step: usize, losses: &[f64], extra: &DummyExtra, train: bool) {
        trace!(step, train, notes = extra.notes, "losses {losses:?}");
    }

    fn output(&mut self, step: usize, losses: &[f64], extra: &DummyExtra, train: bool) {
        let phase = if train { "train" } else { "eval" };
        info!(
            "[{phase}] step {step}: loss {:.4} over {} notes",
            losses.first().copied().unwrap_or_default(),
            extra.notes
        );
    }
}
