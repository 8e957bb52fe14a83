use crate::{BatchOutput, Runner, RunnerError};
use noteml_config::Config;
use noteml_core::{EarlyStopTarget, LossAccumulator, LossVector, Split};
use noteml_data_provider::NoteReader;
use std::path::Path;
use tracing::{debug, info};

/// Printed in place of a loss when a pass saw no batches.
pub const NO_DATA: &str = "no data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EpochLimit,
    EarlyStop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Training + validation epochs that ran to completion.
    pub epochs_run: usize,
    pub global_step: u64,
    /// `None` when early stopping is disabled.
    pub early_stop_target: Option<usize>,
    pub stop_reason: StopReason,
    pub test_loss: LossVector,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Visualized,
    Trained(RunSummary),
}

/// Drives a [`Runner`] through training and validation epochs until the
/// epoch limit or the early stop target is passed, then through one test
/// pass.
pub struct EpochController<'a, R, D> {
    config: &'a Config,
    runner: R,
    reader: D,
    train_splits: Vec<Split>,
    val_splits: Vec<Split>,
    test_splits: Vec<Split>,
}

impl<'a, R: Runner, D: NoteReader> EpochController<'a, R, D> {
    pub fn new(config: &'a Config, runner: R, reader: D) -> Self {
        Self {
            config,
            runner,
            reader,
            train_splits: vec![Split::Train],
            val_splits: vec![Split::Val],
            test_splits: vec![Split::Test],
        }
    }

    pub fn with_splits(
        mut self,
        train_splits: Vec<Split>,
        val_splits: Vec<Split>,
        test_splits: Vec<Split>,
    ) -> Self {
        self.train_splits = train_splits;
        self.val_splits = val_splits;
        self.test_splits = test_splits;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_parts(self) -> (R, D) {
        (self.runner, self.reader)
    }

    pub fn run(&mut self, verbose: bool) -> Result<RunOutcome, RunnerError> {
        if self.config.options.visualize {
            if verbose {
                info!("Running visualizations.");
            }
            self.runner
                .visualize(verbose)
                .map_err(|err| match err.downcast::<RunnerError>() {
                    Ok(err) => err,
                    Err(err) => RunnerError::Visualize(err),
                })?;
            return Ok(RunOutcome::Visualized);
        }
        self.run_loop(verbose).map(RunOutcome::Trained)
    }

    pub fn run_loop(&mut self, verbose: bool) -> Result<RunSummary, RunnerError> {
        let config = self.config;
        let train_splits = self.train_splits.clone();
        let val_splits = self.val_splits.clone();
        let test_splits = self.test_splits.clone();

        let mut epoch = 1;
        let mut global_step = 0;
        let mut target = config
            .options
            .early_stop
            .then(|| EarlyStopTarget::new(config.options.min_epochs));
        if let (Some(target), true) = (&target, verbose) {
            info!("Initializing early stop target to {}", target.get());
        }

        let stop_reason = loop {
            if config.epoch_limit().is_some_and(|limit| epoch > limit) {
                break StopReason::EpochLimit;
            }
            if target.is_some_and(|target| target.should_stop(epoch)) {
                if verbose {
                    info!("Early stopping.");
                }
                break StopReason::EarlyStop;
            }
            if verbose {
                info!("Epoch {epoch}");
            }

            self.runner
                .start_epoch(Some(epoch))
                .map_err(|source| RunnerError::Hook {
                    hook: "start_epoch",
                    source,
                })?;

            let (step, train_loss) =
                self.run_epoch(epoch, global_step, &train_splits, true, verbose)?;
            global_step = step;
            if verbose {
                info!("Epoch {epoch}: Train losses: {}", self.display_loss(&train_loss));
            }

            let (step, loss) = self.run_epoch(epoch, global_step, &val_splits, false, verbose)?;
            global_step = step;
            if verbose {
                info!("Epoch {epoch}: Valid losses: {}", self.display_loss(&loss));
            }

            if self.runner.is_new_best_val_loss(&loss) {
                if verbose {
                    info!("Found new best validation loss!");
                }
                if let Some(new_target) = target.as_mut().and_then(|t| t.observe_best(epoch)) {
                    if verbose {
                        info!("Updating early stop target to {new_target}");
                    }
                }
                if let Some(path) = config.best_save_file() {
                    save_model(&mut self.runner, path)?;
                }
            }

            self.runner
                .finish_epoch(Some(epoch))
                .map_err(|source| RunnerError::Hook {
                    hook: "finish_epoch",
                    source,
                })?;
            epoch += 1;
        };

        self.runner
            .start_epoch(None)
            .map_err(|source| RunnerError::Hook {
                hook: "start_epoch",
                source,
            })?;
        let (global_step, test_loss) =
            self.run_epoch(epoch, global_step, &test_splits, false, verbose)?;
        if verbose {
            info!("Test losses: {}", self.display_loss(&test_loss));
        }
        self.runner
            .finish_epoch(None)
            .map_err(|source| RunnerError::Hook {
                hook: "finish_epoch",
                source,
            })?;

        Ok(RunSummary {
            epochs_run: epoch - 1,
            global_step,
            early_stop_target: target.map(|t| t.get()),
            stop_reason,
            test_loss,
        })
    }

    /// One pass over `splits`. Training passes bump `global_step` before
    /// each batch and save a checkpoint every `save_every` global steps.
    pub fn run_epoch(
        &mut self,
        epoch: usize,
        mut global_step: u64,
        splits: &[Split],
        train: bool,
        verbose: bool,
    ) -> Result<(u64, LossVector), RunnerError> {
        let config = self.config;
        let print_every = config.options.print_every;
        let save_every = config.options.save_every;

        let mut loss = LossAccumulator::new();
        let batches = self.reader.get(splits).map_err(RunnerError::Reader)?;
        for (step, batch) in batches.enumerate() {
            let batch = batch.map_err(RunnerError::Reader)?;
            if train {
                global_step += 1;
            }
            let BatchOutput { losses, extra } = self
                .runner
                .run_batch(&batch, train)
                .map_err(|source| RunnerError::Batch {
                    epoch,
                    step,
                    source,
                })?;
            loss.add(&losses)?;
            if verbose {
                self.runner.verbose_output(step, &losses, &extra, train);
            }
            if print_every > 0 && step as u64 % print_every == 0 {
                self.runner.output(step, &losses, &extra, train);
            }
            if train && save_every > 0 && global_step % save_every == 0 {
                save_model(&mut self.runner, config.save_file())?;
            }
        }
        debug!(
            epoch,
            global_step,
            train,
            batches = loss.batches(),
            "Finished pass over {splits:?}"
        );
        Ok((global_step, loss.mean()))
    }

    pub fn display_loss(&self, loss: &LossVector) -> String {
        if loss.has_data() {
            self.runner.loss_str(loss)
        } else {
            NO_DATA.to_string()
        }
    }
}

fn save_model<R: Runner>(runner: &mut R, path: &Path) -> Result<(), RunnerError> {
    debug!("Saving model to {}", path.display());
    runner
        .save_model(path)
        .map_err(|source| RunnerError::Checkpoint {
            path: path.to_path_buf(),
            source,
        })
}
