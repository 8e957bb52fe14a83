use noteml_core::LossShapeMismatch;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0} is not implemented by this runner")]
    NotImplemented(&'static str),

    #[error("failed to read batches")]
    Reader(#[source] anyhow::Error),

    #[error("batch {step} of epoch {epoch} failed")]
    Batch {
        epoch: usize,
        step: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    LossShape(#[from] LossShapeMismatch),

    #[error("failed to save model to {path:?}")]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("{hook} hook failed")]
    Hook {
        hook: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("visualization failed")]
    Visualize(#[source] anyhow::Error),
}
