mod best_loss;
mod early_stop;
mod loss;
mod split;

pub use best_loss::BestValidationLoss;
pub use early_stop::EarlyStopTarget;
pub use loss::{LossAccumulator, LossShapeMismatch, LossVector};
pub use split::{ParseSplitError, Split};
