use crate::Batch;
use anyhow::Result;
use noteml_core::Split;

pub type BatchIter<'a> = Box<dyn Iterator<Item = Result<Batch>> + 'a>;

pub trait NoteReader {
    /// One finite pass over the batches of `splits`, in the reader's order.
    /// Every call starts a fresh pass.
    fn get(&mut self, splits: &[Split]) -> Result<BatchIter<'_>>;
}
