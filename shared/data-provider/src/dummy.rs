use crate::{Batch, BatchIter, NoteReader};
use anyhow::{bail, Result};
use noteml_config::Config;
use noteml_core::Split;
use std::collections::HashMap;

const DEFAULT_BATCHES_PER_SPLIT: usize = 8;
const NOTE_LEN: usize = 16;
const NUM_LABELS: u32 = 8;

/// Serves synthetic batches: a fixed number per split, every note the same
/// length.
pub struct DummyNoteReader {
    batch_size: usize,
    batches_per_split: HashMap<Split, usize>,
}

impl DummyNoteReader {
    pub fn new(batches_per_split: usize, batch_size: usize) -> Self {
        Self {
            batch_size,
            batches_per_split: Split::ALL
                .into_iter()
                .map(|split| (split, batches_per_split))
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        if config.options.batch_size == 0 {
            bail!("--batch-size must be at least 1");
        }
        Ok(Self::new(
            DEFAULT_BATCHES_PER_SPLIT,
            config.options.batch_size,
        ))
    }

    pub fn with_split_batches(mut self, split: Split, batches: usize) -> Self {
        self.batches_per_split.insert(split, batches);
        self
    }

    fn make_batch(&self, split: Split, index: usize) -> Batch {
        let mut batch = Batch::default();
        for row in 0..self.batch_size {
            let base = (split as u32) * 10_000 + (index * self.batch_size + row) as u32;
            let note = (0..NOTE_LEN as u32).map(|t| base + t).collect();
            let labels = vec![base % NUM_LABELS];
            batch.push(note, labels);
        }
        batch
    }
}

impl NoteReader for DummyNoteReader {
    fn get(&mut self, splits: &[Split]) -> Result<BatchIter<'_>> {
        let plan: Vec<(Split, usize)> = splits
            .iter()
            .flat_map(|split| {
                let count = self.batches_per_split.get(split).copied().unwrap_or(0);
                (0..count).map(move |index| (*split, index))
            })
            .collect();
        Ok(Box::new(
            plan.into_iter()
                .map(move |(split, index)| Ok(self.make_batch(split, index))),
        ))
    }
}
