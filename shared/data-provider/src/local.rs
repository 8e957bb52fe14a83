use anyhow::{anyhow, bail, Context, Result};
use noteml_config::Config;
use noteml_core::Split;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{Batch, BatchIter, NoteReader};

const BATCH_ORDER_SEED: u64 = 0x6e6f_7465;

/// One line of a `{split}.jsonl` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub notes: Vec<u32>,
    pub labels: Vec<u32>,
}

/// Reads pre-tokenized notes from `{data_dir}/{split}.jsonl`.
///
/// With `length_sort`, notes of similar length share a batch and the batch
/// order is shuffled on every pass; otherwise batches follow file order.
pub struct LocalNoteReader {
    data_dir: PathBuf,
    batch_size: usize,
    length_sort: bool,
    max_note_len: Option<usize>,
    rng: ChaCha8Rng,
}

impl LocalNoteReader {
    pub fn new(
        data_dir: impl AsRef<Path>,
        batch_size: usize,
        length_sort: bool,
        max_note_len: Option<usize>,
        seed: u64,
    ) -> Result<Self> {
        if batch_size == 0 {
            bail!("batch size must be at least 1");
        }
        let data_dir = data_dir.as_ref().to_path_buf();
        if !data_dir.is_dir() {
            bail!("data directory {} does not exist", data_dir.display());
        }
        info!(
            "Reading notes from {} (batch size {batch_size}, length sort {length_sort})",
            data_dir.display()
        );
        Ok(Self {
            data_dir,
            batch_size,
            length_sort,
            max_note_len,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.options.data_path,
            config.options.batch_size,
            config.options.length_sort,
            config.max_note_len(),
            BATCH_ORDER_SEED,
        )
    }

    pub fn split_path(&self, split: Split) -> PathBuf {
        self.data_dir.join(format!("{split}.jsonl"))
    }
}

impl NoteReader for LocalNoteReader {
    fn get(&mut self, splits: &[Split]) -> Result<BatchIter<'_>> {
        let paths = splits
            .iter()
            .map(|split| {
                let path = self.split_path(*split);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(anyhow!("no data for split {split} at {}", path.display()))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let batch_size = self.batch_size;
        let length_sort = self.length_sort;
        let max_note_len = self.max_note_len;
        let seed: u64 = self.rng.gen();

        Ok(Box::new(paths.into_iter().enumerate().flat_map(
            move |(index, path)| match read_records(&path, max_note_len) {
                Ok(records) => {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(index as u64));
                    make_batches(records, batch_size, length_sort, &mut rng)
                        .into_iter()
                        .map(Ok)
                        .collect::<Vec<Result<Batch>>>()
                }
                Err(err) => vec![Err(err)],
            },
        )))
    }
}

fn read_records(path: &Path, max_note_len: Option<usize>) -> Result<Vec<NoteRecord>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut records = Vec::new();
    for (line_number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let mut record: NoteRecord = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed note record", path.display(), line_number + 1))?;
        if let Some(max) = max_note_len {
            record.notes.truncate(max);
        }
        records.push(record);
    }
    debug!("Read {} notes from {}", records.len(), path.display());
    Ok(records)
}

fn make_batches(
    mut records: Vec<NoteRecord>,
    batch_size: usize,
    length_sort: bool,
    rng: &mut ChaCha8Rng,
) -> Vec<Batch> {
    if length_sort {
        records.sort_by_key(|record| record.notes.len());
    }
    let mut batches: Vec<Batch> = records
        .chunks(batch_size)
        .map(|chunk| {
            let mut batch = Batch::default();
            for record in chunk {
                batch.push(record.notes.clone(), record.labels.clone());
            }
            batch
        })
        .collect();
    if length_sort {
        batches.shuffle(rng);
    }
    batches
}
