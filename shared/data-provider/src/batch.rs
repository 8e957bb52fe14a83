/// Notes as token ids, their lengths, and their label ids.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Batch {
    pub notes: Vec<Vec<u32>>,
    pub lengths: Vec<usize>,
    pub labels: Vec<Vec<u32>>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn push(&mut self, note: Vec<u32>, labels: Vec<u32>) {
        self.lengths.push(note.len());
        self.notes.push(note);
        self.labels.push(labels);
    }
}
