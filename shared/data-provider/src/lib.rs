mod batch;
mod dummy;
mod local;
mod traits;

pub use batch::Batch;
pub use dummy::DummyNoteReader;
pub use local::{LocalNoteReader, NoteRecord};
pub use traits::{BatchIter, NoteReader};
