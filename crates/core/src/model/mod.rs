pub mod change;
pub mod record;

pub use change::{ChangeBatch, ChangeEvent, ChangeKind, DocumentChange};
pub use record::{Record, RecordError, RecordId};
