mod entry;
mod file_handle;
mod file_type;
mod range;

pub use entry::{sort_entries, Entry, EntryKind};
pub use file_handle::{ByteStream, FileHandle};
pub use file_type::{content_type_for, FileType};
pub use range::{ByteRange, ContentStatus};
