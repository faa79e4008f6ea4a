mod entry_name;
mod logical_path;
mod storage_key;
mod user_id;

pub use entry_name::EntryName;
pub use logical_path::{LogicalPath, MAX_PATH_BYTES};
pub use storage_key::StorageKey;
pub use user_id::UserId;
