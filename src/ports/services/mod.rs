mod explorer_service;
mod file_storage;

pub use explorer_service::ExplorerService;
pub use file_storage::FileStorage;
