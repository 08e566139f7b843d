pub mod drive_client;
pub mod file_store;

pub use drive_client::DriveClient;
pub use file_store::{fetch_text, find_file, resolve_folder_id, FileStore};
