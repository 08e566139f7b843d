pub mod mapping_loader;

pub use mapping_loader::{decode_mapping_bytes, load_mapping, read_mapping_rows};
