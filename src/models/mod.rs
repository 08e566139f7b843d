pub mod comparison;
pub mod document;
pub mod job;
pub mod loaders;

pub use comparison::{ComparisonRow, FileNames, HEADERS};
pub use document::ParsedDocument;
pub use job::{MappingRow, OutputRow, RemoteFile, RunJobResult, UploadedFile};
pub use loaders::{load_mapping, read_mapping_rows};
