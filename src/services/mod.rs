pub mod comparer;
pub mod parser;

pub use comparer::{compare, compare_to_csv, write_rows, CsvReport};
pub use parser::{parse, parse_values};
