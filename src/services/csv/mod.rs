pub mod analyzer;
pub mod parser;
pub mod types;
pub mod utils;

pub use analyzer::{analyze, DataAnalyzer};
pub use parser::{parse, CsvError};
pub use types::*;
