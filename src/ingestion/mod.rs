pub mod pipeline;
pub mod records;

pub use pipeline::Analyzer;
pub use records::parse_records;
