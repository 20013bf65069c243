pub mod duckdb_storage;
pub mod filesystem;
pub mod hooks;
pub mod memory;
pub mod plugins;
pub mod records;
pub mod repository;
pub mod storage;
pub mod summarizer;

#[cfg(test)]
pub mod test_utils;

pub use duckdb_storage::*;
pub use filesystem::*;
pub use hooks::*;
pub use memory::*;
pub use plugins::*;
pub use repository::*;
pub use storage::*;
pub use summarizer::*;
