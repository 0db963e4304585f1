mod cli_error;
pub mod index;
pub mod osm;
pub mod parquet;

pub use cli_error::CliError;
