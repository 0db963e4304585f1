use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParquetizerError {
    #[error("invalid conversion configuration: {0}")]
    ConfigurationError(String),
    #[error("failure reading .pbf file: {source}")]
    PbfLibError { source: osmpbf::Error },
    #[error("unable to open coordinate index at {path}: {source}")]
    IndexOpenError {
        path: String,
        source: rocksdb::Error,
    },
    #[error("failure creating output file {0}: {1}")]
    OutputFileError(String, std::io::Error),
    #[error("failure assembling column batch: {source}")]
    ColumnBatchError {
        #[from]
        source: ArrowError,
    },
    #[error("failure writing Parquet output: {source}")]
    ParquetWriteError {
        #[from]
        source: ParquetError,
    },
    #[error("{0}")]
    InternalError(String),
}
