use super::osm::ParquetizerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("failure reading run configuration: {0}")]
    ConfigurationError(String),
    #[error("failure converting .pbf file: {source}")]
    ParquetizerError {
        #[from]
        source: ParquetizerError,
    },
    #[error("failure reading configuration: {source}")]
    StdIoError {
        #[from]
        source: std::io::Error,
    },
    #[error("failure decoding JSON: {source}")]
    SerdeJsonError {
        #[from]
        source: serde_json::Error,
    },
}
