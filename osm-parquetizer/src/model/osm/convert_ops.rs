use super::{OsmElement, ParquetizerError};
use crate::config::ConversionConfiguration;
use crate::model::parquet::{ParquetSink, ProgressObserver};
use osmpbf::ElementReader;
use std::path::Path;

/// streams a PBF file through the sink: every decoded element is
/// converted into the owned model at this boundary and routed in file
/// order. the reader delivers elements grouped by type (nodes, ways,
/// relations), which is what makes the sink's single pass over the
/// coordinate index possible. returns the processed-element total.
pub fn parquetize(
    pbf_filepath: &Path,
    output_directory: &Path,
    config: &ConversionConfiguration,
) -> Result<u64, ParquetizerError> {
    let reader = ElementReader::from_path(pbf_filepath)
        .map_err(|e| ParquetizerError::PbfLibError { source: e })?;
    let progress = ProgressObserver::new(&pbf_filepath.to_string_lossy())?;
    let mut sink = ParquetSink::new(output_directory, config, progress)?;

    // for_each cannot carry a Result out of its closure, so the first
    // encoder failure is parked and processing of the remaining stream
    // is skipped
    let mut failure: Option<ParquetizerError> = None;
    reader
        .for_each(|element| {
            if failure.is_some() {
                return;
            }
            let converted = OsmElement::from(&element);
            if let Err(e) = sink.process(&converted) {
                failure = Some(e);
            }
        })
        .map_err(|e| ParquetizerError::PbfLibError { source: e })?;

    match failure {
        Some(e) => Err(e),
        None => sink.close(),
    }
}
