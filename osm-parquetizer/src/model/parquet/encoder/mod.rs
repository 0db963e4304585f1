mod attribute_columns;
mod node_encoder;
mod relation_encoder;
mod way_encoder;

pub use attribute_columns::AttributeColumns;
pub use node_encoder::NodeEncoder;
pub use relation_encoder::RelationEncoder;
pub use way_encoder::WayEncoder;

use crate::model::osm::ParquetizerError;
use arrow::datatypes::SchemaRef;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;

/// rows buffered per encoder before a batch is flushed to the writer
pub const BATCH_SIZE: usize = 8192;

/// creates the Parquet writer for one entity type's output file
fn open_writer(
    output_directory: &Path,
    filename: &str,
    schema: SchemaRef,
) -> Result<ArrowWriter<File>, ParquetizerError> {
    let filepath = output_directory.join(filename);
    let file = File::create(&filepath).map_err(|e| {
        ParquetizerError::OutputFileError(filepath.to_string_lossy().to_string(), e)
    })?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let writer = ArrowWriter::try_new(file, schema, Some(props))?;
    Ok(writer)
}
