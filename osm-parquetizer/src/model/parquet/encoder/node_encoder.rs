use super::{open_writer, AttributeColumns, BATCH_SIZE};
use crate::model::index::CoordinateIndex;
use crate::model::osm::{OsmNodeData, ParquetizerError};
use crate::model::parquet::filenames;
use arrow::array::Float64Builder;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// encodes node records into `nodes.parquet`: the shared attribute
/// columns plus the required latitude/longitude columns.
pub struct NodeEncoder {
    schema: SchemaRef,
    writer: ArrowWriter<File>,
    attributes: AttributeColumns,
    latitudes: Float64Builder,
    longitudes: Float64Builder,
    pending: usize,
}

impl NodeEncoder {
    pub fn new(
        output_directory: &Path,
        exclude_metadata: bool,
    ) -> Result<NodeEncoder, ParquetizerError> {
        let mut fields = AttributeColumns::fields(exclude_metadata);
        fields.push(Field::new("latitude", DataType::Float64, false));
        fields.push(Field::new("longitude", DataType::Float64, false));
        let schema: SchemaRef = Arc::new(Schema::new(fields));
        let writer = open_writer(output_directory, filenames::NODES, schema.clone())?;
        Ok(NodeEncoder {
            schema,
            writer,
            attributes: AttributeColumns::new(exclude_metadata),
            latitudes: Float64Builder::new(),
            longitudes: Float64Builder::new(),
            pending: 0,
        })
    }

    /// caches the node's coordinate for later way resolution, then
    /// appends the columnar record. the cache write must land before any
    /// way is encoded, which holds because the stream delivers all nodes
    /// first.
    pub fn append(
        &mut self,
        node: &OsmNodeData,
        coordinates: Option<&mut CoordinateIndex>,
    ) -> Result<(), ParquetizerError> {
        if let Some(index) = coordinates {
            index.put(&node.osmid, node.lon, node.lat);
        }
        self.attributes.append(node.osmid.0, &node.meta, &node.tags);
        self.latitudes.append_value(node.lat);
        self.longitudes.append_value(node.lon);
        self.pending += 1;
        if self.pending >= BATCH_SIZE {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ParquetizerError> {
        if self.pending == 0 {
            return Ok(());
        }
        let mut columns = self.attributes.finish()?;
        columns.push(Arc::new(self.latitudes.finish()));
        columns.push(Arc::new(self.longitudes.finish()));
        let batch = RecordBatch::try_new(self.schema.clone(), columns)?;
        self.writer.write(&batch)?;
        self.pending = 0;
        Ok(())
    }

    pub fn close(mut self) -> Result<(), ParquetizerError> {
        self.flush()?;
        self.writer.close()?;
        Ok(())
    }
}
