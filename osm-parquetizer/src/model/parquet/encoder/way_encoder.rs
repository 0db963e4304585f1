use super::{open_writer, AttributeColumns, BATCH_SIZE};
use crate::model::index::CoordinateIndex;
use crate::model::osm::{OsmNodeId, OsmWayData, ParquetizerError};
use crate::model::parquet::filenames;
use arrow::array::{Float64Builder, Int32Builder, Int64Builder, ListArray, StructArray};
use arrow::buffer::{NullBuffer, OffsetBuffer, ScalarBuffer};
use arrow::datatypes::{DataType, Field, FieldRef, Fields, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// encodes way records into `ways.parquet`: the shared attribute columns
/// plus the repeated node-reference group. each reference is resolved
/// against the coordinate index; a miss leaves latitude/longitude null
/// and is tolerated (a clipped extract legitimately references nodes it
/// does not contain).
pub struct WayEncoder {
    schema: SchemaRef,
    writer: ArrowWriter<File>,
    attributes: AttributeColumns,
    nodes: WayNodeColumns,
    pending: usize,
}

impl WayEncoder {
    pub fn new(
        output_directory: &Path,
        exclude_metadata: bool,
    ) -> Result<WayEncoder, ParquetizerError> {
        let mut fields = AttributeColumns::fields(exclude_metadata);
        fields.push(Field::new(
            "nodes",
            DataType::List(way_node_item_field()),
            true,
        ));
        let schema: SchemaRef = Arc::new(Schema::new(fields));
        let writer = open_writer(output_directory, filenames::WAYS, schema.clone())?;
        Ok(WayEncoder {
            schema,
            writer,
            attributes: AttributeColumns::new(exclude_metadata),
            nodes: WayNodeColumns::new(),
            pending: 0,
        })
    }

    pub fn append(
        &mut self,
        way: &OsmWayData,
        coordinates: Option<&CoordinateIndex>,
    ) -> Result<(), ParquetizerError> {
        self.attributes.append(way.osmid.0, &way.meta, &way.tags);
        self.nodes.append(&way.nodes, |id| {
            coordinates.and_then(|index| index.get(id))
        });
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
        columns.push(Arc::new(self.nodes.finish()?));
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

fn way_node_entry_fields() -> Fields {
    Fields::from(vec![
        Field::new("index", DataType::Int32, false),
        Field::new("nodeId", DataType::Int64, false),
        Field::new("latitude", DataType::Float64, true),
        Field::new("longitude", DataType::Float64, true),
    ])
}

fn way_node_item_field() -> FieldRef {
    Arc::new(Field::new(
        "item",
        DataType::Struct(way_node_entry_fields()),
        true,
    ))
}

/// builders for the repeated node-reference group. output order mirrors
/// the way's reference order exactly: no sorting, no deduplication. a
/// way with zero references stores a null entry, never an empty group.
struct WayNodeColumns {
    indices: Int32Builder,
    node_ids: Int64Builder,
    latitudes: Float64Builder,
    longitudes: Float64Builder,
    offsets: Vec<i32>,
    validity: Vec<bool>,
    entries: i32,
}

impl WayNodeColumns {
    fn new() -> WayNodeColumns {
        WayNodeColumns {
            indices: Int32Builder::new(),
            node_ids: Int64Builder::new(),
            latitudes: Float64Builder::new(),
            longitudes: Float64Builder::new(),
            offsets: vec![0],
            validity: vec![],
            entries: 0,
        }
    }

    fn append(&mut self, refs: &[OsmNodeId], resolve: impl Fn(&OsmNodeId) -> Option<(f64, f64)>) {
        if refs.is_empty() {
            self.validity.push(false);
        } else {
            for (index, node_id) in refs.iter().enumerate() {
                self.indices.append_value(index as i32);
                self.node_ids.append_value(node_id.0);
                match resolve(node_id) {
                    Some((lon, lat)) => {
                        self.latitudes.append_value(lat);
                        self.longitudes.append_value(lon);
                    }
                    None => {
                        self.latitudes.append_null();
                        self.longitudes.append_null();
                    }
                }
                self.entries += 1;
            }
            self.validity.push(true);
        }
        self.offsets.push(self.entries);
    }

    fn finish(&mut self) -> Result<ListArray, ParquetizerError> {
        let entries = StructArray::try_new(
            way_node_entry_fields(),
            vec![
                Arc::new(self.indices.finish()),
                Arc::new(self.node_ids.finish()),
                Arc::new(self.latitudes.finish()),
                Arc::new(self.longitudes.finish()),
            ],
            None,
        )?;
        let offsets = std::mem::replace(&mut self.offsets, vec![0]);
        let validity = std::mem::take(&mut self.validity);
        self.entries = 0;
        let list = ListArray::try_new(
            way_node_item_field(),
            OffsetBuffer::new(ScalarBuffer::from(offsets)),
            Arc::new(entries),
            Some(NullBuffer::from(validity)),
        )?;
        Ok(list)
    }
}
