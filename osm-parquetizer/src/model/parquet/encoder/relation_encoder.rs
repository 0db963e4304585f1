use super::{open_writer, AttributeColumns, BATCH_SIZE};
use crate::model::osm::{OsmRelationData, OsmRelationMember, ParquetizerError};
use crate::model::parquet::filenames;
use arrow::array::{Int32Builder, Int64Builder, ListArray, StringBuilder, StructArray};
use arrow::buffer::{NullBuffer, OffsetBuffer, ScalarBuffer};
use arrow::datatypes::{DataType, Field, FieldRef, Fields, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// encodes relation records into `relations.parquet`: the shared
/// attribute columns plus the repeated member group. members are never
/// coordinate-resolved; they can themselves be ways or relations whose
/// geometry this pipeline does not materialize.
pub struct RelationEncoder {
    schema: SchemaRef,
    writer: ArrowWriter<File>,
    attributes: AttributeColumns,
    members: MemberColumns,
    pending: usize,
}

impl RelationEncoder {
    pub fn new(
        output_directory: &Path,
        exclude_metadata: bool,
    ) -> Result<RelationEncoder, ParquetizerError> {
        let mut fields = AttributeColumns::fields(exclude_metadata);
        fields.push(Field::new(
            "members",
            DataType::List(member_item_field()),
            true,
        ));
        let schema: SchemaRef = Arc::new(Schema::new(fields));
        let writer = open_writer(output_directory, filenames::RELATIONS, schema.clone())?;
        Ok(RelationEncoder {
            schema,
            writer,
            attributes: AttributeColumns::new(exclude_metadata),
            members: MemberColumns::new(),
            pending: 0,
        })
    }

    pub fn append(&mut self, relation: &OsmRelationData) -> Result<(), ParquetizerError> {
        self.attributes
            .append(relation.osmid.0, &relation.meta, &relation.tags);
        self.members.append(&relation.members);
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
        columns.push(Arc::new(self.members.finish()?));
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

fn member_entry_fields() -> Fields {
    Fields::from(vec![
        Field::new("index", DataType::Int32, false),
        Field::new("type", DataType::Utf8, false),
        Field::new("id", DataType::Int64, false),
        Field::new("role", DataType::Utf8, true),
    ])
}

fn member_item_field() -> FieldRef {
    Arc::new(Field::new(
        "item",
        DataType::Struct(member_entry_fields()),
        true,
    ))
}

/// builders for the repeated member group. output order mirrors the
/// relation's member order exactly. a relation with zero members stores
/// a null entry, never an empty group.
struct MemberColumns {
    indices: Int32Builder,
    types: StringBuilder,
    ids: Int64Builder,
    roles: StringBuilder,
    offsets: Vec<i32>,
    validity: Vec<bool>,
    entries: i32,
}

impl MemberColumns {
    fn new() -> MemberColumns {
        MemberColumns {
            indices: Int32Builder::new(),
            types: StringBuilder::new(),
            ids: Int64Builder::new(),
            roles: StringBuilder::new(),
            offsets: vec![0],
            validity: vec![],
            entries: 0,
        }
    }

    fn append(&mut self, members: &[OsmRelationMember]) {
        if members.is_empty() {
            self.validity.push(false);
        } else {
            for (index, member) in members.iter().enumerate() {
                self.indices.append_value(index as i32);
                self.types.append_value(member.member_type.to_string());
                self.ids.append_value(member.member_id);
                self.roles.append_option(member.role.as_deref());
                self.entries += 1;
            }
            self.validity.push(true);
        }
        self.offsets.push(self.entries);
    }

    fn finish(&mut self) -> Result<ListArray, ParquetizerError> {
        let entries = StructArray::try_new(
            member_entry_fields(),
            vec![
                Arc::new(self.indices.finish()),
                Arc::new(self.types.finish()),
                Arc::new(self.ids.finish()),
                Arc::new(self.roles.finish()),
            ],
            None,
        )?;
        let offsets = std::mem::replace(&mut self.offsets, vec![0]);
        let validity = std::mem::take(&mut self.validity);
        self.entries = 0;
        let list = ListArray::try_new(
            member_item_field(),
            OffsetBuffer::new(ScalarBuffer::from(offsets)),
            Arc::new(entries),
            Some(NullBuffer::from(validity)),
        )?;
        Ok(list)
    }
}
