use crate::model::osm::{OsmElementMeta, OsmTags, ParquetizerError};
use arrow::array::{ArrayRef, Int32Builder, Int64Builder, ListArray, StringBuilder, StructArray};
use arrow::buffer::{NullBuffer, OffsetBuffer, ScalarBuffer};
use arrow::datatypes::{DataType, Field, FieldRef, Fields};
use std::sync::Arc;

/// builders for the column prefix shared by every entity type: the id,
/// the metadata columns (unless excluded), and the repeated tag group.
pub struct AttributeColumns {
    exclude_metadata: bool,
    id: Int64Builder,
    version: Int32Builder,
    timestamp: Int64Builder,
    changeset: Int64Builder,
    uid: Int64Builder,
    user: StringBuilder,
    tags: TagColumns,
}

impl AttributeColumns {
    pub fn new(exclude_metadata: bool) -> AttributeColumns {
        AttributeColumns {
            exclude_metadata,
            id: Int64Builder::new(),
            version: Int32Builder::new(),
            timestamp: Int64Builder::new(),
            changeset: Int64Builder::new(),
            uid: Int64Builder::new(),
            user: StringBuilder::new(),
            tags: TagColumns::new(),
        }
    }

    /// schema prefix shared by all entity types. the declaration order is
    /// fixed for the whole run; downstream readers depend on it.
    pub fn fields(exclude_metadata: bool) -> Vec<Field> {
        let mut fields = vec![Field::new("id", DataType::Int64, false)];
        if !exclude_metadata {
            fields.push(Field::new("version", DataType::Int32, true));
            fields.push(Field::new("timestamp", DataType::Int64, true));
            fields.push(Field::new("changeset", DataType::Int64, true));
            fields.push(Field::new("uid", DataType::Int64, true));
            fields.push(Field::new("user", DataType::Utf8, true));
        }
        fields.push(Field::new("tags", DataType::List(tag_item_field()), true));
        fields
    }

    pub fn append(&mut self, id: i64, meta: &OsmElementMeta, tags: &OsmTags) {
        self.id.append_value(id);
        if !self.exclude_metadata {
            self.version.append_option(meta.version);
            self.timestamp.append_option(meta.timestamp);
            self.changeset.append_option(meta.changeset);
            self.uid.append_option(meta.uid);
            self.user.append_option(meta.user.as_deref());
        }
        self.tags.append(tags);
    }

    /// drains the builders into columns, in schema order
    pub fn finish(&mut self) -> Result<Vec<ArrayRef>, ParquetizerError> {
        let mut columns: Vec<ArrayRef> = vec![Arc::new(self.id.finish())];
        if !self.exclude_metadata {
            columns.push(Arc::new(self.version.finish()));
            columns.push(Arc::new(self.timestamp.finish()));
            columns.push(Arc::new(self.changeset.finish()));
            columns.push(Arc::new(self.uid.finish()));
            columns.push(Arc::new(self.user.finish()));
        }
        columns.push(Arc::new(self.tags.finish()?));
        Ok(columns)
    }
}

fn tag_entry_fields() -> Fields {
    Fields::from(vec![
        Field::new("key", DataType::Utf8, false),
        Field::new("value", DataType::Utf8, false),
    ])
}

fn tag_item_field() -> FieldRef {
    Arc::new(Field::new("item", DataType::Struct(tag_entry_fields()), true))
}

/// builders for the repeated tag group. a record with no tags stores a
/// null entry, never an empty group.
struct TagColumns {
    keys: StringBuilder,
    values: StringBuilder,
    offsets: Vec<i32>,
    validity: Vec<bool>,
    entries: i32,
}

impl TagColumns {
    fn new() -> TagColumns {
        TagColumns {
            keys: StringBuilder::new(),
            values: StringBuilder::new(),
            offsets: vec![0],
            validity: vec![],
            entries: 0,
        }
    }

    fn append(&mut self, tags: &OsmTags) {
        if tags.is_empty() {
            self.validity.push(false);
        } else {
            for (key, value) in tags.iter() {
                self.keys.append_value(key);
                self.values.append_value(value);
                self.entries += 1;
            }
            self.validity.push(true);
        }
        self.offsets.push(self.entries);
    }

    fn finish(&mut self) -> Result<ListArray, ParquetizerError> {
        let entries = StructArray::try_new(
            tag_entry_fields(),
            vec![Arc::new(self.keys.finish()), Arc::new(self.values.finish())],
            None,
        )?;
        let offsets = std::mem::replace(&mut self.offsets, vec![0]);
        let validity = std::mem::take(&mut self.validity);
        self.entries = 0;
        let list = ListArray::try_new(
            tag_item_field(),
            OffsetBuffer::new(ScalarBuffer::from(offsets)),
            Arc::new(entries),
            Some(NullBuffer::from(validity)),
        )?;
        Ok(list)
    }
}
