pub mod convert_ops;
mod osm_element;
mod osm_element_meta;
mod osm_node_data;
mod osm_node_id;
mod osm_relation_data;
mod osm_relation_id;
mod osm_source;
mod osm_way_data;
mod osm_way_id;
mod parquetizer_error;

pub use osm_element::OsmElement;
pub use osm_element_meta::OsmElementMeta;
pub use osm_node_data::OsmNodeData;
pub use osm_node_id::OsmNodeId;
pub use osm_relation_data::{OsmMemberType, OsmRelationData, OsmRelationMember};
pub use osm_relation_id::OsmRelationId;
pub use osm_source::OsmSource;
pub use osm_way_data::OsmWayData;
pub use osm_way_id::OsmWayId;
pub use parquetizer_error::ParquetizerError;

/// tag key/value pairs in their original file order, repeats included
pub type OsmTags = Vec<(String, String)>;
