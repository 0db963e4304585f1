use super::{OsmElementMeta, OsmNodeId, OsmTags, OsmWayId};
use serde::{Deserialize, Serialize};

/// an OSM way: an ordered path of node references. the reference order
/// defines the path and is preserved exactly, repeats included.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct OsmWayData {
    pub osmid: OsmWayId,
    pub nodes: Vec<OsmNodeId>,
    pub tags: OsmTags,
    pub meta: OsmElementMeta,
}

impl From<&osmpbf::elements::Way<'_>> for OsmWayData {
    fn from(way: &osmpbf::elements::Way) -> Self {
        OsmWayData {
            osmid: OsmWayId(way.id()),
            nodes: way.refs().map(OsmNodeId).collect(),
            tags: way
                .tags()
                .map(|(k, v)| (String::from(k), String::from(v)))
                .collect(),
            meta: OsmElementMeta::from(&way.info()),
        }
    }
}
