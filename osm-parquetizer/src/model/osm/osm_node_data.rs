use super::{OsmElementMeta, OsmNodeId, OsmTags};
use serde::{Deserialize, Serialize};

/// a located OSM node with its full tag set and authorship metadata.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct OsmNodeData {
    pub osmid: OsmNodeId,
    pub lon: f64,
    pub lat: f64,
    pub tags: OsmTags,
    pub meta: OsmElementMeta,
}

impl From<&osmpbf::elements::Node<'_>> for OsmNodeData {
    fn from(node: &osmpbf::elements::Node) -> Self {
        OsmNodeData {
            osmid: OsmNodeId(node.id()),
            lon: node.lon(),
            lat: node.lat(),
            tags: node
                .tags()
                .map(|(k, v)| (String::from(k), String::from(v)))
                .collect(),
            meta: OsmElementMeta::from(&node.info()),
        }
    }
}

impl From<&osmpbf::dense::DenseNode<'_>> for OsmNodeData {
    fn from(node: &osmpbf::dense::DenseNode<'_>) -> Self {
        OsmNodeData {
            osmid: OsmNodeId(node.id()),
            lon: node.lon(),
            lat: node.lat(),
            tags: node
                .tags()
                .map(|(k, v)| (String::from(k), String::from(v)))
                .collect(),
            meta: node
                .info()
                .map(OsmElementMeta::from)
                .unwrap_or_default(),
        }
    }
}
