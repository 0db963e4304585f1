use super::{OsmNodeData, OsmRelationData, OsmWayData};
use osmpbf::Element;
use serde::{Deserialize, Serialize};

/// the closed set of entity variants this pipeline routes. the sink and
/// every encoder match on this exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OsmElement {
    Node(OsmNodeData),
    Way(OsmWayData),
    Relation(OsmRelationData),
}

impl OsmElement {
    /// the entity type label used in logs
    pub fn type_name(&self) -> &'static str {
        match self {
            OsmElement::Node(_) => "node",
            OsmElement::Way(_) => "way",
            OsmElement::Relation(_) => "relation",
        }
    }
}

impl From<&Element<'_>> for OsmElement {
    fn from(element: &Element) -> Self {
        match element {
            Element::Node(node) => OsmElement::Node(OsmNodeData::from(node)),
            Element::DenseNode(dense) => OsmElement::Node(OsmNodeData::from(dense)),
            Element::Way(way) => OsmElement::Way(OsmWayData::from(way)),
            Element::Relation(relation) => OsmElement::Relation(OsmRelationData::from(relation)),
        }
    }
}
