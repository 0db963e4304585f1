use super::{OsmElementMeta, OsmRelationId, OsmTags};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// an OSM relation: an ordered collection of typed member references,
/// each with an optional role. member order is preserved exactly.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct OsmRelationData {
    pub osmid: OsmRelationId,
    pub members: Vec<OsmRelationMember>,
    pub tags: OsmTags,
    pub meta: OsmElementMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsmRelationMember {
    pub member_type: OsmMemberType,
    pub member_id: i64,
    /// `None` when the source carries no role for this member
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum OsmMemberType {
    Node,
    Way,
    Relation,
}

impl Display for OsmMemberType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsmMemberType::Node => write!(f, "node"),
            OsmMemberType::Way => write!(f, "way"),
            OsmMemberType::Relation => write!(f, "relation"),
        }
    }
}

impl From<osmpbf::RelMemberType> for OsmMemberType {
    fn from(member_type: osmpbf::RelMemberType) -> Self {
        match member_type {
            osmpbf::RelMemberType::Node => OsmMemberType::Node,
            osmpbf::RelMemberType::Way => OsmMemberType::Way,
            osmpbf::RelMemberType::Relation => OsmMemberType::Relation,
        }
    }
}

impl From<&osmpbf::elements::Relation<'_>> for OsmRelationData {
    fn from(relation: &osmpbf::elements::Relation) -> Self {
        let members = relation
            .members()
            .map(|member| OsmRelationMember {
                member_type: OsmMemberType::from(member.member_type.clone()),
                member_id: member.member_id,
                role: member
                    .role()
                    .ok()
                    .filter(|role| !role.is_empty())
                    .map(String::from),
            })
            .collect();
        OsmRelationData {
            osmid: OsmRelationId(relation.id()),
            members,
            tags: relation
                .tags()
                .map(|(k, v)| (String::from(k), String::from(v)))
                .collect(),
            meta: OsmElementMeta::from(&relation.info()),
        }
    }
}
