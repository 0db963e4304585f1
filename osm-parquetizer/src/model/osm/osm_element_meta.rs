use osmpbf::dense::DenseNodeInfo;
use osmpbf::elements::Info;
use serde::{Deserialize, Serialize};

/// authorship metadata attached to an OSM element. every field is
/// optional in the wire format, and the whole group can be dropped from
/// the output schemas by configuration.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct OsmElementMeta {
    pub version: Option<i32>,
    /// epoch milliseconds
    pub timestamp: Option<i64>,
    pub changeset: Option<i64>,
    pub uid: Option<i64>,
    pub user: Option<String>,
}

impl From<&Info<'_>> for OsmElementMeta {
    fn from(info: &Info) -> Self {
        OsmElementMeta {
            version: info.version(),
            timestamp: info.milli_timestamp(),
            changeset: info.changeset(),
            uid: info.uid().map(i64::from),
            user: info.user().and_then(|u| u.ok()).map(String::from),
        }
    }
}

impl From<&DenseNodeInfo<'_>> for OsmElementMeta {
    fn from(info: &DenseNodeInfo) -> Self {
        OsmElementMeta {
            version: Some(info.version()),
            timestamp: Some(info.milli_timestamp()),
            changeset: Some(info.changeset()),
            uid: Some(i64::from(info.uid())),
            user: info.user().ok().map(String::from),
        }
    }
}
