use crate::model::CliError;
use serde::{Deserialize, Serialize};

/// defines behaviors for a PBF-to-Parquet conversion run. paths are
/// provided separately (see [`crate::model::osm::OsmSource`]); this
/// carries the switches that shape the output schemas and the reader.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ConversionConfiguration {
    /// drops the version/timestamp/changeset/uid/user columns from every schema
    pub exclude_metadata: bool,
    pub no_nodes: bool,
    pub no_ways: bool,
    pub no_relations: bool,
    /// decode parallelism hint, forwarded to the reader and never used
    /// to parallelize routing or encoding
    pub pbf_threads: usize,
}

impl Default for ConversionConfiguration {
    fn default() -> Self {
        Self {
            exclude_metadata: false,
            no_nodes: false,
            no_ways: false,
            no_relations: false,
            pbf_threads: 1,
        }
    }
}

impl ConversionConfiguration {
    pub fn nodes_enabled(&self) -> bool {
        !self.no_nodes
    }

    pub fn ways_enabled(&self) -> bool {
        !self.no_ways
    }

    pub fn relations_enabled(&self) -> bool {
        !self.no_relations
    }

    /// the coordinate index only exists for runs that either fill it
    /// (nodes) or consult it (ways)
    pub fn coordinate_index_enabled(&self) -> bool {
        self.nodes_enabled() || self.ways_enabled()
    }
}

impl TryFrom<&String> for ConversionConfiguration {
    type Error = CliError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        if f.ends_with(".toml") {
            let s = std::fs::read_to_string(f)
                .map_err(|e| CliError::ConfigurationError(format!("failure reading {f}: {e}")))?;
            toml::from_str(&s)
                .map_err(|e| CliError::ConfigurationError(format!("failure decoding {f}: {e}")))
        } else if f.ends_with(".json") {
            let s = std::fs::read_to_string(f)
                .map_err(|e| CliError::ConfigurationError(format!("failure reading {f}: {e}")))?;
            serde_json::from_str(&s)
                .map_err(|e| CliError::ConfigurationError(format!("failure decoding {f}: {e}")))
        } else {
            Err(CliError::ConfigurationError(format!(
                "unsupported file type: {f}"
            )))
        }
    }
}
