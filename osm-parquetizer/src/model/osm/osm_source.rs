use super::{convert_ops, ParquetizerError};
use crate::config::ConversionConfiguration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OsmSource {
    Pbf {
        pbf_filepath: Option<String>,
        output_directory: Option<String>,
        continent: Option<String>,
        country: Option<String>,
        country_region: Option<String>,
        configuration: ConversionConfiguration,
    },
}

impl OsmSource {
    /// root of the extract tree used when no explicit paths are given;
    /// the continent/country/region arguments select a subdirectory
    pub const DEFAULT_TREE: &'static str = "tmp/kuwala/osm_files";

    pub fn parquetize(&self) -> Result<u64, ParquetizerError> {
        match self {
            OsmSource::Pbf { configuration, .. } => {
                let source = self.source_path();
                let destination = self.destination_path();
                log::info!(
                    "parquetizing {} into {}",
                    source.display(),
                    destination.display()
                );
                log::info!(
                    "entity types: nodes={}, ways={}, relations={}; metadata={}",
                    configuration.nodes_enabled(),
                    configuration.ways_enabled(),
                    configuration.relations_enabled(),
                    !configuration.exclude_metadata
                );
                let total = convert_ops::parquetize(&source, &destination, configuration)?;
                log::info!(
                    "wrote Parquet output for {} elements to {}",
                    total,
                    destination.display()
                );
                Ok(total)
            }
        }
    }

    pub fn source_path(&self) -> PathBuf {
        match self {
            OsmSource::Pbf { pbf_filepath, .. } => match pbf_filepath {
                Some(f) => PathBuf::from(f),
                None => self.region_base().join("pbf").join("geo_fabrik.osm.pbf"),
            },
        }
    }

    pub fn destination_path(&self) -> PathBuf {
        match self {
            OsmSource::Pbf {
                output_directory, ..
            } => match output_directory {
                Some(d) => PathBuf::from(d),
                None => self.region_base().join("parquet").join("osm_parquetizer"),
            },
        }
    }

    fn region_base(&self) -> PathBuf {
        match self {
            OsmSource::Pbf {
                continent,
                country,
                country_region,
                ..
            } => {
                let mut base = PathBuf::from(Self::DEFAULT_TREE);
                for part in [continent, country, country_region].into_iter().flatten() {
                    base.push(part);
                }
                base
            }
        }
    }
}
