use super::encoder::{NodeEncoder, RelationEncoder, WayEncoder};
use super::{ProgressObserver, SinkPhase};
use crate::config::ConversionConfiguration;
use crate::model::index::CoordinateIndex;
use crate::model::osm::{OsmElement, ParquetizerError};
use std::path::Path;

/// routes each incoming element to the encoder for its type and owns the
/// coordinate index for its whole lifecycle: opened before the first
/// element, flipped to its drain phase at the first non-node element,
/// destroyed at end of stream. the stream is assumed to be grouped by
/// type (nodes, then ways, then relations); an element arriving out of
/// order is still routed, but its coordinates can no longer enter the
/// index.
///
/// single-writer: callers must deliver one element at a time.
pub struct ParquetSink {
    phase: SinkPhase,
    coordinates: Option<CoordinateIndex>,
    nodes: Option<NodeEncoder>,
    ways: Option<WayEncoder>,
    relations: Option<RelationEncoder>,
    progress: ProgressObserver,
}

impl ParquetSink {
    /// creates output files for the enabled entity types and, when nodes
    /// or ways are processed, opens the coordinate index. an index open
    /// failure is fatal: way records could not be resolved without it.
    pub fn new(
        output_directory: &Path,
        config: &ConversionConfiguration,
        progress: ProgressObserver,
    ) -> Result<ParquetSink, ParquetizerError> {
        if !output_directory.is_dir() {
            std::fs::create_dir_all(output_directory).map_err(|e| {
                ParquetizerError::OutputFileError(
                    output_directory.to_string_lossy().to_string(),
                    e,
                )
            })?;
        }
        let coordinates = match config.coordinate_index_enabled() {
            true => Some(CoordinateIndex::open(output_directory)?),
            false => None,
        };
        let nodes = match config.nodes_enabled() {
            true => Some(NodeEncoder::new(output_directory, config.exclude_metadata)?),
            false => None,
        };
        let ways = match config.ways_enabled() {
            true => Some(WayEncoder::new(output_directory, config.exclude_metadata)?),
            false => None,
        };
        let relations = match config.relations_enabled() {
            true => Some(RelationEncoder::new(
                output_directory,
                config.exclude_metadata,
            )?),
            false => None,
        };
        Ok(ParquetSink {
            phase: SinkPhase::CollectingNodes,
            coordinates,
            nodes,
            ways,
            relations,
            progress,
        })
    }

    pub fn phase(&self) -> SinkPhase {
        self.phase
    }

    /// dispatches one element to its encoder. disabled types are counted
    /// but never encoded; their output file does not exist.
    pub fn process(&mut self, element: &OsmElement) -> Result<(), ParquetizerError> {
        match element {
            OsmElement::Node(node) => {
                if self.phase != SinkPhase::CollectingNodes {
                    log::warn!(
                        "node {} arrived during the '{}' phase; input is not grouped by type",
                        node.osmid,
                        self.phase
                    );
                }
                if let Some(encoder) = self.nodes.as_mut() {
                    encoder.append(node, self.coordinates.as_mut())?;
                }
            }
            OsmElement::Way(way) => {
                self.advance(SinkPhase::EmittingWays);
                if let Some(encoder) = self.ways.as_mut() {
                    encoder.append(way, self.coordinates.as_ref())?;
                }
            }
            OsmElement::Relation(relation) => {
                self.advance(SinkPhase::EmittingRelations);
                if let Some(encoder) = self.relations.as_mut() {
                    encoder.append(relation)?;
                }
            }
        }
        self.progress.processed();
        Ok(())
    }

    /// moves the sink forward to `next`. transitions are monotonic and
    /// one-directional; leaving the node-collection phase flips the
    /// coordinate index into its drain phase before the triggering
    /// element is encoded.
    fn advance(&mut self, next: SinkPhase) {
        if self.phase >= next {
            return;
        }
        if self.phase == SinkPhase::CollectingNodes {
            if let Some(coordinates) = self.coordinates.as_mut() {
                coordinates.transition_to_drain();
            }
        }
        log::info!("sink phase change: {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// flushes and closes every encoder, destroys the coordinate index
    /// (whether or not the drain phase was ever reached), and returns
    /// the processed-element total.
    pub fn close(mut self) -> Result<u64, ParquetizerError> {
        if let Some(encoder) = self.nodes.take() {
            encoder.close()?;
        }
        if let Some(encoder) = self.ways.take() {
            encoder.close()?;
        }
        if let Some(encoder) = self.relations.take() {
            encoder.close()?;
        }
        if let Some(coordinates) = self.coordinates.take() {
            coordinates.destroy();
        }
        self.progress.finish();
        Ok(self.progress.total())
    }
}

#[cfg(test)]
mod tests {
    use super::{ParquetSink, SinkPhase};
    use crate::config::ConversionConfiguration;
    use crate::model::index::CoordinateIndex;
    use crate::model::osm::{
        OsmElement, OsmMemberType, OsmNodeData, OsmNodeId, OsmRelationData, OsmRelationId,
        OsmRelationMember, OsmWayData, OsmWayId,
    };
    use crate::model::parquet::{filenames, ProgressObserver};
    use arrow::array::{Array, Float64Array, Int32Array, Int64Array, ListArray, StringArray, StructArray};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::fs::File;
    use std::path::Path;
    use tempfile::TempDir;

    fn node(id: i64, lon: f64, lat: f64) -> OsmElement {
        OsmElement::Node(OsmNodeData {
            osmid: OsmNodeId(id),
            lon,
            lat,
            ..Default::default()
        })
    }

    fn way(id: i64, refs: &[i64]) -> OsmElement {
        OsmElement::Way(OsmWayData {
            osmid: OsmWayId(id),
            nodes: refs.iter().copied().map(OsmNodeId).collect(),
            ..Default::default()
        })
    }

    fn relation(id: i64, members: Vec<OsmRelationMember>) -> OsmElement {
        OsmElement::Relation(OsmRelationData {
            osmid: OsmRelationId(id),
            members,
            ..Default::default()
        })
    }

    fn sink(directory: &Path, config: &ConversionConfiguration) -> ParquetSink {
        let progress = ProgressObserver::new("test").unwrap();
        ParquetSink::new(directory, config, progress).unwrap()
    }

    fn read_single_batch(filepath: &Path) -> RecordBatch {
        let file = File::open(filepath).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let mut batches: Vec<RecordBatch> = reader.collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(batches.len(), 1);
        batches.swap_remove(0)
    }

    /// pulls the repeated node group of one way record apart into
    /// (index, nodeId, latitude, longitude) tuples
    fn way_node_entries(batch: &RecordBatch, row: usize) -> Vec<(i32, i64, Option<f64>, Option<f64>)> {
        let lists = batch
            .column_by_name("nodes")
            .unwrap()
            .as_any()
            .downcast_ref::<ListArray>()
            .unwrap();
        assert!(!lists.is_null(row));
        let entries = lists.value(row);
        let entries = entries.as_any().downcast_ref::<StructArray>().unwrap();
        let indices = entries.column(0).as_any().downcast_ref::<Int32Array>().unwrap();
        let node_ids = entries.column(1).as_any().downcast_ref::<Int64Array>().unwrap();
        let latitudes = entries.column(2).as_any().downcast_ref::<Float64Array>().unwrap();
        let longitudes = entries.column(3).as_any().downcast_ref::<Float64Array>().unwrap();
        (0..entries.len())
            .map(|i| {
                let lat = (!latitudes.is_null(i)).then(|| latitudes.value(i));
                let lon = (!longitudes.is_null(i)).then(|| longitudes.value(i));
                (indices.value(i), node_ids.value(i), lat, lon)
            })
            .collect()
    }

    #[test]
    fn test_end_to_end_resolution() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration::default();
        let mut sink = sink(dir.path(), &config);

        sink.process(&node(1, 10.0, 20.0)).unwrap();
        sink.process(&node(2, 11.0, 21.0)).unwrap();
        sink.process(&way(100, &[1, 2, 1])).unwrap();
        let total = sink.close().unwrap();
        assert_eq!(total, 3);

        let batch = read_single_batch(&dir.path().join(filenames::WAYS));
        assert_eq!(batch.num_rows(), 1);
        let ids = batch
            .column_by_name("id")
            .unwrap()
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(ids.value(0), 100);

        let entries = way_node_entries(&batch, 0);
        assert_eq!(
            entries,
            vec![
                (0, 1, Some(20.0), Some(10.0)),
                (1, 2, Some(21.0), Some(11.0)),
                (2, 1, Some(20.0), Some(10.0)),
            ]
        );
    }

    #[test]
    fn test_round_trip_is_bit_exact() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration::default();
        let mut sink = sink(dir.path(), &config);

        let lon = -105.19745339257665;
        let lat = 39.74077400000001;
        sink.process(&node(7, lon, lat)).unwrap();
        sink.process(&way(70, &[7])).unwrap();
        sink.close().unwrap();

        let batch = read_single_batch(&dir.path().join(filenames::WAYS));
        let entries = way_node_entries(&batch, 0);
        assert_eq!(entries[0].2.unwrap().to_bits(), lat.to_bits());
        assert_eq!(entries[0].3.unwrap().to_bits(), lon.to_bits());
    }

    #[test]
    fn test_miss_tolerance() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration::default();
        let mut sink = sink(dir.path(), &config);

        sink.process(&node(1, 10.0, 20.0)).unwrap();
        sink.process(&way(100, &[1, 42])).unwrap();
        sink.close().unwrap();

        let batch = read_single_batch(&dir.path().join(filenames::WAYS));
        let entries = way_node_entries(&batch, 0);
        assert_eq!(entries[0], (0, 1, Some(20.0), Some(10.0)));
        assert_eq!(entries[1], (1, 42, None, None));
    }

    #[test]
    fn test_order_preserved_with_repeats() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration::default();
        let mut sink = sink(dir.path(), &config);

        for id in [10, 20, 30] {
            sink.process(&node(id, id as f64, -(id as f64))).unwrap();
        }
        sink.process(&way(5, &[10, 20, 30, 10])).unwrap();
        sink.close().unwrap();

        let batch = read_single_batch(&dir.path().join(filenames::WAYS));
        let entries = way_node_entries(&batch, 0);
        let ids: Vec<i64> = entries.iter().map(|e| e.1).collect();
        assert_eq!(ids, vec![10, 20, 30, 10]);
        let indices: Vec<i32> = entries.iter().map(|e| e.0).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_phase_monotonicity_ignores_late_nodes() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration::default();
        let mut sink = sink(dir.path(), &config);

        sink.process(&node(1, 10.0, 20.0)).unwrap();
        sink.process(&way(100, &[1, 99])).unwrap();
        assert_eq!(sink.phase(), SinkPhase::EmittingWays);

        // node 99 arrives late: still routed to the node encoder, but its
        // coordinate can no longer enter the index
        sink.process(&node(99, 1.0, 2.0)).unwrap();
        sink.process(&way(101, &[99])).unwrap();
        sink.close().unwrap();

        let batch = read_single_batch(&dir.path().join(filenames::WAYS));
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(way_node_entries(&batch, 0)[1], (1, 99, None, None));
        assert_eq!(way_node_entries(&batch, 1)[0], (0, 99, None, None));

        // the late node still became a node record
        let nodes = read_single_batch(&dir.path().join(filenames::NODES));
        assert_eq!(nodes.num_rows(), 2);
    }

    #[test]
    fn test_empty_way_has_null_node_group() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration::default();
        let mut sink = sink(dir.path(), &config);

        sink.process(&way(100, &[])).unwrap();
        sink.close().unwrap();

        let batch = read_single_batch(&dir.path().join(filenames::WAYS));
        let lists = batch
            .column_by_name("nodes")
            .unwrap()
            .as_any()
            .downcast_ref::<ListArray>()
            .unwrap();
        assert!(lists.is_null(0));
    }

    #[test]
    fn test_relation_members_in_order_with_roles() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration::default();
        let mut sink = sink(dir.path(), &config);

        let members = vec![
            OsmRelationMember {
                member_type: OsmMemberType::Way,
                member_id: 100,
                role: Some(String::from("outer")),
            },
            OsmRelationMember {
                member_type: OsmMemberType::Node,
                member_id: 1,
                role: None,
            },
            OsmRelationMember {
                member_type: OsmMemberType::Relation,
                member_id: 900,
                role: Some(String::from("subarea")),
            },
        ];
        sink.process(&relation(500, members)).unwrap();
        sink.close().unwrap();

        let batch = read_single_batch(&dir.path().join(filenames::RELATIONS));
        let lists = batch
            .column_by_name("members")
            .unwrap()
            .as_any()
            .downcast_ref::<ListArray>()
            .unwrap();
        let entries = lists.value(0);
        let entries = entries.as_any().downcast_ref::<StructArray>().unwrap();
        assert_eq!(entries.len(), 3);

        let types = entries.column(1).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(types.value(0), "way");
        assert_eq!(types.value(1), "node");
        assert_eq!(types.value(2), "relation");

        let ids = entries.column(2).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(ids.value(0), 100);
        assert_eq!(ids.value(1), 1);
        assert_eq!(ids.value(2), 900);

        let roles = entries.column(3).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(roles.value(0), "outer");
        assert!(roles.is_null(1));
        assert_eq!(roles.value(2), "subarea");
    }

    #[test]
    fn test_disabled_ways_skip_file_and_index_queries() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration {
            no_ways: true,
            ..Default::default()
        };
        let mut sink = sink(dir.path(), &config);

        sink.process(&node(1, 10.0, 20.0)).unwrap();
        sink.process(&way(100, &[1])).unwrap();
        let total = sink.close().unwrap();

        // the way still counts, but no way output exists
        assert_eq!(total, 2);
        assert!(!dir.path().join(filenames::WAYS).exists());
        assert!(dir.path().join(filenames::NODES).exists());
    }

    #[test]
    fn test_disabled_nodes_leave_ways_unresolved() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration {
            no_nodes: true,
            ..Default::default()
        };
        let mut sink = sink(dir.path(), &config);

        sink.process(&node(1, 10.0, 20.0)).unwrap();
        sink.process(&way(100, &[1])).unwrap();
        sink.close().unwrap();

        assert!(!dir.path().join(filenames::NODES).exists());
        let batch = read_single_batch(&dir.path().join(filenames::WAYS));
        assert_eq!(way_node_entries(&batch, 0)[0], (0, 1, None, None));
    }

    #[test]
    fn test_scratch_removed_with_and_without_ways() {
        let scratch_name = CoordinateIndex::SCRATCH_DIRNAME;
        let config = ConversionConfiguration::default();

        // ways present: the index is drained, then destroyed
        let dir = TempDir::new().unwrap();
        let mut s = sink(dir.path(), &config);
        s.process(&node(1, 10.0, 20.0)).unwrap();
        s.process(&way(100, &[1])).unwrap();
        s.close().unwrap();
        assert!(!dir.path().join(scratch_name).exists());

        // no ways: the boundary is never crossed, the index is still destroyed
        let dir = TempDir::new().unwrap();
        let mut s = sink(dir.path(), &config);
        s.process(&node(1, 10.0, 20.0)).unwrap();
        s.close().unwrap();
        assert!(!dir.path().join(scratch_name).exists());
    }

    #[test]
    fn test_all_types_disabled_counts_without_output() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration {
            no_nodes: true,
            no_ways: true,
            no_relations: true,
            ..Default::default()
        };
        let mut sink = sink(dir.path(), &config);
        sink.process(&node(1, 10.0, 20.0)).unwrap();
        sink.process(&way(100, &[1])).unwrap();
        let total = sink.close().unwrap();
        assert_eq!(total, 2);
        assert!(!dir.path().join(filenames::NODES).exists());
        assert!(!dir.path().join(filenames::WAYS).exists());
        assert!(!dir.path().join(filenames::RELATIONS).exists());
        assert!(!dir.path().join(CoordinateIndex::SCRATCH_DIRNAME).exists());
    }

    #[test]
    fn test_relations_directly_after_nodes() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration::default();
        let mut sink = sink(dir.path(), &config);

        sink.process(&node(1, 10.0, 20.0)).unwrap();
        sink.process(&relation(
            500,
            vec![OsmRelationMember {
                member_type: OsmMemberType::Node,
                member_id: 1,
                role: None,
            }],
        ))
        .unwrap();
        assert_eq!(sink.phase(), SinkPhase::EmittingRelations);
        sink.close().unwrap();

        let batch = read_single_batch(&dir.path().join(filenames::RELATIONS));
        assert_eq!(batch.num_rows(), 1);
    }

    #[test]
    fn test_metadata_columns_follow_configuration() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration {
            exclude_metadata: true,
            ..Default::default()
        };
        let mut sink = sink(dir.path(), &config);
        sink.process(&node(1, 10.0, 20.0)).unwrap();
        sink.close().unwrap();

        let batch = read_single_batch(&dir.path().join(filenames::NODES));
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["id", "tags", "latitude", "longitude"]);
    }

    #[test]
    fn test_metadata_columns_present_by_default() {
        let dir = TempDir::new().unwrap();
        let config = ConversionConfiguration::default();
        let mut sink = sink(dir.path(), &config);
        sink.process(&node(1, 10.0, 20.0)).unwrap();
        sink.close().unwrap();

        let batch = read_single_batch(&dir.path().join(filenames::NODES));
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            vec![
                "id",
                "version",
                "timestamp",
                "changeset",
                "uid",
                "user",
                "tags",
                "latitude",
                "longitude"
            ]
        );
    }
}
