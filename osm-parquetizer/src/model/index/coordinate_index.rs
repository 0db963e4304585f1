use super::IndexPhase;
use crate::model::osm::{OsmNodeId, ParquetizerError};
use rocksdb::{Options, DB};
use std::path::{Path, PathBuf};

/// disk-backed node-id -> coordinate store, scratch space for a single
/// conversion run. populated while nodes stream through, consulted while
/// ways are encoded, destroyed at end of stream. the full node set of a
/// large extract does not fit in memory, hence the embedded store.
///
/// the sink owns the only handle and lends it to encoders per phase, so
/// no second open of the same storage can race the first.
pub struct CoordinateIndex {
    db: Option<DB>,
    path: PathBuf,
    phase: IndexPhase,
}

impl CoordinateIndex {
    /// scratch directory under the output directory. never a durable
    /// artifact of the run; a leftover from an interrupted run is
    /// reused via create-if-missing and removed at the next stream end.
    pub const SCRATCH_DIRNAME: &'static str = ".coordinate-index";

    pub fn open(output_directory: &Path) -> Result<CoordinateIndex, ParquetizerError> {
        let path = output_directory.join(Self::SCRATCH_DIRNAME);
        let mut options = Options::default();
        options.create_if_missing(true);
        let db = DB::open(&options, &path).map_err(|e| ParquetizerError::IndexOpenError {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(CoordinateIndex {
            db: Some(db),
            path,
            phase: IndexPhase::Write,
        })
    }

    pub fn phase(&self) -> IndexPhase {
        self.phase
    }

    /// inserts a coordinate pair during the write phase. inserts arriving
    /// after the drain began are ignored so that late nodes can never
    /// alter what already-encoded ways observed. storage errors are
    /// absorbed; the corresponding lookups will miss, which way encoding
    /// tolerates.
    pub fn put(&mut self, id: &OsmNodeId, lon: f64, lat: f64) {
        match (self.phase, self.db.as_ref()) {
            (IndexPhase::Write, Some(db)) => {
                let value = format!("{},{}", lon, lat);
                if let Err(e) = db.put(id.to_string(), value) {
                    log::warn!("failure caching coordinate for node {}: {}", id, e);
                }
            }
            _ => {
                log::debug!("coordinate write for node {} ignored after drain began", id);
            }
        }
    }

    /// looks up a node coordinate during the drain phase. `None` is an
    /// expected outcome for ids never seen in the write phase, e.g. a
    /// way reaching outside a clipped extract or a run with node
    /// processing disabled.
    pub fn get(&self, id: &OsmNodeId) -> Option<(f64, f64)> {
        match (self.phase, self.db.as_ref()) {
            (IndexPhase::Drain, Some(db)) => match db.get(id.to_string()) {
                Ok(Some(bytes)) => decode_coordinate(id, &bytes),
                Ok(None) => None,
                Err(e) => {
                    log::warn!("failure reading coordinate for node {}: {}", id, e);
                    None
                }
            },
            _ => {
                log::debug!("coordinate lookup for node {} before drain began", id);
                None
            }
        }
    }

    /// flips the index into its read-only drain phase. idempotent; the
    /// sink calls this once, at the first non-node element.
    pub fn transition_to_drain(&mut self) {
        if self.phase == IndexPhase::Drain {
            return;
        }
        if let Some(db) = self.db.as_ref() {
            if let Err(e) = db.flush() {
                log::warn!("failure flushing coordinate index: {}", e);
            }
        }
        log::debug!("coordinate index transitioned to drain phase");
        self.phase = IndexPhase::Drain;
    }

    /// releases the handle and removes the backing storage. cleanup
    /// failures are logged and non-fatal: the Parquet outputs are
    /// already complete when this runs.
    pub fn destroy(mut self) {
        // the live handle must drop before the storage files can go
        self.db = None;
        if let Err(e) = DB::destroy(&Options::default(), &self.path) {
            log::warn!(
                "failure destroying coordinate index at {}: {}",
                self.path.display(),
                e
            );
        }
        if self.path.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                log::warn!(
                    "failure removing coordinate index directory {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// decodes a stored `"{lon},{lat}"` pair. both halves round-trip f64
/// values bit-for-bit through their shortest decimal form.
fn decode_coordinate(id: &OsmNodeId, bytes: &[u8]) -> Option<(f64, f64)> {
    let decoded = std::str::from_utf8(bytes).ok().and_then(|s| {
        let (lon, lat) = s.split_once(',')?;
        Some((lon.parse::<f64>().ok()?, lat.parse::<f64>().ok()?))
    });
    if decoded.is_none() {
        log::warn!("undecodable coordinate entry for node {}", id);
    }
    decoded
}
