use crate::model::osm::ParquetizerError;
use kdam::{Bar, BarExt};

/// counts routed elements and reports progress. owned by the sink and
/// injected at construction rather than living in process-global state.
pub struct ProgressObserver {
    bar: Bar,
    count: u64,
}

/// a log line is emitted for every this-many elements processed
pub const REPORT_INTERVAL: u64 = 1_000_000;

impl ProgressObserver {
    pub fn new(desc: &str) -> Result<ProgressObserver, ParquetizerError> {
        let bar = Bar::builder()
            .desc(desc)
            .unit(" elements")
            .unit_scale(true)
            .build()
            .map_err(ParquetizerError::InternalError)?;
        Ok(ProgressObserver { bar, count: 0 })
    }

    pub fn processed(&mut self) {
        self.count += 1;
        let _ = self.bar.update(1);
        if self.count % REPORT_INTERVAL == 0 {
            log::info!("{} elements processed", self.count);
        }
    }

    pub fn total(&self) -> u64 {
        self.count
    }

    pub fn finish(&mut self) {
        eprintln!();
        log::info!("total elements processed: {}", self.count);
    }
}
