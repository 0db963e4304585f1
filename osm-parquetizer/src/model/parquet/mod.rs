pub mod encoder;
mod parquet_sink;
mod progress_observer;
mod sink_phase;

pub use parquet_sink::ParquetSink;
pub use progress_observer::ProgressObserver;
pub use sink_phase::SinkPhase;

pub mod filenames {
    pub const NODES: &str = "nodes.parquet";
    pub const WAYS: &str = "ways.parquet";
    pub const RELATIONS: &str = "relations.parquet";
}
