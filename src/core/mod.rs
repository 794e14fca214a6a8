//! Platform-agnostic core - shared between the egui console and the CLI

pub mod chart;
pub mod config;
pub mod rate;
pub mod variant;
pub mod window;

pub use chart::{build_chart, finite_runs, ChartModel, Dataset};
pub use config::{
    ConfigDescriptor, ConfigError, ConfigRequest, ConfigSync, FieldEdit, FieldValue, SyncState,
    ENCODING_FIELD,
};
pub use rate::{pair_rate, rate_series, CounterPath, RatePoint};
pub use variant::{ModuleDescriptor, ModuleVariant, SeriesDescriptor, COLLECTOR, DISPATCHER};
pub use window::{Sample, SampleWindow, RETENTION_SLACK};
