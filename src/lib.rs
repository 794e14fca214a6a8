//! modscope - live operational console for dispatcher and collector modules
//!
//! Polls a module's stats endpoint and shows:
//! - Rate charts: bytes/s derived from the module's cumulative counters
//! - Configuration: a live form for reading, editing and applying config
//!
//! The core is platform-agnostic; the egui console (`gui` feature) and the
//! headless CLI (`cli` feature) both drive [`console::Console`].

pub mod console;
pub mod core;
pub mod poller;
pub mod settings;
pub mod time;
pub mod transport;

#[cfg(feature = "gui")]
pub mod app;
#[cfg(feature = "gui")]
mod theme;

pub use console::{Console, ConsoleEvent};
pub use settings::ConsoleSettings;
pub use transport::{ModuleApi, ModuleClient, TransportError};
