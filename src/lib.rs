//! Node architect: power, runtime, range and role estimation for field
//! sensor/relay nodes, with MissionProject import and export.

#[cfg(feature = "api")]
pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
/// Saved node designs and their reconstruction.
pub mod design;
pub mod error;
pub mod estimate;
pub mod io;
pub mod logging;
/// MissionProject documents: schema, export, import and map rendering.
pub mod mission;
pub mod store;
pub mod workspace;
