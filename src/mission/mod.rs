//! MissionProject interchange: export, import, and map views.

pub mod export;
/// GeoJSON and CoT renderings of a document.
pub mod geo;
/// Stable node ids derived from names.
pub mod ids;
pub mod import;
pub mod profile;
pub mod schema;

pub use export::{ExportContext, ProjectExtras, export_project};
pub use geo::{CotEvent, to_cot_events, to_geojson};
pub use ids::{IdAllocator, slugify};
pub use import::{ImportOutcome, import_project, parse_document};
pub use profile::PowerProfile;
pub use schema::{Mission, MissionProject, NodeEntry, SCHEMA_TAG, SCHEMA_VERSION, SchemaVersion};
