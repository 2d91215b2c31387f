//! Download TemplateFlow template archives, verify their SHA-256 digests and
//! unpack them into a shared data directory in a single streaming pass.

pub mod config;
pub mod digest;
pub mod fetch;
pub mod logging;
pub mod orchestrator;
pub mod templates;
