//! Routing table
//!
//! Maps routing keys to live client channels.

mod registry;

pub use registry::Registry;
