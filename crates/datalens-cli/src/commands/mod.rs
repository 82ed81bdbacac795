//! CLI command implementations.

pub mod ask;
pub mod baseline;
pub mod drilldown;
pub mod profile;
