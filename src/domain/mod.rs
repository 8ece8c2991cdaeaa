// Domain layer - Readings, formatting rules and chart state
pub mod chart;
pub mod format;
pub mod location;
pub mod telemetry;
