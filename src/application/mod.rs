// Application layer - Polling loop, presenter and the ports they drive
pub mod clock;
pub mod dashboard_surface;
pub mod poller;
pub mod presenter;
pub mod telemetry_backend;
