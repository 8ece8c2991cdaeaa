// Application state for HTTP handlers
use crate::presentation::snapshot::DashboardSnapshot;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub snapshots: watch::Receiver<DashboardSnapshot>,
}
