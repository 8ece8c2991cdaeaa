// In-memory dashboard surface published as immutable snapshots
use crate::application::dashboard_surface::DashboardSurface;
use crate::domain::chart::Chart;
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementState {
    pub text: String,
    pub class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Last completed refresh cycle
    pub cycle: u64,
    pub elements: BTreeMap<String, ElementState>,
    pub charts: BTreeMap<String, Chart>,
    pub last_error: Option<String>,
    /// Total element and chart writes since startup
    pub writes: u64,
}

impl DashboardSnapshot {
    #[cfg(test)]
    pub fn text(&self, element_id: &str) -> Option<&str> {
        self.elements.get(element_id).map(|e| e.text.as_str())
    }

    #[cfg(test)]
    pub fn class(&self, element_id: &str) -> Option<&str> {
        self.elements.get(element_id).map(|e| e.class.as_str())
    }

    #[cfg(test)]
    pub fn chart(&self, canvas_id: &str) -> Option<&Chart> {
        self.charts.get(canvas_id)
    }
}

/// Surface owned by the polling task; readers only see committed snapshots.
pub struct SnapshotSurface {
    current: DashboardSnapshot,
    publisher: watch::Sender<DashboardSnapshot>,
}

impl SnapshotSurface {
    pub fn new() -> Self {
        let (publisher, _) = watch::channel(DashboardSnapshot::default());
        Self {
            current: DashboardSnapshot::default(),
            publisher,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.publisher.subscribe()
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.current
    }

    fn element(&mut self, element_id: &str) -> &mut ElementState {
        self.current.writes += 1;
        self.current
            .elements
            .entry(element_id.to_string())
            .or_default()
    }
}

impl Default for SnapshotSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardSurface for SnapshotSurface {
    fn set_text(&mut self, element_id: &str, text: &str) {
        self.element(element_id).text = text.to_string();
    }

    fn set_class(&mut self, element_id: &str, class: &str) {
        self.element(element_id).class = class.to_string();
    }

    fn render_chart(&mut self, chart: &Chart) {
        self.current.writes += 1;
        self.current
            .charts
            .insert(chart.canvas_id.clone(), chart.clone());
    }

    fn report_error(&mut self, message: &str) {
        tracing::error!("{}", message);
        self.current.last_error = Some(message.to_string());
    }

    fn commit(&mut self, cycle: u64) {
        self.current.cycle = cycle;
        self.publisher.send_replace(self.current.clone());
    }
}
