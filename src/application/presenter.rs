// Presenter - Shapes fetched telemetry into cards, badges and charts
use crate::application::dashboard_surface::DashboardSurface;
use crate::domain::chart::{ChartMetric, ChartState, ChartTransition, Dataset};
use crate::domain::format::{format_metric, status_class, DisplayZone};
use crate::domain::location::{Location, LocationTable};
use crate::domain::telemetry::{LocationHistory, LocationReading};
use crate::infrastructure::config::DashboardConfig;
use chrono::{DateTime, Utc};

pub const OVERALL_STATUS_ID: &str = "overallStatus";
pub const LAST_UPDATE_ID: &str = "lastUpdate";

/// Owns the formatting rules and both chart state machines.
pub struct Presenter {
    locations: LocationTable,
    fill_alpha: String,
    zone: DisplayZone,
    ice_chart: ChartState,
    temperature_chart: ChartState,
}

impl Presenter {
    pub fn new(locations: LocationTable, fill_alpha: String, zone: DisplayZone) -> Self {
        Self {
            locations,
            fill_alpha,
            zone,
            ice_chart: ChartState::Uninitialized,
            temperature_chart: ChartState::Uninitialized,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        let locations = config
            .locations
            .iter()
            .map(|l| Location::new(l.name.clone(), l.key.clone(), l.color.clone()))
            .collect();

        Self::new(
            LocationTable::new(locations),
            config.fill_alpha.clone(),
            DisplayZone::from_offset_minutes(config.utc_offset_minutes),
        )
    }

    pub fn locations(&self) -> &LocationTable {
        &self.locations
    }

    #[cfg(test)]
    pub fn chart(&self, metric: ChartMetric) -> &ChartState {
        match metric {
            ChartMetric::IceThickness => &self.ice_chart,
            ChartMetric::SurfaceTemperature => &self.temperature_chart,
        }
    }

    pub fn update_location_cards(
        &self,
        surface: &mut dyn DashboardSurface,
        readings: &[LocationReading],
    ) {
        for reading in readings {
            let key = self.locations.key_for(&reading.location);

            surface.set_text(&format!("ice-{}", key), &format_metric(reading.avg_ice_thickness));
            surface.set_text(
                &format!("temp-{}", key),
                &format_metric(reading.avg_surface_temperature),
            );
            surface.set_text(
                &format!("snow-{}", key),
                &format_metric(reading.avg_snow_accumulation),
            );

            let badge = format!("status-{}", key);
            match reading.safety_status.as_deref() {
                Some(status) if !status.is_empty() => {
                    surface.set_text(&badge, status);
                    surface.set_class(&badge, &format!("safety-badge {}", status_class(status)));
                }
                // No status: neutral badge
                _ => {
                    surface.set_text(&badge, "");
                    surface.set_class(&badge, "safety-badge");
                }
            }
        }
    }

    /// Returns false when there was no status to show.
    pub fn update_overall_status(
        &self,
        surface: &mut dyn DashboardSurface,
        status: Option<&str>,
    ) -> bool {
        let Some(status) = status.filter(|s| !s.trim().is_empty()) else {
            tracing::warn!("Overall status missing from a successful status response");
            return false;
        };

        surface.set_class(
            OVERALL_STATUS_ID,
            &format!("status-badge {}", status.to_lowercase()),
        );
        surface.set_text(OVERALL_STATUS_ID, &format!("Canal Status: {}", status));
        true
    }

    pub fn update_last_update_time(&self, surface: &mut dyn DashboardSurface, now: DateTime<Utc>) {
        surface.set_text(LAST_UPDATE_ID, &self.zone.clock_with_seconds(now));
    }

    /// Axis labels from the first location's history; shared by both charts.
    pub fn chart_labels(&self, history: &[LocationHistory]) -> Vec<String> {
        history
            .first()
            .map(|first| {
                first
                    .points
                    .iter()
                    .map(|p| self.zone.axis_label(&p.window_end_time))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn datasets(&self, metric: ChartMetric, history: &[LocationHistory]) -> Vec<Dataset> {
        history
            .iter()
            .map(|h| {
                Dataset::new(
                    h.location.clone(),
                    h.points.iter().map(|p| metric.value_of(p)).collect(),
                    self.locations.color_for(&h.location).map(str::to_string),
                    &self.fill_alpha,
                )
            })
            .collect()
    }

    /// Create or update both charts from one joined history batch.
    pub fn update_charts(
        &mut self,
        surface: &mut dyn DashboardSurface,
        history: &[LocationHistory],
    ) -> [ChartTransition; 2] {
        let labels = self.chart_labels(history);
        let ice = self.datasets(ChartMetric::IceThickness, history);
        let temperature = self.datasets(ChartMetric::SurfaceTemperature, history);

        let ice_transition = self
            .ice_chart
            .apply(ChartMetric::IceThickness, labels.clone(), ice);
        let temperature_transition =
            self.temperature_chart
                .apply(ChartMetric::SurfaceTemperature, labels, temperature);

        for state in [&self.ice_chart, &self.temperature_chart] {
            if let Some(chart) = state.chart() {
                surface.render_chart(chart);
            }
        }

        tracing::debug!(
            "Charts refreshed for {} locations: ice={:?}, temperature={:?}",
            history.len(),
            ice_transition,
            temperature_transition
        );

        [ice_transition, temperature_transition]
    }
}
