// Poller - Periodic refresh cycles with per-section failure containment
use crate::application::clock::Clock;
use crate::application::dashboard_surface::DashboardSurface;
use crate::application::presenter::Presenter;
use crate::application::telemetry_backend::{FetchError, TelemetryBackend};
use crate::domain::telemetry::LocationHistory;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

const CARDS_ERROR_MESSAGE: &str = "Failed to fetch latest data. Retrying...";

/// What happened to one section of the dashboard during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    Updated,
    /// Backend answered without usable data; nothing was written.
    Skipped,
    /// Not attempted because an earlier step of the same section failed.
    Abandoned,
    Failed(FetchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub cards: SectionOutcome,
    pub status: SectionOutcome,
    pub charts: SectionOutcome,
}

pub struct DashboardPoller<S> {
    backend: Arc<dyn TelemetryBackend>,
    presenter: Presenter,
    surface: S,
    clock: Arc<dyn Clock>,
    interval: Duration,
    history_limit: usize,
    cycles: u64,
}

impl<S: DashboardSurface> DashboardPoller<S> {
    pub fn new(
        backend: Arc<dyn TelemetryBackend>,
        presenter: Presenter,
        surface: S,
        clock: Arc<dyn Clock>,
        interval: Duration,
        history_limit: usize,
    ) -> Self {
        Self {
            backend,
            presenter,
            surface,
            clock,
            interval,
            history_limit,
            cycles: 0,
        }
    }

    #[cfg(test)]
    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Immediate first refresh.
    pub async fn initialize(&mut self) -> CycleReport {
        tracing::info!(
            "Initializing dashboard for {} locations",
            self.presenter.locations().len()
        );
        let report = self.refresh_cycle().await;
        tracing::info!("Dashboard initialized");
        report
    }

    /// Refresh every interval for the lifetime of the process.
    ///
    /// Cycles never overlap: a tick that fires while a cycle is still running
    /// is skipped.
    pub async fn run(mut self) {
        let start = tokio::time::Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.refresh_cycle().await;
        }
    }

    /// One full fetch-and-render pass.
    pub async fn refresh_cycle(&mut self) -> CycleReport {
        self.cycles += 1;
        let started = Instant::now();

        let (cards, status) = self.refresh_cards().await;
        let charts = self.refresh_charts().await;

        self.surface.commit(self.cycles);

        let report = CycleReport {
            cycle: self.cycles,
            cards,
            status,
            charts,
        };
        tracing::debug!(
            "Cycle {} finished in {}ms: {:?}",
            report.cycle,
            started.elapsed().as_millis(),
            report
        );
        report
    }

    async fn refresh_cards(&mut self) -> (SectionOutcome, SectionOutcome) {
        let cards = match self.backend.fetch_latest().await {
            Ok(latest) if latest.success => {
                self.presenter
                    .update_location_cards(&mut self.surface, &latest.data);
                self.presenter
                    .update_last_update_time(&mut self.surface, self.clock.now());
                SectionOutcome::Updated
            }
            Ok(_) => {
                tracing::debug!("Latest readings not successful; cards left unchanged");
                SectionOutcome::Skipped
            }
            Err(e) => {
                self.contain_card_failure(&e);
                return (SectionOutcome::Failed(e), SectionOutcome::Abandoned);
            }
        };

        let status = match self.backend.fetch_status().await {
            Ok(status) if status.success => {
                if self
                    .presenter
                    .update_overall_status(&mut self.surface, status.overall_status.as_deref())
                {
                    SectionOutcome::Updated
                } else {
                    SectionOutcome::Skipped
                }
            }
            Ok(_) => {
                tracing::debug!("Status not successful; badge left unchanged");
                SectionOutcome::Skipped
            }
            Err(e) => {
                self.contain_card_failure(&e);
                SectionOutcome::Failed(e)
            }
        };

        (cards, status)
    }

    fn contain_card_failure(&mut self, error: &FetchError) {
        tracing::error!("Error updating dashboard: {}", error);
        self.surface.report_error(CARDS_ERROR_MESSAGE);
    }

    /// All-or-nothing: one failed history request leaves both charts untouched.
    async fn refresh_charts(&mut self) -> SectionOutcome {
        let limit = self.history_limit;
        let backend = &self.backend;
        let names: Vec<String> = self
            .presenter
            .locations()
            .iter()
            .map(|l| l.name.clone())
            .collect();

        let fetches = names.into_iter().map(|name| async move {
            let response = backend.fetch_history(&name, limit).await?;
            Ok::<_, FetchError>(LocationHistory::new(name, response.data))
        });
        let batch = try_join_all(fetches).await;

        match batch {
            Ok(history) => {
                self.presenter.update_charts(&mut self.surface, &history);
                SectionOutcome::Updated
            }
            Err(e) => {
                tracing::error!("Error updating charts: {}", e);
                SectionOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::ChartMetric;
    use crate::domain::telemetry::{HistoryResponse, LatestResponse, StatusResponse};
    use crate::infrastructure::config::DashboardConfig;
    use crate::presentation::snapshot::SnapshotSurface;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    /// Serves canned JSON; a missing entry is a transport failure.
    #[derive(Default)]
    struct FakeBackend {
        responses: Mutex<HashMap<String, Value>>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn with(self, endpoint: &str, body: Value) -> Self {
            self.set(endpoint, body);
            self
        }

        fn set(&self, endpoint: &str, body: Value) {
            self.responses.lock().unwrap().insert(endpoint.to_string(), body);
        }

        fn remove(&self, endpoint: &str) {
            self.responses.lock().unwrap().remove(endpoint);
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn respond<T: serde::de::DeserializeOwned>(&self, endpoint: String) -> Result<T, FetchError> {
            self.requests.lock().unwrap().push(endpoint.clone());
            let body = self.responses.lock().unwrap().get(&endpoint).cloned();
            match body {
                Some(body) => serde_json::from_value(body).map_err(|e| FetchError::Decode {
                    endpoint,
                    message: e.to_string(),
                }),
                None => Err(FetchError::Transport {
                    endpoint,
                    message: "connection refused".to_string(),
                }),
            }
        }
    }

    #[async_trait]
    impl TelemetryBackend for FakeBackend {
        async fn fetch_latest(&self) -> Result<LatestResponse, FetchError> {
            self.respond("/api/latest".to_string())
        }

        async fn fetch_status(&self) -> Result<StatusResponse, FetchError> {
            self.respond("/api/status".to_string())
        }

        async fn fetch_history(
            &self,
            location: &str,
            limit: usize,
        ) -> Result<HistoryResponse, FetchError> {
            self.respond(format!("/api/history/{}?limit={}", location, limit))
        }
    }

    /// Answers every request successfully after `delay`, tracking overlap.
    #[derive(Default)]
    struct SlowBackend {
        delay: Duration,
        cycles: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl TelemetryBackend for SlowBackend {
        async fn fetch_latest(&self) -> Result<LatestResponse, FetchError> {
            self.cycles.fetch_add(1, Ordering::SeqCst);
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(LatestResponse {
                success: true,
                data: Vec::new(),
            })
        }

        async fn fetch_status(&self) -> Result<StatusResponse, FetchError> {
            Ok(StatusResponse {
                success: true,
                overall_status: Some("Safe".to_string()),
            })
        }

        async fn fetch_history(
            &self,
            _location: &str,
            _limit: usize,
        ) -> Result<HistoryResponse, FetchError> {
            Ok(HistoryResponse::default())
        }
    }

    fn history_fixture(base_ice: f64) -> Value {
        let points: Vec<Value> = (0..12)
            .map(|i| {
                json!({
                    "windowEndTime": format!("2026-01-15T{:02}:{:02}:00Z", 14 + i / 12, (i % 12) * 5),
                    "avgIceThickness": base_ice + i as f64 * 0.1,
                    "avgSurfaceTemperature": -4.0 - i as f64 * 0.25
                })
            })
            .collect();
        json!({ "data": points })
    }

    fn full_backend() -> FakeBackend {
        FakeBackend::default()
            .with(
                "/api/latest",
                json!({
                    "success": true,
                    "data": [
                        { "location": "Dow's Lake", "avgIceThickness": 32.456, "avgSurfaceTemperature": -5.25,
                          "avgSnowAccumulation": 2.0, "safetyStatus": "Safe" },
                        { "location": "Fifth Avenue", "avgIceThickness": 27.35, "avgSurfaceTemperature": null,
                          "avgSnowAccumulation": 4.75, "safetyStatus": "Caution" },
                        { "location": "NAC", "avgIceThickness": 24.0, "avgSurfaceTemperature": -1.04,
                          "avgSnowAccumulation": "3.1" }
                    ]
                }),
            )
            .with("/api/status", json!({ "success": true, "overallStatus": "Caution" }))
            .with("/api/history/Dow's Lake?limit=12", history_fixture(30.0))
            .with("/api/history/Fifth Avenue?limit=12", history_fixture(26.0))
            .with("/api/history/NAC?limit=12", history_fixture(23.0))
    }

    fn poller(backend: Arc<dyn TelemetryBackend>) -> DashboardPoller<SnapshotSurface> {
        let config = DashboardConfig {
            utc_offset_minutes: Some(-300),
            ..DashboardConfig::default()
        };
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 15, 0, 30).unwrap();
        DashboardPoller::new(
            backend,
            Presenter::from_config(&config),
            SnapshotSurface::new(),
            Arc::new(FixedClock(now)),
            config.refresh_interval(),
            config.history_limit,
        )
    }

    #[tokio::test]
    async fn test_full_cycle_renders_fixtures() {
        let mut poller = poller(Arc::new(full_backend()));
        let report = poller.initialize().await;

        assert_eq!(report.cards, SectionOutcome::Updated);
        assert_eq!(report.status, SectionOutcome::Updated);
        assert_eq!(report.charts, SectionOutcome::Updated);

        let snapshot = poller.surface().snapshot();
        let expected = [
            ("ice-dows", "32.5"),
            ("temp-dows", "-5.3"),
            ("snow-dows", "2.0"),
            ("status-dows", "Safe"),
            ("ice-fifth", "27.4"),
            ("temp-fifth", "--"),
            ("snow-fifth", "4.8"),
            ("status-fifth", "Caution"),
            ("ice-nac", "24.0"),
            ("temp-nac", "-1.0"),
            ("snow-nac", "3.1"),
            ("status-nac", ""),
            ("overallStatus", "Canal Status: Caution"),
            ("lastUpdate", "10:00:30 a.m."),
        ];
        for (id, text) in expected {
            assert_eq!(snapshot.text(id), Some(text), "element {}", id);
        }
        assert_eq!(snapshot.class("status-fifth"), Some("safety-badge caution"));
        assert_eq!(snapshot.class("status-nac"), Some("safety-badge"));
        assert_eq!(snapshot.class("overallStatus"), Some("status-badge caution"));
        assert_eq!(snapshot.cycle, 1);
        assert_eq!(snapshot.last_error, None);

        let ice = snapshot.chart("iceThicknessChart").unwrap();
        assert_eq!(ice.labels.len(), 12);
        assert_eq!(ice.labels[0], "09:00 a.m.");
        assert_eq!(ice.datasets.len(), 3);
        assert_eq!(ice.datasets[0].data[1], Some(30.1));

        let temperature = snapshot.chart("temperatureChart").unwrap();
        assert_eq!(temperature.datasets[2].label, "NAC");
        assert_eq!(temperature.datasets[2].data[2], Some(-4.5));
    }

    #[tokio::test]
    async fn test_cycles_are_deterministic() {
        let mut first = poller(Arc::new(full_backend()));
        let mut second = poller(Arc::new(full_backend()));
        first.refresh_cycle().await;
        second.refresh_cycle().await;

        let a = serde_json::to_string(first.surface().snapshot()).unwrap();
        let b = serde_json::to_string(second.surface().snapshot()).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_unsuccessful_latest_writes_nothing() {
        let backend = Arc::new(
            full_backend()
                .with("/api/latest", json!({ "success": false, "data": [] }))
                .with("/api/status", json!({ "success": false })),
        );
        backend.remove("/api/history/NAC?limit=12");
        let mut poller = poller(backend);

        let report = poller.refresh_cycle().await;

        assert_eq!(report.cards, SectionOutcome::Skipped);
        assert_eq!(report.status, SectionOutcome::Skipped);
        assert!(matches!(report.charts, SectionOutcome::Failed(_)));
        assert_eq!(poller.surface().snapshot().writes, 0);
        assert!(poller.surface().snapshot().elements.is_empty());
    }

    #[tokio::test]
    async fn test_unsuccessful_latest_keeps_previous_values() {
        let backend = Arc::new(full_backend());
        let mut poller = poller(backend.clone());
        poller.refresh_cycle().await;

        backend.set("/api/latest", json!({ "success": false }));
        poller.refresh_cycle().await;

        assert_eq!(poller.surface().snapshot().text("ice-dows"), Some("32.5"));
        assert_eq!(poller.surface().snapshot().cycle, 2);
    }

    #[tokio::test]
    async fn test_one_failed_history_leaves_both_charts() {
        let backend = Arc::new(full_backend());
        let mut poller = poller(backend.clone());
        poller.refresh_cycle().await;

        backend.set("/api/history/NAC?limit=12", json!({ "data": [] }));
        backend.remove("/api/history/Fifth Avenue?limit=12");
        let report = poller.refresh_cycle().await;

        assert!(matches!(report.charts, SectionOutcome::Failed(FetchError::Transport { .. })));
        for metric in [ChartMetric::IceThickness, ChartMetric::SurfaceTemperature] {
            let chart = poller.presenter().chart(metric).chart().unwrap();
            assert_eq!(chart.revision, 0);
            assert!(chart.datasets.iter().all(|d| d.data.len() == 12));
        }
    }

    #[tokio::test]
    async fn test_charts_stay_uninitialized_until_first_batch() {
        let backend = Arc::new(full_backend());
        backend.remove("/api/history/Dow's Lake?limit=12");
        let mut poller = poller(backend.clone());

        poller.refresh_cycle().await;
        assert!(poller.presenter().chart(ChartMetric::IceThickness).chart().is_none());
        assert!(poller.surface().snapshot().charts.is_empty());

        backend.set("/api/history/Dow's Lake?limit=12", history_fixture(30.0));
        poller.refresh_cycle().await;
        assert!(poller.presenter().chart(ChartMetric::IceThickness).chart().is_some());
    }

    #[tokio::test]
    async fn test_latest_failure_is_contained() {
        let backend = Arc::new(full_backend());
        backend.remove("/api/latest");
        let mut poller = poller(backend.clone());

        let report = poller.refresh_cycle().await;

        assert!(matches!(report.cards, SectionOutcome::Failed(_)));
        assert_eq!(report.status, SectionOutcome::Abandoned);
        assert_eq!(report.charts, SectionOutcome::Updated);
        assert!(!backend.requests().contains(&"/api/status".to_string()));
        assert_eq!(
            poller.surface().snapshot().last_error.as_deref(),
            Some("Failed to fetch latest data. Retrying...")
        );

        // next cycle proceeds normally
        backend.set("/api/latest", json!({ "success": true, "data": [] }));
        let report = poller.refresh_cycle().await;
        assert_eq!(report.cards, SectionOutcome::Updated);
        assert_eq!(report.status, SectionOutcome::Updated);
    }

    #[tokio::test]
    async fn test_status_failure_is_contained() {
        let backend = Arc::new(full_backend());
        backend.remove("/api/status");
        let mut poller = poller(backend.clone());

        let report = poller.refresh_cycle().await;

        assert_eq!(report.cards, SectionOutcome::Updated);
        assert!(matches!(report.status, SectionOutcome::Failed(FetchError::Transport { .. })));
        assert_eq!(report.charts, SectionOutcome::Updated);

        let snapshot = poller.surface().snapshot();
        assert_eq!(
            snapshot.last_error.as_deref(),
            Some("Failed to fetch latest data. Retrying...")
        );
        assert_eq!(snapshot.text("ice-dows"), Some("32.5"));
        assert_eq!(snapshot.text("lastUpdate"), Some("10:00:30 a.m."));
        assert_eq!(snapshot.text("overallStatus"), None);
        assert!(snapshot.chart("iceThicknessChart").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_every_interval() {
        let backend = Arc::new(SlowBackend::default());
        let handle = tokio::spawn(poller(backend.clone()).run());

        tokio::time::sleep(Duration::from_secs(95)).await;
        handle.abort();

        // ticks at 30s, 60s and 90s; no immediate tick at startup
        assert_eq!(backend.cycles.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_cycles_never_overlap() {
        let backend = Arc::new(SlowBackend {
            delay: Duration::from_secs(70),
            ..SlowBackend::default()
        });
        let handle = tokio::spawn(poller(backend.clone()).run());

        tokio::time::sleep(Duration::from_secs(400)).await;
        handle.abort();

        // cycles start at 30s, 100s, 170s, 240s, 310s and 380s
        assert_eq!(backend.cycles.load(Ordering::SeqCst), 6);
        assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_latest_is_a_decode_failure() {
        let backend = Arc::new(full_backend().with("/api/latest", json!({ "success": true, "data": [{}] })));
        let mut poller = poller(backend);

        let report = poller.refresh_cycle().await;
        assert!(matches!(report.cards, SectionOutcome::Failed(FetchError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_status_without_value_is_skipped() {
        let backend = Arc::new(full_backend().with("/api/status", json!({ "success": true })));
        let mut poller = poller(backend);

        let report = poller.refresh_cycle().await;
        assert_eq!(report.status, SectionOutcome::Skipped);
        assert_eq!(poller.surface().snapshot().text("overallStatus"), None);
    }

    #[tokio::test]
    async fn test_history_requests_use_configured_limit() {
        let backend = Arc::new(full_backend());
        let mut poller = poller(backend.clone());
        poller.refresh_cycle().await;

        let history: Vec<String> = backend
            .requests()
            .into_iter()
            .filter(|r| r.starts_with("/api/history/"))
            .collect();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|r| r.ends_with("?limit=12")));
    }
}
