// Chart domain models - line charts of recent history
use serde::Serialize;

use super::telemetry::HistoryPoint;

const LINE_TENSION: f64 = 0.4;

/// Metric plotted by one of the two history charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMetric {
    IceThickness,
    SurfaceTemperature,
}

impl ChartMetric {
    pub fn canvas_id(&self) -> &'static str {
        match self {
            ChartMetric::IceThickness => "iceThicknessChart",
            ChartMetric::SurfaceTemperature => "temperatureChart",
        }
    }

    pub fn value_of(&self, point: &HistoryPoint) -> Option<f64> {
        match self {
            ChartMetric::IceThickness => point.avg_ice_thickness,
            ChartMetric::SurfaceTemperature => point.avg_surface_temperature,
        }
    }

    pub fn options(&self) -> ChartOptions {
        match self {
            ChartMetric::IceThickness => ChartOptions::line("Ice Thickness (cm)", Some(false)),
            ChartMetric::SurfaceTemperature => {
                ChartOptions::line("Surface Temperature (°C)", None)
            }
        }
    }
}

/// Display configuration attached once when a chart is created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub legend_position: String,
    pub show_title: bool,
    pub y_axis_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,
}

impl ChartOptions {
    fn line(y_axis_title: &str, begin_at_zero: Option<bool>) -> Self {
        Self {
            responsive: true,
            maintain_aspect_ratio: true,
            legend_position: "top".to_string(),
            show_title: false,
            y_axis_title: y_axis_title.to_string(),
            begin_at_zero,
        }
    }
}

/// One location's series on a chart. Missing values stay `None` (gaps).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub border_color: Option<String>,
    pub background_color: Option<String>,
    pub tension: f64,
    pub fill: bool,
}

impl Dataset {
    pub fn new(label: String, data: Vec<Option<f64>>, border_color: Option<String>, fill_alpha: &str) -> Self {
        let background_color = border_color.as_ref().map(|c| format!("{}{}", c, fill_alpha));
        Self {
            label,
            data,
            border_color,
            background_color,
            tension: LINE_TENSION,
            fill: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub canvas_id: String,
    pub kind: String,
    pub options: ChartOptions,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    /// Number of in-place updates since creation.
    pub revision: u64,
}

impl Chart {
    fn create(metric: ChartMetric, labels: Vec<String>, datasets: Vec<Dataset>) -> Self {
        Self {
            canvas_id: metric.canvas_id().to_string(),
            kind: "line".to_string(),
            options: metric.options(),
            labels,
            datasets,
            revision: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartTransition {
    Created,
    Updated,
}

/// Lifecycle of a chart: created on first data, then updated in place forever.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ChartState {
    #[default]
    Uninitialized,
    Active(Chart),
}

impl ChartState {
    pub fn apply(
        &mut self,
        metric: ChartMetric,
        labels: Vec<String>,
        datasets: Vec<Dataset>,
    ) -> ChartTransition {
        if let ChartState::Active(chart) = self {
            chart.labels = labels;
            chart.datasets = datasets;
            chart.revision += 1;
            return ChartTransition::Updated;
        }

        *self = ChartState::Active(Chart::create(metric, labels, datasets));
        ChartTransition::Created
    }

    pub fn chart(&self) -> Option<&Chart> {
        match self {
            ChartState::Active(chart) => Some(chart),
            ChartState::Uninitialized => None,
        }
    }
}
