// Surface trait - where the presenter writes rendered state
use crate::domain::chart::Chart;

/// Element-addressed render target.
///
/// Element ids follow the dashboard contract: `ice-{key}`, `temp-{key}`,
/// `snow-{key}`, `status-{key}`, `overallStatus`, `lastUpdate`, and one canvas
/// id per chart.
pub trait DashboardSurface {
    fn set_text(&mut self, element_id: &str, text: &str);

    fn set_class(&mut self, element_id: &str, class: &str);

    fn render_chart(&mut self, chart: &Chart);

    /// User-visible error hook
    fn report_error(&mut self, message: &str) {
        tracing::error!("{}", message);
    }

    /// Called once at the end of every refresh cycle.
    fn commit(&mut self, _cycle: u64) {}
}
