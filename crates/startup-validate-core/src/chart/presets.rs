// ABOUTME: Named chart presets: fixed chart types and sizes wrapped around ChartSpec.
// ABOUTME: Pure argument shaping; chain with_title/with_theme/with_size to customize.

use serde_json::json;

use super::series::Series;
use super::spec::ChartSpec;

/// Theme forced on financial charts.
pub const FINANCIAL_THEME: &str = "financial";

fn labeled(labels: &[&str], series: Series, chart_type: &str) -> ChartSpec {
    ChartSpec::new(chart_type, vec![series]).with_labels(labels.iter().copied())
}

/// Bar chart, 800x400, one series labeled "Data".
pub fn bar_chart(labels: &[&str], data: &[f64]) -> ChartSpec {
    labeled(labels, Series::scalar(data.to_vec()).with_label("Data"), "bar")
}

/// Line chart, 800x400, one smoothed series labeled "Data".
pub fn line_chart(labels: &[&str], data: &[f64]) -> ChartSpec {
    let series = Series::scalar(data.to_vec())
        .with_label("Data")
        .with_extra("tension", json!(0.4));
    labeled(labels, series, "line")
}

/// Pie chart, 400x400.
pub fn pie_chart(labels: &[&str], data: &[f64]) -> ChartSpec {
    labeled(labels, Series::scalar(data.to_vec()), "pie").with_size(400, 400)
}

/// Doughnut chart, 400x400.
pub fn doughnut_chart(labels: &[&str], data: &[f64]) -> ChartSpec {
    labeled(labels, Series::scalar(data.to_vec()), "doughnut").with_size(400, 400)
}

/// Sparkline, 200x50, no labels.
pub fn sparkline(data: &[f64]) -> ChartSpec {
    ChartSpec::new("sparkline", vec![Series::scalar(data.to_vec())]).with_size(200, 50)
}

/// Single-value progress bar, 300x30.
pub fn progress_bar(value: f64) -> ChartSpec {
    ChartSpec::new("progressBar", vec![Series::scalar(vec![value])]).with_size(300, 30)
}

/// Single-value radial gauge, 300x300, titled with the value itself.
pub fn radial_gauge(value: f64) -> ChartSpec {
    ChartSpec::new("radialGauge", vec![Series::scalar(vec![value])])
        .with_title(value.to_string())
        .with_size(300, 300)
}

/// Financial chart, 1000x500, always using the financial theme.
pub fn financial_chart(labels: &[&str], data: &[f64], chart_type: Option<&str>) -> ChartSpec {
    let series = Series::scalar(data.to_vec()).with_label("Financial Data");
    labeled(labels, series, chart_type.unwrap_or("line"))
        .with_theme(FINANCIAL_THEME)
        .with_size(1000, 500)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::builder::ChartRequestBuilder;
    use crate::chart::series::SeriesData;

    #[test]
    fn bar_and_line_defaults() {
        let bar = bar_chart(&["a", "b"], &[1.0, 2.0]);
        assert_eq!(bar.chart_type, "bar");
        assert_eq!((bar.width, bar.height), (800, 400));
        assert_eq!(bar.series[0].label.as_deref(), Some("Data"));

        let line = line_chart(&["a", "b"], &[1.0, 2.0]).with_title("Trend");
        assert_eq!(line.chart_type, "line");
        assert_eq!(line.series[0].extra.get("tension"), Some(&json!(0.4)));
        assert_eq!(line.title.as_deref(), Some("Trend"));
    }

    #[test]
    fn round_charts_are_square_and_unlabeled() {
        for spec in [pie_chart(&["x"], &[1.0]), doughnut_chart(&["x"], &[1.0])] {
            assert_eq!((spec.width, spec.height), (400, 400));
            assert!(spec.series[0].label.is_none());
            assert_eq!(spec.labels, Some(vec!["x".to_string()]));
        }
    }

    #[test]
    fn compact_presets_have_fixed_sizes() {
        let spark = sparkline(&[1.0, 3.0, 2.0]);
        assert_eq!(spark.chart_type, "sparkline");
        assert_eq!((spark.width, spark.height), (200, 50));
        assert!(spark.labels.is_none());

        let progress = progress_bar(0.65);
        assert_eq!(progress.chart_type, "progressBar");
        assert_eq!((progress.width, progress.height), (300, 30));
        assert_eq!(progress.series[0].data, SeriesData::Scalar(vec![0.65]));
    }

    #[test]
    fn radial_gauge_titles_with_value() {
        let gauge = radial_gauge(72.5);
        assert_eq!(gauge.chart_type, "radialGauge");
        assert_eq!(gauge.title.as_deref(), Some("72.5"));
        assert_eq!((gauge.width, gauge.height), (300, 300));
    }

    #[test]
    fn financial_chart_forces_theme() {
        let spec = financial_chart(&["2023", "2024"], &[1.5, 2.5], None);
        assert_eq!(spec.chart_type, "line");
        assert_eq!(spec.theme, FINANCIAL_THEME);
        assert_eq!((spec.width, spec.height), (1000, 500));

        let bars = financial_chart(&["2023"], &[1.0], Some("bar"));
        assert_eq!(bars.chart_type, "bar");
    }

    #[test]
    fn every_preset_builds() {
        let builder = ChartRequestBuilder::new();
        let specs = vec![
            bar_chart(&["a"], &[1.0]),
            line_chart(&["a"], &[1.0]),
            pie_chart(&["a"], &[1.0]),
            doughnut_chart(&["a"], &[1.0]),
            sparkline(&[1.0, 2.0]),
            progress_bar(0.5),
            radial_gauge(80.0),
            financial_chart(&["a"], &[1.0], None),
        ];
        for spec in &specs {
            assert!(builder.build(spec).is_ok(), "{} preset should build", spec.chart_type);
        }
    }
}
