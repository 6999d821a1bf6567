// ABOUTME: ChartSpec, the per-call description of a chart to render.
// ABOUTME: Built directly by Rust callers or decoded from the named arguments an agent supplies.

use serde_json::{Map, Value};

use super::error::ChartBuildError;
use super::palette::DEFAULT_THEME;
use super::series::{Series, json_kind};

pub const DEFAULT_WIDTH: i64 = 800;
pub const DEFAULT_HEIGHT: i64 = 400;
pub const DEFAULT_FORMAT: &str = "png";

/// Chart types the rendering service documents. Others are passed through.
pub const KNOWN_CHART_TYPES: [&str; 8] = [
    "bar",
    "line",
    "pie",
    "doughnut",
    "scatter",
    "sparkline",
    "progressBar",
    "radialGauge",
];

/// Output formats the rendering service documents. Others are passed through.
pub const KNOWN_OUTPUT_FORMATS: [&str; 4] = ["png", "jpeg", "svg", "webp"];

/// Everything needed to build one chart request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub chart_type: String,
    pub labels: Option<Vec<String>>,
    pub series: Vec<Series>,
    pub title: Option<String>,
    pub width: i64,
    pub height: i64,
    pub theme: String,
    pub output_format: String,
    pub background_color: Option<String>,
}

impl ChartSpec {
    /// Create a spec with default size (800x400), theme and format.
    pub fn new(chart_type: impl Into<String>, series: Vec<Series>) -> Self {
        Self {
            chart_type: chart_type.into(),
            labels: None,
            series,
            title: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            theme: DEFAULT_THEME.to_string(),
            output_format: DEFAULT_FORMAT.to_string(),
            background_color: None,
        }
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_size(mut self, width: i64, height: i64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    pub fn is_known_chart_type(&self) -> bool {
        KNOWN_CHART_TYPES.contains(&self.chart_type.as_str())
    }

    pub fn is_known_output_format(&self) -> bool {
        KNOWN_OUTPUT_FORMATS.contains(&self.output_format.as_str())
    }

    /// Decode a spec from the JSON arguments of a tool call.
    ///
    /// Accepted keys: `chart_type` (or `type`), `datasets` (or `series`),
    /// `labels`, `title`, `width`, `height`, `theme`, `format` (or
    /// `output_format`), `background_color` (or `backgroundColor`). Missing
    /// optional keys take their defaults; `null` counts as missing.
    pub fn from_args(args: &Value) -> Result<Self, ChartBuildError> {
        let args = args.as_object().ok_or_else(|| {
            ChartBuildError::InvalidArguments(format!(
                "expected an object of named arguments, got {}",
                json_kind(args)
            ))
        })?;

        let chart_type = optional_string(args, &["chart_type", "type"])?.ok_or_else(|| {
            ChartBuildError::InvalidArguments("missing required 'chart_type'".to_string())
        })?;

        let series = decode_series(args)?;

        let mut spec = ChartSpec::new(chart_type, series);
        spec.labels = decode_labels(args)?;
        spec.title = optional_string(args, &["title"])?;
        spec.width = optional_integer(args, "width")?.unwrap_or(DEFAULT_WIDTH);
        spec.height = optional_integer(args, "height")?.unwrap_or(DEFAULT_HEIGHT);
        if let Some(theme) = optional_string(args, &["theme"])? {
            spec.theme = theme;
        }
        if let Some(format) = optional_string(args, &["format", "output_format"])? {
            spec.output_format = format;
        }
        spec.background_color =
            optional_string(args, &["background_color", "backgroundColor"])?;

        Ok(spec)
    }
}

fn lookup<'a>(args: &'a Map<String, Value>, keys: &[&str]) -> Option<(&'a Value, String)> {
    keys.iter().find_map(|key| match args.get(*key) {
        None | Some(Value::Null) => None,
        Some(value) => Some((value, key.to_string())),
    })
}

fn optional_string(
    args: &Map<String, Value>,
    keys: &[&str],
) -> Result<Option<String>, ChartBuildError> {
    match lookup(args, keys) {
        None => Ok(None),
        Some((Value::String(s), _)) => Ok(Some(s.clone())),
        Some((other, key)) => Err(ChartBuildError::InvalidArguments(format!(
            "'{}' must be a string, got {}",
            key,
            json_kind(other)
        ))),
    }
}

fn optional_integer(args: &Map<String, Value>, key: &str) -> Result<Option<i64>, ChartBuildError> {
    let Some((value, _)) = lookup(args, &[key]) else {
        return Ok(None);
    };

    if let Some(n) = value.as_i64() {
        return Ok(Some(n));
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => Ok(Some(f as i64)),
        _ => Err(ChartBuildError::InvalidArguments(format!(
            "'{}' must be an integer, got {}",
            key, value
        ))),
    }
}

fn decode_labels(args: &Map<String, Value>) -> Result<Option<Vec<String>>, ChartBuildError> {
    let Some((value, _)) = lookup(args, &["labels"]) else {
        return Ok(None);
    };

    let items = value.as_array().ok_or_else(|| {
        ChartBuildError::InvalidArguments(format!(
            "'labels' must be a list, got {}",
            json_kind(value)
        ))
    })?;

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(ChartBuildError::InvalidArguments(format!(
                "labels must be strings, got {}",
                json_kind(other)
            ))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn decode_series(args: &Map<String, Value>) -> Result<Vec<Series>, ChartBuildError> {
    let value = lookup(args, &["datasets", "series"])
        .map(|(value, _)| value)
        .ok_or_else(|| ChartBuildError::InvalidSeries("Datasets must be a non-empty list".to_string()))?;

    let items = value.as_array().ok_or_else(|| {
        ChartBuildError::InvalidSeries(format!(
            "Datasets must be a list, got {}",
            json_kind(value)
        ))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Series::from_map(map.clone())
                .map_err(|e| ChartBuildError::InvalidSeries(format!("dataset {}: {}", i, e))),
            other => Err(ChartBuildError::InvalidSeries(format!(
                "Each dataset must be an object (dataset {} is {})",
                i,
                json_kind(other)
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::series::{Color, Fill, SeriesData};
    use serde_json::json;

    #[test]
    fn new_uses_defaults() {
        let spec = ChartSpec::new("bar", vec![Series::scalar(vec![1.0])]);
        assert_eq!(spec.width, 800);
        assert_eq!(spec.height, 400);
        assert_eq!(spec.theme, "default");
        assert_eq!(spec.output_format, "png");
        assert!(spec.labels.is_none());
        assert!(spec.is_known_chart_type());
        assert!(spec.is_known_output_format());
    }

    #[test]
    fn unknown_type_and_format_are_kept() {
        let spec = ChartSpec::new("boxplot", vec![]).with_format("gif");
        assert_eq!(spec.chart_type, "boxplot");
        assert!(!spec.is_known_chart_type());
        assert!(!spec.is_known_output_format());
    }

    #[test]
    fn from_args_decodes_full_argument_set() {
        let spec = ChartSpec::from_args(&json!({
            "chart_type": "line",
            "labels": ["Q1", "Q2", 2025],
            "datasets": [
                {"label": "Revenue", "data": [1, 2, 3], "fill": true},
                {"data": [{"x": 1, "y": 2}], "backgroundColor": "#fff"}
            ],
            "title": "Growth",
            "width": 1000,
            "height": 500.0,
            "theme": "dark",
            "format": "svg",
            "background_color": "rgba(0,0,0,0)"
        }))
        .unwrap();

        assert_eq!(spec.chart_type, "line");
        assert_eq!(
            spec.labels,
            Some(vec!["Q1".to_string(), "Q2".to_string(), "2025".to_string()])
        );
        assert_eq!(spec.series.len(), 2);
        assert_eq!(spec.series[0].fill, Fill::Flag(true));
        assert!(matches!(spec.series[1].data, SeriesData::Points(_)));
        assert_eq!(
            spec.series[1].background_color,
            Some(Color::Single("#fff".to_string()))
        );
        assert_eq!(spec.title.as_deref(), Some("Growth"));
        assert_eq!((spec.width, spec.height), (1000, 500));
        assert_eq!(spec.theme, "dark");
        assert_eq!(spec.output_format, "svg");
        assert_eq!(spec.background_color.as_deref(), Some("rgba(0,0,0,0)"));
    }

    #[test]
    fn from_args_applies_defaults_for_nulls() {
        let spec = ChartSpec::from_args(&json!({
            "chart_type": "bar",
            "series": [{"data": [1]}],
            "theme": null,
            "width": null,
            "labels": null
        }))
        .unwrap();

        assert_eq!(spec.theme, "default");
        assert_eq!(spec.width, DEFAULT_WIDTH);
        assert!(spec.labels.is_none());
    }

    #[test]
    fn from_args_requires_chart_type() {
        let err = ChartSpec::from_args(&json!({"datasets": [{"data": [1]}]})).unwrap_err();
        assert!(matches!(err, ChartBuildError::InvalidArguments(_)));
    }

    #[test]
    fn from_args_rejects_non_list_datasets() {
        let err = ChartSpec::from_args(&json!({"chart_type": "bar", "datasets": {"data": [1]}}))
            .unwrap_err();
        assert!(matches!(err, ChartBuildError::InvalidSeries(_)), "got {:?}", err);

        let err = ChartSpec::from_args(&json!({"chart_type": "bar"})).unwrap_err();
        assert!(matches!(err, ChartBuildError::InvalidSeries(_)), "got {:?}", err);
    }

    #[test]
    fn from_args_rejects_non_object_dataset() {
        let err = ChartSpec::from_args(&json!({"chart_type": "bar", "datasets": [[1, 2]]}))
            .unwrap_err();
        match err {
            ChartBuildError::InvalidSeries(msg) => assert!(msg.contains("dataset 0")),
            other => panic!("expected InvalidSeries, got {:?}", other),
        }
    }

    #[test]
    fn from_args_rejects_fractional_width() {
        let err = ChartSpec::from_args(&json!({
            "chart_type": "bar",
            "datasets": [{"data": [1]}],
            "width": 800.5
        }))
        .unwrap_err();
        assert!(matches!(err, ChartBuildError::InvalidArguments(_)));
    }

    #[test]
    fn from_args_rejects_non_object() {
        let err = ChartSpec::from_args(&json!(["bar"])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }
}
