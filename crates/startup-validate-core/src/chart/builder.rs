// ABOUTME: ChartRequestBuilder turns a ChartSpec into a transport-ready QuickChart request.
// ABOUTME: Validates dimensions and series, defaults colors from the theme palette, and encodes the query.

use serde::Serialize;
use serde_json::Value;

use super::error::{ChartBuildError, MAX_DIMENSION, MIN_DIMENSION};
use super::palette::{Palette, color_at, palette_for};
use super::series::{Color, Series};
use super::spec::ChartSpec;

/// Rendering endpoint used unless overridden.
pub const DEFAULT_BASE_URL: &str = "https://quickchart.io/chart";

/// Prefix of the text returned to agents when a chart cannot be built.
pub const ERROR_PREFIX: &str = "Error generating chart URL";

const TITLE_FONT_SIZE: u32 = 16;

#[derive(Serialize)]
struct ChartConfig<'a> {
    #[serde(rename = "type")]
    chart_type: &'a str,
    data: ChartData<'a>,
    options: ChartOptions<'a>,
}

#[derive(Serialize)]
struct ChartData<'a> {
    datasets: Vec<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<&'a [String]>,
    #[serde(rename = "backgroundColor", skip_serializing_if = "Option::is_none")]
    background_color: Option<&'a str>,
}

#[derive(Serialize)]
struct ChartOptions<'a> {
    responsive: bool,
    plugins: Plugins<'a>,
}

#[derive(Serialize)]
struct Plugins<'a> {
    legend: Legend,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<TitleBlock<'a>>,
}

#[derive(Serialize)]
struct Legend {
    display: bool,
    position: &'static str,
}

#[derive(Serialize)]
struct TitleBlock<'a> {
    display: bool,
    text: &'a str,
    font: Font,
}

#[derive(Serialize)]
struct Font {
    size: u32,
    weight: &'static str,
}

/// A fully assembled chart request, ready to be dispatched by a caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: &'static str,
    pub endpoint: String,
    /// Query parameters in wire order: `c`, `width`, `height`, `format`.
    pub params: Vec<(String, String)>,
    /// The chart configuration carried in the `c` parameter.
    pub config: Value,
}

impl RequestDescriptor {
    /// Percent-encoded query string (form encoding, spaces as `+`).
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }

    /// The complete request URL.
    pub fn url(&self) -> String {
        format!("{}?{}", self.endpoint, self.query_string())
    }

    /// Look up a query parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Builds QuickChart requests. Stateless apart from the target endpoint.
#[derive(Debug, Clone)]
pub struct ChartRequestBuilder {
    base_url: String,
}

impl Default for ChartRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRequestBuilder {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validate `spec` and assemble the request for it.
    pub fn build(&self, spec: &ChartSpec) -> Result<RequestDescriptor, ChartBuildError> {
        validate_dimensions(spec.width, spec.height)?;

        if spec.series.is_empty() {
            return Err(ChartBuildError::InvalidSeries(
                "Datasets must be a non-empty list".to_string(),
            ));
        }

        if !spec.is_known_chart_type() {
            tracing::warn!(chart_type = %spec.chart_type, "unrecognized chart type, passing through");
        }
        if !spec.is_known_output_format() {
            tracing::warn!(format = %spec.output_format, "unrecognized output format, passing through");
        }

        let datasets = normalize_series(&spec.series)?;
        let datasets = apply_theme_colors(datasets, palette_for(&spec.theme));

        let config = ChartConfig {
            chart_type: &spec.chart_type,
            data: ChartData {
                datasets,
                labels: spec
                    .labels
                    .as_deref()
                    .filter(|labels| !labels.is_empty()),
                background_color: spec
                    .background_color
                    .as_deref()
                    .filter(|color| !color.is_empty()),
            },
            options: ChartOptions {
                responsive: true,
                plugins: Plugins {
                    legend: Legend {
                        display: true,
                        position: "top",
                    },
                    title: spec
                        .title
                        .as_deref()
                        .filter(|title| !title.is_empty())
                        .map(|text| TitleBlock {
                            display: true,
                            text,
                            font: Font {
                                size: TITLE_FONT_SIZE,
                                weight: "bold",
                            },
                        }),
                },
            },
        };

        let encoded = serde_json::to_string(&config)?;
        let config = serde_json::to_value(&config)?;

        let params = vec![
            ("c".to_string(), encoded),
            ("width".to_string(), spec.width.to_string()),
            ("height".to_string(), spec.height.to_string()),
            ("format".to_string(), spec.output_format.clone()),
        ];

        tracing::debug!(
            chart_type = %spec.chart_type,
            series = spec.series.len(),
            width = spec.width,
            height = spec.height,
            "built chart request"
        );

        Ok(RequestDescriptor {
            method: "GET",
            endpoint: self.base_url.clone(),
            params,
            config,
        })
    }

    /// Build the request and return its URL, or a descriptive error string.
    ///
    /// This is the form handed back to LLM-driven callers, which can only
    /// reason about text.
    pub fn render_url(&self, spec: &ChartSpec) -> String {
        match self.build(spec) {
            Ok(request) => request.url(),
            Err(err) => {
                tracing::warn!(error = %err, "chart request rejected");
                format!("{}: {}", ERROR_PREFIX, err)
            }
        }
    }
}

/// Build with the default endpoint and flatten failures to text.
pub fn render_chart_url(spec: &ChartSpec) -> String {
    ChartRequestBuilder::new().render_url(spec)
}

fn validate_dimensions(width: i64, height: i64) -> Result<(), ChartBuildError> {
    let range = MIN_DIMENSION..=MAX_DIMENSION;
    if range.contains(&width) && range.contains(&height) {
        Ok(())
    } else {
        Err(ChartBuildError::InvalidDimensions { width, height })
    }
}

/// Copy the series with `fill` normalized and data checked for non-finite values.
fn normalize_series(series: &[Series]) -> Result<Vec<Series>, ChartBuildError> {
    series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if let Some(j) = s.data.first_non_finite() {
                return Err(ChartBuildError::Serialization(format!(
                    "dataset {} contains a non-finite value at index {}",
                    i, j
                )));
            }
            let mut s = s.clone();
            s.fill = std::mem::take(&mut s.fill).normalized();
            Ok(s)
        })
        .collect()
}

/// Fill in missing background and border colors from `palette`.
///
/// A series whose first point is a number gets `palette[i mod 6]`. One whose
/// first point is composite gets one color per point, `palette[j mod 6]`. A
/// missing border copies the background.
pub fn apply_theme_colors(mut series: Vec<Series>, palette: &Palette) -> Vec<Series> {
    for (i, s) in series.iter_mut().enumerate() {
        if s.background_color.is_none() {
            s.background_color = Some(if s.data.colors_per_point() {
                Color::PerPoint(
                    (0..s.data.len())
                        .map(|j| color_at(palette, j).to_string())
                        .collect(),
                )
            } else {
                Color::Single(color_at(palette, i).to_string())
            });
        }

        if s.border_color.is_none() {
            s.border_color = Some(
                s.background_color
                    .clone()
                    .unwrap_or_else(|| Color::Single(color_at(palette, i).to_string())),
            );
        }
    }
    series
}
