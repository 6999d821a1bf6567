// ABOUTME: Series types for chart requests: data variants, colors, and the fill tagged union.
// ABOUTME: Accepts loosely typed caller input and serializes to the vendor's camelCase dataset schema.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Largest magnitude at which an integral f64 is emitted as a JSON integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// The data points of one series.
///
/// `Scalar` holds arrays made only of numbers. Anything else is kept verbatim
/// as `Points`: scatter pairs, `{x, y}` objects, or numbers with `null` gaps.
/// The first element decides how defaulted colors are applied, see
/// [`SeriesData::colors_per_point`].
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    Scalar(Vec<f64>),
    Points(Vec<Value>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Scalar(values) => values.len(),
            SeriesData::Points(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the first NaN or infinite scalar, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        match self {
            SeriesData::Scalar(values) => values.iter().position(|v| !v.is_finite()),
            SeriesData::Points(_) => None,
        }
    }

    /// True when the first point is composite rather than a number, so each
    /// point gets its own default color.
    pub fn colors_per_point(&self) -> bool {
        match self {
            SeriesData::Scalar(_) => false,
            SeriesData::Points(points) => points.first().is_some_and(|p| !p.is_number()),
        }
    }
}

struct Number(f64);

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

impl Serialize for SeriesData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SeriesData::Scalar(values) => {
                serializer.collect_seq(values.iter().map(|v| Number(*v)))
            }
            SeriesData::Points(points) => serializer.collect_seq(points),
        }
    }
}

impl<'de> Deserialize<'de> for SeriesData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = match Value::deserialize(deserializer)? {
            Value::Array(items) => items,
            other => {
                return Err(de::Error::custom(format!(
                    "series data must be an array, got {}",
                    json_kind(&other)
                )));
            }
        };

        let scalars: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
        Ok(match scalars {
            Some(values) => SeriesData::Scalar(values),
            None => SeriesData::Points(items),
        })
    }
}

/// A color setting: one color for the series, or one per data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Single(String),
    PerPoint(Vec<String>),
}

impl From<&str> for Color {
    fn from(color: &str) -> Self {
        Color::Single(color.to_string())
    }
}

/// The `fill` setting as it arrives from a loosely typed caller.
///
/// The vendor schema rejects booleans here, so `Flag(true)` becomes the
/// literal `"origin"` and `Flag(false)` is dropped. Any other value passes
/// through untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Fill {
    #[default]
    Absent,
    Flag(bool),
    Value(Value),
}

impl Fill {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Bool(flag) => Fill::Flag(flag),
            other => Fill::Value(other),
        }
    }

    /// Replace boolean flags with their vendor form. Idempotent.
    pub fn normalized(self) -> Self {
        match self {
            Fill::Flag(true) => Fill::Value(Value::String("origin".to_string())),
            Fill::Flag(false) => Fill::Absent,
            other => other,
        }
    }

    /// True when the field must not appear in serialized output.
    pub fn is_omitted(&self) -> bool {
        matches!(self, Fill::Absent | Fill::Flag(false))
    }
}

impl Serialize for Fill {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Fill::Flag(true) => serializer.serialize_str("origin"),
            Fill::Value(value) => value.serialize(serializer),
            Fill::Absent | Fill::Flag(false) => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for Fill {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Fill::from_value)
    }
}

/// One labeled set of data points, serialized as a vendor dataset object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: SeriesData,
    #[serde(rename = "backgroundColor", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(rename = "borderColor", skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Color>,
    #[serde(skip_serializing_if = "Fill::is_omitted")]
    pub fill: Fill,
    /// Additional vendor keys (e.g. `tension`) carried through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Series {
    fn new(data: SeriesData) -> Self {
        Self {
            label: None,
            data,
            background_color: None,
            border_color: None,
            fill: Fill::Absent,
            extra: Map::new(),
        }
    }

    /// A series of plain numbers.
    pub fn scalar(values: Vec<f64>) -> Self {
        Self::new(SeriesData::Scalar(values))
    }

    /// A series of composite points such as `{x, y}` objects.
    pub fn points(points: Vec<Value>) -> Self {
        Self::new(SeriesData::Points(points))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_border(mut self, color: Color) -> Self {
        self.border_color = Some(color);
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Decode a series from a JSON object, accepting both snake_case and the
    /// vendor's camelCase color keys.
    pub fn from_map(mut map: Map<String, Value>) -> Result<Self, String> {
        let data = take_field(&mut map, &["data"])
            .ok_or_else(|| "series is missing required 'data' field".to_string())?;
        let data: SeriesData =
            serde_json::from_value(data).map_err(|e| format!("invalid 'data': {}", e))?;

        let label = match take_field(&mut map, &["label"]) {
            None | Some(Value::Null) => None,
            Some(Value::String(label)) => Some(label),
            Some(other) => {
                return Err(format!(
                    "'label' must be a string, got {}",
                    json_kind(&other)
                ));
            }
        };

        let background_color =
            take_color(&mut map, &["backgroundColor", "background_color"])?;
        let border_color = take_color(&mut map, &["borderColor", "border_color"])?;

        let fill = take_field(&mut map, &["fill"])
            .map(Fill::from_value)
            .unwrap_or_default();

        Ok(Self {
            label,
            data,
            background_color,
            border_color,
            fill,
            extra: map,
        })
    }
}

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Series::from_map(map).map_err(de::Error::custom)
    }
}

/// Remove every spelling of a field, keeping the first one found.
fn take_field(map: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let mut found = None;
    for key in keys {
        if let Some(value) = map.remove(*key) {
            found.get_or_insert(value);
        }
    }
    found
}

fn take_color(map: &mut Map<String, Value>, keys: &[&str]) -> Result<Option<Color>, String> {
    match take_field(map, keys) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|_| format!("'{}' must be a color string or a list of color strings", keys[0])),
    }
}

/// Short name for a JSON value's type, used in error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
