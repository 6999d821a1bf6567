// ABOUTME: Chart request construction for the QuickChart rendering service.
// ABOUTME: Re-exports the spec, series, palette, builder and preset APIs.

pub mod builder;
pub mod error;
pub mod palette;
pub mod presets;
pub mod series;
pub mod spec;

pub use builder::{ChartRequestBuilder, RequestDescriptor, render_chart_url};
pub use error::ChartBuildError;
pub use series::{Color, Fill, Series, SeriesData};
pub use spec::ChartSpec;
