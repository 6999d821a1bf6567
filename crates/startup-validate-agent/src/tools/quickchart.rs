// ABOUTME: Implements the quickchart_generator tool, exposing the chart builder to agents.
// ABOUTME: Chart failures come back as descriptive text so the model can correct its arguments.

use async_trait::async_trait;
use serde_json::{Value, json};

use startup_validate_core::chart::ChartRequestBuilder;
use startup_validate_core::chart::ChartSpec;
use startup_validate_core::chart::builder::ERROR_PREFIX;
use startup_validate_core::crew::QUICKCHART_TOOL;

use super::{Tool, ToolResult};

/// Tool that turns chart arguments into a QuickChart image URL.
#[derive(Debug, Clone, Default)]
pub struct QuickChartTool {
    builder: ChartRequestBuilder,
}

impl QuickChartTool {
    pub fn new(builder: ChartRequestBuilder) -> Self {
        Self { builder }
    }

    /// Decode, build and flatten any failure into the agent-facing error text.
    fn render(&self, params: &Value) -> ToolResult {
        let result = ChartSpec::from_args(params).and_then(|spec| self.builder.build(&spec));
        match result {
            Ok(request) => {
                tracing::info!(endpoint = %request.endpoint, "chart URL generated");
                ToolResult::text(request.url())
            }
            Err(err) => {
                tracing::warn!(error = %err, "chart tool call rejected");
                ToolResult::error(format!("{}: {}", ERROR_PREFIX, err))
            }
        }
    }
}

#[async_trait]
impl Tool for QuickChartTool {
    fn name(&self) -> &str {
        QUICKCHART_TOOL
    }

    fn description(&self) -> &str {
        "Generates QuickChart.io URLs for rendering professional charts. \
         Supports common chart types with themes and basic customization. \
         Perfect for financial reports and dashboards."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "chart_type": {
                    "type": "string",
                    "description": "Type of chart: bar, line, pie, doughnut, scatter, sparkline, progressBar, radialGauge"
                },
                "labels": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Labels for the X-axis or categories"
                },
                "datasets": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "label": { "type": "string" },
                            "data": { "type": "array", "items": { "type": "number" } },
                            "backgroundColor": { "type": "string" },
                            "borderColor": { "type": "string" },
                            "fill": { "type": "boolean" }
                        },
                        "required": ["data"]
                    },
                    "description": "List of datasets with 'label', 'data', optional 'backgroundColor', 'borderColor', 'fill'"
                },
                "title": {
                    "type": "string",
                    "description": "Optional title for the chart"
                },
                "width": {
                    "type": "integer",
                    "description": "Width of the chart in pixels (100-2000). Defaults to 800."
                },
                "height": {
                    "type": "integer",
                    "description": "Height of the chart in pixels (100-2000). Defaults to 400."
                },
                "theme": {
                    "type": "string",
                    "description": "Chart theme: default, dark, corporate, financial, modern, colorful"
                },
                "format": {
                    "type": "string",
                    "description": "Output format: png, jpeg, svg, webp"
                },
                "background_color": {
                    "type": "string",
                    "description": "Chart background color (hex, rgb, rgba)"
                }
            },
            "required": ["chart_type", "datasets"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolResult, anyhow::Error> {
        Ok(self.render(&params))
    }
}
