// Observation fetch for a single series

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_result, json_schema_object, json_schema_string, Tool};
use anyhow::Result;
use bcrp_core::{BcrpClient, BcrpResult, SeriesObservation};
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

/// Outcome of a series data fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesDataReply {
    /// Serialized as `[[date, value], ...]`.
    Observations(Vec<SeriesObservation>),
    /// Serialized as an empty list; the reason is only logged.
    Unavailable(String),
}

impl SeriesDataReply {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<BcrpResult<Vec<SeriesObservation>>> for SeriesDataReply {
    fn from(result: BcrpResult<Vec<SeriesObservation>>) -> Self {
        match result {
            Ok(observations) => Self::Observations(observations),
            Err(e) => {
                tracing::warn!(error = %e, upstream = e.is_upstream(), "Series fetch failed");
                Self::Unavailable(e.to_string())
            }
        }
    }
}

impl Serialize for SeriesDataReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Observations(observations) => observations.serialize(serializer),
            Self::Unavailable(_) => serializer.collect_seq(std::iter::empty::<SeriesObservation>()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GetSeriesDataArgs {
    #[serde(alias = "code")]
    time_series_code: String,
    start: String,
    end: String,
}

/// Tool to fetch the observations of a series over a period range
pub struct GetSeriesDataTool {
    client: Arc<BcrpClient>,
}

impl GetSeriesDataTool {
    pub fn new(client: Arc<BcrpClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetSeriesDataTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_time_series_data".to_string(),
            description: "Get the observations of a BCRP time series within a period range. \
                          Returns a list of [date, value] pairs with dates as YYYY-MM-DD; \
                          missing values are \"n.d.\". Returns an empty list when the data \
                          cannot be retrieved."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "time_series_code": json_schema_string("Series code, e.g. 'PN01270PM'"),
                    "start": json_schema_string(
                        "Start period: '2020-1' for monthly data or '2020-1-1' for daily data"
                    ),
                    "end": json_schema_string(
                        "End period: '2020-12' for monthly data or '2020-12-31' for daily data"
                    )
                }),
                vec!["time_series_code", "start", "end"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: GetSeriesDataArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid arguments for get_time_series_data");
                return json_result(&SeriesDataReply::Unavailable(e.to_string()), true);
            }
        };

        tracing::info!(
            code = %args.time_series_code,
            start = %args.start,
            end = %args.end,
            "Fetching series data"
        );
        let reply = SeriesDataReply::from(
            self.client
                .fetch_series(&args.time_series_code, &args.start, &args.end)
                .await,
        );
        json_result(&reply, reply.is_failure())
    }
}
