// Series listing for a time series group

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_result, json_schema_object, json_schema_string, Tool};
use anyhow::Result;
use bcrp_core::{BcrpClient, BcrpResult, SeriesSummary};
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

/// Outcome of a series-by-group search.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesListReply {
    Series(Vec<SeriesSummary>),
    /// Serialized as `[{"error": message}]`.
    Failed(String),
}

impl SeriesListReply {
    pub fn invalid_arguments(err: &serde_json::Error) -> Self {
        Self::Failed(format!("invalid arguments: {}", err))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<BcrpResult<Vec<SeriesSummary>>> for SeriesListReply {
    fn from(result: BcrpResult<Vec<SeriesSummary>>) -> Self {
        match result {
            Ok(series) => Self::Series(series),
            Err(e) => {
                tracing::warn!(error = %e, upstream = e.is_upstream(), "Series listing failed");
                Self::Failed(e.to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorEntry<'a> {
    error: &'a str,
}

impl Serialize for SeriesListReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Series(series) => series.serialize(serializer),
            Self::Failed(message) => [ErrorEntry { error: message }].serialize(serializer),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchSeriesArgs {
    #[serde(alias = "group")]
    time_series_group: String,
}

/// Tool to list the series of a group
pub struct SearchSeriesByGroupTool {
    client: Arc<BcrpClient>,
}

impl SearchSeriesByGroupTool {
    pub fn new(client: Arc<BcrpClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for SearchSeriesByGroupTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_time_series_by_group".to_string(),
            description: format!(
                "List the time series of a BCRP group. Matches every catalog row whose \
                 group contains the given text and returns up to {} entries of \
                 {{\"code\", \"name\"}}. On failure returns [{{\"error\": message}}].",
                self.client.config().series_limit()
            ),
            input_schema: json_schema_object(
                serde_json::json!({
                    "time_series_group": json_schema_string(
                        "Group name, or part of it, as returned by search_time_series_groups"
                    )
                }),
                vec!["time_series_group"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: SearchSeriesArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid arguments for search_time_series_by_group");
                return json_result(&SeriesListReply::invalid_arguments(&e), true);
            }
        };

        tracing::info!(group = %args.time_series_group, "Listing series by group");
        let reply = SeriesListReply::from(
            self.client
                .series_by_group(&args.time_series_group)
                .await,
        );
        json_result(&reply, reply.is_failure())
    }
}
