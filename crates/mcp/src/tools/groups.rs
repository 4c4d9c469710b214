// Group search over the metadata catalog

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    json_result, json_schema_array, json_schema_object, json_schema_string, Tool,
};
use anyhow::Result;
use bcrp_core::{BcrpClient, BcrpResult};
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

/// Outcome of a group search.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupSearchReply {
    Groups(Vec<String>),
    /// Serialized as a one-element list holding the message.
    Failed(String),
}

impl GroupSearchReply {
    pub fn invalid_arguments(err: &serde_json::Error) -> Self {
        Self::Failed(format!(
            "Error searching time series groups: invalid arguments: {}",
            err
        ))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<BcrpResult<Vec<String>>> for GroupSearchReply {
    fn from(result: BcrpResult<Vec<String>>) -> Self {
        match result {
            Ok(groups) => Self::Groups(groups),
            Err(e) => {
                tracing::warn!(error = %e, upstream = e.is_upstream(), "Group search failed");
                Self::Failed(format!("Error searching time series groups: {}", e))
            }
        }
    }
}

impl Serialize for GroupSearchReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Groups(groups) => groups.serialize(serializer),
            Self::Failed(message) => [message].serialize(serializer),
        }
    }
}

/// Keywords may arrive as a list or, from looser clients, a single string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Keywords {
    Many(Vec<String>),
    One(String),
}

impl Keywords {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::Many(keywords) => keywords,
            Self::One(keyword) => keyword.split_whitespace().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchGroupsArgs {
    keywords: Keywords,
}

/// Tool to find time series groups by keyword
pub struct SearchGroupsTool {
    client: Arc<BcrpClient>,
}

impl SearchGroupsTool {
    pub fn new(client: Arc<BcrpClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for SearchGroupsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_time_series_groups".to_string(),
            description: "Search the BCRP (Banco Central de Reserva del Perú) catalog for time \
                          series groups matching one or more keywords. Each keyword should be a \
                          single word; matching tolerates case, accents and small typos. Returns \
                          the unique group names found, or an empty list."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "keywords": json_schema_array(
                        json_schema_string("A single search word, e.g. 'inflacion'"),
                        "One or more keywords to search for"
                    )
                }),
                vec!["keywords"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: SearchGroupsArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid arguments for search_time_series_groups");
                return json_result(&GroupSearchReply::invalid_arguments(&e), true);
            }
        };
        let keywords = args.keywords.into_vec();

        tracing::info!(?keywords, "Searching time series groups");
        let reply = GroupSearchReply::from(self.client.search_groups(&keywords).await);
        json_result(&reply, reply.is_failure())
    }
}
