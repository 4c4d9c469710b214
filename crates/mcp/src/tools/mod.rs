pub mod data;
pub mod groups;
pub mod series;
mod registry;

pub use data::{GetSeriesDataTool, SeriesDataReply};
pub use groups::{GroupSearchReply, SearchGroupsTool};
pub use series::{SearchSeriesByGroupTool, SeriesListReply};
pub use registry::{
    json_result, json_schema_array, json_schema_object, json_schema_string, Tool, ToolRegistry,
};

use bcrp_core::BcrpClient;
use std::sync::Arc;

/// Registry holding the three BCRP tools, sharing one client.
pub fn bcrp_tools(client: Arc<BcrpClient>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SearchGroupsTool::new(client.clone())));
    registry.register(Arc::new(SearchSeriesByGroupTool::new(client.clone())));
    registry.register(Arc::new(GetSeriesDataTool::new(client)));
    registry
}
