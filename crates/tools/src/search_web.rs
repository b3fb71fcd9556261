//! Web search tool. A stub that returns canned trend snippets.
//!
//! In production this would call a real search API. The stub returns
//! plausible market chatter so the loop can be exercised without network
//! access.

use async_trait::async_trait;
use rednote_core::error::ToolError;
use rednote_core::tool::{Tool, ToolResult};

use crate::mentions_any;

pub struct SearchWebTool;

#[async_trait]
impl Tool for SearchWebTool {
    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Search the web for real-time information: trending topics, user reviews, industry reports. Use precise keywords rather than broad queries."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Keywords or question, e.g. 'latest beauty trends' or 'blue algae moisturizing mask reviews'"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let snippet = canned_snippet(query);
        tracing::debug!(query, "search_web served canned snippet");

        Ok(ToolResult::success(snippet.clone()).with_data(serde_json::json!({
            "query": query,
            "snippet": snippet,
        })))
    }
}

fn canned_snippet(query: &str) -> String {
    if mentions_any(query, &["beauty trend", "skincare trend", "美妆趋势"]) {
        return "Trending on the platform lately: dopamine styling, the 'vitamin C by day, retinol by night' routine and the no-makeup makeup look. Hot keywords: #glowvibes #antiaging #barrierrepair.".into();
    }
    if mentions_any(query, &["blue algae", "blue-algae", "深海蓝藻"]) {
        return "User reviews of the deep-sea blue algae moisturizing mask: strong hydration, absorbs fast, gentle on sensitive skin. Some mention the price is a bit high but say the results are worth it.".into();
    }
    if mentions_any(query, &["moisturizing mask", "hydrating mask", "保湿面膜"]) {
        return "Popular moisturizing-mask topics: rescue for desert-dry skin, emergency mask after a late night, glass-skin routines. User pain points: makeup pilling, redness, tight-feeling skin.".into();
    }
    format!(
        "No specific results for '{query}'. Market feedback in this category usually focuses on ingredients, visible results and how the product feels in use."
    )
}
