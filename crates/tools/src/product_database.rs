//! Product database tool: a stub over a tiny in-memory catalogue.

use async_trait::async_trait;
use rednote_core::error::ToolError;
use rednote_core::tool::{Tool, ToolResult};

use crate::mentions_any;

pub struct ProductDatabaseTool;

struct ProductSheet {
    keywords: &'static [&'static str],
    name: &'static str,
    sheet: &'static str,
}

const CATALOGUE: &[ProductSheet] = &[
    ProductSheet {
        keywords: &["blue algae", "blue-algae", "深海蓝藻"],
        name: "Deep-Sea Blue Algae Moisturizing Mask",
        sheet: "Key ingredient: deep-sea blue algae extract, rich in polysaccharides and amino acids. Deeply hydrates, repairs the skin barrier, calms sensitive redness. Light, non-sticky texture suited to all skin types, especially dry and sensitive skin. Pack: 25ml x 5 sheets.",
    },
    ProductSheet {
        keywords: &["brightening serum", "whitening serum", "美白精华"],
        name: "Brightening Serum",
        sheet: "Key ingredients: niacinamide and a vitamin C derivative. Evens skin tone, fades post-acne marks, lifts dullness. Thin, fast-absorbing texture for anyone chasing an even complexion.",
    },
];

#[async_trait]
impl Tool for ProductDatabaseTool {
    fn name(&self) -> &str {
        "query_product_database"
    }

    fn description(&self) -> &str {
        "Query the internal product database for a product's selling points, ingredients, target users and usage."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "product_name": {
                    "type": "string",
                    "description": "Product to look up, e.g. 'blue algae moisturizing mask'"
                }
            },
            "required": ["product_name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let product_name = arguments["product_name"].as_str().ok_or_else(|| {
            ToolError::InvalidArguments("Missing 'product_name' argument".into())
        })?;

        let found = CATALOGUE
            .iter()
            .find(|p| mentions_any(product_name, p.keywords));

        Ok(match found {
            Some(p) => ToolResult::success(format!("{}: {}", p.name, p.sheet)).with_data(
                serde_json::json!({ "found": true, "product": p.name }),
            ),
            // A miss is still a successful lookup
            None => ToolResult::success(format!(
                "No detailed record for '{product_name}' in the product database."
            ))
            .with_data(serde_json::json!({ "found": false })),
        })
    }
}
