//! Built-in tool implementations for Rednote.
//!
//! The three tools the copywriting agent can call while researching a note:
//! trend search, product lookup, and emoji suggestions. All three are
//! deterministic stubs over canned data so the loop can run end-to-end
//! without network access; swap them for real backends by registering
//! other [`Tool`](rednote_core::Tool) implementations under the same names.

pub mod generate_emoji;
pub mod product_database;
pub mod search_web;

use rednote_core::tool::ToolRegistry;

pub use generate_emoji::GenerateEmojiTool;
pub use product_database::ProductDatabaseTool;
pub use search_web::SearchWebTool;

/// Create a registry with all built-in tools.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SearchWebTool));
    registry.register(Box::new(ProductDatabaseTool));
    registry.register(Box::new(GenerateEmojiTool));
    registry
}

/// Case-insensitive "contains any of" used by the canned lookups.
pub(crate) fn mentions_any(haystack: &str, needles: &[&str]) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_tools() {
        let registry = default_registry();
        assert_eq!(
            registry.names(),
            vec!["generate_emoji", "query_product_database", "search_web"]
        );
    }

    #[test]
    fn every_tool_declares_required_arguments() {
        for def in default_registry().definitions() {
            let required = def.parameters["required"].as_array().unwrap();
            assert_eq!(required.len(), 1, "{} should require one argument", def.name);
        }
    }

    #[test]
    fn mentions_any_ignores_case() {
        assert!(mentions_any("Moisturizing MASK review", &["mask"]));
        assert!(!mentions_any("serum", &["mask", "cream"]));
    }
}
