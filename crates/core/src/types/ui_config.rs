//! UI variation configuration supplied by the experimentation layer.

use serde::{Deserialize, Serialize};

/// Presentation settings that experiments may vary per user.
///
/// Every field has a documented default, and a partial payload fills the
/// missing fields from those defaults:
///
/// | Field | Default |
/// |---|---|
/// | `theme` | `"default"` |
/// | `primary_color` | `"#007bff"` |
/// | `show_discount` | `false` |
/// | `featured_categories` | `["Electronics", "Clothing", "Books"]` |
/// | `header_message` | `"Welcome to AI Store!"` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiVariationConfig {
    pub theme: String,
    pub primary_color: String,
    pub show_discount: bool,
    pub featured_categories: Vec<String>,
    pub header_message: String,
}

impl UiVariationConfig {
    pub const DEFAULT_THEME: &'static str = "default";
    pub const DEFAULT_PRIMARY_COLOR: &'static str = "#007bff";
    pub const DEFAULT_FEATURED_CATEGORIES: [&'static str; 3] = ["Electronics", "Clothing", "Books"];
    pub const DEFAULT_HEADER_MESSAGE: &'static str = "Welcome to AI Store!";
}

impl Default for UiVariationConfig {
    fn default() -> Self {
        Self {
            theme: Self::DEFAULT_THEME.to_string(),
            primary_color: Self::DEFAULT_PRIMARY_COLOR.to_string(),
            show_discount: false,
            featured_categories: Self::DEFAULT_FEATURED_CATEGORIES
                .iter()
                .map(ToString::to_string)
                .collect(),
            header_message: Self::DEFAULT_HEADER_MESSAGE.to_string(),
        }
    }
}
