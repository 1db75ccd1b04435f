//! Flag decisions and the values derived from them.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use ai_store_core::UiVariationConfig;

use super::user::ExperimentUser;

/// Flag keys configured in the experimentation project.
pub mod flags {
    pub const UI_THEME_EXPERIMENT: &str = "ui_theme_experiment";
    pub const SHOW_DISCOUNT_BANNER: &str = "show_discount_banner";
    pub const HEADER_MESSAGE_EXPERIMENT: &str = "header_message_experiment";
    pub const FEATURED_CATEGORIES_EXPERIMENT: &str = "featured_categories_experiment";
    /// Governs the checkout button label.
    pub const APP_RULE1: &str = "app_rule1";
}

/// Variable keys read from flag decisions.
pub mod variables {
    pub const PRIMARY_COLOR: &str = "primary_color";
    pub const THEME_NAME: &str = "theme_name";
    pub const DISCOUNT_ENABLED: &str = "discount_enabled";
    pub const HEADER_MESSAGE: &str = "header_message";
    pub const FEATURED_CATEGORIES: &str = "featured_categories";
    pub const CHECKOUT_BUTTON_TEXT: &str = "checkout_button_text";
    /// Project-specific alias for [`CHECKOUT_BUTTON_TEXT`].
    pub const CHECKOUT_BUTTONS: &str = "CHECKOUT_BUTTONS";
}

/// Checkout button label when no experiment applies.
pub const DEFAULT_CHECKOUT_BUTTON_TEXT: &str = "Place order";

/// The outcome of evaluating one flag for one user.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Decision {
    pub enabled: bool,
    pub variation_key: Option<String>,
    pub variables: Map<String, Value>,
}

impl Decision {
    fn string_var(&self, key: &str) -> Option<&str> {
        self.variables.get(key).and_then(Value::as_str)
    }
}

/// External experimentation system. Consumed, never owned.
pub trait DecisionProvider: Send + Sync {
    /// Evaluate `flag_key` for `user`.
    fn decide(&self, flag_key: &str, user: &ExperimentUser) -> Decision;
}

/// Fixed decisions, identical for every user.
///
/// Deserializes from a JSON object keyed by flag:
///
/// ```json
/// { "app_rule1": { "enabled": true, "variationKey": "b",
///                  "variables": { "CHECKOUT_BUTTONS": "Buy now" } } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StaticDecisions {
    decisions: HashMap<String, Decision>,
}

impl StaticDecisions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the decision for a flag.
    #[must_use]
    pub fn with(mut self, flag_key: &str, decision: Decision) -> Self {
        self.decisions.insert(flag_key.to_string(), decision);
        self
    }
}

impl DecisionProvider for StaticDecisions {
    fn decide(&self, flag_key: &str, _user: &ExperimentUser) -> Decision {
        self.decisions.get(flag_key).cloned().unwrap_or_default()
    }
}

/// Checkout button presentation derived from the [`flags::APP_RULE1`] decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutButton {
    pub text: String,
    pub flag_enabled: bool,
    pub variation_key: Option<String>,
}

impl CheckoutButton {
    /// Derive the label: the flag's variable when the flag is on, otherwise
    /// the default.
    #[must_use]
    pub fn from_decision(decision: &Decision) -> Self {
        let text = decision
            .enabled
            .then(|| {
                decision
                    .string_var(variables::CHECKOUT_BUTTONS)
                    .or_else(|| decision.string_var(variables::CHECKOUT_BUTTON_TEXT))
            })
            .flatten()
            .unwrap_or(DEFAULT_CHECKOUT_BUTTON_TEXT);

        Self {
            text: text.to_string(),
            flag_enabled: decision.enabled,
            variation_key: decision.variation_key.clone(),
        }
    }

    /// Evaluate the checkout flag for `user`.
    #[must_use]
    pub fn resolve(provider: &dyn DecisionProvider, user: &ExperimentUser) -> Self {
        Self::from_decision(&provider.decide(flags::APP_RULE1, user))
    }
}

/// Assemble the UI variation for `user` from the individual UI flags.
///
/// Disabled flags and missing or mistyped variables leave the corresponding
/// field at its default.
#[must_use]
pub fn resolve_ui_config(provider: &dyn DecisionProvider, user: &ExperimentUser) -> UiVariationConfig {
    let mut config = UiVariationConfig::default();

    let theme = provider.decide(flags::UI_THEME_EXPERIMENT, user);
    if theme.enabled {
        if let Some(name) = theme.string_var(variables::THEME_NAME) {
            config.theme = name.to_string();
        }
        if let Some(color) = theme.string_var(variables::PRIMARY_COLOR) {
            config.primary_color = color.to_string();
        }
    }

    let discount = provider.decide(flags::SHOW_DISCOUNT_BANNER, user);
    if discount.enabled {
        config.show_discount = discount
            .variables
            .get(variables::DISCOUNT_ENABLED)
            .and_then(Value::as_bool)
            .unwrap_or(true);
    }

    let header = provider.decide(flags::HEADER_MESSAGE_EXPERIMENT, user);
    if header.enabled
        && let Some(message) = header.string_var(variables::HEADER_MESSAGE)
    {
        config.header_message = message.to_string();
    }

    let categories = provider.decide(flags::FEATURED_CATEGORIES_EXPERIMENT, user);
    if categories.enabled
        && let Some(list) = categories
            .variables
            .get(variables::FEATURED_CATEGORIES)
            .and_then(parse_categories)
    {
        config.featured_categories = list;
    }

    config
}

/// Categories arrive either as a JSON array or as a JSON-encoded string.
fn parse_categories(value: &Value) -> Option<Vec<String>> {
    let owned;
    let array = match value {
        Value::Array(items) => items,
        Value::String(encoded) => {
            owned = serde_json::from_str::<Vec<Value>>(encoded).ok()?;
            &owned
        }
        _ => return None,
    };
    array
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decision(enabled: bool, variables: Value) -> Decision {
        Decision {
            enabled,
            variation_key: Some("variation_b".to_string()),
            variables: variables.as_object().cloned().unwrap_or_default(),
        }
    }

    fn anon() -> ExperimentUser {
        ExperimentUser::from_identity(None)
    }

    #[test]
    fn test_checkout_button_default_when_disabled() {
        let button =
            CheckoutButton::from_decision(&decision(false, json!({"CHECKOUT_BUTTONS": "Buy now"})));
        assert_eq!(button.text, DEFAULT_CHECKOUT_BUTTON_TEXT);
        assert!(!button.flag_enabled);
        assert_eq!(button.variation_key.as_deref(), Some("variation_b"));
    }

    #[test]
    fn test_checkout_button_prefers_project_variable() {
        let button = CheckoutButton::from_decision(&decision(
            true,
            json!({"CHECKOUT_BUTTONS": "Buy now", "checkout_button_text": "Order"}),
        ));
        assert_eq!(button.text, "Buy now");
    }

    #[test]
    fn test_checkout_button_falls_back_to_legacy_variable() {
        let button =
            CheckoutButton::from_decision(&decision(true, json!({"checkout_button_text": "Order"})));
        assert_eq!(button.text, "Order");
    }

    #[test]
    fn test_checkout_button_enabled_without_variables() {
        let button = CheckoutButton::from_decision(&decision(true, json!({})));
        assert_eq!(button.text, DEFAULT_CHECKOUT_BUTTON_TEXT);
        assert!(button.flag_enabled);
    }

    #[test]
    fn test_static_decisions_from_json() {
        let provider: StaticDecisions = serde_json::from_value(json!({
            "app_rule1": {
                "enabled": true,
                "variationKey": "b",
                "variables": {"CHECKOUT_BUTTONS": "Buy now"}
            }
        }))
        .unwrap();

        let button = CheckoutButton::resolve(&provider, &anon());
        assert_eq!(button.text, "Buy now");
        assert_eq!(provider.decide("unknown_flag", &anon()), Decision::default());
    }

    #[test]
    fn test_resolve_ui_config_defaults() {
        let config = resolve_ui_config(&StaticDecisions::new(), &anon());
        assert_eq!(config, UiVariationConfig::default());
    }

    #[test]
    fn test_resolve_ui_config_from_flags() {
        let provider = StaticDecisions::new()
            .with(
                flags::UI_THEME_EXPERIMENT,
                decision(true, json!({"theme_name": "warm", "primary_color": "#ff6600"})),
            )
            .with(flags::SHOW_DISCOUNT_BANNER, decision(true, json!({})))
            .with(
                flags::HEADER_MESSAGE_EXPERIMENT,
                decision(false, json!({"header_message": "ignored"})),
            )
            .with(
                flags::FEATURED_CATEGORIES_EXPERIMENT,
                decision(true, json!({"featured_categories": "[\"Books\",\"Toys\"]"})),
            );

        let config = resolve_ui_config(&provider, &anon());
        assert_eq!(config.theme, "warm");
        assert_eq!(config.primary_color, "#ff6600");
        assert!(config.show_discount);
        assert_eq!(config.header_message, UiVariationConfig::DEFAULT_HEADER_MESSAGE);
        assert_eq!(config.featured_categories, vec!["Books", "Toys"]);
    }

    #[test]
    fn test_parse_categories_rejects_mixed_arrays() {
        assert_eq!(parse_categories(&json!(["Books", 3])), None);
        assert_eq!(parse_categories(&json!(42)), None);
    }
}
