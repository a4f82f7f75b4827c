//! Conditional visibility rule types.
//!
//! Evaluation lives in [`crate::visibility`]; these are plain data.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a rule reads its current value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    /// Selected value of the catalog option named by `source_key`
    ShopifyOption,
    /// Identity of the selected catalog variant
    ShopifyVariant,
    /// Live value of another element on the design, keyed by element id
    ElementValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    #[default]
    All,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicAction {
    #[default]
    Show,
    Hide,
}

/// A single condition over catalog selection state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityRule {
    pub id: String,
    pub source_type: RuleSource,
    #[serde(default)]
    pub source_key: String,
    pub operator: RuleOperator,
    #[serde(default)]
    pub value: Value,
}

impl VisibilityRule {
    pub fn new(
        id: impl Into<String>,
        source_type: RuleSource,
        source_key: impl Into<String>,
        operator: RuleOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            id: id.into(),
            source_type,
            source_key: source_key.into(),
            operator,
            value: value.into(),
        }
    }

    /// Rule on a named catalog option
    pub fn option(
        id: impl Into<String>,
        option_name: impl Into<String>,
        operator: RuleOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self::new(id, RuleSource::ShopifyOption, option_name, operator, value)
    }

    /// Rule on the selected variant id
    pub fn variant(id: impl Into<String>, operator: RuleOperator, variant_id: impl Into<Value>) -> Self {
        Self::new(id, RuleSource::ShopifyVariant, "", operator, variant_id)
    }
}

/// Rule set attached to an element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementLogic {
    #[serde(default)]
    pub rules: Vec<VisibilityRule>,
    #[serde(default)]
    pub match_type: MatchType,
    #[serde(default)]
    pub action: LogicAction,
}

impl ElementLogic {
    pub fn new(match_type: MatchType, action: LogicAction) -> Self {
        Self {
            rules: Vec::new(),
            match_type,
            action,
        }
    }

    pub fn show_when_all(rules: Vec<VisibilityRule>) -> Self {
        Self {
            rules,
            match_type: MatchType::All,
            action: LogicAction::Show,
        }
    }

    pub fn with_rule(mut self, rule: VisibilityRule) -> Self {
        self.rules.push(rule);
        self
    }
}
