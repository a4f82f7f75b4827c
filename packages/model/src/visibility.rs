//! # Visibility Rule Engine
//!
//! Decides per element, per render pass, whether it is shown for the
//! current catalog selection. Evaluation is referentially transparent: the
//! same element and selection always give the same answer.
//!
//! ## Semantics
//!
//! - No `logic` attached: visible.
//! - Each rule resolves a current value from the selection. A value that
//!   cannot be resolved (unknown option, no selected variant, unset element
//!   value, null rule value, non-numeric operand for a numeric operator)
//!   makes the rule **false** for every operator, `not_equals` included.
//! - `all` is vacuously true, `any` vacuously false.
//! - `show` shows iff the combination holds, `hide` shows iff it does not.
//!
//! String comparison is case-insensitive. When the current value is a list
//! (multi-select buttons, checkboxes) `equals` and `contains` test the
//! items and `not_equals` holds iff no item equals the target.

use crate::catalog::CatalogSelection;
use crate::element::CanvasElement;
use crate::logic::{ElementLogic, LogicAction, MatchType, RuleOperator, RuleSource, VisibilityRule};
use crate::page::PageData;
use serde_json::Value;

/// Whether `element` is visible under `selection`
pub fn is_visible(element: &CanvasElement, selection: &CatalogSelection) -> bool {
    match &element.base.logic {
        None => true,
        Some(logic) => evaluate_logic(logic, selection),
    }
}

/// Final visibility for a rule set
pub fn evaluate_logic(logic: &ElementLogic, selection: &CatalogSelection) -> bool {
    let mut results = logic.rules.iter().map(|rule| evaluate_rule(rule, selection));

    let matched = match logic.match_type {
        MatchType::All => results.all(|r| r),
        MatchType::Any => results.any(|r| r),
    };

    match logic.action {
        LogicAction::Show => matched,
        LogicAction::Hide => !matched,
    }
}

/// Truth value of one rule; unresolvable rules are false
pub fn evaluate_rule(rule: &VisibilityRule, selection: &CatalogSelection) -> bool {
    if rule.value.is_null() {
        return false;
    }

    match resolve(rule, selection) {
        Some(current) => compare(&current, rule.operator, &rule.value),
        None => {
            tracing::trace!(rule = %rule.id, source = %rule.source_key, "unresolvable rule");
            false
        }
    }
}

/// Visible elements of a page, in paint order
pub fn visible_elements<'a>(page: &'a PageData, selection: &CatalogSelection) -> Vec<&'a CanvasElement> {
    page.paint_order()
        .into_iter()
        .filter(|element| is_visible(element, selection))
        .collect()
}

fn resolve(rule: &VisibilityRule, selection: &CatalogSelection) -> Option<Value> {
    match rule.source_type {
        RuleSource::ShopifyOption => selection
            .options
            .get(&rule.source_key)
            .map(|v| Value::String(v.clone())),
        RuleSource::ShopifyVariant => selection.variant_id.clone().map(Value::String),
        RuleSource::ElementValue => selection
            .element_values
            .get(&rule.source_key)
            .filter(|v| !v.is_null())
            .cloned(),
    }
}

fn compare(current: &Value, operator: RuleOperator, target: &Value) -> bool {
    if let Value::Array(items) = current {
        return match operator {
            RuleOperator::Equals | RuleOperator::Contains => {
                items.iter().any(|item| compare(item, operator, target))
            }
            RuleOperator::NotEquals => {
                !items.is_empty() && !items.iter().any(|item| compare(item, RuleOperator::Equals, target))
            }
            RuleOperator::GreaterThan | RuleOperator::LessThan => false,
        };
    }

    match operator {
        RuleOperator::Equals => match (as_text(current), as_text(target)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        RuleOperator::NotEquals => match (as_text(current), as_text(target)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        },
        RuleOperator::Contains => match (as_text(current), as_text(target)) {
            (Some(a), Some(b)) => a.contains(&b),
            _ => false,
        },
        RuleOperator::GreaterThan => match (as_number(current), as_number(target)) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        RuleOperator::LessThan => match (as_number(current), as_number(target)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.to_lowercase()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integral floats print without a fraction (`12.0` is `12`), so number
/// fields compare equal to integer rule values
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::VisibilityRule;
    use serde_json::json;

    fn element_with(logic: ElementLogic) -> CanvasElement {
        CanvasElement::text("el", "x").with_logic(logic)
    }

    fn red_selection() -> CatalogSelection {
        CatalogSelection::default()
            .with_variant("101")
            .with_option("Color", "Red")
            .with_option("Size", "M")
    }

    #[test]
    fn test_no_logic_is_visible() {
        let element = CanvasElement::text("el", "x");
        assert!(is_visible(&element, &CatalogSelection::default()));
    }

    #[test]
    fn test_show_when_option_equals() {
        let element = element_with(ElementLogic::show_when_all(vec![VisibilityRule::option(
            "r1",
            "Color",
            RuleOperator::Equals,
            "red",
        )]));

        assert!(is_visible(&element, &red_selection()));
        assert!(!is_visible(
            &element,
            &CatalogSelection::default().with_option("Color", "Blue")
        ));
    }

    #[test]
    fn test_hide_inverts() {
        let logic = ElementLogic::new(MatchType::All, LogicAction::Hide).with_rule(VisibilityRule::option(
            "r1",
            "Color",
            RuleOperator::Equals,
            "Red",
        ));
        assert!(!is_visible(&element_with(logic), &red_selection()));
    }

    #[test]
    fn test_unresolvable_option_fails_closed() {
        let element = element_with(ElementLogic::show_when_all(vec![VisibilityRule::option(
            "r1",
            "Engraving",
            RuleOperator::Equals,
            "Yes",
        )]));
        assert!(!is_visible(&element, &red_selection()));

        // not_equals on a missing option is still false
        let element = element_with(ElementLogic::show_when_all(vec![VisibilityRule::option(
            "r1",
            "Engraving",
            RuleOperator::NotEquals,
            "Yes",
        )]));
        assert!(!is_visible(&element, &red_selection()));
    }

    #[test]
    fn test_vacuous_rule_sets() {
        let all_show = ElementLogic::new(MatchType::All, LogicAction::Show);
        let any_show = ElementLogic::new(MatchType::Any, LogicAction::Show);
        let any_hide = ElementLogic::new(MatchType::Any, LogicAction::Hide);

        let selection = CatalogSelection::default();
        assert!(is_visible(&element_with(all_show), &selection));
        assert!(!is_visible(&element_with(any_show), &selection));
        assert!(is_visible(&element_with(any_hide), &selection));
    }

    #[test]
    fn test_any_needs_one_match() {
        let logic = ElementLogic::new(MatchType::Any, LogicAction::Show)
            .with_rule(VisibilityRule::option("r1", "Color", RuleOperator::Equals, "Blue"))
            .with_rule(VisibilityRule::option("r2", "Size", RuleOperator::Equals, "M"));
        assert!(is_visible(&element_with(logic), &red_selection()));
    }

    #[test]
    fn test_variant_rule() {
        let logic = ElementLogic::show_when_all(vec![VisibilityRule::variant("r1", RuleOperator::Equals, 101)]);
        assert!(is_visible(&element_with(logic.clone()), &red_selection()));
        assert!(!is_visible(&element_with(logic), &CatalogSelection::default()));
    }

    #[test]
    fn test_contains_and_numeric_operators() {
        let selection = CatalogSelection::default()
            .with_option("Material", "Brushed Steel")
            .with_element_value("qty", json!(12))
            .with_element_value("toppings", json!(["Cheese", "Olives"]));

        let contains = VisibilityRule::option("r1", "Material", RuleOperator::Contains, "steel");
        assert!(evaluate_rule(&contains, &selection));

        let greater = VisibilityRule::new("r2", RuleSource::ElementValue, "qty", RuleOperator::GreaterThan, "10");
        let less = VisibilityRule::new("r3", RuleSource::ElementValue, "qty", RuleOperator::LessThan, 10);
        assert!(evaluate_rule(&greater, &selection));
        assert!(!evaluate_rule(&less, &selection));

        let member = VisibilityRule::new("r4", RuleSource::ElementValue, "toppings", RuleOperator::Equals, "olives");
        let absent = VisibilityRule::new("r5", RuleSource::ElementValue, "toppings", RuleOperator::NotEquals, "ham");
        assert!(evaluate_rule(&member, &selection));
        assert!(evaluate_rule(&absent, &selection));
    }

    #[test]
    fn test_number_element_equals_integer_rule() {
        let page = PageData::new("p", "Front").with_elements(vec![serde_json::from_value(json!({
            "id": "qty", "type": "number", "value": 12
        }))
        .unwrap()]);
        let selection = CatalogSelection::default().with_element_values_from(std::slice::from_ref(&page));
        assert_eq!(selection.element_values["qty"], json!(12.0));

        let equals = VisibilityRule::new("r1", RuleSource::ElementValue, "qty", RuleOperator::Equals, 12);
        let equals_text = VisibilityRule::new("r2", RuleSource::ElementValue, "qty", RuleOperator::Equals, "12");
        let not_equals = VisibilityRule::new("r3", RuleSource::ElementValue, "qty", RuleOperator::NotEquals, 12);
        assert!(evaluate_rule(&equals, &selection));
        assert!(evaluate_rule(&equals_text, &selection));
        assert!(!evaluate_rule(&not_equals, &selection));

        let fraction = CatalogSelection::default().with_element_value("qty", json!(12.5));
        let half = VisibilityRule::new("r4", RuleSource::ElementValue, "qty", RuleOperator::Equals, "12.5");
        assert!(evaluate_rule(&half, &fraction));
        assert!(!evaluate_rule(&equals, &fraction));
    }

    #[test]
    fn test_numeric_on_text_fails_closed() {
        let selection = CatalogSelection::default().with_option("Size", "Large");
        let rule = VisibilityRule::option("r1", "Size", RuleOperator::GreaterThan, 3);
        assert!(!evaluate_rule(&rule, &selection));
    }

    #[test]
    fn test_null_rule_value_is_false() {
        let rule = VisibilityRule::option("r1", "Color", RuleOperator::NotEquals, Value::Null);
        assert!(!evaluate_rule(&rule, &red_selection()));
    }

    #[test]
    fn test_visible_elements_in_paint_order() {
        let hidden = CanvasElement::text("hidden", "h")
            .with_z_index(1)
            .with_logic(ElementLogic::show_when_all(vec![VisibilityRule::option(
                "r1",
                "Color",
                RuleOperator::Equals,
                "Blue",
            )]));
        let page = PageData::new("p", "Front").with_elements(vec![
            CanvasElement::text("top", "t").with_z_index(9),
            hidden,
            CanvasElement::text("bottom", "b").with_z_index(2),
        ]);

        let ids: Vec<&str> = visible_elements(&page, &red_selection())
            .iter()
            .map(|e| e.id())
            .collect();
        assert_eq!(ids, vec!["bottom", "top"]);
    }
}
