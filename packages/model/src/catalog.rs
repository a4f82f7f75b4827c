//! Read-only product catalog and the customer's current selection.
//!
//! The catalog is owned by the storefront; the core never mutates it.

use crate::page::PageData;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOption {
    pub name: String,
    /// 1-based position; matches `optionN` on variants
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogVariant {
    /// Numeric ids (Shopify REST) are kept as their decimal text
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "variant id must be a string or a number, got {}",
            other
        ))),
    }
}

impl CatalogVariant {
    /// Option value at a 1-based position
    pub fn option_at(&self, position: u32) -> Option<&str> {
        match position {
            1 => self.option1.as_deref(),
            2 => self.option2.as_deref(),
            3 => self.option3.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub options: Vec<CatalogOption>,
    #[serde(default)]
    pub variants: Vec<CatalogVariant>,
}

impl Catalog {
    pub fn variant(&self, id: &str) -> Option<&CatalogVariant> {
        self.variants.iter().find(|v| v.id == id)
    }

    pub fn option(&self, name: &str) -> Option<&CatalogOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Selection implied by picking a variant.
    ///
    /// Options are positioned by their index when `position` is unset.
    /// An unknown variant id yields a selection with that id and no options.
    pub fn selection_for_variant(&self, variant_id: &str) -> CatalogSelection {
        let mut selection = CatalogSelection::default().with_variant(variant_id);

        if let Some(variant) = self.variant(variant_id) {
            for (index, option) in self.options.iter().enumerate() {
                let position = if option.position == 0 {
                    index as u32 + 1
                } else {
                    option.position
                };
                if let Some(value) = variant.option_at(position) {
                    selection.options.insert(option.name.clone(), value.to_string());
                }
            }
        }

        selection
    }

    /// Variant whose options match every selected option, if any
    pub fn variant_for_options(&self, options: &HashMap<String, String>) -> Option<&CatalogVariant> {
        self.variants.iter().find(|variant| {
            self.options.iter().enumerate().all(|(index, option)| {
                let position = if option.position == 0 {
                    index as u32 + 1
                } else {
                    option.position
                };
                match options.get(&option.name) {
                    Some(wanted) => variant.option_at(position) == Some(wanted.as_str()),
                    None => true,
                }
            })
        })
    }
}

/// Current catalog selection state, as consumed by the rule engine
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub options: HashMap<String, String>,
    #[serde(default)]
    pub element_values: HashMap<String, Value>,
}

impl CatalogSelection {
    pub fn with_variant(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn with_element_value(mut self, element_id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.element_values.insert(element_id.into(), value.into());
        self
    }

    /// Capture the current values of every element on the given pages.
    ///
    /// Element ids are only unique per page. When two pages reuse an id the
    /// later page's value wins.
    pub fn with_element_values_from(mut self, pages: &[PageData]) -> Self {
        for page in pages {
            for element in &page.elements {
                if let Some(value) = element.current_value() {
                    let replaced = self.element_values.insert(element.id().to_string(), value);
                    if replaced.is_some() {
                        tracing::debug!(page = %page.id, element = element.id(), "element value shadows an earlier page");
                    }
                }
            }
        }
        self
    }
}
