//! Pages (product sides) and the design document.

use crate::element::CanvasElement;
use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// One side of the product, holding an ordered list of elements.
///
/// Pages share a coordinate space but not element identity: ids are unique
/// per page only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub elements: Vec<CanvasElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_image_color: Option<String>,
}

impl PageData {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            elements: Vec::new(),
            base_image: None,
            base_image_color: None,
        }
    }

    pub fn with_elements(mut self, elements: Vec<CanvasElement>) -> Self {
        self.elements = elements;
        self
    }

    pub fn element(&self, id: &str) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut CanvasElement> {
        self.elements.iter_mut().find(|e| e.id() == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn max_z_index(&self) -> Option<i64> {
        self.elements.iter().filter_map(|e| e.base.z_index).max()
    }

    /// Elements in paint order: ascending zIndex, ties by array position
    pub fn paint_order(&self) -> Vec<&CanvasElement> {
        let mut ordered: Vec<&CanvasElement> = self.elements.iter().collect();
        // sort_by_key is stable, so equal zIndex keeps array order
        ordered.sort_by_key(|e| e.base.z_index.unwrap_or(0));
        ordered
    }
}

/// Default single-page document
pub fn default_pages() -> Vec<PageData> {
    vec![PageData::new("default", "Side 1")]
}

/// Parse a design document (`designJson`): an ordered list of pages
pub fn pages_from_json(json: &str) -> Result<Vec<PageData>, ModelError> {
    let pages: Vec<PageData> = serde_json::from_str(json)?;
    if pages.is_empty() {
        return Err(ModelError::EmptyDocument);
    }
    Ok(pages)
}

pub fn pages_to_json(pages: &[PageData]) -> Result<String, ModelError> {
    Ok(serde_json::to_string_pretty(pages)?)
}
