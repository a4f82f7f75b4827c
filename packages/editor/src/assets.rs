//! Asset library threaded into the editor.
//!
//! Elements only reference assets by id (`fontAssetId`, `colorAssetId`,
//! `linkedAssetId`). Option elements additionally keep a snapshot of the
//! linked option list, copied at link time, so a design renders the same
//! even if the asset is later edited or deleted.

use crate::mutations::ElementPatch;
use customfly_model::{CanvasElement, ElementKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named list of options (sizes, finishes, ...) shared by option elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontAsset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorAsset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub colors: Vec<String>,
}

/// Assets available to a design, as fetched by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetLibrary {
    pub option_sets: Vec<OptionSet>,
    pub fonts: Vec<FontAsset>,
    pub colors: Vec<ColorAsset>,
}

impl AssetLibrary {
    pub fn option_set(&self, id: &str) -> Option<&OptionSet> {
        self.option_sets.iter().find(|s| s.id == id)
    }

    pub fn font(&self, id: &str) -> Option<&FontAsset> {
        self.fonts.iter().find(|f| f.id == id)
    }

    pub fn color(&self, id: &str) -> Option<&ColorAsset> {
        self.colors.iter().find(|c| c.id == id)
    }
}

/// State of an element's link to an option set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// Not linked, or not an option element
    Unlinked,
    /// Snapshot matches the asset
    Synced,
    /// Asset options changed since the snapshot was taken
    Stale,
    /// Linked asset no longer exists; the snapshot keeps rendering
    Orphaned,
}

pub fn link_status(element: &CanvasElement, library: &AssetLibrary) -> LinkStatus {
    let Some(asset_id) = element.kind.linked_asset_id() else {
        return LinkStatus::Unlinked;
    };

    match library.option_set(asset_id) {
        None => LinkStatus::Orphaned,
        Some(set) if element.kind.options() == Some(set.options.as_slice()) => LinkStatus::Synced,
        Some(_) => LinkStatus::Stale,
    }
}

/// Patch that links `element` to `set`, snapshotting its options.
///
/// Linking enables every option. `None` if the element type cannot link.
pub fn linked_patch(element: &CanvasElement, set: &OptionSet) -> Option<ElementPatch> {
    let options = Value::from(set.options.clone());
    let patch = ElementPatch::new().set("linkedAssetId", set.id.clone());

    match &element.kind {
        ElementKind::Dropdown(_) => Some(patch.set("dropdownOptions", options)),
        ElementKind::Button(_) => Some(
            patch
                .set("buttonOptions", options.clone())
                .set("enabledOptions", options),
        ),
        ElementKind::Checkbox(_) => Some(
            patch
                .set("checkboxOptions", options.clone())
                .set("enabledCheckboxOptions", options),
        ),
        ElementKind::Swatch(_) | ElementKind::ProductColor(_) => Some(patch.set("swatchColors", options)),
        _ => None,
    }
}

/// Patch that drops the link. The option snapshot stays; enabled subsets
/// are emptied.
pub fn unlinked_patch(element: &CanvasElement) -> Option<ElementPatch> {
    element.kind.linked_asset_id()?;

    let patch = ElementPatch::new().unset("linkedAssetId");
    Some(match &element.kind {
        ElementKind::Button(_) => patch.set("enabledOptions", Value::Array(vec![])),
        ElementKind::Checkbox(_) => patch.set("enabledCheckboxOptions", Value::Array(vec![])),
        _ => patch,
    })
}
