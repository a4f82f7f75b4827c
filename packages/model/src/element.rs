//! # Canvas Elements
//!
//! A placeable design element is a shared [`ElementBase`] record plus a
//! per-variant [`ElementKind`] payload, discriminated by `type`.
//!
//! Both halves are flattened on the wire so a serialized element looks like
//! the flat JSON records consumed by the production renderer:
//!
//! ```json
//! { "id": "el1", "type": "text", "x": 10, "y": 20, "rotation": 0,
//!   "opacity": 100, "zIndex": 1712000000000, "text": "Hello" }
//! ```
//!
//! Every payload field is optional. An unset field means "use the type
//! default" and is never an error.

use crate::logic::ElementLogic;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved id for an in-progress, uncommitted element
pub const DRAFT_ID: &str = "draft";

/// A placeable, configurable unit on a design page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasElement {
    #[serde(flatten)]
    pub base: ElementBase,

    #[serde(flatten)]
    pub kind: ElementKind,
}

/// Fields shared by every element variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementBase {
    pub id: String,

    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,

    /// Paint order. Relative only; ties are broken by array position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_label: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_move: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_resize: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_rotate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_delete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_duplicate: Option<bool>,

    /// Conditional show/hide rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<ElementLogic>,
}

fn default_opacity() -> f64 {
    100.0
}

impl ElementBase {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            width: None,
            height: None,
            rotation: 0.0,
            opacity: default_opacity(),
            z_index: None,
            label: None,
            help_text: None,
            placeholder: None,
            show_label: None,
            is_required: None,
            locked: None,
            lock_move: None,
            lock_resize: None,
            lock_rotate: None,
            lock_delete: None,
            lock_duplicate: None,
            logic: None,
        }
    }
}

/// Variant payloads, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Text(TextProps),
    Monogram(MonogramProps),
    Image(ImageProps),
    Gallery(GalleryProps),
    Field(FieldProps),
    Textarea(FieldProps),
    Swatch(SwatchProps),
    ProductColor(SwatchProps),
    Dropdown(DropdownProps),
    Button(ButtonProps),
    Checkbox(CheckboxProps),
    Number(NumberProps),
    Phone(PhoneProps),
    Date(DateProps),
    Time(TimeProps),
    FileUpload(FileUploadProps),
    Map(MapProps),
    Shape(ShapeProps),
}

/// Discriminant of [`ElementKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Text,
    Monogram,
    Image,
    Gallery,
    Field,
    Textarea,
    Swatch,
    ProductColor,
    Dropdown,
    Button,
    Checkbox,
    Number,
    Phone,
    Date,
    Time,
    FileUpload,
    Map,
    Shape,
}

impl ElementType {
    /// Wire name, as it appears in the `type` tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Text => "text",
            ElementType::Monogram => "monogram",
            ElementType::Image => "image",
            ElementType::Gallery => "gallery",
            ElementType::Field => "field",
            ElementType::Textarea => "textarea",
            ElementType::Swatch => "swatch",
            ElementType::ProductColor => "product_color",
            ElementType::Dropdown => "dropdown",
            ElementType::Button => "button",
            ElementType::Checkbox => "checkbox",
            ElementType::Number => "number",
            ElementType::Phone => "phone",
            ElementType::Date => "date",
            ElementType::Time => "time",
            ElementType::FileUpload => "file_upload",
            ElementType::Map => "map",
            ElementType::Shape => "shape",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    None,
    Uppercase,
    Lowercase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_case: Option<TextCase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_curved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_asset_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonogramProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Diamond, Circle, Round, Scallop, Stacked or Vine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monogram_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageProps {
    /// URL returned by the upload collaborator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_aspect_ratio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_bg: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalleryProps {
    /// `all` or `categorized`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery_max_images: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gallery_source_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldProps {
    /// `text`, `email`, `number` or `textarea`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwatchProps {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub swatch_colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swatch_shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_asset_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DropdownProps {
    /// Options snapshot, copied from the linked asset at link time
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropdown_options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropdown_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_searchable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonProps {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub button_options: Vec<String>,
    /// Subset of `button_options` offered to the customer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_multiple: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selected_options: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckboxProps {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checkbox_options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_checkbox_options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_selection: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_selection: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selected_options: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumberProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_suffix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhoneProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DateProps {
    /// Raw ISO-8601 date (`2024-05-01`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Display format, e.g. `DD/MM/YYYY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeProps {
    /// Raw 24-hour time (`14:30`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Display format, `12h` or `24h`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileUploadProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_file_types: Vec<String>,
    /// Megabytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ElementKind {
    /// Default payload for an element type
    pub fn default_for(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Text => ElementKind::Text(TextProps::default()),
            ElementType::Monogram => ElementKind::Monogram(MonogramProps::default()),
            ElementType::Image => ElementKind::Image(ImageProps::default()),
            ElementType::Gallery => ElementKind::Gallery(GalleryProps::default()),
            ElementType::Field => ElementKind::Field(FieldProps::default()),
            ElementType::Textarea => ElementKind::Textarea(FieldProps::default()),
            ElementType::Swatch => ElementKind::Swatch(SwatchProps::default()),
            ElementType::ProductColor => ElementKind::ProductColor(SwatchProps::default()),
            ElementType::Dropdown => ElementKind::Dropdown(DropdownProps::default()),
            ElementType::Button => ElementKind::Button(ButtonProps::default()),
            ElementType::Checkbox => ElementKind::Checkbox(CheckboxProps::default()),
            ElementType::Number => ElementKind::Number(NumberProps::default()),
            ElementType::Phone => ElementKind::Phone(PhoneProps::default()),
            ElementType::Date => ElementKind::Date(DateProps::default()),
            ElementType::Time => ElementKind::Time(TimeProps::default()),
            ElementType::FileUpload => ElementKind::FileUpload(FileUploadProps::default()),
            ElementType::Map => ElementKind::Map(MapProps::default()),
            ElementType::Shape => ElementKind::Shape(ShapeProps::default()),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Text(_) => ElementType::Text,
            ElementKind::Monogram(_) => ElementType::Monogram,
            ElementKind::Image(_) => ElementType::Image,
            ElementKind::Gallery(_) => ElementType::Gallery,
            ElementKind::Field(_) => ElementType::Field,
            ElementKind::Textarea(_) => ElementType::Textarea,
            ElementKind::Swatch(_) => ElementType::Swatch,
            ElementKind::ProductColor(_) => ElementType::ProductColor,
            ElementKind::Dropdown(_) => ElementType::Dropdown,
            ElementKind::Button(_) => ElementType::Button,
            ElementKind::Checkbox(_) => ElementType::Checkbox,
            ElementKind::Number(_) => ElementType::Number,
            ElementKind::Phone(_) => ElementType::Phone,
            ElementKind::Date(_) => ElementType::Date,
            ElementKind::Time(_) => ElementType::Time,
            ElementKind::FileUpload(_) => ElementType::FileUpload,
            ElementKind::Map(_) => ElementType::Map,
            ElementKind::Shape(_) => ElementType::Shape,
        }
    }

    /// Linked option asset, for variants that can link one
    pub fn linked_asset_id(&self) -> Option<&str> {
        match self {
            ElementKind::Dropdown(p) => p.linked_asset_id.as_deref(),
            ElementKind::Button(p) => p.linked_asset_id.as_deref(),
            ElementKind::Checkbox(p) => p.linked_asset_id.as_deref(),
            ElementKind::Swatch(p) | ElementKind::ProductColor(p) => p.linked_asset_id.as_deref(),
            _ => None,
        }
    }

    /// Full option list (the resolved snapshot for linked elements)
    pub fn options(&self) -> Option<&[String]> {
        match self {
            ElementKind::Dropdown(p) => Some(&p.dropdown_options),
            ElementKind::Button(p) => Some(&p.button_options),
            ElementKind::Checkbox(p) => Some(&p.checkbox_options),
            ElementKind::Swatch(p) | ElementKind::ProductColor(p) => Some(&p.swatch_colors),
            _ => None,
        }
    }

    /// Options offered to the customer, when narrowed from the full list
    pub fn enabled_options(&self) -> Option<&[String]> {
        match self {
            ElementKind::Button(p) => p.enabled_options.as_deref(),
            ElementKind::Checkbox(p) => p.enabled_checkbox_options.as_deref(),
            _ => None,
        }
    }
}

impl CanvasElement {
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            base: ElementBase::new(id),
            kind,
        }
    }

    /// Text element with the given content
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            id,
            ElementKind::Text(TextProps {
                text: Some(text.into()),
                ..TextProps::default()
            }),
        )
    }

    pub fn id(&self) -> &str {
        &self.base.id
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn is_draft(&self) -> bool {
        self.base.id == DRAFT_ID
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.base.x = x;
        self.base.y = y;
        self
    }

    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.base.z_index = Some(z_index);
        self
    }

    pub fn with_logic(mut self, logic: ElementLogic) -> Self {
        self.base.logic = Some(logic);
        self
    }

    /// The customer-entered value, as read by `element_value` rules
    pub fn current_value(&self) -> Option<Value> {
        match &self.kind {
            ElementKind::Text(p) => p.text.clone().map(Value::String),
            ElementKind::Monogram(p) => p.text.clone().map(Value::String),
            ElementKind::Field(p) | ElementKind::Textarea(p) => p.text.clone().map(Value::String),
            ElementKind::Swatch(p) | ElementKind::ProductColor(p) => {
                p.selected_color.clone().map(Value::String)
            }
            ElementKind::Dropdown(p) => p.selected_option.clone().map(Value::String),
            ElementKind::Button(p) if !p.selected_options.is_empty() => {
                Some(Value::from(p.selected_options.clone()))
            }
            ElementKind::Checkbox(p) if !p.selected_options.is_empty() => {
                Some(Value::from(p.selected_options.clone()))
            }
            ElementKind::Number(p) => p.value.or(p.default_value).map(Value::from),
            ElementKind::Phone(p) => p.phone_number.clone().map(Value::String),
            ElementKind::Date(p) => p.value.clone().map(Value::String),
            ElementKind::Time(p) => p.value.clone().map(Value::String),
            ElementKind::Image(p) => p.src.clone().map(Value::String),
            ElementKind::FileUpload(p) => p.src.clone().map(Value::String),
            ElementKind::Gallery(p) => p.src.clone().map(Value::String),
            ElementKind::Map(p) => p.map_location.clone().map(Value::String),
            _ => None,
        }
    }
}
