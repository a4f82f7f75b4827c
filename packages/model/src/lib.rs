//! # Customfly Model
//!
//! Data model for product customizer designs.
//!
//! ```text
//! Vec<PageData>            one entry per product side
//!   └─ Vec<CanvasElement>  ElementBase + ElementKind (tagged by `type`)
//!        └─ ElementLogic   show/hide rules over CatalogSelection
//! ```
//!
//! The visibility rule engine ([`is_visible`]) is a pure function of an
//! element and the current catalog selection.

pub mod catalog;
pub mod check;
pub mod element;
pub mod error;
pub mod logic;
pub mod page;
pub mod visibility;

pub use catalog::{Catalog, CatalogOption, CatalogSelection, CatalogVariant};
pub use check::{check_document, has_errors, Diagnostic, DiagnosticLevel};
pub use element::{
    ButtonProps, CanvasElement, CheckboxProps, Crop, DateProps, DropdownProps, ElementBase, ElementKind,
    ElementType, FieldProps, FileUploadProps, GalleryProps, ImageProps, MapProps, MonogramProps, NumberProps,
    PhoneProps, ShapeProps, SwatchProps, TextAlign, TextCase, TextProps, TimeProps, DRAFT_ID,
};
pub use error::ModelError;
pub use logic::{ElementLogic, LogicAction, MatchType, RuleOperator, RuleSource, VisibilityRule};
pub use page::{default_pages, pages_from_json, pages_to_json, PageData};
pub use visibility::{evaluate_logic, evaluate_rule, is_visible, visible_elements};
