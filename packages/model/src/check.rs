//! Structural checks over a design document.
//!
//! Errors break an invariant the editor relies on. Warnings flag data the
//! editor tolerates but a merchant probably wants to look at.

use crate::element::DRAFT_ID;
use crate::page::PageData;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub page_id: Option<String>,
    pub element_id: Option<String>,
    pub message: String,
}

impl Diagnostic {
    fn error(page_id: Option<&str>, element_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            page_id: page_id.map(str::to_string),
            element_id: element_id.map(str::to_string),
            message: message.into(),
        }
    }

    fn warning(page_id: Option<&str>, element_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            ..Self::error(page_id, element_id, message)
        }
    }
}

/// Run every document check
pub fn check_document(pages: &[PageData]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if pages.is_empty() {
        diagnostics.push(Diagnostic::error(None, None, "document has no pages"));
        return diagnostics;
    }

    let mut page_ids = HashSet::new();
    for page in pages {
        if !page_ids.insert(page.id.as_str()) {
            diagnostics.push(Diagnostic::error(Some(&page.id), None, "duplicate page id"));
        }
        check_page(page, &mut diagnostics);
    }

    diagnostics
}

fn check_page(page: &PageData, diagnostics: &mut Vec<Diagnostic>) {
    let page_id = Some(page.id.as_str());
    let mut element_ids = HashSet::new();

    for element in &page.elements {
        let id = element.id();

        if id.is_empty() {
            diagnostics.push(Diagnostic::error(page_id, None, "element without id"));
            continue;
        }
        if id == DRAFT_ID {
            diagnostics.push(Diagnostic::error(
                page_id,
                Some(id),
                "reserved draft id in committed document",
            ));
        }
        if !element_ids.insert(id) {
            diagnostics.push(Diagnostic::error(page_id, Some(id), "duplicate element id"));
        }
        if element.base.z_index.is_none() {
            diagnostics.push(Diagnostic::warning(page_id, Some(id), "missing zIndex"));
        }

        if let (Some(options), Some(enabled)) = (element.kind.options(), element.kind.enabled_options()) {
            for option in enabled.iter().filter(|o| !options.contains(o)) {
                diagnostics.push(Diagnostic::warning(
                    page_id,
                    Some(id),
                    format!("enabled option '{}' is not in the option list", option),
                ));
            }
        }
    }
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.level == DiagnosticLevel::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ButtonProps, CanvasElement, ElementKind};

    #[test]
    fn test_clean_document() {
        let pages = vec![PageData::new("p1", "Front")
            .with_elements(vec![CanvasElement::text("t1", "Hi").with_z_index(1)])];
        assert!(check_document(&pages).is_empty());
    }

    #[test]
    fn test_reports_duplicates_and_draft() {
        let pages = vec![
            PageData::new("p1", "Front").with_elements(vec![
                CanvasElement::text("t1", "a").with_z_index(1),
                CanvasElement::text("t1", "b").with_z_index(2),
                CanvasElement::text(DRAFT_ID, "c").with_z_index(3),
            ]),
            PageData::new("p1", "Back"),
        ];

        let diagnostics = check_document(&pages);
        assert!(has_errors(&diagnostics));
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn test_same_element_id_on_two_pages_is_fine() {
        let pages = vec![
            PageData::new("front", "Front").with_elements(vec![CanvasElement::text("t1", "a").with_z_index(1)]),
            PageData::new("back", "Back").with_elements(vec![CanvasElement::text("t1", "b").with_z_index(1)]),
        ];
        assert!(check_document(&pages).is_empty());
    }

    #[test]
    fn test_orphan_enabled_option_is_warning() {
        let button = CanvasElement::new(
            "b1",
            ElementKind::Button(ButtonProps {
                button_options: vec!["Red".into()],
                enabled_options: Some(vec!["Red".into(), "Gold".into()]),
                ..ButtonProps::default()
            }),
        )
        .with_z_index(1);

        let diagnostics = check_document(&[PageData::new("p", "Front").with_elements(vec![button])]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].level, DiagnosticLevel::Warning);
        assert!(!has_errors(&diagnostics));
    }
}
