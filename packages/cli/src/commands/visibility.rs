use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use customfly_model::{is_visible, pages_from_json, Catalog, CatalogSelection, PageData};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct VisibilityArgs {
    /// Design file to evaluate
    pub design: PathBuf,

    /// Product catalog (options and variants)
    #[arg(short, long)]
    pub catalog: PathBuf,

    /// Selected variant id
    #[arg(long)]
    pub variant: Option<String>,

    /// Selected option value, e.g. --option Color=Red (repeatable)
    #[arg(long = "option", value_parser = parse_option)]
    pub options: Vec<(String, String)>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementVisibility {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVisibility {
    pub page_id: String,
    pub name: String,
    pub elements: Vec<ElementVisibility>,
}

pub fn visibility(args: VisibilityArgs, _cwd: &str) -> Result<()> {
    let content = fs::read_to_string(&args.design)
        .with_context(|| format!("Failed to read design {}", args.design.display()))?;
    let pages = pages_from_json(&content)?;

    let content = fs::read_to_string(&args.catalog)
        .with_context(|| format!("Failed to read catalog {}", args.catalog.display()))?;
    let catalog: Catalog = serde_json::from_str(&content)?;

    let selection = build_selection(&catalog, args.variant.as_deref(), &args.options, &pages);
    tracing::debug!(variant = ?selection.variant_id, options = selection.options.len(), "evaluating visibility");

    let report = evaluate(&pages, &selection);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &selection.variant_id {
        Some(variant) => println!("Variant: {}", variant.bright_white()),
        None => println!("Variant: {}", "none".dimmed()),
    }
    for page in &report {
        println!();
        println!("{} ({})", page.name.bold(), page.page_id);
        for element in &page.elements {
            let mark = if element.visible {
                "✓ visible".green()
            } else {
                "✗ hidden ".red()
            };
            println!("  {}  {} {}", mark, element.id, element.element_type.dimmed());
        }
    }
    Ok(())
}

/// Selection for a variant, with explicit options layered on top.
///
/// With options but no variant, the matching variant (if any) is selected.
pub fn build_selection(
    catalog: &Catalog,
    variant: Option<&str>,
    options: &[(String, String)],
    pages: &[PageData],
) -> CatalogSelection {
    let mut selection = match variant {
        Some(variant) => catalog.selection_for_variant(variant),
        None => CatalogSelection::default(),
    };
    for (name, value) in options {
        selection = selection.with_option(name.clone(), value.clone());
    }
    if variant.is_none() && !options.is_empty() {
        if let Some(found) = catalog.variant_for_options(&selection.options) {
            selection.variant_id = Some(found.id.clone());
        }
    }
    selection.with_element_values_from(pages)
}

/// Every element's visibility, per page in paint order
pub fn evaluate(pages: &[PageData], selection: &CatalogSelection) -> Vec<PageVisibility> {
    pages
        .iter()
        .map(|page| PageVisibility {
            page_id: page.id.clone(),
            name: page.name.clone(),
            elements: page
                .paint_order()
                .into_iter()
                .map(|element| ElementVisibility {
                    id: element.id().to_string(),
                    element_type: element.element_type().as_str().to_string(),
                    visible: is_visible(element, selection),
                })
                .collect(),
        })
        .collect()
}

fn parse_option(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}
