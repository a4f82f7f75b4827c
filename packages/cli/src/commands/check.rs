use crate::config::DEFAULT_CONFIG_NAME;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use customfly_editor::{link_status, AssetLibrary, LinkStatus};
use customfly_model::{check_document, pages_from_json, Diagnostic, DiagnosticLevel, PageData};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Design file or directory of designs to check
    pub input: PathBuf,

    /// Asset library used to check linked option sets
    #[arg(short, long)]
    pub assets: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
}

pub fn check(args: CheckArgs, _cwd: &str) -> Result<()> {
    let library = match &args.assets {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read assets {}", path.display()))?;
            Some(serde_json::from_str::<AssetLibrary>(&content)?)
        }
        None => None,
    };

    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        find_design_files(&args.input)
    } else {
        anyhow::bail!("Input path does not exist: {}", args.input.display());
    };

    let mut summary = CheckSummary::default();
    for file in &files {
        let diagnostics = check_file(file, library.as_ref());
        summary.files += 1;
        summary.errors += count(&diagnostics, DiagnosticLevel::Error);
        summary.warnings += count(&diagnostics, DiagnosticLevel::Warning);
        print_diagnostics(file, &diagnostics, &args.format)?;
    }

    if args.format != "json" {
        println!(
            "✨ {} Checked {} file(s)",
            if summary.errors > 0 {
                "Done".red().bold()
            } else {
                "Done".green().bold()
            },
            summary.files
        );
        if summary.errors > 0 {
            println!("   {} {}", "Errors:".red(), summary.errors);
        }
        if summary.warnings > 0 {
            println!("   {} {}", "Warnings:".yellow(), summary.warnings);
        }
        if summary.errors == 0 && summary.warnings == 0 {
            println!("   {} No issues found!", "✓".green());
        }
    }

    if summary.errors > 0 {
        anyhow::bail!("{} error(s) found", summary.errors);
    }
    Ok(())
}

/// Diagnostics for one design file; unreadable files become a single error
pub fn check_file(path: &Path, library: Option<&AssetLibrary>) -> Vec<Diagnostic> {
    let pages = match fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|content| pages_from_json(&content).map_err(anyhow::Error::from))
    {
        Ok(pages) => pages,
        Err(err) => {
            return vec![Diagnostic {
                level: DiagnosticLevel::Error,
                page_id: None,
                element_id: None,
                message: format!("failed to load design: {}", err),
            }]
        }
    };

    let mut diagnostics = check_document(&pages);
    if let Some(library) = library {
        diagnostics.extend(check_links(&pages, library));
    }
    diagnostics
}

/// Warnings for option elements whose linked set is gone or has changed
pub fn check_links(pages: &[PageData], library: &AssetLibrary) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for page in pages {
        for element in &page.elements {
            let message = match link_status(element, library) {
                LinkStatus::Orphaned => "linked option set no longer exists",
                LinkStatus::Stale => "linked option set has changed since it was linked",
                LinkStatus::Unlinked | LinkStatus::Synced => continue,
            };
            diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Warning,
                page_id: Some(page.id.clone()),
                element_id: Some(element.id().to_string()),
                message: message.to_string(),
            });
        }
    }
    diagnostics
}

fn count(diagnostics: &[Diagnostic], level: DiagnosticLevel) -> usize {
    diagnostics.iter().filter(|d| d.level == level).count()
}

fn print_diagnostics(file: &Path, diagnostics: &[Diagnostic], format: &str) -> Result<()> {
    if format == "json" {
        let json = serde_json::json!({
            "file": file.display().to_string(),
            "diagnostics": diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    if diagnostics.is_empty() {
        println!("{} {}", "✓".green(), file.display());
        return Ok(());
    }

    println!("{}", file.display());
    for diagnostic in diagnostics {
        let level_str = match diagnostic.level {
            DiagnosticLevel::Error => "error".red().bold(),
            DiagnosticLevel::Warning => "warning".yellow().bold(),
        };
        let location = match (&diagnostic.page_id, &diagnostic.element_id) {
            (Some(page), Some(element)) => format!("{}/{}", page, element),
            (Some(page), None) => page.clone(),
            (None, _) => "document".to_string(),
        };
        println!("  {} [{}] {}", level_str, location, diagnostic.message);
    }
    println!();
    Ok(())
}

fn find_design_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| {
            path.is_file()
                && path.extension().map(|e| e == "json").unwrap_or(false)
                && path.file_name().map(|n| n != DEFAULT_CONFIG_NAME).unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}
