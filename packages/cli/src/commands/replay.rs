use crate::config::Config;
use crate::store::FileStore;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use customfly_autosave::{AutosaveScheduler, Designer};
use customfly_editor::{EditSession, Mutation, MutationResult};
use customfly_model::{pages_from_json, pages_to_json};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Design file to start from
    pub design: PathBuf,

    /// JSON array of mutations to apply in order
    pub mutations: PathBuf,

    /// Undo this many steps after replaying
    #[arg(long, default_value_t = 0)]
    pub undo: usize,

    /// Redo this many steps after undoing
    #[arg(long, default_value_t = 0)]
    pub redo: usize,

    /// Persist the result to the design store
    #[arg(long)]
    pub save: bool,

    /// Design name used when saving
    #[arg(long, default_value = "Untitled design")]
    pub name: String,

    /// Existing design id to overwrite when saving
    #[arg(long)]
    pub id: Option<String>,

    /// Editor settings (JSON object) saved alongside the design
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub skipped: usize,
    pub undone: usize,
    pub redone: usize,
}

impl ReplaySummary {
    fn count(&mut self, result: &MutationResult) {
        if result.is_applied() {
            self.applied += 1;
        } else {
            self.skipped += 1;
        }
    }
}

pub async fn replay(args: ReplayArgs, config: &Config, cwd: &str) -> Result<()> {
    let content = fs::read_to_string(&args.design)
        .with_context(|| format!("Failed to read design {}", args.design.display()))?;
    let pages = pages_from_json(&content)?;

    let content = fs::read_to_string(&args.mutations)
        .with_context(|| format!("Failed to read mutations {}", args.mutations.display()))?;
    let mutations: Vec<Mutation> = serde_json::from_str(&content)?;

    let session = EditSession::new(pages, config.history.clone());

    let (session, summary) = if args.save {
        let store = FileStore::new(config.get_store_dir(cwd));
        eprintln!("💾 Saving to {}", store.dir().display());

        let autosave = AutosaveScheduler::spawn(Arc::new(store), &config.autosave, args.id.clone());
        let mut designer = Designer::new(session, autosave, args.name.clone());
        if let Some(path) = &args.settings {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings {}", path.display()))?;
            designer = designer.with_config(serde_json::from_str(&content)?);
        }

        let mut summary = ReplaySummary::default();
        for mutation in mutations {
            let result = designer.apply(mutation);
            summary.count(&result);
        }
        summary.undone = repeat(args.undo, || designer.undo());
        summary.redone = repeat(args.redo, || designer.redo());

        designer.save_now().await?;
        let (session, status) = designer.close().await?;

        if let Some(error) = &status.last_error {
            anyhow::bail!("Save failed: {}", error);
        }
        match &status.design_id {
            Some(id) => eprintln!("  {} Saved design {}", "✓".green(), id.bright_white()),
            None => eprintln!("  {} Nothing to save", "•".dimmed()),
        }
        (session, summary)
    } else {
        let mut session = session;
        let summary = replay_session(&mut session, mutations, args.undo, args.redo);
        (session, summary)
    };

    eprintln!(
        "✨ {} {} applied, {} skipped, {} undone, {} redone (revision {})",
        "Replayed".green().bold(),
        summary.applied,
        summary.skipped,
        summary.undone,
        summary.redone,
        session.revision()
    );

    println!("{}", pages_to_json(session.pages())?);
    Ok(())
}

/// Apply `mutations`, then undo and redo up to the given counts
pub fn replay_session(
    session: &mut EditSession,
    mutations: Vec<Mutation>,
    undo: usize,
    redo: usize,
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for mutation in mutations {
        let result = session.apply(mutation);
        summary.count(&result);
    }
    summary.undone = repeat(undo, || session.undo());
    summary.redone = repeat(redo, || session.redo());
    summary
}

/// Run `step` up to `times` times, stopping at the first `false`
fn repeat(times: usize, mut step: impl FnMut() -> bool) -> usize {
    (0..times).take_while(|_| step()).count()
}
