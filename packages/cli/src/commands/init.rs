use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use customfly_model::{
    pages_to_json, CanvasElement, ElementLogic, PageData, RuleOperator, VisibilityRule,
};
use std::fs;
use std::path::PathBuf;

pub const EXAMPLE_DESIGN_NAME: &str = "design.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory designs are saved to
    #[arg(short, long, default_value = ".customfly/designs")]
    pub store_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Customfly project...".bright_blue().bold());

    let example_file = PathBuf::from(cwd).join(EXAMPLE_DESIGN_NAME);
    if !example_file.exists() {
        fs::write(&example_file, pages_to_json(&example_design())?)?;
        println!("  {} Created {}", "✓".green(), EXAMPLE_DESIGN_NAME);
    }

    let config = Config {
        store_dir: args.store_dir.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: customfly check {}", EXAMPLE_DESIGN_NAME);
    println!("  2. Run: customfly visibility {} --catalog catalog.json", EXAMPLE_DESIGN_NAME);
    println!("  3. Saved designs land in {}/", args.store_dir);

    Ok(())
}

/// One side with a name field and an engraving shown only for one finish
fn example_design() -> Vec<PageData> {
    let engraving = CanvasElement::text("engraving", "Your text here")
        .with_position(40.0, 120.0)
        .with_z_index(2)
        .with_logic(ElementLogic::show_when_all(vec![VisibilityRule::option(
            "rule-finish",
            "Finish",
            RuleOperator::Equals,
            "Engraved",
        )]));

    vec![PageData::new("front", "Side 1").with_elements(vec![
        CanvasElement::text("name", "Name").with_position(40.0, 40.0).with_z_index(1),
        engraving,
    ])]
}
