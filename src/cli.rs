//! Command-line interface
//!
//! Every command loads the file, acts on the document and (for edits) saves
//! it back atomically. Validation issues block saves unless `--force` is given
//! or `[save] block_on_issues = false` is set in the preferences.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, WrapErr};
use color_eyre::Result;
use tracing::{info, warn};

use gamecfg_app::config::{self, Preferences};
use gamecfg_app::games::{self, GameModule, GAMES};
use gamecfg_app::{interchange, io, LoadOptions, SettingsDocument};
use gamecfg_core::{Catalog, ValidationIssue};

/// gamecfg - Catalog-driven editor for game-server OptionSettings files
#[derive(Parser, Debug)]
#[command(name = "gamecfg", version)]
#[command(about = "Inspect, validate and edit game-server OptionSettings files", long_about = None)]
pub struct Args {
    /// Game id (skips detection)
    #[arg(long, global = true, value_name = "ID")]
    pub game: Option<String>,

    /// Save even when validation issues remain
    #[arg(long, global = true)]
    pub force: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show every setting grouped by category
    Show {
        file: PathBuf,

        /// Only show this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Print the raw value of one setting
    Get { file: PathBuf, name: String },

    /// Set one or more settings (NAME=VALUE)
    Set {
        file: PathBuf,

        #[arg(required = true, value_name = "NAME=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
    },

    /// Report validation issues
    Validate { file: PathBuf },

    /// Restore a setting, or every setting, to the catalog default
    Reset {
        file: PathBuf,

        #[arg(conflicts_with = "all", required_unless_present = "all")]
        name: Option<String>,

        /// Replace the whole block with the catalog defaults
        #[arg(long)]
        all: bool,
    },

    /// Export settings as JSON
    Export {
        file: PathBuf,

        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge settings from a JSON export
    Import { file: PathBuf, json: PathBuf },

    /// List supported games
    Games,

    /// Describe the settings catalog
    Catalog,
}

fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing setting name in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Run the parsed command
pub fn run(args: Args) -> Result<()> {
    let mut prefs = config::load_preferences();
    let options = LoadOptions {
        game: args.game.clone(),
        catalog_overrides: prefs.catalog.overrides.clone(),
    };

    match &args.command {
        Command::Show { file, category } => {
            let (doc, issues) = open(file, &options, &mut prefs)?;
            show(&doc, &issues, category.as_deref());
        }

        Command::Get { file, name } => {
            let (doc, _) = open(file, &options, &mut prefs)?;
            let value = doc
                .get(name)
                .ok_or_else(|| eyre!("'{}' is not set in {}", name, file.display()))?;
            println!("{}", value);
        }

        Command::Set { file, assignments } => {
            let (mut doc, _) = open(file, &options, &mut prefs)?;
            for (name, value) in assignments {
                doc.set_raw(name, value.as_str())?;
            }
            save(&mut doc, file, &prefs, args.force)?;
        }

        Command::Validate { file } => {
            let (_, issues) = open(file, &options, &mut prefs)?;
            if !issues.is_empty() {
                print_issues(&issues);
                bail!("{} validation issue(s) in {}", issues.len(), file.display());
            }
            println!("No issues found");
        }

        Command::Reset { file, name, all } => {
            let (mut doc, _) = open(file, &options, &mut prefs)?;
            match name {
                Some(name) if !all => doc.reset(name)?,
                _ => doc.reset_all(),
            }
            save(&mut doc, file, &prefs, args.force)?;
        }

        Command::Export { file, output } => {
            let (doc, _) = open(file, &options, &mut prefs)?;
            let export = interchange::export(&doc);
            match output {
                Some(path) => {
                    interchange::write_export(&export, path)?;
                    println!("Exported {} settings to {}", export.settings.len(), path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&export)?),
            }
        }

        Command::Import { file, json } => {
            let (mut doc, _) = open(file, &options, &mut prefs)?;
            let export = interchange::read_export(json)
                .wrap_err_with(|| format!("Cannot import {}", json.display()))?;

            let report = interchange::import(&mut doc, &export);
            if let Some(game) = &report.game_mismatch {
                println!(
                    "Warning: export was made for '{}', importing into {}",
                    game,
                    doc.game().display_name
                );
            }
            for name in &report.skipped_unknown {
                println!("Skipped unknown setting {}", name);
            }
            for (name, reason) in &report.rejected {
                println!("Rejected {}: {}", name, reason);
            }
            println!("Applied {} setting(s)", report.applied.len());

            save(&mut doc, file, &prefs, args.force)?;
        }

        Command::Games => {
            for game in GAMES {
                println!("{:<12} {}", game.id, game.display_name);
            }
        }

        Command::Catalog => {
            let selected: Vec<&'static GameModule> = match &args.game {
                Some(id) => vec![games::find_game(id)?],
                None => GAMES.iter().collect(),
            };
            for game in selected {
                let catalog = game.load_catalog_with(&prefs.catalog.overrides)?;
                println!("# {} ({} settings)", game.display_name, catalog.len());
                print_catalog(&catalog);
            }
        }
    }

    Ok(())
}

fn open(
    file: &Path,
    options: &LoadOptions,
    prefs: &mut Preferences,
) -> Result<(SettingsDocument, Vec<ValidationIssue>)> {
    let loaded = io::load_with(file, options)
        .wrap_err_with(|| format!("Cannot open {}", file.display()))?;

    if config::remember_directory(prefs, file) {
        if let Err(e) = config::save_preferences(prefs) {
            warn!("Could not record last directory: {}", e);
        }
    }
    Ok(loaded)
}

fn save(doc: &mut SettingsDocument, file: &Path, prefs: &Preferences, force: bool) -> Result<()> {
    if !doc.is_modified() {
        println!("Nothing to save");
        return Ok(());
    }

    let issues = doc.validate();
    if !issues.is_empty() {
        print_issues(&issues);
        if prefs.save.block_on_issues && !force {
            bail!(
                "Not saved: {} validation issue(s); use --force to save anyway",
                issues.len()
            );
        }
        warn!("Saving {} with {} validation issue(s)", file.display(), issues.len());
    }

    let changed = doc.changed_keys().len();
    io::save(doc, file).wrap_err_with(|| format!("Cannot save {}", file.display()))?;
    info!("{} setting(s) changed in {}", changed, file.display());
    println!("Saved {} ({} change(s))", file.display(), changed);
    Ok(())
}

fn show(doc: &SettingsDocument, issues: &[ValidationIssue], only: Option<&str>) {
    let catalog = doc.catalog();
    for category in catalog.categories() {
        if only.is_some_and(|c| !c.eq_ignore_ascii_case(category)) {
            continue;
        }

        let present: Vec<_> = catalog
            .by_category(category)
            .filter_map(|def| doc.get(&def.name).map(|v| (def, v)))
            .collect();
        if present.is_empty() {
            continue;
        }

        println!("[{}]", category);
        for (def, value) in present {
            let flag = if issues.iter().any(|i| i.setting == def.name) {
                "  !"
            } else {
                ""
            };
            println!("  {:<40} = {}{}", def.name, value, flag);
        }
        println!();
    }

    let unknown: Vec<_> = doc.passthrough_keys().collect();
    if !unknown.is_empty() && only.is_none() {
        println!("[Unknown]");
        for key in unknown {
            println!("  {:<40} = {}", key, doc.get(key).unwrap_or_default());
        }
        println!();
    }

    if !issues.is_empty() {
        print_issues(issues);
    }
}

fn print_issues(issues: &[ValidationIssue]) {
    for issue in issues {
        eprintln!("warning: {}", issue);
    }
}

fn print_catalog(catalog: &Catalog) {
    for def in catalog {
        let mut constraint = String::new();
        match (def.min, def.max) {
            (Some(min), Some(max)) => constraint = format!(" [{}..{}]", min, max),
            (Some(min), None) => constraint = format!(" [>= {}]", min),
            (None, Some(max)) => constraint = format!(" [<= {}]", max),
            (None, None) => {}
        }
        if !def.options.is_empty() {
            constraint = format!(" {{{}}}", def.options.join("|"));
        }

        println!(
            "{:<40} {:<6} default={}{}",
            def.name,
            def.kind,
            def.default_raw(),
            constraint
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("ExpRate=2.5").unwrap(),
            ("ExpRate".to_string(), "2.5".to_string())
        );
        assert_eq!(
            parse_assignment("ServerName=a=b").unwrap(),
            ("ServerName".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_assignment("ServerPassword=").unwrap().1,
            String::new()
        );
        assert!(parse_assignment("ExpRate").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "gamecfg",
            "--game",
            "palworld",
            "set",
            "PalWorldSettings.ini",
            "ExpRate=2",
            "bIsPvP=True",
            "--force",
        ])
        .unwrap();

        assert_eq!(args.game.as_deref(), Some("palworld"));
        assert!(args.force);
        match args.command {
            Command::Set { assignments, .. } => assert_eq!(assignments.len(), 2),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_reset_requires_name_or_all() {
        assert!(Args::try_parse_from(["gamecfg", "reset", "f.ini"]).is_err());
        assert!(Args::try_parse_from(["gamecfg", "reset", "f.ini", "--all"]).is_ok());
        assert!(Args::try_parse_from(["gamecfg", "reset", "f.ini", "ExpRate"]).is_ok());
    }
}
