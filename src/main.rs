use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use wireup::backup_manager::BackupManager;
use wireup::cli::{parse_args, Args};
use wireup::config::{self, Config};
use wireup::diff_formatter::DiffFormatter;
use wireup::file_patcher::FilePatcher;
use wireup::logger;
use wireup::patch::PatchOutcome;
use wireup::patches;

fn main() -> Result<()> {
    let args = parse_args()?;

    match args {
        Args::Apply {
            patches,
            frontend_root,
            dry_run,
            interactive,
            strict,
            context,
            no_backup,
            backup_dir,
        } => {
            run_apply(
                &patches,
                frontend_root.as_deref(),
                dry_run,
                interactive,
                strict,
                context,
                no_backup,
                backup_dir,
            )?;
        }
        Args::Rollback { id } => {
            rollback(id)?;
        }
        Args::History => {
            show_history()?;
        }
        Args::Status => {
            show_status()?;
        }
        Args::Config { show } => {
            edit_config(show)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_apply(
    patch_names: &[String],
    frontend_root: Option<&str>,
    dry_run: bool,
    interactive: bool,
    strict: bool,
    context: usize,
    no_backup: bool,
    backup_dir: Option<String>,
) -> Result<()> {
    let cfg = config::load_config()?;
    config::validate_config(&cfg)?;

    let _log_path = logger::init_debug_logging(cfg.logging.debug.unwrap_or(false))?;

    let selected = patches::select_patches(patch_names)?;

    let root = config::resolve_frontend_root(frontend_root, &cfg);
    let patcher = FilePatcher::new(root);
    patcher.check_root()?;

    tracing::info!(
        frontend_root = %patcher.frontend_root().display(),
        patches = selected.len(),
        dry_run,
        "starting run"
    );

    // Preview every patch before touching anything
    let mut reports = Vec::new();
    for patch in &selected {
        reports.push(patcher.preview(patch)?);
    }

    if dry_run {
        print!("{}", DiffFormatter::format_dry_run_header());
    }

    for report in &reports {
        print!("{}", DiffFormatter::format_report(report, context));
    }

    let applied = reports.iter().filter(|r| r.outcome == PatchOutcome::Applied).count();
    let already = reports
        .iter()
        .filter(|r| r.outcome == PatchOutcome::AlreadyApplied)
        .count();
    let missing = reports
        .iter()
        .filter(|r| r.outcome == PatchOutcome::TargetMissing)
        .count();

    print!("{}", DiffFormatter::format_summary(applied, already, missing));

    if missing > 0 {
        for report in reports.iter().filter(|r| r.outcome == PatchOutcome::TargetMissing) {
            eprintln!(
                "Could not find the code block for patch '{}' in {}",
                report.patch_name,
                report.file_path.display()
            );
        }
        if strict {
            anyhow::bail!("{} patch target(s) missing (--strict)", missing);
        }
    }

    if applied == 0 {
        println!("Nothing to do.");
        return Ok(());
    }

    if dry_run {
        return Ok(());
    }

    // Interactive mode: ask for confirmation
    if interactive {
        print!("Apply changes? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim().to_lowercase();
        if input != "y" && input != "yes" {
            println!("Changes not applied.");
            return Ok(());
        }
    }

    // Back up the files we are about to rewrite
    let mut backup_id = None;
    if !no_backup {
        let mut backup_manager = backup_manager_from(&cfg, backup_dir)?;

        let names: Vec<String> = reports
            .iter()
            .filter(|r| r.outcome == PatchOutcome::Applied)
            .map(|r| r.patch_name.clone())
            .collect();
        let files: Vec<PathBuf> = reports
            .iter()
            .filter(|r| r.outcome == PatchOutcome::Applied)
            .map(|r| r.file_path.clone())
            .collect();

        backup_id = Some(backup_manager.create_backup(&names, &files)?);
    }

    for report in &reports {
        patcher.apply(report)?;
    }

    println!("\nApplied {} patch{}.", applied, if applied == 1 { "" } else { "es" });
    if let Some(id) = backup_id {
        println!("Backup ID: {}", id);
        println!("Rollback with: wireup rollback {}", id);
    }

    Ok(())
}

fn backup_manager_from(cfg: &Config, cli_dir: Option<String>) -> Result<BackupManager> {
    let dir = cli_dir.or_else(|| cfg.backup.backup_dir.clone());

    let mut manager = match dir {
        Some(dir) => BackupManager::with_directory(dir)?,
        None => BackupManager::new()?,
    };

    if let Some(max) = cfg.backup.max_backups {
        manager.set_max_backups(max);
    }

    Ok(manager)
}

fn rollback(id: Option<String>) -> Result<()> {
    let cfg = config::load_config()?;
    let backup_manager = backup_manager_from(&cfg, None)?;

    let backup_id = match id {
        Some(id) => id,
        None => match backup_manager.get_last_backup_id()? {
            Some(id) => {
                println!("Rolling back last run: {}\n", id);
                id
            }
            None => {
                anyhow::bail!("No backups found to rollback");
            }
        },
    };

    backup_manager.restore_backup(&backup_id)?;
    println!("\nRollback complete");

    Ok(())
}

fn show_history() -> Result<()> {
    let cfg = config::load_config()?;
    let backup_manager = backup_manager_from(&cfg, None)?;
    let backups = backup_manager.list_backups()?;

    let output = DiffFormatter::format_history(backups);
    println!("{}", output);

    Ok(())
}

fn show_status() -> Result<()> {
    let cfg = config::load_config()?;
    let root = config::resolve_frontend_root(None, &cfg);

    println!("Frontend root: {}", root.display());
    if !root.is_dir() {
        println!("  (directory not found; see --frontend-root)");
    }

    let backup_manager = backup_manager_from(&cfg, None)?;
    let backups = backup_manager.list_backups()?;

    println!("Backup directory: {}", backup_manager.backups_dir().display());
    println!("Total backups: {}\n", backups.len());

    if let Some(last) = backups.last() {
        println!("Last run:");
        println!("  ID: {}", last.id);
        println!("  Time: {}", last.timestamp.format("%Y-%m-%d %H:%M:%S"));
        println!("  Patches: {}", last.patches.join(", "));
    }

    Ok(())
}

fn edit_config(show: bool) -> Result<()> {
    let config_path = config::config_file_path()?;

    if !config_path.exists() {
        config::save_default_config()?;
    }

    if show {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        println!("# {}\n", config_path.display());
        print!("{}", content);
        return Ok(());
    }

    let previous = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    let editor = find_editor()?;
    let status = std::process::Command::new(&editor)
        .arg(&config_path)
        .status()
        .with_context(|| format!("Failed to launch editor: {}", editor.display()))?;

    if !status.success() {
        anyhow::bail!("Editor exited with an error; configuration not validated");
    }

    // Validate the edited file; keep the previous content on failure
    let edited = fs::read_to_string(&config_path)?;
    let validation = toml::from_str::<Config>(&edited)
        .map_err(anyhow::Error::from)
        .and_then(|cfg| config::validate_config(&cfg));

    match validation {
        Ok(()) => {
            println!("Configuration updated.");
            Ok(())
        }
        Err(e) => {
            fs::write(&config_path, previous).with_context(|| {
                format!("Failed to restore config file: {}", config_path.display())
            })?;
            anyhow::bail!("Invalid configuration: {}\nPrevious configuration restored.", e)
        }
    }
}

fn find_editor() -> Result<PathBuf> {
    for var in ["VISUAL", "EDITOR"] {
        if let Ok(value) = env::var(var) {
            if !value.trim().is_empty() {
                return Ok(PathBuf::from(value));
            }
        }
    }

    for candidate in ["nano", "vi"] {
        if let Ok(path) = which::which(candidate) {
            return Ok(path);
        }
    }

    anyhow::bail!("No editor found. Set $EDITOR or install nano/vi.")
}
