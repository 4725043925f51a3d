use anyhow::Result;
use clap::{Parser, Subcommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "

love-space maintenance tooling
License: MIT
Rust Edition: 2024"
);

#[derive(Parser)]
#[command(name = "wireup")]
#[command(about = "Wire the avatar-upload endpoint into the love-space frontend")]
#[command(long_about = "wireup applies the source patches that connect the new /users/avatar
endpoint to the frontend: the API client gains a user.uploadAvatar call, and
the profile view switches its avatar handler over to it.

Every patch is idempotent: files that already carry the change are skipped,
and files where the expected code cannot be found are left byte-identical.
Modified files are backed up first, so any run can be undone.

PATCHES:
  api-upload-avatar        Add user.uploadAvatar to src/api/index.js
  profile-avatar-handler   Rewire the handler in src/views/Profile.vue

EXAMPLES:
  wireup                                Apply all patches
  wireup --dry-run                      Preview without touching files
  wireup --patch api-upload-avatar      Apply a single patch
  wireup --frontend-root ../fe          Use a non-default checkout location
  wireup --strict                       Fail when expected code is missing
  wireup rollback                       Undo the last run")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = LONG_VERSION)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the frontend checkout
    #[arg(long, value_name = "DIR")]
    #[arg(help = "Path to the love-space frontend checkout\nDefault: ../love-space-frontend (or [frontend] root from the config)")]
    frontend_root: Option<String>,

    /// Apply only the named patch (repeatable)
    #[arg(long = "patch", value_name = "NAME")]
    #[arg(help = "Apply only the named patch; may be given more than once\nDefault: all patches")]
    patches: Vec<String>,

    /// Dry run mode (preview changes without applying)
    #[arg(short = 'd', long)]
    #[arg(help = "Preview changes without modifying files")]
    dry_run: bool,

    /// Interactive mode (ask before applying changes)
    #[arg(short = 'i', long)]
    #[arg(help = "Show the diff and ask for confirmation before applying.")]
    interactive: bool,

    /// Treat missing anchors/blocks as errors
    #[arg(long)]
    #[arg(help = "Fail with a non-zero exit when a patch target cannot be found\nDefault: print a diagnostic and leave the file untouched")]
    strict: bool,

    /// Number of context lines to show in diffs (default: 2)
    #[arg(short = 'n', long, value_name = "NUM")]
    #[arg(help = "Number of unchanged lines to show around each change")]
    context: Option<usize>,

    /// Skip backup creation (requires --force)
    #[arg(long = "no-backup", requires = "force")]
    #[arg(help = "Skip creating a backup (requires --force)\nRecommended only when the frontend checkout is clean under version control")]
    no_backup: bool,

    /// Force dangerous operations (use with --no-backup)
    #[arg(long = "force", requires = "no_backup")]
    #[arg(help = "Confirms you understand --no-backup cannot be undone")]
    force: bool,

    /// Custom backup directory
    #[arg(long, value_name = "DIR")]
    #[arg(help = "Use custom directory for backups\nDefault: ~/.wireup/backups/")]
    backup_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rollback a previous run
    #[command(long_about = "Restore the patched files from a backup.

If no backup ID is specified, rolls back the most recent run.
Use 'wireup history' to see all available backups.

EXAMPLES:
  wireup rollback                   Rollback last run
  wireup rollback 20250110-120000   Rollback a specific backup")]
    Rollback {
        /// Backup ID to rollback (optional, defaults to last run)
        #[arg(value_name = "ID")]
        id: Option<String>,
    },

    /// Show run history
    #[command(long_about = "Display a log of past wireup runs.

Shows timestamp, patches applied, files touched, and backup ID for each run.")]
    History,

    /// Show frontend root and backup status
    #[command(long_about = "Display the resolved frontend root, backup directory location,
and details of the most recent run.")]
    Status,

    /// Edit configuration file
    #[command(long_about = "Open the configuration file (~/.wireup/config.toml) in a text editor.
If the file doesn't exist, a default one will be created.

After saving and exiting, the configuration is validated; errors are
reported and the previous file is kept.

CONFIGURATION OPTIONS:
  [frontend]
    root = \"../love-space-frontend\"   # Frontend checkout location

  [backup]
    max_backups = 50                  # Backups kept before pruning
    backup_dir = \"/path\"              # Custom backup directory (optional)

  [logging]
    debug = false                     # Log operations to ~/.wireup/wireup.log

EXAMPLES:
  wireup config                     Edit configuration
  wireup config --show              Show current configuration")]
    Config {
        /// Show current configuration without editing
        #[arg(long = "show")]
        show: bool,
    },
}

pub fn parse_args() -> Result<Args> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Rollback { id }) => Ok(Args::Rollback { id }),
        Some(Commands::History) => Ok(Args::History),
        Some(Commands::Status) => Ok(Args::Status),
        Some(Commands::Config { show }) => Ok(Args::Config { show }),
        None => {
            // Default context size; the config file may override it later.
            let context = cli.context.unwrap_or(2);

            Ok(Args::Apply {
                patches: cli.patches,
                frontend_root: cli.frontend_root,
                dry_run: cli.dry_run,
                interactive: cli.interactive,
                strict: cli.strict,
                context,
                no_backup: cli.no_backup,
                backup_dir: cli.backup_dir,
            })
        }
    }
}

#[derive(Debug)]
pub enum Args {
    Apply {
        patches: Vec<String>,
        frontend_root: Option<String>,
        dry_run: bool,
        interactive: bool,
        strict: bool,
        context: usize,
        no_backup: bool,
        backup_dir: Option<String>,
    },
    Rollback {
        id: Option<String>,
    },
    History,
    Status,
    Config {
        show: bool,
    },
}
