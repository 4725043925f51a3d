use crate::backup_manager::BackupMetadata;
use crate::file_patcher::PatchReport;
use crate::patch::PatchOutcome;
use colored::*;
use similar::{ChangeTag, TextDiff};
use std::io::IsTerminal;

pub struct DiffFormatter;

impl DiffFormatter {
    /// Auto-detect if we should use colors
    fn should_use_color() -> bool {
        // Check NO_COLOR env var (https://no-color.org/)
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }

        std::io::stdout().is_terminal()
    }

    /// Format the preview of one patch: file header plus a line diff of the
    /// pending change, or a note when there is nothing to do.
    pub fn format_report(report: &PatchReport, context_size: usize) -> String {
        Self::format_report_with(report, context_size, Self::should_use_color())
    }

    pub fn format_report_with(
        report: &PatchReport,
        context_size: usize,
        use_color: bool,
    ) -> String {
        let mut output = String::new();

        let header = format!("{} ({})", report.file_path.display(), report.patch_name);
        if use_color {
            output.push_str(&format!("{}\n", header.bold().cyan()));
        } else {
            output.push_str(&format!("{}\n", header));
        }

        match report.outcome {
            PatchOutcome::AlreadyApplied => {
                let note = "already applied, skipping";
                if use_color {
                    output.push_str(&format!("{}\n", note.dimmed()));
                } else {
                    output.push_str(&format!("{}\n", note));
                }
            }
            PatchOutcome::TargetMissing => {
                let note = "expected code not found; file left unchanged";
                if use_color {
                    output.push_str(&format!("{}\n", note.yellow().bold()));
                } else {
                    output.push_str(&format!("{}\n", note));
                }
            }
            PatchOutcome::Applied => {
                let new_content = report
                    .new_content
                    .as_deref()
                    .unwrap_or(&report.old_content);
                output.push_str(&Self::format_line_diff(
                    &report.old_content,
                    new_content,
                    context_size,
                    use_color,
                ));
            }
        }

        output.push('\n');
        output
    }

    fn format_line_diff(
        old: &str,
        new: &str,
        context_size: usize,
        use_color: bool,
    ) -> String {
        let diff = TextDiff::from_lines(old, new);
        let mut output = String::new();
        let mut added = 0usize;
        let mut deleted = 0usize;

        for (group_index, group) in diff.grouped_ops(context_size).iter().enumerate() {
            if group_index > 0 {
                if use_color {
                    output.push_str(&format!("{}\n", "...".dimmed()));
                } else {
                    output.push_str("...\n");
                }
            }

            for op in group {
                for change in diff.iter_changes(op) {
                    let line = change.value().trim_end_matches('\n');
                    let (sign, line_number) = match change.tag() {
                        ChangeTag::Delete => {
                            deleted += 1;
                            ("-", change.old_index().map(|i| i + 1))
                        }
                        ChangeTag::Insert => {
                            added += 1;
                            ("+", change.new_index().map(|i| i + 1))
                        }
                        ChangeTag::Equal => ("=", change.new_index().map(|i| i + 1)),
                    };
                    let line_number = line_number.unwrap_or(0);

                    if use_color {
                        let rendered = match change.tag() {
                            ChangeTag::Delete => {
                                format!("L{}: {} {}\n", line_number, sign.red().bold(), line.red())
                            }
                            ChangeTag::Insert => format!(
                                "L{}: {} {}\n",
                                line_number,
                                sign.green().bold(),
                                line.green().bold()
                            ),
                            ChangeTag::Equal => format!(
                                "L{}: {} {}\n",
                                line_number,
                                sign.dimmed(),
                                line.dimmed()
                            ),
                        };
                        output.push_str(&rendered);
                    } else {
                        output.push_str(&format!("L{}: {} {}\n", line_number, sign, line));
                    }
                }
            }
        }

        let total = added + deleted;
        if use_color {
            output.push_str(&format!(
                "\nTotal: {} line{} ({} {}, {} {})\n",
                total.to_string().bold().white(),
                if total == 1 { "" } else { "s" },
                added,
                "added".green(),
                deleted,
                "deleted".red()
            ));
        } else {
            output.push_str(&format!(
                "\nTotal: {} line{} ({} added, {} deleted)\n",
                total,
                if total == 1 { "" } else { "s" },
                added,
                deleted
            ));
        }

        output
    }

    /// Format dry run header
    pub fn format_dry_run_header() -> String {
        if Self::should_use_color() {
            format!("{}\n\n", "🔍 Dry run (no files will be modified)".bold().cyan())
        } else {
            "Dry run (no files will be modified)\n\n".to_string()
        }
    }

    /// One-line summary for the whole run
    pub fn format_summary(applied: usize, already_applied: usize, missing: usize) -> String {
        Self::format_summary_with(applied, already_applied, missing, Self::should_use_color())
    }

    pub fn format_summary_with(
        applied: usize,
        already_applied: usize,
        missing: usize,
        use_color: bool,
    ) -> String {
        let mut parts = Vec::new();
        if use_color {
            parts.push(format!("{} {}", applied, "applied".green()));
            if already_applied > 0 {
                parts.push(format!("{} {}", already_applied, "already applied".dimmed()));
            }
            if missing > 0 {
                parts.push(format!("{} {}", missing, "missing target".yellow()));
            }
        } else {
            parts.push(format!("{} applied", applied));
            if already_applied > 0 {
                parts.push(format!("{} already applied", already_applied));
            }
            if missing > 0 {
                parts.push(format!("{} missing target", missing));
            }
        }
        format!("Patches: {}\n", parts.join(", "))
    }

    /// Format run history
    pub fn format_history(backups: Vec<BackupMetadata>) -> String {
        let use_color = Self::should_use_color();
        let mut output = String::new();

        if backups.is_empty() {
            output.push_str("No backup history found.\n");
            return output;
        }

        if use_color {
            output.push_str(&format!("{}", "Run History:\n\n".bold().white()));
        } else {
            output.push_str("Run History:\n\n");
        }

        for backup in backups {
            if use_color {
                output.push_str(&format!("ID: {}\n", backup.id.yellow()));
                output.push_str(&format!("  Time: {}\n", backup.timestamp.format("%Y-%m-%d %H:%M:%S")));
                output.push_str(&format!("  Patches: {}\n", backup.patches.join(", ").cyan()));
                output.push_str(&format!("  Files: {}\n", backup.files.len()));
            } else {
                output.push_str(&format!("ID: {}\n", backup.id));
                output.push_str(&format!("  Time: {}\n", backup.timestamp.format("%Y-%m-%d %H:%M:%S")));
                output.push_str(&format!("  Patches: {}\n", backup.patches.join(", ")));
                output.push_str(&format!("  Files: {}\n", backup.files.len()));
            }
            output.push('\n');
        }

        output
    }
}
