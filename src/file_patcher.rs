//! Reads target files, applies patches in memory, and rewrites atomically.
//!
//! Each file is read once and, when a patch actually applies, rewritten once
//! through a temp file in the same directory so the replacement is a rename.
//! The two built-in patches touch different files and are processed strictly
//! in order; a file whose patch does not apply is never written at all.

use crate::error_helpers;
use crate::patch::{Patch, PatchOutcome};
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Result of previewing one patch against its target file.
#[derive(Debug)]
pub struct PatchReport {
    pub patch_name: String,
    pub file_path: PathBuf,
    pub outcome: PatchOutcome,
    pub old_content: String,
    /// Full replacement content; present only when `outcome` is `Applied`.
    pub new_content: Option<String>,
}

pub struct FilePatcher {
    frontend_root: PathBuf,
}

impl FilePatcher {
    pub fn new(frontend_root: impl Into<PathBuf>) -> Self {
        Self {
            frontend_root: frontend_root.into(),
        }
    }

    pub fn frontend_root(&self) -> &Path {
        &self.frontend_root
    }

    /// Verify the frontend root looks like a checkout we can patch.
    pub fn check_root(&self) -> Result<()> {
        if !self.frontend_root.is_dir() {
            anyhow::bail!(error_helpers::frontend_root_error(&self.frontend_root));
        }
        Ok(())
    }

    fn resolve(&self, patch: &Patch) -> PathBuf {
        self.frontend_root.join(&patch.relative_path)
    }

    /// Read the target file and compute what the patch would do, without
    /// writing anything.
    pub fn preview(&self, patch: &Patch) -> Result<PatchReport> {
        let file_path = self.resolve(patch);

        let old_content = match fs::read_to_string(&file_path) {
            Ok(content) => content,
            Err(e) if error_helpers::is_not_found(&e) => {
                anyhow::bail!(error_helpers::not_found_error(
                    &file_path,
                    &format!("target of patch '{}'", patch.name),
                ));
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read file: {}", file_path.display())
                });
            }
        };

        let (outcome, new_content) = patch.apply(&old_content);

        tracing::info!(
            patch = %patch.name,
            file = %file_path.display(),
            outcome = ?outcome,
            "previewed patch"
        );

        Ok(PatchReport {
            patch_name: patch.name.clone(),
            file_path,
            outcome,
            old_content,
            new_content,
        })
    }

    /// Write a previewed change to disk. No-op unless the report carries new
    /// content. The write goes through a temp file in the target's directory
    /// and is persisted over the original in one rename.
    pub fn apply(&self, report: &PatchReport) -> Result<()> {
        let Some(new_content) = &report.new_content else {
            return Ok(());
        };

        let parent_dir = report.file_path.parent().unwrap_or(Path::new("."));

        let mut temp_file = NamedTempFile::new_in(parent_dir).with_context(|| {
            format!("Failed to create temp file in {}", parent_dir.display())
        })?;

        temp_file
            .write_all(new_content.as_bytes())
            .with_context(|| {
                format!("Failed to write patched content for {}", report.file_path.display())
            })?;

        temp_file.persist(&report.file_path).map_err(|e| {
            if error_helpers::is_permission_denied(&e.error) {
                anyhow::anyhow!(error_helpers::permission_error(
                    &report.file_path,
                    "writing",
                ))
            } else {
                anyhow::anyhow!(e).context(format!(
                    "Failed to replace file: {}",
                    report.file_path.display()
                ))
            }
        })?;

        tracing::info!(
            patch = %report.patch_name,
            file = %report.file_path.display(),
            bytes = new_content.len(),
            "applied patch"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Patch;
    use tempfile::TempDir;

    fn patcher_with_file(content: &str) -> (TempDir, FilePatcher) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/target.js"), content).unwrap();
        let patcher = FilePatcher::new(dir.path());
        (dir, patcher)
    }

    fn test_patch() -> Patch {
        Patch::insert_before("t", "src/target.js", "// END", "added()\n", "added()")
    }

    #[test]
    fn preview_does_not_write() {
        let (dir, patcher) = patcher_with_file("a\n// END\n");
        let report = patcher.preview(&test_patch()).unwrap();
        assert!(report.outcome.is_applied());

        let on_disk = fs::read_to_string(dir.path().join("src/target.js")).unwrap();
        assert_eq!(on_disk, "a\n// END\n");
    }

    #[test]
    fn apply_writes_previewed_content() {
        let (dir, patcher) = patcher_with_file("a\n// END\n");
        let report = patcher.preview(&test_patch()).unwrap();
        patcher.apply(&report).unwrap();

        let on_disk = fs::read_to_string(dir.path().join("src/target.js")).unwrap();
        assert_eq!(on_disk, "a\nadded()\n// END\n");
    }

    #[test]
    fn apply_without_new_content_is_noop() {
        let (dir, patcher) = patcher_with_file("nothing matches\n");
        let report = patcher.preview(&test_patch()).unwrap();
        assert_eq!(report.outcome, PatchOutcome::TargetMissing);
        patcher.apply(&report).unwrap();

        let on_disk = fs::read_to_string(dir.path().join("src/target.js")).unwrap();
        assert_eq!(on_disk, "nothing matches\n");
    }

    #[test]
    fn missing_file_gets_actionable_error() {
        let dir = TempDir::new().unwrap();
        let patcher = FilePatcher::new(dir.path());
        let err = patcher.preview(&test_patch()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("File not found"));
        assert!(msg.contains("target.js"));
    }

    #[test]
    fn check_root_rejects_missing_directory() {
        let patcher = FilePatcher::new("/definitely/not/a/frontend");
        assert!(patcher.check_root().is_err());
    }
}
