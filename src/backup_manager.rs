use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const DEFAULT_MAX_BACKUPS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Names of the patches this run was about to apply.
    pub patches: Vec<String>,
    pub files: Vec<FileBackup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileBackup {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
}

pub struct BackupManager {
    backups_dir: PathBuf,
    max_backups: usize,
}

impl BackupManager {
    pub fn new() -> Result<Self> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
        let backups_dir = home_dir.join(".wireup").join("backups");
        Self::at(backups_dir)
    }

    /// Create a BackupManager with a custom backup directory
    pub fn with_directory(dir: String) -> Result<Self> {
        Self::at(PathBuf::from(dir))
    }

    fn at(backups_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&backups_dir).with_context(|| {
            format!(
                "Failed to create backups directory: {}",
                backups_dir.display()
            )
        })?;

        Ok(Self {
            backups_dir,
            max_backups: DEFAULT_MAX_BACKUPS,
        })
    }

    /// Override how many backups are kept before the oldest are pruned.
    pub fn set_max_backups(&mut self, max_backups: usize) {
        self.max_backups = max_backups.max(1);
    }

    /// Get the backup directory path
    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Snapshot the given files before a run. Files that don't exist are
    /// skipped; a patch whose target is missing never gets written anyway.
    pub fn create_backup(&mut self, patch_names: &[String], files: &[PathBuf]) -> Result<String> {
        // Millisecond precision keeps IDs sortable even for back-to-back runs
        let id = format!(
            "{}-{}",
            Utc::now().format("%Y%m%d-%H%M%S%3f"),
            Uuid::new_v4().to_string().split_at(8).0
        );
        let backup_dir = self.backups_dir.join(&id);

        fs::create_dir_all(&backup_dir).with_context(|| {
            format!(
                "Failed to create backup directory: {}",
                backup_dir.display()
            )
        })?;

        let mut file_backups = Vec::new();

        for (index, file_path) in files.iter().enumerate() {
            if !file_path.exists() {
                continue;
            }

            let file_name = file_path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", file_path.display()))?;

            // Prefix with the index so two targets with the same file name
            // can't clobber each other inside the backup directory.
            let backup_path =
                backup_dir.join(format!("{}_{}", index, file_name.to_string_lossy()));

            fs::copy(file_path, &backup_path)
                .with_context(|| format!("Failed to backup file: {}", file_path.display()))?;

            file_backups.push(FileBackup {
                original_path: file_path.clone(),
                backup_path,
            });
        }

        let metadata = BackupMetadata {
            id: id.clone(),
            timestamp: Utc::now(),
            patches: patch_names.to_vec(),
            files: file_backups,
        };

        let metadata_path = backup_dir.join("operation.json");
        let metadata_json =
            serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;

        fs::write(&metadata_path, metadata_json)
            .with_context(|| format!("Failed to write metadata: {}", metadata_path.display()))?;

        self.cleanup_old_backups()?;

        Ok(id)
    }

    pub fn restore_backup(&self, id: &str) -> Result<()> {
        let backup_dir = self.backups_dir.join(id);
        let metadata_path = backup_dir.join("operation.json");

        if !backup_dir.exists() {
            anyhow::bail!("Backup not found: {}", id);
        }

        let metadata_json = fs::read_to_string(&metadata_path)
            .with_context(|| format!("Failed to read metadata: {}", metadata_path.display()))?;

        let metadata: BackupMetadata =
            serde_json::from_str(&metadata_json).context("Failed to parse metadata")?;

        for file_backup in &metadata.files {
            if !file_backup.backup_path.exists() {
                eprintln!(
                    "Warning: Backup file missing: {}",
                    file_backup.backup_path.display()
                );
                continue;
            }

            fs::copy(&file_backup.backup_path, &file_backup.original_path).with_context(|| {
                format!(
                    "Failed to restore file: {}",
                    file_backup.original_path.display()
                )
            })?;

            println!("Restored: {}", file_backup.original_path.display());
        }

        // Remove backup after successful restore
        fs::remove_dir_all(&backup_dir).with_context(|| {
            format!(
                "Failed to remove backup directory: {}",
                backup_dir.display()
            )
        })?;

        println!("Backup {} removed after restore", id);

        Ok(())
    }

    pub fn get_last_backup_id(&self) -> Result<Option<String>> {
        let mut backups = self.list_backups()?;
        backups.sort_by_key(|b| b.timestamp);
        Ok(backups.last().map(|b| b.id.clone()))
    }

    pub fn list_backups(&self) -> Result<Vec<BackupMetadata>> {
        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backups_dir).with_context(|| {
            format!(
                "Failed to read backups directory: {}",
                self.backups_dir.display()
            )
        })? {
            let entry = entry?;
            let metadata_path = entry.path().join("operation.json");

            if !metadata_path.exists() {
                continue;
            }

            let metadata_json = fs::read_to_string(&metadata_path)?;
            if let Ok(metadata) = serde_json::from_str::<BackupMetadata>(&metadata_json) {
                backups.push(metadata);
            }
        }

        // Chronological order; ID breaks the (rare) timestamp tie
        backups.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(backups)
    }

    /// Remove a backup by its ID (used when a run ends up changing nothing)
    pub fn remove_backup_by_id(&self, backup_id: &str) -> Result<()> {
        let backup_dir = self.backups_dir.join(backup_id);
        fs::remove_dir_all(&backup_dir)
            .with_context(|| format!("Failed to remove backup: {}", backup_dir.display()))?;
        Ok(())
    }

    fn cleanup_old_backups(&self) -> Result<()> {
        let mut backups = self.list_backups()?;
        backups.sort_by_key(|b| b.timestamp);

        if backups.len() > self.max_backups {
            for backup in backups.iter().take(backups.len() - self.max_backups) {
                let backup_dir = self.backups_dir.join(&backup.id);
                fs::remove_dir_all(&backup_dir).with_context(|| {
                    format!("Failed to remove old backup: {}", backup_dir.display())
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let file_path = dir.join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn create_test_manager() -> (BackupManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let backups_dir = temp_dir.path().join("backups");
        let manager =
            BackupManager::with_directory(backups_dir.to_str().unwrap().to_string()).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn backup_and_restore_round_trip() {
        let (mut manager, temp_dir) = create_test_manager();
        let file = create_test_file(temp_dir.path(), "index.js", "original\n");

        let id = manager
            .create_backup(&["api-upload-avatar".to_string()], &[file.clone()])
            .unwrap();

        fs::write(&file, "clobbered\n").unwrap();
        manager.restore_backup(&id).unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "original\n");
        // Backup is consumed by the restore
        assert!(manager.list_backups().unwrap().is_empty());
    }

    #[test]
    fn missing_files_are_skipped() {
        let (mut manager, temp_dir) = create_test_manager();
        let present = create_test_file(temp_dir.path(), "a.js", "a\n");
        let absent = temp_dir.path().join("missing.js");

        let id = manager
            .create_backup(&["p".to_string()], &[present, absent])
            .unwrap();

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].id, id);
        assert_eq!(backups[0].files.len(), 1);
    }

    #[test]
    fn duplicate_file_names_do_not_collide() {
        let (mut manager, temp_dir) = create_test_manager();
        let dir_a = temp_dir.path().join("a");
        let dir_b = temp_dir.path().join("b");
        fs::create_dir_all(&dir_a).unwrap();
        fs::create_dir_all(&dir_b).unwrap();
        let first = create_test_file(&dir_a, "index.js", "first\n");
        let second = create_test_file(&dir_b, "index.js", "second\n");

        let id = manager
            .create_backup(&["p".to_string()], &[first.clone(), second.clone()])
            .unwrap();

        fs::write(&first, "x").unwrap();
        fs::write(&second, "y").unwrap();
        manager.restore_backup(&id).unwrap();

        assert_eq!(fs::read_to_string(&first).unwrap(), "first\n");
        assert_eq!(fs::read_to_string(&second).unwrap(), "second\n");
    }

    #[test]
    fn restore_unknown_backup_fails() {
        let (manager, _temp_dir) = create_test_manager();
        assert!(manager.restore_backup("no-such-id").is_err());
    }

    #[test]
    fn cleanup_prunes_oldest_beyond_limit() {
        let (mut manager, temp_dir) = create_test_manager();
        manager.set_max_backups(2);
        let file = create_test_file(temp_dir.path(), "f.js", "content\n");

        let first = manager.create_backup(&["p".to_string()], &[file.clone()]).unwrap();
        let _second = manager.create_backup(&["p".to_string()], &[file.clone()]).unwrap();
        let _third = manager.create_backup(&["p".to_string()], &[file.clone()]).unwrap();

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 2);
        assert!(backups.iter().all(|b| b.id != first));
    }

    #[test]
    fn get_last_backup_id_returns_newest() {
        let (mut manager, temp_dir) = create_test_manager();
        let file = create_test_file(temp_dir.path(), "f.js", "content\n");

        let _first = manager.create_backup(&["p".to_string()], &[file.clone()]).unwrap();
        let second = manager.create_backup(&["p".to_string()], &[file]).unwrap();

        assert_eq!(manager.get_last_backup_id().unwrap(), Some(second));
    }

    #[test]
    fn remove_backup_by_id_deletes_directory() {
        let (mut manager, temp_dir) = create_test_manager();
        let file = create_test_file(temp_dir.path(), "f.js", "content\n");
        let id = manager.create_backup(&["p".to_string()], &[file]).unwrap();

        manager.remove_backup_by_id(&id).unwrap();
        assert!(manager.list_backups().unwrap().is_empty());
    }
}
