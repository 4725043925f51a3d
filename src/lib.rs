//! wireup: idempotent source patcher for the love-space frontend
//!
//! Wires the avatar-upload endpoint into the frontend checkout: one literal
//! insertion in the API client, one literal block replacement in the profile
//! view. Both patches are safe to re-run and are backed up before applying.
//! The main binary is at src/main.rs.

pub mod backup_manager;
pub mod cli;
pub mod config;
pub mod diff_formatter;
pub mod error_helpers;
pub mod file_patcher;
pub mod logger;
pub mod patch;
pub mod patches;

// Re-export commonly used types for convenience
pub use backup_manager::{BackupManager, BackupMetadata, FileBackup};
pub use file_patcher::{FilePatcher, PatchReport};
pub use patch::{Patch, PatchOp, PatchOutcome};
pub use patches::{builtin_patches, select_patches};
