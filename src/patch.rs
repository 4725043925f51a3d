//! Literal text patches with built-in idempotence checks.
//!
//! A patch is a whole-file string operation: either insert a block before a
//! fixed anchor, or swap one multi-line block for another. Matching is always
//! literal, never regex. Every patch knows how to detect that it has already
//! been applied, so re-running the tool is always safe.

/// A single named patch against one file in the frontend tree.
#[derive(Debug, Clone)]
pub struct Patch {
    /// Short identifier shown in output and stored in backup metadata.
    pub name: String,
    /// Path of the target file, relative to the frontend root.
    pub relative_path: String,
    pub op: PatchOp,
}

#[derive(Debug, Clone)]
pub enum PatchOp {
    /// Insert `insertion` immediately before the first occurrence of
    /// `anchor`. Skipped when `marker` is already present in the file.
    InsertBefore {
        anchor: String,
        insertion: String,
        marker: String,
    },
    /// Replace the first occurrence of `old_block` with `new_block`.
    /// Skipped when `new_block` is already present in the file.
    ReplaceBlock {
        old_block: String,
        new_block: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The target was found and the patched content differs from the input.
    Applied,
    /// The marker (or new block) is already present; nothing to do.
    AlreadyApplied,
    /// Neither the target nor the already-applied marker was found.
    TargetMissing,
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PatchOutcome::Applied)
    }
}

/// CRLF line endings are folded to LF before matching. The patch payloads
/// are LF-only, so a file checked out with Windows line endings would never
/// match otherwise.
fn normalize_newlines(content: &str) -> String {
    content.replace("\r\n", "\n")
}

impl Patch {
    pub fn insert_before(
        name: &str,
        relative_path: &str,
        anchor: &str,
        insertion: &str,
        marker: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            relative_path: relative_path.to_string(),
            op: PatchOp::InsertBefore {
                anchor: anchor.to_string(),
                insertion: insertion.to_string(),
                marker: marker.to_string(),
            },
        }
    }

    pub fn replace_block(
        name: &str,
        relative_path: &str,
        old_block: &str,
        new_block: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            relative_path: relative_path.to_string(),
            op: PatchOp::ReplaceBlock {
                old_block: old_block.to_string(),
                new_block: new_block.to_string(),
            },
        }
    }

    /// Apply this patch to the given file content.
    ///
    /// Pure and single-pass: no I/O happens here. Returns the outcome and,
    /// only when the outcome is `Applied`, the full new file content. When
    /// nothing is applied the caller must leave the file untouched, which
    /// keeps unmatched files byte-identical.
    pub fn apply(&self, content: &str) -> (PatchOutcome, Option<String>) {
        match &self.op {
            PatchOp::InsertBefore {
                anchor,
                insertion,
                marker,
            } => {
                if content.contains(marker.as_str()) {
                    return (PatchOutcome::AlreadyApplied, None);
                }

                let text = normalize_newlines(content);
                match text.find(anchor.as_str()) {
                    Some(pos) => {
                        let mut patched =
                            String::with_capacity(text.len() + insertion.len());
                        patched.push_str(&text[..pos]);
                        patched.push_str(insertion);
                        patched.push_str(&text[pos..]);
                        (PatchOutcome::Applied, Some(patched))
                    }
                    None => (PatchOutcome::TargetMissing, None),
                }
            }
            PatchOp::ReplaceBlock {
                old_block,
                new_block,
            } => {
                if content.contains(new_block.as_str()) {
                    return (PatchOutcome::AlreadyApplied, None);
                }

                let text = normalize_newlines(content);
                match text.find(old_block.as_str()) {
                    Some(pos) => {
                        let mut patched = String::with_capacity(
                            text.len() - old_block.len() + new_block.len(),
                        );
                        patched.push_str(&text[..pos]);
                        patched.push_str(new_block);
                        patched.push_str(&text[pos + old_block.len()..]);
                        (PatchOutcome::Applied, Some(patched))
                    }
                    None => (PatchOutcome::TargetMissing, None),
                }
            }
        }
    }
}
