//! Helpers for building actionable error messages

use std::io;
use std::path::Path;

/// Check if an IO error is a permission denied error
pub fn is_permission_denied(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}

/// Check if an IO error is a "not found" error
pub fn is_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}

/// Error message for a frontend root that doesn't exist or isn't a directory
pub fn frontend_root_error(path: &Path) -> String {
    format!(
        "Frontend root not found: '{}'\n\n\
         wireup patches files inside the love-space frontend checkout.\n\n\
         Possible fixes:\n\
         1. Run from the backend directory so the default '../love-space-frontend' resolves\n\
         2. Point at the checkout explicitly: wireup --frontend-root /path/to/love-space-frontend\n\
         3. Set it once in the config: wireup config  (then edit [frontend] root)",
        path.display()
    )
}

/// Enhanced error message for file permission issues
pub fn permission_error(path: &Path, operation: &str) -> String {
    format!(
        "Permission denied when {} '{}'\n\n\
         Possible fixes:\n\
         1. Check file permissions: ls -l '{}'\n\
         2. Ensure write access: chmod u+w '{}'\n\
         3. If the checkout is owned by another user, fix ownership rather than using sudo",
        operation,
        path.display(),
        path.display(),
        path.display()
    )
}

/// Enhanced error message for a missing target file
pub fn not_found_error(path: &Path, context: &str) -> String {
    format!(
        "File not found: '{}'\n\n\
         Context: {}\n\n\
         Possible fixes:\n\
         1. Check that the frontend checkout is complete and on the expected branch\n\
         2. Verify the frontend root with: wireup status\n\
         3. Use --frontend-root if the checkout lives somewhere else",
        path.display(),
        context
    )
}
