//! Separator normalization.

/// Convert `path` to the platform's native separator form.
///
/// On Windows forward slashes become backslashes. Elsewhere the string is
/// returned unchanged, since a backslash is an ordinary file name character.
pub fn normalize_path(path: &str) -> String {
    if cfg!(windows) {
        path.replace('/', "\\")
    } else {
        path.to_string()
    }
}
