use super::error::StorageError;

/// Validates an object path such as `planta/abc-2025-06-29T00-22-14.333Z.webp`.
///
/// Paths are relative, `/`-separated, and may not contain traversal, hidden
/// segments, backslashes or control characters. Spaces are allowed because
/// archive folder names are used verbatim.
pub fn validate_object_path(path: &str) -> Result<&str, StorageError> {
    if path.is_empty() {
        return Err(invalid("path cannot be empty", path));
    }

    if path.len() > 1024 {
        return Err(invalid("path exceeds 1024 bytes", path));
    }

    if path.chars().any(|c| c.is_control()) {
        return Err(invalid("path must not contain control characters", path));
    }

    if path.contains('\\') {
        return Err(invalid("path must not contain backslashes", path));
    }

    if path.starts_with('/') || path.ends_with('/') {
        return Err(invalid("path must not start or end with '/'", path));
    }

    for segment in path.split('/') {
        if segment.trim().is_empty() {
            return Err(invalid("path must not contain empty segments", path));
        }
        if segment.starts_with('.') {
            return Err(invalid("path segments must not start with '.'", path));
        }
    }

    Ok(path)
}

fn invalid(msg: &str, path: &str) -> StorageError {
    StorageError::InvalidPath(format!("{msg}: {path:?}"))
}
