//! Virtual path helpers.
//!
//! Hosts hand us relative paths with either separator (`items\armors`). The
//! namespace works with absolute `/`-separated paths (`/items/armors`).

/// Normalize a host path: `/` separators, a leading `/`, no trailing `/`
/// except for the root itself.
pub fn normalize(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    if !normalized.starts_with('/') {
        normalized.insert(0, '/');
    }
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Normalize a host path into a directory key, which always ends with `/`.
pub fn directory_key(path: &str) -> String {
    let mut key = normalize(path);
    if !key.ends_with('/') {
        key.push('/');
    }
    key
}

/// The final segment of a normalized path. Empty for the root.
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[i + 1..],
        None => path,
    }
}
