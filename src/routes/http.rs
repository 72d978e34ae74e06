/// Canonical form of a route or group path.
///
/// Trims surrounding whitespace, forces a leading `/`, collapses runs of `/`
/// and drops a trailing `/` unless the whole path is `/`. Total and idempotent.
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = String::with_capacity(trimmed.len() + 1);
    out.push('/');
    for ch in trimmed.chars() {
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

/// `normalize(prefix + "/" + suffix)`; an empty prefix joins against the root.
pub fn join_paths(prefix: &str, suffix: &str) -> String {
    let mut joined = String::with_capacity(prefix.len() + suffix.len() + 1);
    joined.push_str(prefix);
    joined.push('/');
    joined.push_str(suffix);
    normalize_path(&joined)
}
