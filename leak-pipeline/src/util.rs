/// Extract a short type name from the full module path.
///
/// Given `"leak_pipeline::components::TopLeaksSelector"`, returns `"TopLeaksSelector"`.
pub fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Clamp a requested listing size into `[1, max]`.
pub fn clamp_limit(limit: usize, max: usize) -> usize {
    limit.clamp(1, max)
}
