/// Reduce a column or variable name to its lookup key: strip every
/// non-alphanumeric character and lowercase the rest. "Sample Depth",
/// "sample_depth" and "SAMPLEDEPTH!!" all key identically.
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
