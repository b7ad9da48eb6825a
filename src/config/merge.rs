//! Deep merge for configuration trees.
//!
//! Implements field-by-field merging where overlay values override base
//! values. Arrays are replaced entirely, not concatenated.

use serde_json::Value;

/// Deep merge two configuration trees, with `overlay` taking precedence
/// over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base,
///   keys only in base are kept untouched
/// - Arrays, strings, numbers, booleans, and nulls replace the base value
///   entirely; an explicit `null` in an overlay document is a real value,
///   not "unset"
/// - A type mismatch at a key is resolved by replacement, never by error
///
/// Both inputs are consumed; the merged tree is the only copy that remains.
///
/// # Example
/// ```
/// use serde_json::json;
/// use envstamp::config::deep_merge;
///
/// let base = json!({
///     "service": { "image": "api", "replicas": 2 },
///     "regions": ["us-east1", "us-west1"]
/// });
/// let overlay = json!({
///     "service": { "replicas": 6 },
///     "regions": ["eu-west1"]
/// });
/// let result = deep_merge(base, overlay);
/// // Result: { "service": { "image": "api", "replicas": 6 }, "regions": ["eu-west1"] }
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        // Both are objects: merge recursively
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        // Any other case: overlay replaces base entirely
        (_, overlay) => overlay,
    }
}

/// Merge multiple trees in order, with later trees taking precedence.
///
/// Equivalent to folding `deep_merge` over the list.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
