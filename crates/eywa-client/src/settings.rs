//! Dotted-key settings flattening.
//!
//! The settings-update path accepts a compact string form,
//! `key1.key2:value, key3:value2`, and expands it into the nested JSON
//! document the server expects. All values stay strings; the server is
//! responsible for interpreting them.

use serde_json::{Map, Value};

use crate::error::SettingsError;

/// Expands `"a.b.c:1,a.b.d:2"` into `{"a":{"b":{"c":"1","d":"2"}}}`.
///
/// Identical full key paths are last-write-wins. A key path that is a
/// strict prefix of another is rejected: silently replacing a nested map
/// with a string (or the reverse) would hide a user mistake.
///
/// # Errors
///
/// Returns a [`SettingsError`] for empty input, a segment without a `:`
/// separator, an empty dotted component, or a prefix collision.
pub fn flatten_settings(input: &str) -> Result<Map<String, Value>, SettingsError> {
    let mut root = Map::new();
    let mut seen_any = false;

    for segment in input.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        seen_any = true;

        let (path, value) = segment
            .split_once(':')
            .ok_or_else(|| SettingsError::MissingSeparator {
                segment: segment.to_string(),
            })?;
        let path = path.trim();
        let keys: Vec<&str> = path.split('.').map(str::trim).collect();
        if path.is_empty() || keys.iter().any(|key| key.is_empty()) {
            return Err(SettingsError::EmptyKey {
                segment: segment.to_string(),
            });
        }

        insert(&mut root, &keys, value.trim(), path)?;
    }

    if seen_any { Ok(root) } else { Err(SettingsError::Empty) }
}

fn insert(
    root: &mut Map<String, Value>,
    keys: &[&str],
    value: &str,
    path: &str,
) -> Result<(), SettingsError> {
    let mut current = root;
    for key in &keys[..keys.len() - 1] {
        let entry = current
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            _ => {
                return Err(SettingsError::PrefixCollision {
                    path: path.to_string(),
                });
            }
        };
    }

    let leaf = keys[keys.len() - 1];
    if matches!(current.get(leaf), Some(Value::Object(_))) {
        return Err(SettingsError::PrefixCollision {
            path: path.to_string(),
        });
    }
    current.insert(leaf.to_string(), Value::String(value.to_string()));
    Ok(())
}
