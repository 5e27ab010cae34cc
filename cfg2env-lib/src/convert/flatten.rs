use super::RawValue;
use std::collections::BTreeMap;

/// Separator placed between path segments
pub const SEPARATOR: char = '_';

/// Flatten a tree into `output`, one entry per leaf.
///
/// Mapping keys are joined with `_`, sequence elements use their zero-based index. Keys are
/// uppercased as they are emitted. A nested empty mapping produces an entry with an empty value at
/// its own path, while an empty sequence produces nothing at all. At the root, an empty mapping
/// produces nothing and a bare scalar is emitted under the empty key.
///
/// When two paths uppercase to the same key, the one visited last wins.
pub fn flatten(prefix: &str, node: &RawValue, output: &mut BTreeMap<String, String>) {
    match node {
        RawValue::Mapping(entries) if entries.is_empty() => {
            if !prefix.is_empty() {
                let _ = output.insert(prefix.to_uppercase(), String::new());
            }
        }

        RawValue::Mapping(entries) => {
            for (key, child) in entries {
                if prefix.is_empty() {
                    flatten(key, child, output);
                } else {
                    flatten(&format!("{prefix}{SEPARATOR}{key}"), child, output);
                }
            }
        }

        RawValue::Sequence(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&format!("{prefix}{SEPARATOR}{index}"), child, output);
            }
        }

        scalar => {
            let _ = output.insert(prefix.to_uppercase(), scalar.stringify());
        }
    }
}

/// Flatten a whole document from the root
#[must_use]
pub fn flatten_root(root: &RawValue) -> BTreeMap<String, String> {
    let mut output = BTreeMap::new();
    flatten("", root, &mut output);
    output
}
