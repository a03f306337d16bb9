//! Tree merge algebra.
//!
//! Includes and templates are overlaid onto the document with `merge`; the
//! `:REPLACE` key attribute turns the additive overlay into an assertive
//! override, anchored at whichever side declares it. Shorthand forms are
//! wrapped into their normal form before any merge so that both sides always
//! have the same shape.

use crate::preproc::node::{key_attribute, Node};

const REPLACE: &str = "REPLACE";

/// Merge `from` into `to`.
///
/// Mappings merge per key, sequences append, everything else replaces. A
/// `:REPLACE` attribute on the destination key keeps the destination as-is;
/// on the source key it overwrites the destination without merging.
pub fn merge(from: &Node, to: &mut Node) {
    if from.is_null() {
        return;
    }

    if from.as_mapping().is_some() && to.as_mapping().is_some() {
        let from_entries = from.as_mapping().unwrap();
        for (from_key, from_val) in from_entries {
            let (base, from_attr) = key_attribute(from_key);
            let found = to.find(base).map(|(idx, attr)| (idx, attr == REPLACE));

            match found {
                Some((_, true)) => {
                    // keep the destination with its attribute
                }
                Some((idx, _)) if from_attr == REPLACE => {
                    let entries = to.as_mapping_mut().unwrap();
                    entries[idx] = (base.to_string(), clone_stripped(from_val));
                }
                Some((idx, _)) => {
                    let entries = to.as_mapping_mut().unwrap();
                    merge(from_val, &mut entries[idx].1);
                }
                None => {
                    let value = if from_attr == REPLACE {
                        clone_stripped(from_val)
                    } else {
                        let mut slot = Node::Null;
                        merge(from_val, &mut slot);
                        slot
                    };
                    to.as_mapping_mut()
                        .unwrap()
                        .push((base.to_string(), value));
                }
            }
        }
    } else if from.as_sequence().is_some() && to.as_sequence().is_some() {
        let items = to.as_sequence_mut().unwrap();
        for item in from.as_sequence().unwrap() {
            items.push(clone_stripped(item));
        }
    } else {
        *to = clone_stripped(from);
    }
}

/// Deep copy that strips the attribute from every mapping key. Attributes
/// are a merge-time signal, not content.
pub fn clone_stripped(node: &Node) -> Node {
    match node {
        Node::Mapping(entries) => Node::Mapping(
            entries
                .iter()
                .map(|(k, v)| (key_attribute(k).0.to_string(), clone_stripped(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Rename every mapping key to its base name, descending through mappings
/// only. Sequences act as a barrier; the driver trims each target's node
/// separately.
pub fn trim_attributes(node: &mut Node) {
    if let Some(entries) = node.as_mapping_mut() {
        for (key, value) in entries.iter_mut() {
            let base = key_attribute(key).0;
            if base.len() != key.len() {
                *key = base.to_string();
            }
            trim_attributes(value);
        }
    }
}

fn has_key(node: &Node, key: &str) -> bool {
    node.get(key).is_some() || node.get(&format!("{key}:{REPLACE}")).is_some()
}

fn wrap_configs_value(node: &mut Node) {
    if has_key(node, "global") || has_key(node, "configurations") {
        return;
    }

    let inner = std::mem::replace(node, Node::Null);
    *node = Node::Mapping(vec![("global".to_string(), inner)]);
}

fn wrap_visibility_value(node: &mut Node) {
    let has_specifier = ["default", "public", "private", "interface"]
        .iter()
        .any(|key| has_key(node, key));

    if has_specifier {
        for key in ["default", "public", "private", "interface"] {
            wrap_configs(node, key);
        }
    } else {
        wrap_configs_value(node);
        let inner = std::mem::replace(node, Node::Null);
        *node = Node::Mapping(vec![("default".to_string(), inner)]);
    }
}

/// Lift `map[key]` into `{global: ...}` normal form unless it already names
/// `global` or `configurations`. The `key:REPLACE` variant is wrapped too,
/// keeping its attribute.
pub fn wrap_configs(map: &mut Node, key: &str) {
    for key in [key.to_string(), format!("{key}:{REPLACE}")] {
        if let Some(value) = map.get_mut(&key) {
            wrap_configs_value(value);
        }
    }
}

/// Lift `map[key]` into `{default: {global: ...}}` normal form; a node that
/// already names a visibility bucket only gets its buckets config-wrapped.
pub fn wrap_visibility(map: &mut Node, key: &str) {
    for key in [key.to_string(), format!("{key}:{REPLACE}")] {
        if let Some(value) = map.get_mut(&key) {
            wrap_visibility_value(value);
        }
    }
}
