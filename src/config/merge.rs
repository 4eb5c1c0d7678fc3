//! Layer merge policy.
//!
//! Top-level keys from a higher layer replace the lower layer wholesale,
//! except `presets`: preset entries merge by name, with a matching name
//! updated field-by-field and a new name inserted verbatim.

use serde_yaml::{Mapping, Value};

pub const PRESETS_KEY: &str = "presets";

pub(crate) fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

/// Merge the `user` layer over `base` in place.
pub fn merge_layers(base: &mut Mapping, user: Mapping) {
    for (name, value) in user {
        match value {
            Value::Mapping(user_presets) if name.as_str() == Some(PRESETS_KEY) => {
                let merged = match base.remove(&name) {
                    Some(Value::Mapping(existing)) => merge_presets(existing, user_presets),
                    _ => user_presets,
                };
                base.insert(name, Value::Mapping(merged));
            }
            value => {
                base.insert(name, value);
            }
        }
    }
}

fn merge_presets(mut base: Mapping, user: Mapping) -> Mapping {
    for (name, body) in user {
        match (base.remove(&name), body) {
            (Some(Value::Mapping(mut existing)), Value::Mapping(update)) => {
                for (field, value) in update {
                    existing.insert(field, value);
                }
                base.insert(name, Value::Mapping(existing));
            }
            (_, body) => {
                base.insert(name, body);
            }
        }
    }
    base
}

/// Overlay a selected preset's fields over the flat top-level sections,
/// replacing per top-level key.
pub fn overlay_preset(flat: &mut Mapping, preset: &Mapping) {
    for (name, value) in preset {
        flat.insert(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        match serde_yaml::from_str(yaml).unwrap() {
            Value::Mapping(m) => m,
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    fn preset<'a>(merged: &'a Mapping, name: &str) -> &'a Mapping {
        merged
            .get(&key(PRESETS_KEY))
            .and_then(|p| p.get(name))
            .and_then(Value::as_mapping)
            .unwrap_or_else(|| panic!("preset '{}' missing", name))
    }

    const BASE: &str = "\
presets:
  basic:
    agents: [a]
    services: [x]
  dev:
    agents: [b]
    services: [y]
";

    const USER: &str = "\
presets:
  dev:
    services: [y, z]
  creator:
    agents: [c]
";

    #[test]
    fn untouched_preset_survives_merge() {
        let mut base = mapping(BASE);
        merge_layers(&mut base, mapping(USER));
        assert_eq!(*preset(&base, "basic"), mapping("agents: [a]\nservices: [x]\n"));
    }

    #[test]
    fn matching_preset_updates_field_by_field() {
        let mut base = mapping(BASE);
        merge_layers(&mut base, mapping(USER));
        // agents untouched, services replaced by the user layer
        assert_eq!(*preset(&base, "dev"), mapping("agents: [b]\nservices: [y, z]\n"));
    }

    #[test]
    fn new_preset_inserted_verbatim() {
        let mut base = mapping(BASE);
        merge_layers(&mut base, mapping(USER));
        assert_eq!(*preset(&base, "creator"), mapping("agents: [c]\n"));
    }

    #[test]
    fn non_preset_top_level_keys_replace_wholesale() {
        let mut base = mapping("services: [x, y]\nui_server:\n  host: a\n  port: 1\n");
        merge_layers(&mut base, mapping("services: [z]\n"));
        let user = mapping("services: [z]\n");
        assert_eq!(base.get(&key("services")), user.get(&key("services")));
        assert!(base.get(&key("ui_server")).is_some());
    }

    #[test]
    fn preset_overlay_replaces_per_top_level_key() {
        let mut flat = mapping("agents: [a]\nservices: [x]\nextra: 1\n");
        let chosen = mapping("agents: [b]\n");
        overlay_preset(&mut flat, &chosen);
        assert_eq!(flat.get(&key("agents")), chosen.get(&key("agents")));
        assert_eq!(flat.get(&key("services")), mapping("services: [x]\n").get(&key("services")));
    }
}
