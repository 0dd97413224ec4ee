//! Ward tags.
//!
//! Patients are tagged with the teams looking after them. On the wire a tag set is a mapping of
//! tag name to boolean; only tags mapped to `true` are active.

use serde_json::{Map, Value};

/// Known tags in display order, with their short labels.
pub const TAGS: &[(&str, &str)] = &[
    ("microbiology", "Micro"),
    ("infectious_diseases", "ID"),
    ("hiv", "HIV"),
    ("tropical_diseases", "Tropical"),
    ("mine", "Mine"),
];

/// Short display label of a known tag.
pub fn label(name: &str) -> Option<&'static str> {
    TAGS.iter().find(|(tag, _)| *tag == name).map(|(_, label)| *label)
}

pub fn is_known(name: &str) -> bool {
    label(name).is_some()
}

/// Names of the active tags in `map`, in the order they appear.
///
/// Only `true` counts as active; any other value (including truthy strings) is ignored.
pub fn active_tags(map: &Map<String, Value>) -> Vec<String> {
    map.iter()
        .filter(|(_, value)| matches!(value, Value::Bool(true)))
        .map(|(name, _)| name.clone())
        .collect()
}

/// Wire form of an active tag list: every tag mapped to `true`.
pub fn to_tag_map(tags: &[String]) -> Map<String, Value> {
    tags.iter()
        .map(|tag| (tag.clone(), Value::Bool(true)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn active_tags_keep_insertion_order() {
        let map = json!({"tropical_diseases": true, "mine": true, "hiv": false});
        let map = map.as_object().expect("object");
        assert_eq!(active_tags(map), ["tropical_diseases", "mine"]);
    }

    #[test]
    fn only_true_is_active() {
        let map = json!({"mine": true, "tropical": false, "hiv": "yes", "micro": 1});
        assert_eq!(active_tags(map.as_object().expect("object")), ["mine"]);
    }

    #[test]
    fn labels_for_known_tags() {
        assert_eq!(label("infectious_diseases"), Some("ID"));
        assert_eq!(label("mine"), Some("Mine"));
        assert!(!is_known("cardiology"));
    }

    #[test]
    fn tag_map_marks_every_tag_true() {
        let map = to_tag_map(&["mine".to_string(), "hiv".to_string()]);
        assert_eq!(Value::Object(map), json!({"mine": true, "hiv": true}));
    }
}
