use serde::{Deserialize, Serialize};

/// A labeled category-tree node with an optional parent reference.
///
/// The label is also accepted under the localized `name_ru` key; other
/// wire fields (counters, cache flags, other locales) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbNode {
    pub id: u64,

    #[serde(default)]
    pub parent: Option<u64>,

    #[serde(alias = "name_ru")]
    pub label: String,
}

impl BreadcrumbNode {
    pub fn new(id: u64, parent: Option<u64>, label: impl Into<String>) -> Self {
        Self {
            id,
            parent,
            label: label.into(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_localized_label() {
        let node: BreadcrumbNode = serde_json::from_str(
            r#"{"id": 4, "parent": 1, "advertisement_count": 12, "has_child_cache": false,
                "name_en_us": "Lamps", "name_ru": "Лампы", "name_src": "lamps"}"#,
        )
        .unwrap();
        assert_eq!(node, BreadcrumbNode::new(4, Some(1), "Лампы"));
    }

    #[test]
    fn null_parent_is_root() {
        let node: BreadcrumbNode =
            serde_json::from_str(r#"{"id": 1, "parent": null, "label": "All"}"#).unwrap();
        assert!(node.is_root());
    }
}
