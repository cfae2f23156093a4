use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

impl TodoItem {
    pub fn new(text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoConfig {
    pub items: Vec<TodoItem>,
}

impl TodoConfig {
    /// Append a task. Blank input leaves the list unchanged and returns `None`.
    pub fn add_item(&self, text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut items = self.items.clone();
        items.push(TodoItem::new(text));
        Some(Self {
            items: completed_last(items),
        })
    }

    pub fn toggle_item(&self, item_id: &str) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id == item_id {
                    TodoItem {
                        completed: !item.completed,
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Self {
            items: completed_last(items),
        }
    }

    pub fn remove_item(&self, item_id: &str) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|item| item.id != item_id)
                .cloned()
                .collect(),
        }
    }

    pub fn pending(&self) -> usize {
        self.items.iter().filter(|item| !item.completed).count()
    }

    /// Resolve an item by exact id or by its 1-based position in the list.
    pub fn find(&self, key: &str) -> Option<&TodoItem> {
        if let Some(item) = self.items.iter().find(|item| item.id == key) {
            return Some(item);
        }
        key.parse::<usize>()
            .ok()
            .and_then(|pos| pos.checked_sub(1))
            .and_then(|idx| self.items.get(idx))
    }
}

/// Move completed items below open ones. The sort is stable, so each group
/// keeps its relative order.
pub(crate) fn completed_last(mut items: Vec<TodoItem>) -> Vec<TodoItem> {
    items.sort_by_key(|item| item.completed);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, completed: bool) -> TodoItem {
        TodoItem {
            id: id.into(),
            text: id.to_uppercase(),
            completed,
        }
    }

    #[test]
    fn add_item_trims_and_ignores_blank() {
        let cfg = TodoConfig::default();
        assert!(cfg.add_item("   ").is_none());
        let cfg = cfg.add_item("  water plants ").unwrap();
        assert_eq!(cfg.items.len(), 1);
        assert_eq!(cfg.items[0].text, "water plants");
        assert!(!cfg.items[0].completed);
    }

    #[test]
    fn new_items_land_above_completed_ones() {
        let cfg = TodoConfig {
            items: vec![item("a", true)],
        };
        let cfg = cfg.add_item("b").unwrap();
        assert_eq!(cfg.items[0].text, "b");
        assert_eq!(cfg.items[1].id, "a");
    }

    #[test]
    fn toggle_moves_completed_to_bottom_stably() {
        let cfg = TodoConfig {
            items: vec![item("a", false), item("b", false), item("c", false)],
        };
        let cfg = cfg.toggle_item("a");
        let ids: Vec<_> = cfg.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(cfg.pending(), 2);

        let cfg = cfg.toggle_item("a");
        let ids: Vec<_> = cfg.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(cfg.pending(), 3);
    }

    #[test]
    fn remove_unknown_item_is_noop() {
        let cfg = TodoConfig {
            items: vec![item("a", false)],
        };
        assert_eq!(cfg.remove_item("zzz"), cfg);
        assert!(cfg.remove_item("a").items.is_empty());
    }

    #[test]
    fn find_accepts_id_or_position() {
        let cfg = TodoConfig {
            items: vec![item("a", false), item("b", true)],
        };
        assert_eq!(cfg.find("b").map(|i| i.id.as_str()), Some("b"));
        assert_eq!(cfg.find("1").map(|i| i.id.as_str()), Some("a"));
        assert!(cfg.find("0").is_none());
        assert!(cfg.find("3").is_none());
    }
}
