use crate::dashboard::widgets::{Widget, WidgetId};
use serde::{Deserialize, Serialize};

/// The complete dashboard state. Each accepted intent produces a new value;
/// an existing value is never changed after it has been published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStore {
    #[serde(default)]
    pub widgets: Vec<Widget>,
    #[serde(default)]
    pub is_add_modal_open: bool,
    #[serde(default)]
    pub is_delete_modal_open: bool,
    #[serde(default)]
    pub is_edit_modal_open: bool,
    #[serde(default)]
    pub selected_widget: Option<WidgetId>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn position(&self, id: &WidgetId) -> Option<usize> {
        self.widgets.iter().position(|w| w.id() == id)
    }

    pub fn get(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id() == id)
    }

    pub fn selected(&self) -> Option<&Widget> {
        self.selected_widget.as_ref().and_then(|id| self.get(id))
    }

    /// Check the selection invariants, returning a description of every
    /// violation found.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let modal_open = self.is_delete_modal_open || self.is_edit_modal_open;
        if self.is_delete_modal_open && self.is_edit_modal_open {
            problems.push("delete and edit modals are open at the same time".to_string());
        }
        match &self.selected_widget {
            Some(id) => {
                if !modal_open {
                    problems.push(format!("widget '{id}' selected with no modal open"));
                }
                if self.get(id).is_none() {
                    problems.push(format!("selected widget '{id}' is not on the dashboard"));
                }
            }
            None if modal_open => {
                problems.push("a widget modal is open without a selection".to_string());
            }
            None => {}
        }
        let mut seen = std::collections::HashSet::new();
        for widget in &self.widgets {
            if !seen.insert(widget.id()) {
                problems.push(format!("duplicate widget id '{}'", widget.id()));
            }
        }
        problems
    }

    pub fn is_consistent(&self) -> bool {
        self.invariant_violations().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::widgets::{NotesConfig, Widget};
    use serde_json::json;

    #[test]
    fn serializes_with_camel_case_keys() {
        let store = DashboardStore {
            widgets: vec![Widget::new("a", "Notes", NotesConfig::default().into())],
            ..Default::default()
        };
        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(
            value,
            json!({
                "widgets": [{"id": "a", "type": "NOTES", "title": "Notes", "config": {"content": ""}}],
                "isAddModalOpen": false,
                "isDeleteModalOpen": false,
                "isEditModalOpen": false,
                "selectedWidget": null
            })
        );
    }

    #[test]
    fn detects_dangling_selection() {
        let store = DashboardStore {
            is_edit_modal_open: true,
            selected_widget: Some("ghost".into()),
            ..Default::default()
        };
        let problems = store.invariant_violations();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("ghost"));
        assert!(DashboardStore::new().is_consistent());
    }
}
