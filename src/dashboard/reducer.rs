use crate::dashboard::persistence::Snapshot;
use crate::dashboard::reorder::move_item;
use crate::dashboard::store::DashboardStore;
use crate::dashboard::widgets::{Widget, WidgetId, WidgetRegistry, WidgetVariant};
use crate::error::{DashboardError, Result};

/// A request to transition the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    LoadSnapshot(Snapshot),
    OpenAddModal,
    CloseAddModal,
    AddWidget(WidgetVariant),
    UpdateWidget(Widget),
    DeleteWidget(WidgetId),
    OpenDeleteModal(WidgetId),
    CloseDeleteModal,
    OpenEditModal(WidgetId),
    CloseEditModal,
    /// Result of a drag gesture. `destination` is `None` when the drag was
    /// cancelled.
    Reorder {
        source: usize,
        destination: Option<usize>,
    },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::LoadSnapshot(_) => "load_snapshot",
            Intent::OpenAddModal => "open_add_modal",
            Intent::CloseAddModal => "close_add_modal",
            Intent::AddWidget(_) => "add_widget",
            Intent::UpdateWidget(_) => "update_widget",
            Intent::DeleteWidget(_) => "delete_widget",
            Intent::OpenDeleteModal(_) => "open_delete_modal",
            Intent::CloseDeleteModal => "close_delete_modal",
            Intent::OpenEditModal(_) => "open_edit_modal",
            Intent::CloseEditModal => "close_edit_modal",
            Intent::Reorder { .. } => "reorder",
        }
    }
}

/// Compute the next store for `intent`.
///
/// `state` is never modified. On error the caller keeps `state` as the
/// current version.
pub fn reduce(
    state: &DashboardStore,
    intent: Intent,
    registry: &WidgetRegistry,
) -> Result<DashboardStore> {
    match intent {
        Intent::LoadSnapshot(snapshot) => Ok(DashboardStore {
            widgets: snapshot.into_widgets(),
            ..DashboardStore::default()
        }),
        Intent::OpenAddModal => Ok(DashboardStore {
            is_add_modal_open: true,
            ..state.clone()
        }),
        Intent::CloseAddModal => Ok(DashboardStore {
            is_add_modal_open: false,
            ..state.clone()
        }),
        Intent::AddWidget(variant) => {
            let widget = registry.create(variant)?;
            let mut widgets = state.widgets.clone();
            widgets.push(widget);
            Ok(DashboardStore {
                widgets,
                ..state.clone()
            })
        }
        Intent::UpdateWidget(widget) => {
            let idx = state
                .position(widget.id())
                .ok_or_else(|| DashboardError::WidgetNotFound(widget.id().to_string()))?;
            let current = &state.widgets[idx];
            if current.variant() != widget.variant() {
                return Err(DashboardError::VariantChanged {
                    id: widget.id().to_string(),
                    from: current.variant().to_string(),
                    to: widget.variant().to_string(),
                });
            }
            let mut widgets = state.widgets.clone();
            widgets[idx] = widget;
            Ok(DashboardStore {
                widgets,
                ..state.clone()
            })
        }
        Intent::DeleteWidget(id) => {
            let widgets: Vec<Widget> = state
                .widgets
                .iter()
                .filter(|w| w.id() != &id)
                .cloned()
                .collect();
            if state.selected_widget.as_ref() == Some(&id) {
                // The selection must never outlive the widget it points at.
                return Ok(DashboardStore {
                    widgets,
                    is_delete_modal_open: false,
                    is_edit_modal_open: false,
                    selected_widget: None,
                    ..state.clone()
                });
            }
            Ok(DashboardStore {
                widgets,
                ..state.clone()
            })
        }
        Intent::OpenDeleteModal(id) => {
            require_widget(state, &id)?;
            Ok(DashboardStore {
                is_delete_modal_open: true,
                is_edit_modal_open: false,
                selected_widget: Some(id),
                ..state.clone()
            })
        }
        // Closing a modal that is not open must not drop the other modal's
        // selection.
        Intent::CloseDeleteModal if !state.is_delete_modal_open => Ok(state.clone()),
        Intent::CloseDeleteModal => Ok(DashboardStore {
            is_delete_modal_open: false,
            selected_widget: None,
            ..state.clone()
        }),
        Intent::OpenEditModal(id) => {
            require_widget(state, &id)?;
            Ok(DashboardStore {
                is_edit_modal_open: true,
                is_delete_modal_open: false,
                selected_widget: Some(id),
                ..state.clone()
            })
        }
        Intent::CloseEditModal if !state.is_edit_modal_open => Ok(state.clone()),
        Intent::CloseEditModal => Ok(DashboardStore {
            is_edit_modal_open: false,
            selected_widget: None,
            ..state.clone()
        }),
        Intent::Reorder {
            source,
            destination,
        } => {
            let Some(destination) = destination else {
                return Ok(state.clone());
            };
            let widgets = move_item(&state.widgets, source, destination).ok_or(
                DashboardError::IndexOutOfRange {
                    source_index: source,
                    destination,
                    len: state.widgets.len(),
                },
            )?;
            Ok(DashboardStore {
                widgets,
                ..state.clone()
            })
        }
    }
}

fn require_widget(state: &DashboardStore, id: &WidgetId) -> Result<()> {
    if state.get(id).is_some() {
        Ok(())
    } else {
        Err(DashboardError::WidgetNotFound(id.to_string()))
    }
}
