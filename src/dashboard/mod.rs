pub mod persistence;
pub mod reducer;
pub mod reorder;
pub mod session;
pub mod store;
pub mod widgets;

pub use persistence::{Hydrated, ImportMode, ImportReport, Persistence, Snapshot, STATE_KEY};
pub use reducer::{reduce, Intent};
pub use session::DashboardSession;
pub use store::DashboardStore;
pub use widgets::{Widget, WidgetConfig, WidgetId, WidgetRegistry, WidgetVariant};
