use crate::error::{DashboardError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

mod chart;
mod list;
mod notes;
mod table;
mod todo;

pub use chart::{ChartConfig, ChartType};
pub use list::ListConfig;
pub use notes::NotesConfig;
pub use table::TableConfig;
pub use todo::{TodoConfig, TodoItem};

/// Closed set of widget kinds. Adding a variant means adding a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WidgetVariant {
    Chart,
    Table,
    List,
    Todo,
    Notes,
}

impl WidgetVariant {
    pub const ALL: [WidgetVariant; 5] = [
        WidgetVariant::Chart,
        WidgetVariant::Table,
        WidgetVariant::List,
        WidgetVariant::Todo,
        WidgetVariant::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetVariant::Chart => "CHART",
            WidgetVariant::Table => "TABLE",
            WidgetVariant::List => "LIST",
            WidgetVariant::Todo => "TODO",
            WidgetVariant::Notes => "NOTES",
        }
    }
}

impl std::fmt::Display for WidgetVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetVariant {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        WidgetVariant::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DashboardError::UnknownVariant(trimmed.to_string()))
    }
}

/// Variant-specific widget configuration. The widget's variant is derived from
/// this value, so config and tag cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WidgetConfig {
    Chart(ChartConfig),
    Table(TableConfig),
    List(ListConfig),
    Todo(TodoConfig),
    Notes(NotesConfig),
}

impl WidgetConfig {
    pub fn variant(&self) -> WidgetVariant {
        match self {
            WidgetConfig::Chart(_) => WidgetVariant::Chart,
            WidgetConfig::Table(_) => WidgetVariant::Table,
            WidgetConfig::List(_) => WidgetVariant::List,
            WidgetConfig::Todo(_) => WidgetVariant::Todo,
            WidgetConfig::Notes(_) => WidgetVariant::Notes,
        }
    }

    /// Parse a raw config object as the shape required by `variant`.
    pub fn from_value(variant: WidgetVariant, value: Value) -> serde_json::Result<Self> {
        Ok(match variant {
            WidgetVariant::Chart => WidgetConfig::Chart(serde_json::from_value(value)?),
            WidgetVariant::Table => WidgetConfig::Table(serde_json::from_value(value)?),
            WidgetVariant::List => WidgetConfig::List(serde_json::from_value(value)?),
            WidgetVariant::Todo => WidgetConfig::Todo(serde_json::from_value(value)?),
            WidgetVariant::Notes => WidgetConfig::Notes(serde_json::from_value(value)?),
        })
    }
}

/// Config types that belong to exactly one variant.
pub trait VariantConfig: Default + Into<WidgetConfig> {
    const VARIANT: WidgetVariant;
}

macro_rules! variant_config {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl VariantConfig for $ty {
                const VARIANT: WidgetVariant = WidgetVariant::$variant;
            }

            impl From<$ty> for WidgetConfig {
                fn from(cfg: $ty) -> Self {
                    WidgetConfig::$variant(cfg)
                }
            }
        )*
    };
}

variant_config! {
    ChartConfig => Chart,
    TableConfig => Table,
    ListConfig => List,
    TodoConfig => Todo,
    NotesConfig => Notes,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WidgetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WidgetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single dashboard tile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawWidget")]
pub struct Widget {
    id: WidgetId,
    pub title: String,
    pub config: WidgetConfig,
}

impl Widget {
    pub fn new(id: impl Into<WidgetId>, title: impl Into<String>, config: WidgetConfig) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            config,
        }
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn variant(&self) -> WidgetVariant {
        self.config.variant()
    }

    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    pub fn with_config(&self, config: impl Into<WidgetConfig>) -> Self {
        Self {
            config: config.into(),
            ..self.clone()
        }
    }
}

/// Wire form of a widget: `{id, type, title, config}`.
#[derive(Deserialize)]
struct RawWidget {
    id: WidgetId,
    #[serde(rename = "type")]
    variant: WidgetVariant,
    title: String,
    config: Value,
}

impl TryFrom<RawWidget> for Widget {
    type Error = String;

    fn try_from(raw: RawWidget) -> std::result::Result<Self, Self::Error> {
        let config = WidgetConfig::from_value(raw.variant, raw.config)
            .map_err(|e| format!("config of widget '{}' is not a {} config: {e}", raw.id, raw.variant))?;
        Ok(Widget {
            id: raw.id,
            title: raw.title,
            config,
        })
    }
}

#[derive(Serialize)]
struct WidgetRef<'a> {
    id: &'a WidgetId,
    #[serde(rename = "type")]
    variant: WidgetVariant,
    title: &'a str,
    config: &'a WidgetConfig,
}

impl Serialize for Widget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        WidgetRef {
            id: &self.id,
            variant: self.variant(),
            title: &self.title,
            config: &self.config,
        }
        .serialize(serializer)
    }
}

/// Opaque reference to a view component supplied by the presentation layer.
pub type ViewHandle = Arc<dyn Any + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetMetadata {
    pub variant: WidgetVariant,
    pub label: &'static str,
    pub description: &'static str,
    pub title: &'static str,
    pub has_config_editor: bool,
}

/// Registry entry for one variant: display metadata, default config and the
/// view handles attached by the presentation layer.
#[derive(Clone)]
pub struct WidgetDescriptor {
    variant: WidgetVariant,
    label: &'static str,
    description: &'static str,
    title: &'static str,
    init: fn() -> WidgetConfig,
    renderer: Option<ViewHandle>,
    config_editor: Option<ViewHandle>,
}

fn init_of<C: VariantConfig>() -> WidgetConfig {
    C::default().into()
}

impl WidgetDescriptor {
    pub fn new<C: VariantConfig>(
        label: &'static str,
        description: &'static str,
        title: &'static str,
    ) -> Self {
        Self {
            variant: C::VARIANT,
            label,
            description,
            title,
            init: init_of::<C>,
            renderer: None,
            config_editor: None,
        }
    }

    pub fn with_renderer(mut self, renderer: ViewHandle) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_config_editor(mut self, editor: ViewHandle) -> Self {
        self.config_editor = Some(editor);
        self
    }

    pub fn variant(&self) -> WidgetVariant {
        self.variant
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    /// A freshly built default config; never shared with another widget.
    pub fn default_config(&self) -> WidgetConfig {
        (self.init)()
    }

    pub fn renderer(&self) -> Option<&ViewHandle> {
        self.renderer.as_ref()
    }

    pub fn config_editor(&self) -> Option<&ViewHandle> {
        self.config_editor.as_ref()
    }

    pub fn metadata(&self) -> WidgetMetadata {
        WidgetMetadata {
            variant: self.variant,
            label: self.label,
            description: self.description,
            title: self.title,
            has_config_editor: self.config_editor.is_some(),
        }
    }
}

impl std::fmt::Debug for WidgetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetDescriptor")
            .field("variant", &self.variant)
            .field("label", &self.label)
            .field("title", &self.title)
            .field("has_renderer", &self.renderer.is_some())
            .field("has_config_editor", &self.config_editor.is_some())
            .finish()
    }
}

static DEFAULT_REGISTRY: Lazy<WidgetRegistry> = Lazy::new(WidgetRegistry::with_defaults);

#[derive(Clone, Default, Debug)]
pub struct WidgetRegistry {
    map: HashMap<WidgetVariant, WidgetDescriptor>,
}

impl WidgetRegistry {
    /// The built-in catalog shared by the whole process. It is never mutated;
    /// views that need handles build their own registry from `with_defaults`.
    pub fn global() -> &'static WidgetRegistry {
        &DEFAULT_REGISTRY
    }

    pub fn with_defaults() -> Self {
        let mut reg = Self::default();
        reg.register(WidgetDescriptor::new::<ChartConfig>(
            "Chart",
            "Display a bar chart.",
            "Chart Widget",
        ));
        reg.register(WidgetDescriptor::new::<TableConfig>(
            "Table",
            "Organize data in rows and columns.",
            "Table Widget",
        ));
        reg.register(WidgetDescriptor::new::<ListConfig>(
            "NHL Week Schedule",
            "Show a simple list of NHL team week schedule.",
            "List Widget",
        ));
        reg.register(WidgetDescriptor::new::<NotesConfig>(
            "Notes",
            "Write down quick thoughts and reminders.",
            "Notes Widget",
        ));
        reg.register(WidgetDescriptor::new::<TodoConfig>(
            "Todo List",
            "Track your tasks and get things done.",
            "Todo Widget",
        ));
        reg
    }

    pub fn register(&mut self, descriptor: WidgetDescriptor) {
        self.map.insert(descriptor.variant, descriptor);
    }

    pub fn contains(&self, variant: WidgetVariant) -> bool {
        self.map.contains_key(&variant)
    }

    pub fn lookup(&self, variant: WidgetVariant) -> Result<&WidgetDescriptor> {
        self.map
            .get(&variant)
            .ok_or_else(|| DashboardError::UnknownVariant(variant.to_string()))
    }

    pub fn lookup_name(&self, name: &str) -> Result<&WidgetDescriptor> {
        self.lookup(name.parse()?)
    }

    pub fn default_config(&self, variant: WidgetVariant) -> Result<WidgetConfig> {
        self.lookup(variant).map(WidgetDescriptor::default_config)
    }

    /// Build a new widget with a fresh id, the default title and default config.
    pub fn create(&self, variant: WidgetVariant) -> Result<Widget> {
        let descriptor = self.lookup(variant)?;
        Ok(Widget {
            id: WidgetId::generate(),
            title: descriptor.title.to_string(),
            config: descriptor.default_config(),
        })
    }

    pub fn variants(&self) -> Vec<WidgetVariant> {
        let mut variants: Vec<WidgetVariant> = self.map.keys().copied().collect();
        variants.sort();
        variants
    }

    pub fn metadata(&self) -> Vec<WidgetMetadata> {
        let mut meta: Vec<WidgetMetadata> =
            self.map.values().map(WidgetDescriptor::metadata).collect();
        meta.sort_by_key(|m| m.variant);
        meta
    }
}
