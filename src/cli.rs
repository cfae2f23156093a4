//! Command-line host: parses one command, turns it into the same intent
//! sequence the dashboard views would dispatch, and renders the result.

use crate::auth::AuthSession;
use crate::dashboard::widgets::{TableConfig, Widget, WidgetConfig, WidgetVariant};
use crate::dashboard::{DashboardSession, DashboardStore, Intent, WidgetId};
use anyhow::{anyhow, bail, Result};
use std::path::{Path, PathBuf};

pub const USAGE: &str = "\
usage: dashboard_editor <command>
  list                         show the widgets in display order
  registry                     show the available widget types
  add <type>                   add a widget (chart, table, list, todo, notes)
  rename <widget> <title>      change a widget title
  note <widget> <text>         replace the text of a notes widget
  table <widget> <rows> <cols> resize a table widget
  team <widget> <code>         set the team of a schedule list widget
  todo-add <widget> <text>     add a task to a todo widget
  todo-toggle <widget> <task>  mark a task done or open again
  todo-rm <widget> <task>      remove a task
  delete <widget>              remove a widget
  move <from> <to>             move a widget between positions (1-based)
  import <file>                replace the dashboard with an exported file
  export [dir]                 write the dashboard to a timestamped file
  login | logout               start or end the local session
<widget> is an id, an id prefix or a position from `list`.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseArgsResult<T> {
    Parsed(T),
    Usage(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Registry,
    Add(String),
    Rename { widget: String, title: String },
    Note { widget: String, text: String },
    Table { widget: String, rows: u32, cols: u32 },
    Team { widget: String, code: String },
    TodoAdd { widget: String, text: String },
    TodoToggle { widget: String, task: String },
    TodoRemove { widget: String, task: String },
    Delete(String),
    Move { from: usize, to: usize },
    Import(PathBuf),
    Export(Option<PathBuf>),
    Login,
    Logout,
}

impl Command {
    /// Commands that change the dashboard need a signed-in user.
    pub fn requires_session(&self) -> bool {
        !matches!(
            self,
            Command::List | Command::Registry | Command::Export(_) | Command::Login | Command::Logout
        )
    }
}

fn rest(args: &[&str]) -> Option<String> {
    let text = args.join(" ");
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn position(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok().filter(|p| *p > 0)
}

pub fn parse_args(args: &[&str]) -> ParseArgsResult<Command> {
    let Some((cmd, args)) = args.split_first() else {
        return ParseArgsResult::Usage(USAGE.to_string());
    };
    let parsed = match (*cmd, args) {
        ("list", []) => Some(Command::List),
        ("registry", []) => Some(Command::Registry),
        ("add", [variant]) => Some(Command::Add(variant.to_string())),
        ("rename", [widget, title @ ..]) => rest(title).map(|title| Command::Rename {
            widget: widget.to_string(),
            title,
        }),
        ("note", [widget, text @ ..]) => Some(Command::Note {
            widget: widget.to_string(),
            text: text.join(" "),
        }),
        ("table", [widget, rows, cols]) => match (rows.parse(), cols.parse()) {
            (Ok(rows), Ok(cols)) => Some(Command::Table {
                widget: widget.to_string(),
                rows,
                cols,
            }),
            _ => None,
        },
        ("team", [widget, code]) => Some(Command::Team {
            widget: widget.to_string(),
            code: code.to_string(),
        }),
        ("todo-add", [widget, text @ ..]) => rest(text).map(|text| Command::TodoAdd {
            widget: widget.to_string(),
            text,
        }),
        ("todo-toggle", [widget, task]) => Some(Command::TodoToggle {
            widget: widget.to_string(),
            task: task.to_string(),
        }),
        ("todo-rm", [widget, task]) => Some(Command::TodoRemove {
            widget: widget.to_string(),
            task: task.to_string(),
        }),
        ("delete", [widget]) => Some(Command::Delete(widget.to_string())),
        ("move", [from, to]) => match (position(from), position(to)) {
            (Some(from), Some(to)) => Some(Command::Move {
                from: from - 1,
                to: to - 1,
            }),
            _ => None,
        },
        ("import", [file]) => Some(Command::Import(PathBuf::from(file))),
        ("export", []) => Some(Command::Export(None)),
        ("export", [dir]) => Some(Command::Export(Some(PathBuf::from(dir)))),
        ("login", []) => Some(Command::Login),
        ("logout", []) => Some(Command::Logout),
        _ => None,
    };
    match parsed {
        Some(command) => ParseArgsResult::Parsed(command),
        None => ParseArgsResult::Usage(USAGE.to_string()),
    }
}

/// Find a widget by exact id, 1-based position or unique id prefix.
pub fn resolve_widget<'a>(store: &'a DashboardStore, key: &str) -> Result<&'a Widget> {
    if let Some(widget) = store.get(&WidgetId::from(key)) {
        return Ok(widget);
    }
    if let Some(idx) = position(key) {
        return store
            .widgets
            .get(idx - 1)
            .ok_or_else(|| anyhow!("no widget at position {idx}"));
    }
    let mut matches = store.widgets.iter().filter(|w| w.id().as_str().starts_with(key));
    match (matches.next(), matches.next()) {
        (Some(widget), None) => Ok(widget),
        (Some(_), Some(_)) => bail!("widget id prefix '{key}' is ambiguous"),
        _ => bail!("no widget matches '{key}'"),
    }
}

pub fn summarize(widget: &Widget) -> String {
    match &widget.config {
        WidgetConfig::Chart(cfg) => format!("{:?} chart", cfg.chart_type).to_lowercase(),
        WidgetConfig::Table(cfg) => format!("{} x {}", cfg.row_count, cfg.col_count),
        WidgetConfig::List(cfg) if cfg.is_configured() => format!("team {}", cfg.team),
        WidgetConfig::List(_) => "no team selected".to_string(),
        WidgetConfig::Todo(cfg) => format!("{} of {} open", cfg.pending(), cfg.items.len()),
        WidgetConfig::Notes(cfg) => match cfg.content.lines().next() {
            Some(line) if !line.is_empty() => line.to_string(),
            _ => "empty".to_string(),
        },
    }
}

pub fn render_list(store: &DashboardStore) -> String {
    if store.is_empty() {
        return "Your dashboard is empty. Use `add <type>` to get started.".to_string();
    }
    store
        .widgets
        .iter()
        .enumerate()
        .map(|(idx, w)| {
            let mut line = format!(
                "{}. [{}] {} - {} ({})",
                idx + 1,
                w.variant(),
                w.title,
                summarize(w),
                w.id()
            );
            if let WidgetConfig::Todo(todo) = &w.config {
                for (pos, item) in todo.items.iter().enumerate() {
                    let mark = if item.completed { "x" } else { " " };
                    line.push_str(&format!("\n     {}. [{mark}] {}", pos + 1, item.text));
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Dispatch the edit flow for one widget: open the editor, save, close.
fn edit(session: &mut DashboardSession, updated: Widget) -> Result<()> {
    let id = updated.id().clone();
    session.dispatch(Intent::OpenEditModal(id))?;
    let saved = session.dispatch(Intent::UpdateWidget(updated));
    session.dispatch(Intent::CloseEditModal)?;
    saved?;
    Ok(())
}

fn widget_for(session: &DashboardSession, key: &str) -> Result<Widget> {
    let store = session.store();
    resolve_widget(&store, key).cloned()
}

pub fn run(
    command: Command,
    session: &mut DashboardSession,
    auth: &mut AuthSession,
    default_export_dir: &Path,
) -> Result<String> {
    if command.requires_session() && !auth.is_authenticated() {
        bail!("sign in first with `login`");
    }
    match command {
        Command::List => Ok(render_list(&session.store())),
        Command::Registry => Ok(session
            .registry()
            .metadata()
            .iter()
            .map(|m| format!("{:<6} {} - {}", m.variant.as_str(), m.label, m.description))
            .collect::<Vec<_>>()
            .join("\n")),
        Command::Add(name) => {
            let variant: WidgetVariant = name.parse()?;
            session.dispatch(Intent::OpenAddModal)?;
            let added = session.dispatch(Intent::AddWidget(variant));
            session.dispatch(Intent::CloseAddModal)?;
            let store = added?;
            let widget = store
                .widgets
                .last()
                .ok_or_else(|| anyhow!("widget was not added"))?;
            Ok(format!("added {} ({})", widget.title, widget.id()))
        }
        Command::Rename { widget, title } => {
            let current = widget_for(session, &widget)?;
            edit(session, current.with_title(title.trim()))?;
            Ok(format!("renamed {}", current.id()))
        }
        Command::Note { widget, text } => {
            let current = widget_for(session, &widget)?;
            let WidgetConfig::Notes(notes) = &current.config else {
                bail!("'{}' is not a notes widget", current.title);
            };
            match notes.with_content(&text) {
                Some(updated) => {
                    edit(session, current.with_config(updated))?;
                    Ok("note saved".to_string())
                }
                None => Ok("note unchanged".to_string()),
            }
        }
        Command::Table { widget, rows, cols } => {
            let current = widget_for(session, &widget)?;
            if !matches!(current.config, WidgetConfig::Table(_)) {
                bail!("'{}' is not a table widget", current.title);
            }
            let cfg = TableConfig::new(rows, cols);
            let msg = format!("table is now {} x {}", cfg.row_count, cfg.col_count);
            edit(session, current.with_config(cfg))?;
            Ok(msg)
        }
        Command::Team { widget, code } => {
            let current = widget_for(session, &widget)?;
            let WidgetConfig::List(list) = &current.config else {
                bail!("'{}' is not a schedule list widget", current.title);
            };
            let mut list = list.clone();
            list.team = code.trim().to_uppercase();
            edit(session, current.with_config(list))?;
            Ok(format!("team set to {}", code.trim().to_uppercase()))
        }
        Command::TodoAdd { widget, text } => {
            let current = widget_for(session, &widget)?;
            let WidgetConfig::Todo(todo) = &current.config else {
                bail!("'{}' is not a todo widget", current.title);
            };
            match todo.add_item(&text) {
                Some(updated) => {
                    session.dispatch(Intent::UpdateWidget(current.with_config(updated)))?;
                    Ok("task added".to_string())
                }
                None => Ok("nothing to add".to_string()),
            }
        }
        Command::TodoToggle { widget, task } => {
            let current = widget_for(session, &widget)?;
            let WidgetConfig::Todo(todo) = &current.config else {
                bail!("'{}' is not a todo widget", current.title);
            };
            let item = todo.find(&task).ok_or_else(|| anyhow!("no task matches '{task}'"))?;
            let updated = todo.toggle_item(&item.id);
            session.dispatch(Intent::UpdateWidget(current.with_config(updated)))?;
            Ok("task updated".to_string())
        }
        Command::TodoRemove { widget, task } => {
            let current = widget_for(session, &widget)?;
            let WidgetConfig::Todo(todo) = &current.config else {
                bail!("'{}' is not a todo widget", current.title);
            };
            let item = todo.find(&task).ok_or_else(|| anyhow!("no task matches '{task}'"))?;
            let updated = todo.remove_item(&item.id);
            session.dispatch(Intent::UpdateWidget(current.with_config(updated)))?;
            Ok("task removed".to_string())
        }
        Command::Delete(widget) => {
            let current = widget_for(session, &widget)?;
            let id = current.id().clone();
            session.dispatch(Intent::OpenDeleteModal(id.clone()))?;
            session.dispatch(Intent::DeleteWidget(id))?;
            session.dispatch(Intent::CloseDeleteModal)?;
            Ok(format!("deleted {}", current.title))
        }
        Command::Move { from, to } => {
            session.dispatch(Intent::Reorder {
                source: from,
                destination: Some(to),
            })?;
            Ok(render_list(&session.store()))
        }
        Command::Import(path) => {
            let report = session.import_file(&path)?;
            let mut out = format!("imported {} widgets", report.snapshot.widgets().len());
            for warning in report.warnings {
                out.push_str(&format!("\nwarning: {warning}"));
            }
            Ok(out)
        }
        Command::Export(dir) => {
            let dir = dir.unwrap_or_else(|| default_export_dir.to_path_buf());
            let path = session.export(&dir)?;
            Ok(format!("exported to {}", path.display()))
        }
        Command::Login => {
            let user = auth.login()?;
            Ok(format!("signed in as {}", user.name))
        }
        Command::Logout => {
            auth.logout();
            Ok("signed out".to_string())
        }
    }
}
