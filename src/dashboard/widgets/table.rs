use serde::{Deserialize, Serialize};

/// Upper bound offered by the table settings editor.
pub(crate) const MAX_ROWS: u32 = 20;
/// Upper bound offered by the table settings editor.
pub(crate) const MAX_COLS: u32 = 10;

fn default_rows() -> u32 {
    3
}

fn default_cols() -> u32 {
    3
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TableSize")]
pub struct TableConfig {
    pub row_count: u32,
    pub col_count: u32,
}

/// Stored table size before the editor limits are checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableSize {
    row_count: u32,
    col_count: u32,
}

impl TryFrom<TableSize> for TableConfig {
    type Error = String;

    fn try_from(size: TableSize) -> Result<Self, Self::Error> {
        if size.row_count > MAX_ROWS || size.col_count > MAX_COLS {
            return Err(format!(
                "table size {} x {} exceeds the {MAX_ROWS} x {MAX_COLS} limit",
                size.row_count, size.col_count
            ));
        }
        Ok(Self {
            row_count: size.row_count,
            col_count: size.col_count,
        })
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_count: default_rows(),
            col_count: default_cols(),
        }
    }
}

impl TableConfig {
    /// Build a table size, clamping to the editor limits.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            row_count: rows.min(MAX_ROWS),
            col_count: cols.min(MAX_COLS),
        }
    }
}
