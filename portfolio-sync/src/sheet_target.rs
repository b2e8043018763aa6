/// Last column cleared before new rows are written.
const LAST_COLUMN: &str = "Z";

/// The tab that receives positions and how its first row is treated.
///
/// With `preserve_header`, row 1 holds a "Last Updated" label and data starts at row 2.
/// Without it, the whole tab is replaced and data starts at row 1.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTarget {
    tab: String,
    preserve_header: bool,
}

impl SheetTarget {
    pub fn new(tab: &str, preserve_header: bool) -> Self {
        Self {
            tab: quote_tab(tab),
            preserve_header,
        }
    }

    fn first_data_row(&self) -> usize {
        if self.preserve_header { 2 } else { 1 }
    }

    /// Range wiped before the new rows are written.
    pub fn clear_range(&self) -> String {
        format!("{}!A{}:{}", self.tab, self.first_data_row(), LAST_COLUMN)
    }

    /// Top-left cell of the written rows.
    pub fn data_anchor(&self) -> String {
        format!("{}!A{}", self.tab, self.first_data_row())
    }

    /// Range holding the three data columns, used to read the rows back.
    pub fn data_range(&self) -> String {
        format!("{}!A{}:C", self.tab, self.first_data_row())
    }

    pub fn header_range(&self) -> Option<String> {
        self.preserve_header.then(|| format!("{}!A1", self.tab))
    }
}

fn quote_tab(tab: &str) -> String {
    if tab
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        tab.to_string()
    } else {
        format!("'{}'", tab.replace('\'', "''"))
    }
}
