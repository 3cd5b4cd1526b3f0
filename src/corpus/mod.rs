pub mod loader;

pub use loader::*;

use crate::bibtex::BibEntry;
use crate::common::CleanError;

/// Column names every corpus must provide
pub const REQUIRED_COLUMNS: [&str; 4] = ["ID", "title", "author", "year"];

/// Written for corpus cells that are missing or blank
pub const BLANK_PLACEHOLDER: &str = " ";

/// One canonical publication
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRow {
    values: Vec<Option<String>>,
    year: Option<i64>,
}

impl ReferenceRow {
    pub fn get(&self, column: usize) -> Option<&str> {
        self.values.get(column).and_then(|v| v.as_deref())
    }

    /// Year parsed once at load; `None` when the cell is blank or non-numeric
    pub fn year(&self) -> Option<i64> {
        self.year
    }
}

/// Read-only reference table, queried by the resolver
#[derive(Debug, Clone)]
pub struct Corpus {
    columns: Vec<String>,
    rows: Vec<ReferenceRow>,
    id_col: usize,
    title_col: usize,
    author_col: usize,
    entry_type_col: Option<usize>,
}

impl Corpus {
    /// Build a corpus from column names and row cells (`None` = missing)
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self, CleanError> {
        let position = |name: &str| columns.iter().position(|c| c == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| position(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(CleanError::corpus_load(
                "<corpus>",
                format!("missing required columns: {}", missing.join(", ")),
            ));
        }

        let id_col = position("ID").unwrap_or_default();
        let title_col = position("title").unwrap_or_default();
        let author_col = position("author").unwrap_or_default();
        let year_col = position("year").unwrap_or_default();
        let entry_type_col = position("ENTRYTYPE");

        let rows = rows
            .into_iter()
            .map(|mut values| {
                values.resize(columns.len(), None);
                let year = values[year_col].as_deref().and_then(parse_year);
                ReferenceRow { values, year }
            })
            .collect();

        Ok(Self {
            columns,
            rows,
            id_col,
            title_col,
            author_col,
            entry_type_col,
        })
    }

    /// Convenience constructor for small tables; empty cells are missing
    pub fn from_table(columns: &[&str], rows: &[Vec<&str>]) -> Result<Self, CleanError> {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                    .collect()
            })
            .collect();
        Self::from_rows(columns, rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row(&self, index: usize) -> &ReferenceRow {
        &self.rows[index]
    }

    /// Every row index, in corpus order
    pub fn all_rows(&self) -> Vec<usize> {
        (0..self.rows.len()).collect()
    }

    pub fn id(&self, index: usize) -> Option<&str> {
        self.rows[index].get(self.id_col)
    }

    pub fn title(&self, index: usize) -> Option<&str> {
        self.rows[index].get(self.title_col)
    }

    pub fn author(&self, index: usize) -> Option<&str> {
        self.rows[index].get(self.author_col)
    }

    pub fn year(&self, index: usize) -> Option<i64> {
        self.rows[index].year()
    }

    /// Flatten a row into an entry: every column becomes a text field,
    /// missing or blank cells become `BLANK_PLACEHOLDER`.
    ///
    /// The entry type comes from an `ENTRYTYPE` column when the row has one.
    pub fn to_entry(&self, index: usize, fallback_type: &str) -> BibEntry {
        let row = &self.rows[index];
        let entry_type = self
            .entry_type_col
            .and_then(|col| row.get(col))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(fallback_type)
            .to_lowercase();
        let id = row.get(self.id_col).unwrap_or_default().to_string();

        let mut entry = BibEntry::new(entry_type, id);
        for (col, name) in self.columns.iter().enumerate() {
            if col == self.id_col || Some(col) == self.entry_type_col {
                continue;
            }
            let value = match row.get(col) {
                Some(v) if !v.trim().is_empty() => v.to_string(),
                _ => BLANK_PLACEHOLDER.to_string(),
            };
            entry.set(name, value);
        }
        entry
    }
}

/// Parse a year cell; float renderings such as "2017.0" are accepted
pub fn parse_year(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(year) = cell.parse::<i64>() {
        return Some(year);
    }
    cell.parse::<f64>()
        .ok()
        .filter(|y| y.fract() == 0.0 && y.is_finite())
        .map(|y| y as i64)
}
