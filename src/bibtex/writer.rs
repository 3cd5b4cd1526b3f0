use super::{BibEntry, FieldValue, StringExpr};
use crate::common::CleanError;

/// Fields emitted first, in this order; the rest follow alphabetically
pub const DEFAULT_FIELD_ORDER: [&str; 10] = [
    "title",
    "author",
    "booktitle",
    "journal",
    "month",
    "year",
    "address",
    "publisher",
    "url",
    "pages",
];

/// Layout options for BibTeX output
#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub indent: String,
    /// Pad field names to the widest name in the entry
    pub align_values: bool,
    /// Append a comma after the final field
    pub trailing_comma: bool,
    pub field_order: Vec<String>,
    /// Skip fields whose text is exactly one character (blank placeholders, stray marks)
    pub drop_single_char_values: bool,
    /// Written after each entry's closing brace line
    pub entry_separator: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            align_values: true,
            trailing_comma: false,
            field_order: DEFAULT_FIELD_ORDER.iter().map(|f| f.to_string()).collect(),
            drop_single_char_values: true,
            entry_separator: "\n".to_string(),
        }
    }
}

/// Deterministic BibTeX serializer
#[derive(Debug, Clone, Default)]
pub struct BibWriter {
    config: WriterConfig,
}

impl BibWriter {
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Fields in emission order: priority list first, then by name
    pub fn ordered_fields<'e>(&self, entry: &'e BibEntry) -> Vec<(&'e str, &'e FieldValue)> {
        let keep = |value: &FieldValue| !(self.config.drop_single_char_values && value.text_len() == Some(1));

        let mut ordered: Vec<(&str, &FieldValue)> = Vec::with_capacity(entry.fields.len());
        for name in &self.config.field_order {
            if let Some((key, value)) = entry.fields.get_key_value(name.as_str()) {
                if keep(value) {
                    ordered.push((key.as_str(), value));
                }
            }
        }
        // BTreeMap iteration is already lexicographic
        for (key, value) in &entry.fields {
            if self.config.field_order.iter().any(|f| f == key) {
                continue;
            }
            if keep(value) {
                ordered.push((key.as_str(), value));
            }
        }
        ordered
    }

    /// Render one entry; nothing is produced if any field is not writable
    pub fn write_entry(&self, entry: &BibEntry) -> Result<String, CleanError> {
        let fields = self.ordered_fields(entry);
        let width = if self.config.align_values {
            fields.iter().map(|(name, _)| name.chars().count()).max().unwrap_or(0)
        } else {
            0
        };

        let mut out = format!("@{}{{{}", entry.entry_type, entry.id);
        for (name, value) in fields {
            let rendered = render_value(name, value, &entry.id)?;
            out.push_str(&format!(
                ",\n{}{:<width$} = {}",
                self.config.indent,
                name,
                rendered,
                width = width
            ));
        }
        if self.config.trailing_comma {
            out.push(',');
        }
        out.push_str("\n}\n");
        out.push_str(&self.config.entry_separator);
        Ok(out)
    }

    /// Render entries in order, collecting failures instead of stopping
    pub fn write_entries(&self, entries: &[BibEntry]) -> (String, Vec<CleanError>) {
        let mut text = String::new();
        let mut failures = Vec::new();
        for entry in entries {
            match self.write_entry(entry) {
                Ok(rendered) => text.push_str(&rendered),
                Err(e) => failures.push(e),
            }
        }
        (text, failures)
    }
}

fn render_value(name: &str, value: &FieldValue, id: &str) -> Result<String, CleanError> {
    let writable = match value {
        FieldValue::Text(s) => braces_balanced(s),
        FieldValue::Expr(expr) => literals_balanced(expr),
        FieldValue::List(_) => {
            return Err(CleanError::NonStringFieldValue {
                field: name.to_string(),
                id: id.to_string(),
            })
        }
    };
    if !writable {
        return Err(CleanError::UnbalancedBraces {
            field: name.to_string(),
            id: id.to_string(),
        });
    }
    Ok(match value {
        FieldValue::Expr(expr) => expr.to_bibtex(),
        _ => format!("{{{}}}", value.to_plain_text()),
    })
}

fn literals_balanced(expr: &StringExpr) -> bool {
    match expr {
        StringExpr::Literal(s) => braces_balanced(s),
        StringExpr::Ref(_) => true,
        StringExpr::Concat(parts) => parts.iter().all(literals_balanced),
    }
}

/// True when `{value}` reads back as exactly `value`, whether or not the
/// reader treats a backslash as escaping the next character
pub fn braces_balanced(value: &str) -> bool {
    nesting_closes(value, false) && nesting_closes(value, true)
}

fn nesting_closes(value: &str, backslash_escapes: bool) -> bool {
    let mut depth = 0usize;
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' if backslash_escapes => {
                if chars.next().is_none() {
                    return false;
                }
            }
            '{' => depth += 1,
            '}' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}
