use biblatex::{RawBibliography, RawChunk, Spanned};
use std::collections::BTreeMap;

use super::customize::{customize, Customization};
use super::{BibDatabase, BibEntry, FieldValue, StringExpr};
use crate::common::CleanError;

/// Month abbreviations every BibTeX style predefines
pub const COMMON_STRINGS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// Options for turning BibTeX text into entries.
///
/// Values are kept exactly as written between their delimiters; any decoding
/// (see `convert_to_unicode`) is a customization.
#[derive(Clone)]
pub struct ParserConfig {
    /// Resolve the month abbreviations in `COMMON_STRINGS`
    pub common_strings: bool,
    /// Applied to every entry after its fields are read
    pub customizations: Vec<Customization>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            common_strings: true,
            customizations: Vec::new(),
        }
    }
}

/// Parse BibTeX text into a database of entries, macros and preambles
pub fn parse_bibtex(text: &str, config: &ParserConfig) -> Result<BibDatabase, CleanError> {
    let raw = RawBibliography::parse(text).map_err(|e| CleanError::Parse {
        line: line_at(text, e.span.start),
        message: e.to_string(),
    })?;

    let mut db = BibDatabase::default();
    if !raw.preamble.trim().is_empty() {
        db.preambles.push(raw.preamble.clone());
    }

    let mut macros = Macros::new(config.common_strings);
    for pair in &raw.abbreviations {
        let name = pair.key.v.to_lowercase();
        let value = macros.resolve(&pair.value.v).to_plain_text();
        macros.define(&name, &value);
        db.strings.insert(name, value);
    }

    for spanned in &raw.entries {
        let raw_entry = &spanned.v;
        let key = raw_entry.key.v.trim();
        if key.is_empty() {
            return Err(CleanError::Parse {
                line: line_at(text, spanned.span.start),
                message: format!("missing citation key in @{}", raw_entry.kind.v),
            });
        }

        let mut entry = BibEntry::new(raw_entry.kind.v.to_lowercase(), key);
        for pair in &raw_entry.fields {
            // last occurrence of a duplicated field wins
            entry
                .fields
                .insert(pair.key.v.to_lowercase(), macros.resolve(&pair.value.v));
        }
        db.entries.push(customize(entry, &config.customizations));
    }

    Ok(db)
}

/// 1-based line of a byte offset
fn line_at(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// `@string` definitions seen so far, plus the month names when enabled
struct Macros {
    defined: BTreeMap<String, String>,
    common_strings: bool,
}

impl Macros {
    fn new(common_strings: bool) -> Self {
        Self {
            defined: BTreeMap::new(),
            common_strings,
        }
    }

    fn define(&mut self, name: &str, value: &str) {
        self.defined.insert(name.to_string(), value.to_string());
    }

    fn lookup(&self, name: &str) -> Option<String> {
        if let Some(value) = self.defined.get(name) {
            return Some(value.clone());
        }
        if self.common_strings {
            return COMMON_STRINGS
                .iter()
                .find(|(abbr, _)| *abbr == name)
                .map(|(_, month)| month.to_string());
        }
        None
    }

    /// Substitute known macros; fully literal values collapse to text
    fn resolve(&self, chunks: &[Spanned<RawChunk<'_>>]) -> FieldValue {
        let mut parts: Vec<StringExpr> = chunks
            .iter()
            .map(|chunk| match &chunk.v {
                RawChunk::Normal(text) => StringExpr::Literal(text.to_string()),
                RawChunk::Abbreviation(name) => {
                    let name = name.to_lowercase();
                    match self.lookup(&name) {
                        Some(value) => StringExpr::Literal(value),
                        None => StringExpr::Ref(name),
                    }
                }
            })
            .collect();

        if parts.iter().all(|p| matches!(p, StringExpr::Literal(_))) {
            let text: String = parts.iter().map(|p| p.to_plain_text()).collect();
            return FieldValue::Text(text);
        }

        if parts.len() == 1 {
            FieldValue::Expr(parts.remove(0))
        } else {
            FieldValue::Expr(StringExpr::Concat(parts))
        }
    }
}
