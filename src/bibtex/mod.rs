pub mod customize;
pub mod latex;
pub mod parser;
pub mod writer;

pub use customize::*;
pub use parser::{parse_bibtex, ParserConfig};
pub use writer::{BibWriter, WriterConfig};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// String-concatenation expression as written with `#` in BibTeX
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StringExpr {
    /// Literal text, emitted in braces
    Literal(String),
    /// Reference to an `@string` macro, emitted bare
    Ref(String),
    /// Ordered fragments joined by `#`
    Concat(Vec<StringExpr>),
}

impl StringExpr {
    /// Render the expression back into BibTeX value syntax
    pub fn to_bibtex(&self) -> String {
        match self {
            StringExpr::Literal(s) => format!("{{{}}}", s),
            StringExpr::Ref(name) => name.clone(),
            StringExpr::Concat(parts) => parts
                .iter()
                .map(|p| p.to_bibtex())
                .collect::<Vec<_>>()
                .join(" # "),
        }
    }

    /// Flatten to text, keeping unresolved macro names verbatim
    pub fn to_plain_text(&self) -> String {
        match self {
            StringExpr::Literal(s) => s.clone(),
            StringExpr::Ref(name) => name.clone(),
            StringExpr::Concat(parts) => parts.iter().map(|p| p.to_plain_text()).collect(),
        }
    }
}

/// Value held by one field of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Expr(StringExpr),
    /// Produced by list customizations (split names, keywords); not writable
    List(Vec<String>),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Best-effort plain text for matching; lists join with " and "
    pub fn to_plain_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Expr(e) => e.to_plain_text(),
            FieldValue::List(items) => items.join(" and "),
        }
    }

    /// Length in characters of a textual value; `None` for expressions and lists
    pub fn text_len(&self) -> Option<usize> {
        self.as_text().map(|s| s.chars().count())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// One bibliography entry: `@entry_type{id, fields...}`
///
/// Field names are lowercase and unique; iteration order is lexicographic and
/// carries no meaning. Output order is decided by the writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibEntry {
    pub entry_type: String,
    pub id: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl BibEntry {
    pub fn new(entry_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Field as plain text, if present
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|v| v.to_plain_text())
    }

    pub fn title(&self) -> Option<String> {
        self.text("title")
    }

    pub fn year(&self) -> Option<String> {
        self.text("year")
    }

    /// Author-name tokens: a split list is used as-is, text is split on " and "
    pub fn author_tokens(&self) -> Vec<String> {
        match self.fields.get("author") {
            Some(FieldValue::List(names)) => names.clone(),
            Some(other) => split_names(&other.to_plain_text()),
            None => Vec::new(),
        }
    }
}

/// Split a BibTeX name list on the ` and ` separator
pub fn split_names(value: &str) -> Vec<String> {
    value
        .split(" and ")
        .map(|n| n.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|n| !n.is_empty())
        .collect()
}

impl fmt::Display for BibEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}{{{}}}", self.entry_type, self.id)
    }
}

/// Everything a parsed bibliography file contains
#[derive(Debug, Clone, Default)]
pub struct BibDatabase {
    pub entries: Vec<BibEntry>,
    pub strings: BTreeMap<String, String>,
    pub preambles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_to_bibtex() {
        let expr = StringExpr::Concat(vec![
            StringExpr::Literal("Proceedings of ".to_string()),
            StringExpr::Ref("acl".to_string()),
        ]);
        assert_eq!(expr.to_bibtex(), "{Proceedings of } # acl");
        assert_eq!(expr.to_plain_text(), "Proceedings of acl");
    }

    #[test]
    fn test_nested_concat_renders_flat() {
        let expr = StringExpr::Concat(vec![
            StringExpr::Ref("a".to_string()),
            StringExpr::Concat(vec![
                StringExpr::Literal("b".to_string()),
                StringExpr::Ref("c".to_string()),
            ]),
        ]);
        assert_eq!(expr.to_bibtex(), "a # {b} # c");
    }

    #[test]
    fn test_author_tokens_from_text() {
        let entry = BibEntry::new("article", "k")
            .with_field("author", "Vaswani, Ashish and  Shazeer,  Noam");
        assert_eq!(entry.author_tokens(), vec!["Vaswani, Ashish", "Shazeer, Noam"]);
    }

    #[test]
    fn test_author_tokens_from_list() {
        let mut entry = BibEntry::new("article", "k");
        entry.set("author", FieldValue::List(vec!["Vaswani".to_string()]));
        assert_eq!(entry.author_tokens(), vec!["Vaswani"]);
    }

    #[test]
    fn test_field_names_are_lowercased() {
        let entry = BibEntry::new("article", "k").with_field("Title", "X");
        assert!(entry.get("title").is_some());
        assert!(entry.get("Title").is_none());
    }

    #[test]
    fn test_text_len_counts_chars() {
        assert_eq!(FieldValue::text("é").text_len(), Some(1));
        assert_eq!(FieldValue::List(vec![]).text_len(), None);
    }
}
