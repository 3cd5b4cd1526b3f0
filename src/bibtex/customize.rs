use lazy_static::lazy_static;
use regex::Regex;

use super::latex::latex_to_unicode;
use super::{split_names, BibEntry, FieldValue, StringExpr};

lazy_static! {
    /// Single hyphen (or en dash) between two page tokens
    static ref PAGE_RANGE: Regex = Regex::new(r"^\s*(\S+?)\s*(?:-|–|—)\s*(\S+)\s*$").unwrap();
}

/// A record-level transform applied after parsing
pub type Customization = fn(BibEntry) -> BibEntry;

/// Decode LaTeX in every value; macro references are left alone
pub fn convert_to_unicode(mut entry: BibEntry) -> BibEntry {
    for value in entry.fields.values_mut() {
        match value {
            FieldValue::Text(text) => *text = latex_to_unicode(text),
            FieldValue::Expr(expr) => decode_literals(expr),
            FieldValue::List(items) => {
                for item in items.iter_mut() {
                    *item = latex_to_unicode(item);
                }
            }
        }
    }
    entry
}

fn decode_literals(expr: &mut StringExpr) {
    match expr {
        StringExpr::Literal(text) => *text = latex_to_unicode(text),
        StringExpr::Ref(_) => {}
        StringExpr::Concat(parts) => parts.iter_mut().for_each(decode_literals),
    }
}

/// Rewrite a single-hyphen page range as `--`
pub fn page_double_hyphen(mut entry: BibEntry) -> BibEntry {
    if let Some(FieldValue::Text(pages)) = entry.fields.get("pages") {
        if !pages.contains("--") {
            if let Some(caps) = PAGE_RANGE.captures(pages) {
                let rewritten = format!("{}--{}", &caps[1], &caps[2]);
                entry.set("pages", rewritten);
            }
        }
    }
    entry
}

/// Split `author` and `editor` into name lists
pub fn split_name_fields(mut entry: BibEntry) -> BibEntry {
    for field in ["author", "editor"] {
        if let Some(FieldValue::Text(value)) = entry.fields.get(field) {
            let names = split_names(value);
            entry.set(field, FieldValue::List(names));
        }
    }
    entry
}

/// Split `keywords` on `,` or `;`
pub fn split_keywords(mut entry: BibEntry) -> BibEntry {
    if let Some(FieldValue::Text(value)) = entry.fields.get("keywords") {
        let keywords: Vec<String> = value
            .split([',', ';'])
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        entry.set("keywords", FieldValue::List(keywords));
    }
    entry
}

/// Apply a chain of customizations in order
pub fn customize(entry: BibEntry, chain: &[Customization]) -> BibEntry {
    chain.iter().fold(entry, |acc, step| step(acc))
}
