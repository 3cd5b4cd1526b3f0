pub mod venue;

pub use venue::*;

use crate::bibtex::BibEntry;

/// Fields removed from every entry in concise mode
pub const VERBOSE_FIELDS: [&str; 8] = [
    "abstract",
    "annote",
    "file",
    "keywords",
    "language",
    "timestamp",
    "biburl",
    "bibsource",
];

/// Set `publisher` from the venue lookup and strip verbose fields
pub fn apply_concise(mut entry: BibEntry, lookup: &dyn VenueLookup, removed: &[&str]) -> BibEntry {
    if let Some(publisher) = lookup.publisher_for(&entry) {
        entry.set("publisher", publisher);
    }
    for field in removed {
        entry.remove(field);
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPublisher;

    impl VenueLookup for FixedPublisher {
        fn publisher_for(&self, _entry: &BibEntry) -> Option<String> {
            Some("Fixed Press".to_string())
        }
    }

    #[test]
    fn test_concise_overwrites_publisher_and_removes_fields() {
        let entry = BibEntry::new("inproceedings", "k")
            .with_field("publisher", "Old Press")
            .with_field("abstract", "Long text")
            .with_field("keywords", "a, b")
            .with_field("title", "Kept");

        let entry = apply_concise(entry, &FixedPublisher, &VERBOSE_FIELDS);
        assert_eq!(entry.text("publisher").as_deref(), Some("Fixed Press"));
        assert!(entry.get("abstract").is_none());
        assert!(entry.get("keywords").is_none());
        assert_eq!(entry.text("title").as_deref(), Some("Kept"));
    }

    #[test]
    fn test_unknown_venue_keeps_existing_publisher() {
        let entry = BibEntry::new("inproceedings", "k")
            .with_field("booktitle", "Workshop on Things")
            .with_field("publisher", "Old Press");
        let entry = apply_concise(entry, &VenueTable::default(), &VERBOSE_FIELDS);
        assert_eq!(entry.text("publisher").as_deref(), Some("Old Press"));
    }
}
