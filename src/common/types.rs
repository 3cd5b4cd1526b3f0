use serde::{Deserialize, Serialize};

/// Which filter of the cascade settled a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStage {
    Title,
    Author,
    Year,
}

impl MatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStage::Title => "title",
            MatchStage::Author => "author",
            MatchStage::Year => "year",
        }
    }
}

impl std::fmt::Display for MatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final disposition of one input record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Matched,
    Unmatched,
    Error,
}

/// One line of the JSONL match report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub id: String,
    pub outcome: Outcome,
    pub matched_id: Option<String>,
    pub stage: Option<MatchStage>,
    pub reason: Option<String>,
}

/// Statistics from the clean command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub total_records: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub malformed_year: usize,
    pub write_failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serialization() {
        let report = MatchReport {
            id: "my-key".to_string(),
            outcome: Outcome::Matched,
            matched_id: Some("vaswani2017attention".to_string()),
            stage: Some(MatchStage::Title),
            reason: None,
        };
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"id":"my-key","outcome":"matched","matched_id":"vaswani2017attention","stage":"title","reason":null}"#
        );
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(MatchStage::Year.to_string(), "year");
    }
}
