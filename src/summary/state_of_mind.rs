//! State-of-mind summaries

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::metadata::{long_date, title_case, ImportMetadata, MemoryContent};
use crate::model::dates::flexible;
use crate::model::StateOfMindEntry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateOfMindSummary {
    pub id: String,
    pub kind: String,
    #[serde(with = "flexible")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "flexible")]
    pub end: DateTime<FixedOffset>,
    pub valence: f64,
    pub valence_classification: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associations: Vec<Value>,

    /// No duration and no presence flags for mood entries
    pub import_metadata: ImportMetadata,
    pub memory_content: MemoryContent,
}

impl StateOfMindSummary {
    pub fn build(entry: &StateOfMindEntry) -> Self {
        let mut summary = Self {
            id: entry.id.clone(),
            kind: entry.kind.clone(),
            start: entry.start,
            end: entry.end,
            valence: entry.valence,
            valence_classification: entry.valence_classification.clone(),
            labels: entry.labels.clone(),
            associations: entry.associations.clone(),
            import_metadata: ImportMetadata::at(&entry.start),
            memory_content: MemoryContent::default(),
        };

        summary.memory_content = MemoryContent {
            title: summary.title(),
            summary: format!(
                "{} mood recorded as {} (valence: {:.2})",
                summary.kind.replace('_', " "),
                summary.valence_classification,
                summary.valence
            ),
            markdown: summary.markdown(),
        };

        summary
    }

    fn title(&self) -> String {
        format!("{} - {}", title_case(&self.kind), long_date(&self.start))
    }

    fn markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", self.title()));
        md.push_str(&format!("**Time:** {}\n\n", self.start.format("%H:%M:%S")));

        md.push_str("## Classification\n");
        md.push_str(&format!("- **Valence:** {:.3}\n", self.valence));
        md.push_str(&format!(
            "- **Classification:** {}\n\n",
            self.valence_classification
        ));

        push_list_section(&mut md, "Labels", &self.labels);
        push_list_section(&mut md, "Associations", &self.associations);

        md.push_str("---\n");
        md.push_str(&format!("*Source: Apple Health (ID: {})*\n", self.id));

        md
    }
}

fn push_list_section(md: &mut String, heading: &str, items: &[Value]) {
    if items.is_empty() {
        return;
    }

    md.push_str(&format!("## {}\n", heading));
    for item in items {
        md.push_str(&format!("- {}\n", plain(item)));
    }
    md.push('\n');
}

/// Strings without their JSON quotes, anything else as compact JSON
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::TimeOfDay;
    use serde_json::json;

    fn entry(labels: Value, associations: Value) -> StateOfMindEntry {
        serde_json::from_value(json!({
            "id": "S-7",
            "kind": "daily_mood",
            "start": "2025-11-12 21:15:00 -0500",
            "end": "2025-11-12 21:15:00 -0500",
            "valence": 0.4567,
            "valenceClassification": "slightly pleasant",
            "labels": labels,
            "associations": associations
        }))
        .unwrap()
    }

    #[test]
    fn test_import_metadata_has_no_duration() {
        let summary = StateOfMindSummary::build(&entry(json!([]), json!([])));
        let meta = &summary.import_metadata;

        assert_eq!(meta.duration_minutes, 0.0);
        assert!(!meta.has_heart_rate && !meta.has_steps && !meta.has_recovery);
        assert_eq!(meta.time_of_day, TimeOfDay::Night);
        assert_eq!(meta.date, "2025-11-12");
    }

    #[test]
    fn test_title_and_summary() {
        let content = StateOfMindSummary::build(&entry(json!([]), json!([]))).memory_content;

        assert_eq!(content.title, "Daily Mood - November 12, 2025");
        assert_eq!(
            content.summary,
            "daily mood mood recorded as slightly pleasant (valence: 0.46)"
        );
    }

    #[test]
    fn test_markdown_with_lists() {
        let summary = StateOfMindSummary::build(&entry(json!(["calm", "grateful"]), json!(["family"])));
        let md = &summary.memory_content.markdown;

        assert!(md.starts_with("# Daily Mood - November 12, 2025\n\n**Time:** 21:15:00\n\n"));
        assert!(md.contains("- **Valence:** 0.457\n- **Classification:** slightly pleasant\n\n"));
        assert!(md.contains("## Labels\n- calm\n- grateful\n\n"));
        assert!(md.contains("## Associations\n- family\n\n"));
        assert!(md.ends_with("*Source: Apple Health (ID: S-7)*\n"));
    }

    #[test]
    fn test_empty_lists_are_omitted() {
        let summary = StateOfMindSummary::build(&entry(json!([]), json!([])));
        assert!(!summary.memory_content.markdown.contains("## Labels"));
        assert!(!summary.memory_content.markdown.contains("## Associations"));

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("labels").is_none());
        assert_eq!(json["valenceClassification"], "slightly pleasant");
    }
}
