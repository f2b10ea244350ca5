//! Content calendar types shared by the extraction, generation, and
//! persistence layers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::error::DomainError;
use super::types::{ContentStatus, Platform, canonical_day};

/// One piece of generated content within a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// A single week of the content calendar: a week label plus an ordered
/// mapping from canonical day names to content items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyContent {
    pub week: String,
    pub content_by_days: BTreeMap<String, Vec<ContentItem>>,
}

impl WeeklyContent {
    /// Every day label must be one of the seven canonical day names in
    /// canonical capitalization.
    pub fn validate(&self) -> Result<(), DomainError> {
        for day in self.content_by_days.keys() {
            match canonical_day(day) {
                Some(canonical) if canonical == day => {}
                _ => {
                    return Err(DomainError::validation(format!(
                        "invalid day label `{day}` in week `{}`",
                        self.week
                    )));
                }
            }
        }
        Ok(())
    }

    /// Week number parsed from the `"Week <N>"` label, when present.
    pub fn week_number(&self) -> Option<u32> {
        let mut parts = self.week.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some(_), Some(number)) => number.parse().ok(),
            _ => None,
        }
    }
}

/// Parsed form of a `"Week <N> - <Day>[ - Post <M>]"` label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekDayLabel {
    pub week: u32,
    pub day: &'static str,
    pub post: Option<u32>,
}

impl WeekDayLabel {
    pub fn new(week: u32, day: &'static str) -> Self {
        Self {
            week,
            day,
            post: None,
        }
    }

    pub fn with_post(week: u32, day: &'static str, post: u32) -> Self {
        Self {
            week,
            day,
            post: Some(post),
        }
    }

    /// Parse a label, rejecting anything that does not match the format.
    pub fn parse(label: &str) -> Result<Self, DomainError> {
        let mut segments = label.split(" - ");

        let week_segment = segments
            .next()
            .ok_or_else(|| DomainError::validation(format!("empty week_day label `{label}`")))?;
        let week = week_segment
            .strip_prefix("Week ")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .ok_or_else(|| {
                DomainError::validation(format!("malformed week in label `{label}`"))
            })?;

        let day_segment = segments.next().ok_or_else(|| {
            DomainError::validation(format!("missing day in label `{label}`"))
        })?;
        let day = canonical_day(day_segment)
            .ok_or_else(|| DomainError::validation(format!("unknown day in label `{label}`")))?;

        let post = match segments.next() {
            None => None,
            Some(post_segment) => Some(
                post_segment
                    .strip_prefix("Post ")
                    .and_then(|value| value.trim().parse::<u32>().ok())
                    .ok_or_else(|| {
                        DomainError::validation(format!("malformed post index in label `{label}`"))
                    })?,
            ),
        };

        if segments.next().is_some() {
            return Err(DomainError::validation(format!(
                "trailing segments in label `{label}`"
            )));
        }

        Ok(Self { week, day, post })
    }

    pub fn render(&self) -> String {
        match self.post {
            Some(post) => format!("Week {} - {} - Post {}", self.week, self.day, post),
            None => format!("Week {} - {}", self.week, self.day),
        }
    }
}

/// A fully formatted post produced by the pipeline, ready for persistence
/// and for the JSON output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub week_day: String,
    pub title: String,
    pub content: String,
    pub platform: Platform,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub word_count: usize,
    pub char_count: usize,
}

/// A persisted content row.
#[derive(Debug, Clone, Serialize)]
pub struct ContentRecord {
    pub id: i32,
    pub week: i32,
    pub day: String,
    pub title: String,
    pub content: String,
    pub platform: Platform,
    pub status: ContentStatus,
    pub date_upload: Date,
    pub file_name: String,
    pub file_type: String,
}

/// A distinct source file with pending content.
#[derive(Debug, Clone, Serialize)]
pub struct PendingFile {
    pub file_name: String,
    pub date_upload: Date,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_round_trips_without_post_index() {
        let label = WeekDayLabel::parse("Week 3 - Wednesday").expect("valid label");
        assert_eq!(label.week, 3);
        assert_eq!(label.day, "Wednesday");
        assert_eq!(label.post, None);
        assert_eq!(label.render(), "Week 3 - Wednesday");
    }

    #[test]
    fn label_round_trips_with_post_index() {
        let label = WeekDayLabel::parse("Week 1 - Friday - Post 2").expect("valid label");
        assert_eq!(label, WeekDayLabel::with_post(1, "Friday", 2));
        assert_eq!(label.render(), "Week 1 - Friday - Post 2");
    }

    #[test]
    fn label_rejects_malformed_input() {
        assert!(WeekDayLabel::parse("Week x - Monday").is_err());
        assert!(WeekDayLabel::parse("Week 1").is_err());
        assert!(WeekDayLabel::parse("Week 1 - Blursday").is_err());
        assert!(WeekDayLabel::parse("Week 1 - Monday - Post").is_err());
        assert!(WeekDayLabel::parse("Week 1 - Monday - Post 1 - extra").is_err());
    }

    #[test]
    fn weekly_content_validates_day_labels() {
        let mut content_by_days = BTreeMap::new();
        content_by_days.insert("Monday".to_string(), vec![ContentItem::text("hello")]);
        let valid = WeeklyContent {
            week: "Week 1".to_string(),
            content_by_days,
        };
        assert!(valid.validate().is_ok());

        let mut content_by_days = BTreeMap::new();
        content_by_days.insert("monday".to_string(), vec![ContentItem::text("hello")]);
        let lowercase = WeeklyContent {
            week: "Week 1".to_string(),
            content_by_days,
        };
        assert!(lowercase.validate().is_err());
    }

    #[test]
    fn week_number_parses_from_label() {
        let content = WeeklyContent {
            week: "Week 4".to_string(),
            content_by_days: BTreeMap::new(),
        };
        assert_eq!(content.week_number(), Some(4));

        let unlabelled = WeeklyContent {
            week: "Weekly".to_string(),
            content_by_days: BTreeMap::new(),
        };
        assert_eq!(unlabelled.week_number(), None);
    }
}
