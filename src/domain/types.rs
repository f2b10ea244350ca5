//! Shared domain enumerations aligned with persisted database enums.

use serde::{Deserialize, Serialize};

/// Publishing destinations supported by the pipeline (mirrors Postgres enum `platform`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "platform", rename_all = "snake_case")]
pub enum Platform {
    Linkedin,
    Instagram,
    Facebook,
    Twitter,
    Wordpress,
    Youtube,
    Tiktok,
}

pub const ALL_PLATFORMS: [Platform; 7] = [
    Platform::Linkedin,
    Platform::Instagram,
    Platform::Facebook,
    Platform::Twitter,
    Platform::Wordpress,
    Platform::Youtube,
    Platform::Tiktok,
];

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Linkedin => "linkedin",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::Wordpress => "wordpress",
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
        }
    }

    /// Maximum number of words a post may carry on this platform.
    pub fn word_limit(self) -> usize {
        match self {
            Platform::Twitter => 280,
            Platform::Instagram => 400,
            Platform::Linkedin => 600,
            Platform::Facebook => 1000,
            Platform::Wordpress => 2000,
            Platform::Youtube => 2000,
            Platform::Tiktok => 400,
        }
    }
}

impl TryFrom<&str> for Platform {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "linkedin" => Ok(Platform::Linkedin),
            "instagram" => Ok(Platform::Instagram),
            "facebook" => Ok(Platform::Facebook),
            "twitter" => Ok(Platform::Twitter),
            "wordpress" => Ok(Platform::Wordpress),
            "youtube" => Ok(Platform::Youtube),
            "tiktok" => Ok(Platform::Tiktok),
            _ => Err(()),
        }
    }
}

/// Lifecycle of a persisted content row (mirrors Postgres enum `content_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "content_status", rename_all = "snake_case")]
pub enum ContentStatus {
    Pending,
    Uploaded,
}

impl ContentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentStatus::Pending => "pending",
            ContentStatus::Uploaded => "uploaded",
        }
    }
}

/// The seven canonical day names in their canonical capitalization.
pub const CANONICAL_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Resolve a day label to its canonical capitalization, case-insensitively.
pub fn canonical_day(label: &str) -> Option<&'static str> {
    let trimmed = label.trim();
    CANONICAL_DAYS
        .iter()
        .find(|day| day.eq_ignore_ascii_case(trimmed))
        .copied()
}

/// Zero-based position of a canonical day within the week.
pub fn day_index(label: &str) -> Option<usize> {
    CANONICAL_DAYS
        .iter()
        .position(|day| day.eq_ignore_ascii_case(label.trim()))
}
