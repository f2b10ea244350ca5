//! Format-specific text extraction for uploaded documents.
//!
//! One routine per format, no shared logic. Binary formats whose decoding
//! lives outside this service (PDF, DOCX, spreadsheets, audio, video) are
//! recognized but reported as requiring an external converter.

use std::path::Path;

use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file format: `.{extension}`")]
    UnsupportedFormat { extension: String },
    #[error("`.{extension}` extraction requires an external converter")]
    ConverterRequired { extension: String },
    #[error("{format} extraction error: {message}")]
    Failed {
        format: &'static str,
        message: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Formats that need a converter this service does not embed.
const CONVERTER_FORMATS: [&str; 12] = [
    "pdf", "docx", "xlsx", "xls", "pptx", "ppt", "mp3", "wav", "m4a", "mp4", "mov", "avi",
];

/// Extract plain text from the file at `path`, dispatching on its extension.
pub async fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "txt" => extract_from_txt(path).await,
        "md" => extract_from_markdown(path).await,
        "csv" => extract_from_csv(path).await,
        "json" => extract_from_json(path).await,
        "html" | "htm" => extract_from_html(path).await,
        other if CONVERTER_FORMATS.contains(&other) => Err(ExtractError::ConverterRequired {
            extension: other.to_string(),
        }),
        other => Err(ExtractError::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}

async fn extract_from_txt(path: &Path) -> Result<String, ExtractError> {
    Ok(fs::read_to_string(path).await?)
}

/// Strip markdown syntax down to its text content.
async fn extract_from_markdown(path: &Path) -> Result<String, ExtractError> {
    let raw = fs::read_to_string(path).await?;
    let mut text = String::with_capacity(raw.len());

    for line in raw.lines() {
        let stripped = line
            .trim_start_matches(['#', '>'])
            .trim_start_matches("- ")
            .trim_start_matches("* ")
            .trim();
        let cleaned: String = stripped
            .chars()
            .filter(|ch| !matches!(ch, '*' | '_' | '`'))
            .collect();
        if !cleaned.is_empty() {
            text.push_str(&cleaned);
            text.push('\n');
        }
    }

    Ok(text)
}

/// Render CSV rows as a header line followed by pipe-joined rows.
async fn extract_from_csv(path: &Path) -> Result<String, ExtractError> {
    let raw = fs::read_to_string(path).await?;
    let mut lines = raw.lines();

    let headers = lines.next().ok_or_else(|| ExtractError::Failed {
        format: "csv",
        message: "file has no header row".to_string(),
    })?;
    let header_cells: Vec<&str> = headers.split(',').map(str::trim).collect();

    let mut text = format!("Headers: {}", header_cells.join(", "));
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        text.push('\n');
        text.push_str(&cells.join(" | "));
    }

    Ok(text)
}

async fn extract_from_json(path: &Path) -> Result<String, ExtractError> {
    let raw = fs::read_to_string(path).await?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|err| ExtractError::Failed {
            format: "json",
            message: err.to_string(),
        })?;
    serde_json::to_string_pretty(&value).map_err(|err| ExtractError::Failed {
        format: "json",
        message: err.to_string(),
    })
}

/// Drop tags and scripts, keeping visible text one block per line.
async fn extract_from_html(path: &Path) -> Result<String, ExtractError> {
    let raw = fs::read_to_string(path).await?;
    let mut text = String::with_capacity(raw.len() / 2);
    let mut inside_tag = false;
    let mut skip_until: Option<&str> = None;
    let mut rest = raw.as_str();

    while !rest.is_empty() {
        if let Some(closer) = skip_until {
            match rest.to_ascii_lowercase().find(closer) {
                Some(at) => {
                    rest = &rest[at + closer.len()..];
                    skip_until = None;
                }
                None => break,
            }
            continue;
        }

        let mut chars = rest.char_indices();
        let Some((index, ch)) = chars.next() else {
            break;
        };

        match ch {
            '<' => {
                let lowered = rest.to_ascii_lowercase();
                if lowered.starts_with("<script") {
                    skip_until = Some("</script>");
                } else if lowered.starts_with("<style") {
                    skip_until = Some("</style>");
                } else {
                    inside_tag = true;
                }
                rest = &rest[index + ch.len_utf8()..];
            }
            '>' if inside_tag => {
                inside_tag = false;
                if !text.ends_with('\n') && !text.is_empty() {
                    text.push('\n');
                }
                rest = &rest[index + ch.len_utf8()..];
            }
            _ => {
                if !inside_tag {
                    text.push(ch);
                }
                rest = &rest[index + ch.len_utf8()..];
            }
        }
    }

    let cleaned: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    Ok(cleaned.join("\n"))
}
