//! Summary extraction from results files.
//!
//! A summary is stored either as a JSON result with a `summary` field (what
//! `sumbench summarize` writes) or as a markdown/text file in which the summary
//! sits between two section markers.

use std::path::Path;

use crate::error::ExtractError;
use crate::model::SummaryMarkers;

/// Return the text between `start_marker` and the following `end_marker`.
///
/// Without a start marker the whole content is the summary. A missing end
/// marker extends the summary to the end of the content.
pub fn extract_summary(content: &str, start_marker: &str, end_marker: &str) -> String {
    let Some(start) = content.find(start_marker) else {
        return content.trim().to_string();
    };
    let rest = &content[start + start_marker.len()..];
    let body = if end_marker.is_empty() {
        rest
    } else {
        rest.find(end_marker).map_or(rest, |end| &rest[..end])
    };
    body.trim().to_string()
}

/// Load a summary from a `.json` result or a marker-delimited text file.
pub fn load_summary(path: &Path, markers: &SummaryMarkers) -> Result<String, ExtractError> {
    let content = std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| ExtractError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        return value
            .get("summary")
            .and_then(|s| s.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ExtractError::MissingSummary(path.to_path_buf()));
    }

    Ok(extract_summary(&content, &markers.start, &markers.end))
}
