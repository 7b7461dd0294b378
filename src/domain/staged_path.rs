use std::fmt;

use chrono::{DateTime, Utc};

/// Location of a staged upload inside the temporary store. Names are
/// collision-resistant: millisecond timestamp plus the sanitized original
/// filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPath(String);

impl StagedPath {
    pub fn new(original_filename: &str, now: DateTime<Utc>) -> Self {
        Self(format!(
            "{}_{}",
            now.timestamp_millis(),
            sanitize_filename(original_filename)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StagedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip path components and collapse whitespace so client-supplied names
/// cannot escape the staging directory.
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .replace("..", "");

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| *c != '\0')
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
