// Strict parse/normalize boundary for server payloads.
//
// The service has shipped more than one shape for job records over time;
// everything is accepted as optional here and `normalize` decides what is
// actually required. Unknown fields are dropped by serde, never propagated.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use joblens_common::{JobPosting, Location, LocationKind, SyncError};

#[derive(Debug, Clone, Deserialize)]
pub struct RawLocation {
    #[serde(rename = "type")]
    pub kind: Option<LocationKind>,
    #[serde(default)]
    pub location_string: Option<String>,
}

/// Job record as the server sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawJob {
    #[serde(default, alias = "id")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub locations: Vec<RawLocation>,
    /// Legacy single free-text location from older payload revisions.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_pinned: bool,
}

/// Validate a raw record into a `JobPosting`.
///
/// `job_id`, `title`, `company` and `posted_at` are required; a record missing
/// any of them is a `Validation` error rather than a partial object. Location
/// entries without a `type` are dropped. If the structured list is empty but
/// the legacy `location` string is present, it becomes a single onsite entry.
pub fn normalize(raw: RawJob) -> Result<JobPosting, SyncError> {
    let id = required(raw.job_id, "job_id")?;
    let title = required(raw.title, "title")?;
    let company = required(raw.company, "company")?;
    let posted_at = raw
        .posted_at
        .ok_or_else(|| SyncError::Validation("job record missing posted_at".to_string()))?;

    let mut locations: Vec<Location> = raw
        .locations
        .into_iter()
        .filter_map(|loc| {
            loc.kind.map(|kind| Location {
                kind,
                text: loc.location_string.unwrap_or_default(),
            })
        })
        .collect();
    if locations.is_empty() {
        if let Some(text) = raw.location.filter(|t| !t.is_empty()) {
            locations.push(Location {
                kind: LocationKind::Onsite,
                text,
            });
        }
    }

    Ok(JobPosting {
        id,
        title,
        company,
        locations,
        description: raw.description.unwrap_or_default(),
        posted_at,
        is_pinned: raw.is_pinned,
    })
}

fn required(value: Option<String>, field: &str) -> Result<String, SyncError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SyncError::Validation(format!(
            "job record missing {field}"
        ))),
    }
}
