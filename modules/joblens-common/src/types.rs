use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Job postings ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Remote,
    Hybrid,
    Onsite,
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationKind::Remote => write!(f, "remote"),
            LocationKind::Hybrid => write!(f, "hybrid"),
            LocationKind::Onsite => write!(f, "onsite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub kind: LocationKind,
    pub text: String,
}

/// A single job posting as held in the result list. Identity is `id`; two
/// postings with the same id are the same logical record regardless of other
/// field drift between refetches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub locations: Vec<Location>,
    pub description: String,
    pub posted_at: DateTime<Utc>,
    pub is_pinned: bool,
}

// --- Filters ---

/// User-editable filter values. Two instances exist at runtime: the raw one
/// mutated on every keystroke and the stabilized one produced by debouncing.
/// Only the stabilized instance ever reaches the query builder.
///
/// `categories` is a `BTreeSet` so the multi-value query parameter comes out
/// in a deterministic order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub title: String,
    pub company: String,
    pub search: String,
    pub categories: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.company.is_empty()
            && self.search.is_empty()
            && self.categories.is_empty()
    }
}

// --- Queries ---

/// Request descriptor for one list fetch: stabilized filters plus pagination.
/// Built by `joblens_sync::query::build_query`; identical inputs always yield
/// an equal descriptor, which is what lets callers detect a no-op requery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub title: Option<String>,
    pub company: Option<String>,
    pub search: Option<String>,
    pub categories: Vec<String>,
    pub cursor: Option<String>,
    pub page_size: u32,
}

impl ListQuery {
    /// Serialize to wire query parameters. Unset fields produce no parameter
    /// at all — an empty `title=` would over-constrain the remote query.
    /// Categories go out as a repeated `locations` parameter.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", self.page_size.to_string())];
        if let Some(title) = &self.title {
            params.push(("title", title.clone()));
        }
        if let Some(company) = &self.company {
            params.push(("company", company.clone()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        for category in &self.categories {
            params.push(("locations", category.clone()));
        }
        if let Some(cursor) = &self.cursor {
            params.push(("last_doc_id", cursor.clone()));
        }
        params
    }
}

// --- Mutations ---

/// The write actions a user can apply to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Pin,
    Unpin,
    HideJob,
    HideCompany,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationKind::Pin => write!(f, "pin"),
            MutationKind::Unpin => write!(f, "unpin"),
            MutationKind::HideJob => write!(f, "hide_job"),
            MutationKind::HideCompany => write!(f, "hide_company"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_query_fields_emit_no_params() {
        let query = ListQuery {
            title: None,
            company: None,
            search: None,
            categories: Vec::new(),
            cursor: None,
            page_size: 20,
        };
        assert_eq!(query.params(), vec![("limit", "20".to_string())]);
    }

    #[test]
    fn categories_emit_repeated_locations_param() {
        let query = ListQuery {
            title: Some("Engineer".to_string()),
            company: None,
            search: None,
            categories: vec!["hybrid".to_string(), "remote".to_string()],
            cursor: Some("job-19".to_string()),
            page_size: 20,
        };
        let params = query.params();
        assert_eq!(
            params,
            vec![
                ("limit", "20".to_string()),
                ("title", "Engineer".to_string()),
                ("locations", "hybrid".to_string()),
                ("locations", "remote".to_string()),
                ("last_doc_id", "job-19".to_string()),
            ]
        );
    }
}
