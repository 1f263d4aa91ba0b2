use joblens_common::{FilterCriteria, ListQuery};

/// Turn a stabilized filter snapshot plus pagination into a request
/// descriptor. Empty text fields are omitted entirely rather than sent as
/// empty strings. Same inputs always produce an equal descriptor, which is
/// how callers detect a no-op requery.
pub fn build_query(
    filters: &FilterCriteria,
    cursor: Option<String>,
    page_size: u32,
) -> ListQuery {
    ListQuery {
        title: non_empty(&filters.title),
        company: non_empty(&filters.company),
        search: non_empty(&filters.search),
        categories: filters.categories.iter().cloned().collect(),
        cursor,
        page_size,
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    #[test]
    fn empty_fields_are_omitted() {
        let query = build_query(&FilterCriteria::default(), None, 20);
        assert_eq!(query.title, None);
        assert_eq!(query.company, None);
        assert_eq!(query.search, None);
        assert!(query.categories.is_empty());
        assert_eq!(query.page_size, 20);
    }

    #[test]
    fn same_inputs_build_the_same_descriptor() {
        let filters = FilterCriteria {
            title: "Engineer".to_string(),
            company: String::new(),
            search: "rust".to_string(),
            categories: BTreeSet::from(["remote".to_string(), "hybrid".to_string()]),
        };
        let a = build_query(&filters, Some("job-19".to_string()), 20);
        let b = build_query(&filters, Some("job-19".to_string()), 20);
        assert_eq!(a, b);
        assert_eq!(a.title.as_deref(), Some("Engineer"));
        assert_eq!(a.company, None);
        // BTreeSet ordering keeps the multi-value parameter deterministic.
        assert_eq!(a.categories, vec!["hybrid".to_string(), "remote".to_string()]);
    }
}
