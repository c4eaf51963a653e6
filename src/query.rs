//! Query builder: turns a [`SearchRequest`] into OpenAlex request parameters.
//!
//! Pure and total. Filter syntax follows the OpenAlex `filter=` grammar:
//! comma-joined `field:value` clauses, `|` for alternatives.

use crate::model::{AccessPolicy, SearchRequest, SortCriterion};

/// Results per page in normal operation
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Results per page in debug mode
pub const DEBUG_PER_PAGE: u32 = 20;

/// Page size of the degraded retry request
pub const MINIMAL_PER_PAGE: u32 = 10;

/// Provider parameters derived from a search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    pub search: String,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub per_page: u32,
    pub mailto: String,
}

impl ProviderQuery {
    /// Build the provider query for `request`
    pub fn build(request: &SearchRequest, mailto: &str, debug: bool) -> Self {
        Self {
            search: request.keywords.clone(),
            filter: build_filter(request),
            sort: build_sort(request),
            per_page: if debug { DEBUG_PER_PAGE } else { DEFAULT_PER_PAGE },
            mailto: mailto.to_string(),
        }
    }

    /// Full parameter set for one page
    pub fn page_params(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("search", self.search.clone()),
            ("per_page", self.per_page.to_string()),
            ("mailto", self.mailto.clone()),
        ];
        if let Some(sort) = &self.sort {
            params.push(("sort", sort.clone()));
        }
        if let Some(filter) = &self.filter {
            params.push(("filter", filter.clone()));
        }
        params.push(("page", page.to_string()));
        params
    }

    /// Reduced parameter set used for the single retry after a provider error
    pub fn minimal_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("search", self.search.clone()),
            ("per_page", MINIMAL_PER_PAGE.to_string()),
            ("mailto", self.mailto.clone()),
        ]
    }
}

/// Filter expression, or `None` when the request has no restrictions
pub fn build_filter(request: &SearchRequest) -> Option<String> {
    let mut filters = Vec::new();

    match (request.start_year, request.end_year) {
        (Some(start), Some(end)) => filters.push(format!("publication_year:{}-{}", start, end)),
        (Some(start), None) => filters.push(format!("publication_year:>{}", start - 1)),
        (None, Some(end)) => filters.push(format!("publication_year:<{}", end + 1)),
        (None, None) => {}
    }

    if !request.document_types.is_empty() {
        filters.push(format!("type:{}", request.document_types.join("|")));
    }

    match request.access {
        AccessPolicy::Any => {}
        AccessPolicy::OpenOnly => filters.push("is_oa:true".to_string()),
        AccessPolicy::PaidOnly => filters.push("is_oa:false".to_string()),
    }

    if filters.is_empty() {
        None
    } else {
        Some(filters.join(","))
    }
}

/// Sort expression for the active criteria, primary first
pub fn build_sort(request: &SearchRequest) -> Option<String> {
    let keys: Vec<&str> = request.sort.criteria().map(sort_key).collect();
    if keys.is_empty() {
        None
    } else {
        Some(keys.join(","))
    }
}

/// Provider sort key for a criterion
pub fn sort_key(criterion: SortCriterion) -> &'static str {
    match criterion {
        SortCriterion::Recency => "publication_date:desc",
        SortCriterion::Relevance => "relevance_score:desc",
        SortCriterion::CitationCount => "cited_by_count:desc",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_filter_variants() {
        let both = SearchRequest::new("x").with_years(Some(2020), Some(2023));
        assert_eq!(build_filter(&both).as_deref(), Some("publication_year:2020-2023"));

        let start = SearchRequest::new("x").with_years(Some(2020), None);
        assert_eq!(build_filter(&start).as_deref(), Some("publication_year:>2019"));

        let end = SearchRequest::new("x").with_years(None, Some(2023));
        assert_eq!(build_filter(&end).as_deref(), Some("publication_year:<2024"));

        assert_eq!(build_filter(&SearchRequest::new("x")), None);
    }

    #[test]
    fn test_combined_filter() {
        let req = SearchRequest::new("x")
            .with_years(Some(2018), Some(2024))
            .with_document_types(["article", "book-chapter"])
            .with_access(AccessPolicy::PaidOnly);
        assert_eq!(
            build_filter(&req).as_deref(),
            Some("publication_year:2018-2024,type:article|book-chapter,is_oa:false")
        );
    }

    #[test]
    fn test_access_filter() {
        let open = SearchRequest::new("x").with_access(AccessPolicy::OpenOnly);
        assert_eq!(build_filter(&open).as_deref(), Some("is_oa:true"));
        let any = SearchRequest::new("x").with_access(AccessPolicy::Any);
        assert_eq!(build_filter(&any), None);
    }

    #[test]
    fn test_sort_expression() {
        let single = SearchRequest::new("x").with_sort(SortCriterion::Relevance, None);
        assert_eq!(build_sort(&single).as_deref(), Some("relevance_score:desc"));

        let double = SearchRequest::new("x")
            .with_sort(SortCriterion::Recency, Some(SortCriterion::CitationCount));
        assert_eq!(
            build_sort(&double).as_deref(),
            Some("publication_date:desc,cited_by_count:desc")
        );
    }

    #[test]
    fn test_page_and_minimal_params() {
        let req = SearchRequest::new("graph neural networks")
            .with_access(AccessPolicy::OpenOnly);
        let query = ProviderQuery::build(&req, "me@example.org", false);

        let params = query.page_params(3);
        assert!(params.contains(&("page", "3".to_string())));
        assert!(params.contains(&("per_page", "100".to_string())));
        assert!(params.contains(&("filter", "is_oa:true".to_string())));
        assert!(params.contains(&("mailto", "me@example.org".to_string())));

        let minimal = query.minimal_params();
        assert_eq!(minimal.len(), 3);
        assert!(minimal.contains(&("per_page", "10".to_string())));
        assert!(!minimal.iter().any(|(k, _)| *k == "page" || *k == "filter"));
    }

    #[test]
    fn test_debug_page_size() {
        let query = ProviderQuery::build(&SearchRequest::new("x"), "a@b.c", true);
        assert_eq!(query.per_page, DEBUG_PER_PAGE);
    }
}
