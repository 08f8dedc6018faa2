//! Page-number pagination (`?page=N&page-size=M`).

use serde::Serialize;
use serde_json::Value;

use crate::config::PaginationSettings;
use crate::error::AppError;
use crate::extractors::query::QueryParams;

pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "page-size";

const INVALID_PAGE: &str = "Invalid page.";

/// Metadata block of a paginated payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current: usize,
    pub total: usize,
    pub size: usize,
    pub total_items: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub page: PageInfo,
    pub results: Vec<T>,
}

/// Requested page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: PageNumber,
    size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageNumber {
    Index(usize),
    Last,
}

impl PageRequest {
    /// Reads `page` and `page-size` from the query.
    ///
    /// A page that is not a positive integer (or `last`) is a 404 `Invalid
    /// page.`. An unusable page size falls back to the default; a larger one
    /// is capped at `max_page_size`.
    pub fn from_query(query: &QueryParams, settings: &PaginationSettings) -> Result<Self, AppError> {
        let number = match query.get(PAGE_PARAM) {
            None => PageNumber::Index(1),
            Some("last") => PageNumber::Last,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n >= 1 => PageNumber::Index(n),
                _ => return Err(AppError::not_found(INVALID_PAGE)),
            },
        };

        let size = query
            .get(PAGE_SIZE_PARAM)
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|size| *size > 0)
            .map(|size| size.min(settings.max_page_size))
            .unwrap_or(settings.page_size);

        Ok(Self { number, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Cuts `items` into the requested page and builds the payload
/// `{"page": {...}, "results": [...]}`.
///
/// Links are relative to `path` and keep the other query parameters.
pub fn paginate<T: Serialize>(
    items: Vec<T>,
    request: PageRequest,
    query: &QueryParams,
    path: &str,
) -> Result<Value, AppError> {
    let total_items = items.len();
    // Una lista vacia sigue teniendo una primera pagina
    let total = total_items.div_ceil(request.size).max(1);

    let current = match request.number {
        PageNumber::Index(n) if n <= total => n,
        PageNumber::Index(_) => return Err(AppError::not_found(INVALID_PAGE)),
        PageNumber::Last => total,
    };

    let results: Vec<T> = items
        .into_iter()
        .skip((current - 1) * request.size)
        .take(request.size)
        .collect();

    let next = (current < total).then(|| link(path, query, Some(current + 1)));
    let previous = (current > 1).then(|| {
        let target = current - 1;
        link(path, query, (target > 1).then_some(target))
    });

    let page = Page {
        page: PageInfo {
            current,
            total,
            size: request.size,
            total_items,
            next,
            previous,
        },
        results,
    };

    serde_json::to_value(page).map_err(|e| AppError::Internal(e.to_string()))
}

fn link(path: &str, query: &QueryParams, page: Option<usize>) -> String {
    let params = match page {
        Some(n) => query.clone().with(PAGE_PARAM, n.to_string()),
        None => query.clone().without(PAGE_PARAM),
    };

    if params.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, params.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn settings() -> PaginationSettings {
        PaginationSettings {
            page_size: 2,
            max_page_size: 3,
        }
    }

    fn page(query: &QueryParams, items: Vec<u32>) -> Result<Value, AppError> {
        let request = PageRequest::from_query(query, &settings())?;
        paginate(items, request, query, "/todos")
    }

    #[test]
    fn test_first_page_metadata() {
        let value = page(&QueryParams::new(), vec![1, 2, 3, 4, 5]).unwrap();

        assert_eq!(value["results"], serde_json::json!([1, 2]));
        assert_eq!(value["page"]["current"], 1);
        assert_eq!(value["page"]["total"], 3);
        assert_eq!(value["page"]["size"], 2);
        assert_eq!(value["page"]["total_items"], 5);
        assert_eq!(value["page"]["next"], "/todos?page=2");
        assert!(value["page"]["previous"].is_null());
    }

    #[test]
    fn test_links_keep_filters() {
        let query = QueryParams::new().with("page", "2").with("status", "pending");
        let value = page(&query, vec![1, 2, 3, 4, 5]).unwrap();

        assert_eq!(value["page"]["next"], "/todos?page=3&status=pending");
        assert_eq!(value["page"]["previous"], "/todos?status=pending");
    }

    #[test]
    fn test_last_page() {
        let query = QueryParams::new().with("page", "last");
        let value = page(&query, vec![1, 2, 3, 4, 5]).unwrap();

        assert_eq!(value["results"], serde_json::json!([5]));
        assert!(value["page"]["next"].is_null());
    }

    #[test]
    fn test_page_size_is_capped() {
        let query = QueryParams::new().with("page-size", "50");
        let value = page(&query, (1..=10).collect()).unwrap();
        assert_eq!(value["page"]["size"], 3);

        let bogus = QueryParams::new().with("page-size", "zero");
        assert_eq!(page(&bogus, vec![1]).unwrap()["page"]["size"], 2);
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let value = page(&QueryParams::new(), Vec::new()).unwrap();
        assert_eq!(value["page"]["total"], 1);
        assert_eq!(value["results"], serde_json::json!([]));
    }

    #[test]
    fn test_invalid_page_is_not_found() {
        for raw in ["0", "abc", "9"] {
            let err = page(&QueryParams::new().with("page", raw), vec![1, 2, 3]).unwrap_err();
            assert_eq!(err.status(), StatusCode::NOT_FOUND);
            assert_eq!(err.to_string(), "Invalid page.");
        }
    }
}
