//! Shared JSON response envelope.
//!
//! Every endpoint answers with `{ success, data?, message? }`; list endpoints
//! add `count`, and paged ones add `total`/`page`/`pages`. The SPA relies on
//! this shape, so handlers build responses through these types only.

use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

/// The basic `{ success, data?, message? }` envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 envelope carrying a payload.
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }

    /// 201 envelope carrying a freshly created payload.
    pub fn created(data: T) -> (StatusCode, Json<Self>) {
        (
            StatusCode::CREATED,
            Json(Self {
                success: true,
                data: Some(data),
                message: None,
            }),
        )
    }
}

impl ApiResponse<()> {
    /// Success envelope with only a human-readable message.
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: Some(message.into()),
        })
    }

    /// Failure envelope; paired with a status code by the error type.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Envelope for unpaged collections: adds `count`.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn ok(data: Vec<T>) -> Json<Self> {
        Json(Self {
            success: true,
            count: data.len(),
            data,
        })
    }
}

/// Envelope for paged collections: adds `total` and the derived page count.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub success: bool,
    pub count: usize,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
    pub data: Vec<T>,
}

impl<T: Serialize> PageResponse<T> {
    pub fn ok(data: Vec<T>, total: u64, page: u32, limit: u32) -> Json<Self> {
        Json(Self {
            success: true,
            count: data.len(),
            total,
            page,
            pages: page_count(total, limit),
            data,
        })
    }
}

/// Number of pages needed for `total` rows at `limit` rows per page.
#[must_use]
pub fn page_count(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_absent_fields() {
        let Json(body) = ApiResponse::ok(42);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 42 }));

        let Json(body) = ApiResponse::message("done");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": true, "message": "done" })
        );
    }

    #[test]
    fn test_failure_envelope_shape() {
        let body = ApiResponse::failure("nope");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "message": "nope" })
        );
    }

    #[test]
    fn test_list_response_counts_items() {
        let Json(body) = ListResponse::ok(vec!["a", "b"]);
        assert_eq!(body.count, 2);
        assert!(body.success);
    }

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(page_count(0, 20), 0);
        assert_eq!(page_count(1, 20), 1);
        assert_eq!(page_count(20, 20), 1);
        assert_eq!(page_count(21, 20), 2);
        assert_eq!(page_count(5, 0), 0);
    }

    #[test]
    fn test_page_response_derives_pages() {
        let Json(body) = PageResponse::ok(vec![1, 2, 3], 43, 2, 20);
        assert_eq!(body.count, 3);
        assert_eq!(body.total, 43);
        assert_eq!(body.page, 2);
        assert_eq!(body.pages, 3);
    }
}
