//! HTTP implementation of the backend contracts.
//!
//! ```text
//! POST {base}/reorder-items          { itemType, orderedIds, parentId } -> {} | { error }
//! GET  {base}/base-classes/{id}      -> course with paths
//! GET  {base}/paths/{id}/lessons     -> [lesson]
//! GET  {base}/lessons/{id}/sections  -> [section]
//! ```
use super::api::{ApiError, CatalogApi, ErrorBody, ReorderApi, ReorderRequest};
use crate::model::{CourseOutline, Lesson, NodeId, Section};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = concat!("course-studio/", env!("CARGO_PKG_VERSION"));

pub struct HttpBackend {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if status == 404 {
            return Err(ApiError::NotFound(path.to_string()));
        }
        if !(200..300).contains(&status) {
            return Err(status_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

/// Builds the error for a non-success status, preferring the backend's own
/// `error` message over the raw body.
fn status_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string());
    ApiError::Status { status, message }
}

/// Interprets the reply to a reorder request.
///
/// Success requires a 2xx status *and* a JSON object body; anything else is
/// a failure.
pub fn interpret_reorder_response(status: u16, body: &str) -> Result<(), ApiError> {
    if !(200..300).contains(&status) {
        return Err(status_error(status, body));
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(_)) => Ok(()),
        Ok(other) => Err(ApiError::MalformedResponse(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(ApiError::MalformedResponse(e.to_string())),
    }
}

#[async_trait]
impl ReorderApi for HttpBackend {
    #[instrument(skip(self, request), fields(item_type = %request.item_type, parent_id = %request.parent_id))]
    async fn reorder_items(&self, request: &ReorderRequest) -> Result<(), ApiError> {
        debug!(?request, "POST reorder-items");
        let response = self
            .http_client
            .post(self.url("reorder-items"))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let result = interpret_reorder_response(status, &body);
        if let Err(e) = &result {
            warn!(status, error = %e, "Reorder rejected");
        }
        result
    }
}

#[async_trait]
impl CatalogApi for HttpBackend {
    #[instrument(skip(self))]
    async fn load_course(&self, course_id: &NodeId) -> Result<CourseOutline, ApiError> {
        self.get_json(&format!("base-classes/{course_id}")).await
    }

    #[instrument(skip(self))]
    async fn fetch_lessons(&self, path_id: &NodeId) -> Result<Vec<Lesson>, ApiError> {
        self.get_json(&format!("paths/{path_id}/lessons")).await
    }

    #[instrument(skip(self))]
    async fn fetch_sections(&self, lesson_id: &NodeId) -> Result<Vec<Section>, ApiError> {
        self.get_json(&format!("lessons/{lesson_id}/sections")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListKey;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_success_requires_json_object() {
        assert_eq!(interpret_reorder_response(200, "{}"), Ok(()));
        assert!(matches!(
            interpret_reorder_response(200, "not json"),
            Err(ApiError::MalformedResponse(_))
        ));
        assert!(matches!(
            interpret_reorder_response(200, "[]"),
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_error_body_message_is_surfaced() {
        assert_eq!(
            interpret_reorder_response(500, r#"{"error":"db unavailable"}"#),
            Err(ApiError::Status {
                status: 500,
                message: "db unavailable".to_string()
            })
        );
        assert_eq!(
            interpret_reorder_response(403, "forbidden\n"),
            Err(ApiError::Status {
                status: 403,
                message: "forbidden".to_string()
            })
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:3000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            backend.url("reorder-items"),
            "http://localhost:3000/api/reorder-items"
        );
    }

    // ── Transport (mock server) ──────────────────────────────────────

    fn backend_for(server: &MockServer) -> HttpBackend {
        HttpBackend::new(format!("{}/api/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_reorder_posts_camel_case_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reorder-items"))
            .and(body_json(json!({
                "itemType": "lesson",
                "orderedIds": ["l2", "l1"],
                "parentId": "p1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let request = ReorderRequest::new(&ListKey::lessons("p1"), vec!["l2".into(), "l1".into()]);
        assert_eq!(backend_for(&server).reorder_items(&request).await, Ok(()));
    }

    #[tokio::test]
    async fn test_reorder_rejection_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reorder-items"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "error": "db unavailable" })),
            )
            .mount(&server)
            .await;

        let request = ReorderRequest::new(&ListKey::paths("c1"), vec!["p1".into()]);
        assert_eq!(
            backend_for(&server).reorder_items(&request).await,
            Err(ApiError::Status {
                status: 500,
                message: "db unavailable".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_reorder_success_without_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reorder-items"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&server)
            .await;

        let request = ReorderRequest::new(&ListKey::paths("c1"), vec!["p1".into()]);
        assert!(matches!(
            backend_for(&server).reorder_items(&request).await,
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_catalog_routes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/base-classes/c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "c1",
                "name": "Algebra",
                "paths": [
                    { "id": "p1", "title": "Numbers", "order_index": 0 },
                    { "id": "p2", "title": "Equations", "order_index": 1 }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/paths/p1/lessons"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "l1", "title": "Counting", "order_index": 0 }
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/lessons/l1/sections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "s1", "title": "Intro", "content": { "blocks": [] }, "order_index": 0 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend_for(&server);

        let outline = backend.load_course(&"c1".into()).await.unwrap();
        assert_eq!(outline.course.name, "Algebra");
        assert_eq!(outline.paths.len(), 2);
        assert_eq!(outline.paths[1].order_index, 1);

        let lessons = backend.fetch_lessons(&"p1".into()).await.unwrap();
        assert_eq!(lessons[0].title, "Counting");

        let sections = backend.fetch_sections(&"l1".into()).await.unwrap();
        assert_eq!(sections[0].content, json!({ "blocks": [] }));
    }

    #[tokio::test]
    async fn test_missing_parent_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/paths/missing/lessons"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "no such path" })))
            .mount(&server)
            .await;

        assert_eq!(
            backend_for(&server).fetch_lessons(&"missing".into()).await,
            Err(ApiError::NotFound("paths/missing/lessons".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unparseable_list_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/lessons/l1/sections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sections": [] })))
            .mount(&server)
            .await;

        assert!(matches!(
            backend_for(&server).fetch_sections(&"l1".into()).await,
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_relative_base_url_is_rejected() {
        assert!(matches!(
            HttpBackend::new("/api", Duration::from_secs(1)),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }
}
