//! Request body extraction.
//!
//! `AppJson` wraps axum's JSON extractor so malformed bodies come back in
//! the same error envelope every other failure uses, instead of axum's
//! plain-text rejections.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;

pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(describe_rejection(&rejection)))?;
        Ok(Self(value))
    }
}

fn describe_rejection(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonDataError(e) => {
            format!("Request body does not match the expected shape: {}", e)
        }
        JsonRejection::JsonSyntaxError(e) => format!("Request body is not valid JSON: {}", e),
        JsonRejection::MissingJsonContentType(_) => {
            "Request must be sent as application/json".to_string()
        }
        _ => "Unable to read the request body".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Router};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Deserialize)]
    struct Payload {
        name: String,
    }

    async fn accept(AppJson(payload): AppJson<Payload>) -> String {
        payload.name
    }

    fn server() -> TestServer {
        TestServer::new(Router::new().route("/echo", post(accept))).unwrap()
    }

    #[tokio::test]
    async fn well_formed_bodies_pass_through() {
        let response = server().post("/echo").json(&json!({"name": "Budi"})).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "Budi");
    }

    #[tokio::test]
    async fn syntax_errors_come_back_in_the_standard_envelope() {
        let response = server()
            .post("/echo")
            .add_header("content-type", "application/json")
            .bytes("{not json".into())
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Request body is not valid JSON"));
    }

    #[tokio::test]
    async fn shape_mismatches_are_bad_requests() {
        let response = server().post("/echo").json(&json!({"nom": "Budi"})).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Request body does not match the expected shape"));
    }

    #[tokio::test]
    async fn missing_content_type_is_reported() {
        let response = server()
            .post("/echo")
            .bytes(r#"{"name": "Budi"}"#.into())
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "Request must be sent as application/json");
    }
}
