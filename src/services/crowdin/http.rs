use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::{CrowdinError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            bearer: None,
            body: Some(body),
        }
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx answer into `CrowdinError::Http`.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let body = String::from_utf8_lossy(&self.body);
        Err(CrowdinError::Http {
            status: self.status,
            message: extract_error_message(&body),
        })
    }

    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body)
            .map_err(|e| CrowdinError::InvalidResponse(format!("invalid JSON: {e}")))
    }
}

/// Blocking HTTP seam; the client never talks to `reqwest` directly.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("lingo-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CrowdinError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        };

        let resp = builder
            .send()
            .map_err(|e| CrowdinError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .map_err(|e| CrowdinError::Transport(e.to_string()))?
            .to_vec();

        Ok(HttpResponse { status, body })
    }
}

fn extract_error_message(body_text: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        // { "error": { "message": "..." } }
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        // validation errors: { "errors": [ { "error": { "errors": [ { "message": "..." } ] } } ] }
        if let Some(msg) = v
            .get("errors")
            .and_then(|e| e.get(0))
            .and_then(|e| e.get("error"))
            .and_then(|e| e.get("errors"))
            .and_then(|e| e.get(0))
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        // OAuth: { "error": "invalid_grant", "error_description": "..." }
        if let Some(msg) = v.get("error_description").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }

    let trimmed = body_text.trim();
    if trimmed.len() > 400 {
        let mut end = 400;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    fn message_of(resp: HttpResponse) -> String {
        match resp.error_for_status() {
            Err(CrowdinError::Http { message, .. }) => message,
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[test]
    fn success_passes_through() {
        assert!(response(204, "").error_for_status().is_ok());
    }

    #[test]
    fn api_error_message_is_extracted() {
        let msg = message_of(response(
            401,
            r#"{"error":{"code":401,"message":"Unauthorized"}}"#,
        ));
        assert_eq!(msg, "Unauthorized");
    }

    #[test]
    fn validation_error_message_is_extracted() {
        let msg = message_of(response(
            400,
            r#"{"errors":[{"error":{"key":"limit","errors":[{"code":"x","message":"Limit too big"}]}}]}"#,
        ));
        assert_eq!(msg, "Limit too big");
    }

    #[test]
    fn oauth_error_description_is_extracted() {
        let msg = message_of(response(
            400,
            r#"{"error":"invalid_grant","error_description":"Code expired"}"#,
        ));
        assert_eq!(msg, "Code expired");
    }

    #[test]
    fn non_json_body_is_truncated() {
        let body = "x".repeat(1000);
        let msg = message_of(response(502, &body));
        assert_eq!(msg.len(), 403);
        assert!(msg.ends_with("..."));
    }
}
