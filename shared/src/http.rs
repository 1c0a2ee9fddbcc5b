//! API Gateway proxy envelopes.
//!
//! Both REST API (v1) and HTTP API (v2) proxy payloads are accepted. Only the
//! fields the webhook needs are modelled.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::models::ErrorBody;
use crate::{Error, Result};

/// API Gateway proxy request (simplified)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayRequest {
    /// REST API (v1) method
    pub http_method: Option<String>,
    pub request_context: Option<RequestContext>,
    pub headers: Option<HashMap<String, String>>,
    pub multi_value_headers: Option<HashMap<String, Vec<String>>>,
    pub body: Option<String>,
    pub is_base64_encoded: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RequestContext {
    pub http: Option<HttpContext>,
}

/// HTTP API (v2) request details
#[derive(Debug, Default, Deserialize)]
pub struct HttpContext {
    pub method: Option<String>,
}

impl ApiGatewayRequest {
    /// HTTP method, upper-cased.
    pub fn method(&self) -> Result<String> {
        self.http_method
            .as_deref()
            .or_else(|| {
                self.request_context
                    .as_ref()
                    .and_then(|ctx| ctx.http.as_ref())
                    .and_then(|http| http.method.as_deref())
            })
            .filter(|m| !m.trim().is_empty())
            .map(|m| m.trim().to_ascii_uppercase())
            .ok_or_else(|| Error::MalformedRequest("HTTP method not found in event".to_string()))
    }

    /// Case-insensitive header lookup, falling back to multi-value headers.
    pub fn header(&self, name: &str) -> Option<&str> {
        let single = self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        });

        single.or_else(|| {
            self.multi_value_headers.as_ref().and_then(|headers| {
                headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .and_then(|(_, values)| values.first())
                    .map(String::as_str)
            })
        })
    }

    /// Raw body bytes, base64-decoded when API Gateway flagged it.
    pub fn body_bytes(&self) -> Result<Vec<u8>> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| Error::MalformedPayload("Request body is missing".to_string()))?;

        if self.is_base64_encoded.unwrap_or(false) {
            STANDARD
                .decode(body)
                .map_err(|e| Error::MalformedPayload(format!("Invalid base64 body: {}", e)))
        } else {
            Ok(body.as_bytes().to_vec())
        }
    }
}

/// API Gateway proxy response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ApiGatewayResponse {
    pub fn new(status_code: u16, body: &str, content_type: &str) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        Self {
            status_code,
            headers,
            body: body.to_string(),
            is_base64_encoded: false,
        }
    }

    pub fn json<T: Serialize>(status_code: u16, data: &T) -> serde_json::Result<Self> {
        let body = serde_json::to_string(data)?;
        Ok(Self::new(status_code, &body, "application/json"))
    }

    /// Render an error as `{"error": "..."}` with its mapped status.
    pub fn from_error(err: &Error) -> Self {
        let body = ErrorBody {
            error: err.public_message(),
        };
        let body = serde_json::to_string(&body)
            .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());
        Self::new(err.status_code(), &body, "application/json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> ApiGatewayRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_method_from_rest_api_event() {
        let req = request(r#"{"httpMethod": "get"}"#);
        assert_eq!(req.method().unwrap(), "GET");
    }

    #[test]
    fn test_method_from_http_api_event() {
        let req = request(r#"{"requestContext": {"http": {"method": "POST"}}}"#);
        assert_eq!(req.method().unwrap(), "POST");
    }

    #[test]
    fn test_missing_method() {
        let req = request(r#"{"requestContext": {}}"#);
        assert!(matches!(req.method(), Err(Error::MalformedRequest(_))));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = request(r#"{"headers": {"x-okta-verification-challenge": "abc"}}"#);
        assert_eq!(req.header("X-Okta-Verification-Challenge"), Some("abc"));
    }

    #[test]
    fn test_header_falls_back_to_multi_value() {
        let req = request(
            r#"{"multiValueHeaders": {"X-Okta-Verification-Challenge": ["first", "second"]}}"#,
        );
        assert_eq!(req.header("x-okta-verification-challenge"), Some("first"));
    }

    #[test]
    fn test_base64_body() {
        let req = request(r#"{"body": "eyJhIjoxfQ==", "isBase64Encoded": true}"#);
        assert_eq!(req.body_bytes().unwrap(), br#"{"a":1}"#.to_vec());
    }

    #[test]
    fn test_missing_body() {
        let req = request(r#"{"httpMethod": "POST"}"#);
        assert!(matches!(req.body_bytes(), Err(Error::MalformedPayload(_))));
    }

    #[test]
    fn test_error_response_shape() {
        let resp = ApiGatewayResponse::from_error(&Error::UnsupportedMethod("PUT".into()));
        assert_eq!(resp.status_code, 405);
        assert_eq!(resp.body, r#"{"error":"Method PUT not allowed"}"#);
        assert_eq!(resp.headers["content-type"], "application/json");
    }
}
