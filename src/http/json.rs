//! JSON layer over [`HttpClient`]

use super::client::{HttpClient, HttpResponse, RequestBody, RequestConfig};
use crate::codec::encode_form;
use crate::error::{Error, Result};
use crate::jsonquery::JsonQuery;
use crate::types::{JsonValue, Method};
use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::OnceLock;

/// Response whose body is parsed as JSON on first access
#[derive(Debug)]
pub struct JsonHttpResponse {
    pub code: u16,
    pub headers: HeaderMap,
    pub bytes: Bytes,
    parsed: OnceLock<std::result::Result<Option<JsonValue>, String>>,
}

impl JsonHttpResponse {
    /// Build from raw parts
    pub fn new(code: u16, headers: HeaderMap, bytes: Bytes) -> Self {
        Self {
            code,
            headers,
            bytes,
            parsed: OnceLock::new(),
        }
    }

    /// Parsed body, `None` for an empty body
    pub fn body(&self) -> Result<Option<&JsonValue>> {
        let parsed = self.parsed.get_or_init(|| {
            if self.bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(None);
            }
            serde_json::from_slice(&self.bytes)
                .map(Some)
                .map_err(|e| e.to_string())
        });
        match parsed {
            Ok(body) => Ok(body.as_ref()),
            Err(message) => Err(Error::unmarshal(message.clone())),
        }
    }

    /// Parsed body, failing when the response was empty
    pub fn body_required(&self) -> Result<&JsonValue> {
        self.body()?.ok_or(Error::EmptyJsonHttpResponse)
    }

    /// Query view over the required body
    pub fn query(&self) -> Result<JsonQuery<'_>> {
        Ok(JsonQuery::new(self.body_required()?))
    }

    /// Deserialize the body into a typed value
    pub fn unmarshal<T: DeserializeOwned>(&self) -> Result<T> {
        let body = self.body_required()?;
        T::deserialize(body).map_err(|e| Error::unmarshal(e.to_string()))
    }

    /// Header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        StatusCode::from_u16(self.code).is_ok_and(|s| s.is_success())
    }
}

impl From<HttpResponse> for JsonHttpResponse {
    fn from(response: HttpResponse) -> Self {
        Self::new(response.code(), response.headers, response.body)
    }
}

/// HTTP client that speaks JSON
#[derive(Debug, Clone)]
pub struct JsonHttpClient {
    http: HttpClient,
    content_type: String,
}

impl JsonHttpClient {
    /// Wrap a client; bodies are sent as `application/json`
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            content_type: "application/json".to_string(),
        }
    }

    /// Override the request content type (e.g. `application/vnd.api+json`)
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// The underlying transport client
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub async fn get(&self, url: &str) -> Result<JsonHttpResponse> {
        self.send(Method::GET, url, None, &[]).await
    }

    /// GET with per-call headers
    pub async fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<JsonHttpResponse> {
        self.send(Method::GET, url, None, headers).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<JsonHttpResponse> {
        self.send(Method::POST, url, Some(serde_json::to_value(body)?), &[])
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<JsonHttpResponse> {
        self.send(Method::PUT, url, Some(serde_json::to_value(body)?), &[])
            .await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<JsonHttpResponse> {
        self.send(Method::PATCH, url, Some(serde_json::to_value(body)?), &[])
            .await
    }

    pub async fn delete(&self, url: &str) -> Result<JsonHttpResponse> {
        self.send(Method::DELETE, url, None, &[]).await
    }

    /// POST a JSON object encoded as a form body
    pub async fn post_form(&self, url: &str, body: &JsonValue) -> Result<JsonHttpResponse> {
        self.send_form(Method::POST, url, body).await
    }

    /// Send a JSON object encoded as a form body with any method
    pub async fn send_form(
        &self,
        method: Method,
        url: &str,
        body: &JsonValue,
    ) -> Result<JsonHttpResponse> {
        let config = RequestConfig::new().form(encode_form(body)?);
        let response = self.http.request(method, url, config).await?;
        Ok(response.into())
    }

    /// Send a request with an optional JSON body and extra headers
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<JsonValue>,
        headers: &[(&str, &str)],
    ) -> Result<JsonHttpResponse> {
        let mut config = RequestConfig::new();
        for (key, value) in headers {
            config = config.header(*key, *value);
        }
        if let Some(body) = body {
            if !headers
                .iter()
                .any(|(k, _)| k.eq_ignore_ascii_case(CONTENT_TYPE.as_str()))
            {
                config = config.header(CONTENT_TYPE.as_str(), self.content_type.as_str());
            }
            config.body = Some(RequestBody::Json(body));
        }

        let response = self.http.request(method, url, config).await?;
        Ok(response.into())
    }
}
