//! Tests for the auth module

use super::*;
use crate::error::ErrorKind;
use crate::types::AuthType;
use base64::Engine;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn refresh_config(token_url: String) -> AuthConfig {
    AuthConfig::Oauth2Refresh {
        token_url,
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        refresh_token: "my-refresh-token".to_string(),
        access_token: None,
        expires_at: None,
    }
}

#[tokio::test]
async fn test_no_auth() {
    let auth = Authenticator::new(AuthConfig::None);
    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api");

    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert!(built.headers().get("Authorization").is_none());
}

#[tokio::test]
async fn test_api_key_header_with_prefix() {
    let auth = Authenticator::new(AuthConfig::ApiKey {
        location: Location::Header,
        name: "Authorization".to_string(),
        prefix: Some("Token token=".to_string()),
        value: "my-token".to_string(),
    });

    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api");
    let built = auth.apply(req).await.unwrap().build().unwrap();

    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Token token=my-token"
    );
}

#[tokio::test]
async fn test_api_key_query() {
    let auth = Authenticator::new(AuthConfig::ApiKey {
        location: Location::Query,
        name: "apikey".to_string(),
        prefix: None,
        value: "secret123".to_string(),
    });

    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api?page=2");
    let built = auth.apply(req).await.unwrap().build().unwrap();

    let query = built.url().query().unwrap();
    assert!(query.contains("apikey=secret123"));
    assert!(query.contains("page=2"));
}

#[tokio::test]
async fn test_basic_auth() {
    let auth = Authenticator::new(AuthConfig::Basic {
        username: "user".to_string(),
        password: "pass".to_string(),
    });

    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api");
    let built = auth.apply(req).await.unwrap().build().unwrap();

    let auth_header = built
        .headers()
        .get("Authorization")
        .unwrap()
        .to_str()
        .unwrap();
    let encoded = auth_header.strip_prefix("Basic ").unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), "user:pass");
}

#[tokio::test]
async fn test_oauth2_client_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=my-client"))
        .and(body_string_contains("scope=read+write"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "oauth-token-123",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(AuthConfig::Oauth2ClientCredentials {
        token_url: format!("{}/oauth/token", mock_server.uri()),
        client_id: "my-client".to_string(),
        client_secret: "my-secret".to_string(),
        scopes: vec!["read".to_string(), "write".to_string()],
    });

    let client = reqwest::Client::new();
    for _ in 0..3 {
        let req = client.get("https://example.com/api");
        let built = auth.apply(req).await.unwrap().build().unwrap();
        assert_eq!(
            built.headers().get("Authorization").unwrap(),
            "Bearer oauth-token-123"
        );
    }
}

#[tokio::test]
async fn test_oauth2_refresh_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=my-refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "refreshed-token",
            "expires_in": 3600
        })))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(refresh_config(format!(
        "{}/oauth/token",
        mock_server.uri()
    )));

    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api");
    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Bearer refreshed-token"
    );
}

#[tokio::test]
async fn test_oauth2_seeded_access_token_skips_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(AuthConfig::Oauth2Refresh {
        token_url: format!("{}/oauth/token", mock_server.uri()),
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        refresh_token: "r".to_string(),
        access_token: Some("still-valid".to_string()),
        expires_at: Some(chrono::Utc::now() + chrono::Duration::hours(1)),
    });

    let client = reqwest::Client::new();
    let built = auth
        .apply(client.get("https://example.com/api"))
        .await
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Bearer still-valid"
    );
}

#[tokio::test]
async fn test_oauth2_rotated_refresh_token_is_used() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("refresh_token=my-refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "first",
            "expires_in": 0,
            "refresh_token": "rotated"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("refresh_token=rotated"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "second",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(refresh_config(format!(
        "{}/oauth/token",
        mock_server.uri()
    )));
    let client = reqwest::Client::new();

    let first = auth
        .apply(client.get("https://example.com/api"))
        .await
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(first.headers().get("Authorization").unwrap(), "Bearer first");

    let second = auth
        .apply(client.get("https://example.com/api"))
        .await
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(
        second.headers().get("Authorization").unwrap(),
        "Bearer second"
    );
}

#[tokio::test]
async fn test_clear_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "token",
            "expires_in": 3600
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(AuthConfig::Oauth2ClientCredentials {
        token_url: format!("{}/oauth/token", mock_server.uri()),
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        scopes: vec![],
    });

    let client = reqwest::Client::new();
    let _ = auth.apply(client.get("https://example.com/api")).await.unwrap();
    auth.clear_cache().await;
    let _ = auth.apply(client.get("https://example.com/api")).await.unwrap();
}

#[tokio::test]
async fn test_oauth2_error_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "invalid_grant"
        })))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(refresh_config(format!(
        "{}/oauth/token",
        mock_server.uri()
    )));

    let client = reqwest::Client::new();
    let err = auth
        .apply(client.get("https://example.com/api"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(err.to_string().contains("401"));
}

#[test]
fn test_credentials_deserialize() {
    let creds: Credentials = serde_yaml::from_str(
        r#"
type: api_key
name: Authorization
prefix: "Bearer "
value: sk_test
"#,
    )
    .unwrap();
    assert_eq!(creds.auth_type(), AuthType::ApiKey);
    assert!(matches!(
        creds,
        Credentials::ApiKey { location: Location::Header, ref value, .. } if value == "sk_test"
    ));
}

#[test]
fn test_credentials_validate() {
    let creds = Credentials::Bearer {
        token: "  ".to_string(),
    };
    let err = creds.validate().unwrap_err();
    assert!(err.to_string().contains("credentials.token"));

    assert!(Credentials::None.validate().is_ok());
}

#[tokio::test]
async fn test_client_builder_builds_authenticated_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(wiremock::matchers::header("x-api-key", "k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = ClientBuilder::new()
        .api_key_header("X-API-Key", None, "k")
        .build()
        .unwrap();
    assert_eq!(client.auth_type(), AuthType::ApiKey);

    let response = client
        .json()
        .get(&format!("{}/me", mock_server.uri()))
        .await
        .unwrap();
    assert!(response.body_required().unwrap()["ok"].as_bool().unwrap());
}
