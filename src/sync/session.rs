use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::gateway::Endpoint;
use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::config::{ClientConfig, Credentials};
use crate::error::{Error, Result};

/// An authenticated session: the transport plus the cookie the service
/// handed out at sign-on.
pub struct Session<T> {
    transport: T,
    config: ClientConfig,
    cookie: String,
}

impl<T: Transport> Session<T> {
    /// Sign on and capture the session cookie.
    pub async fn login(transport: T, config: &ClientConfig, credentials: &Credentials) -> Result<Self> {
        let endpoint = Endpoint::SignOn;
        let request = ApiRequest {
            method: endpoint.method(),
            url: config.endpoint_url(endpoint.path()),
            query: vec![
                ("wc".to_string(), "true".to_string()),
                ("remember".to_string(), "true".to_string()),
            ],
            cookie: None,
            body: Some(json!({
                "username": credentials.username,
                "password": credentials.password,
                "remember": true,
            })),
        };
        let resp = transport
            .send(request)
            .await
            .map_err(|source| Error::Transport { endpoint, source })?;

        if !resp.status.is_success() {
            return Err(Error::Auth {
                status: resp.status,
                reason: "sign-on did not succeed".to_string(),
            });
        }

        let cookie = session_cookie(&resp).ok_or_else(|| Error::Auth {
            status: resp.status,
            reason: "no session cookie or token in response".to_string(),
        })?;

        log::info!("Signed on as {}", credentials.username);
        Ok(Self {
            transport,
            config: config.clone(),
            cookie,
        })
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    /// Send an authenticated request and return the body of a successful response.
    pub async fn request(
        &self,
        endpoint: Endpoint,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<String> {
        let request = ApiRequest {
            method: endpoint.method(),
            url: self.config.endpoint_url(endpoint.path()),
            query,
            cookie: Some(self.cookie.clone()),
            body,
        };
        let resp = self
            .transport
            .send(request)
            .await
            .map_err(|source| Error::Transport { endpoint, source })?;

        if !resp.status.is_success() {
            log::warn!("{} returned {}", endpoint, resp.status);
            return Err(Error::Remote {
                endpoint,
                status: resp.status,
            });
        }
        Ok(resp.body)
    }

    pub fn decode<D: DeserializeOwned>(&self, endpoint: Endpoint, body: &str) -> Result<D> {
        serde_json::from_str(body).map_err(|source| Error::Decode { endpoint, source })
    }
}

/// Cookies from `Set-Cookie`, or the body's `token` as the `t` cookie.
fn session_cookie(resp: &ApiResponse) -> Option<String> {
    if !resp.cookies.is_empty() {
        return Some(resp.cookies.join("; "));
    }
    let body: Value = serde_json::from_str(&resp.body).ok()?;
    body.get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(|t| format!("t={}", t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::transport::fake::FakeTransport;
    use reqwest::{Method, StatusCode};

    fn creds() -> Credentials {
        Credentials::new("me@example.com", "secret")
    }

    #[tokio::test]
    async fn login_prefers_set_cookie() {
        let fake = FakeTransport::new();
        fake.respond_full(
            Method::POST,
            "user/signon",
            200,
            vec!["t=abc".into(), "AWSALB=lb".into()],
            r#"{"token": "ignored"}"#.into(),
        );
        let session = Session::login(fake.clone(), &ClientConfig::default(), &creds())
            .await
            .unwrap();
        assert_eq!(session.cookie(), "t=abc; AWSALB=lb");

        let call = &fake.calls()[0];
        assert_eq!(call.body.as_ref().unwrap()["remember"], true);
        assert!(call.cookie.is_none());
    }

    #[tokio::test]
    async fn login_falls_back_to_token() {
        let fake = FakeTransport::new();
        fake.respond(Method::POST, "user/signon", 200, json!({"token": "tok"}));
        let session = Session::login(fake, &ClientConfig::default(), &creds()).await.unwrap();
        assert_eq!(session.cookie(), "t=tok");
    }

    #[tokio::test]
    async fn rejected_login_is_auth_error() {
        let fake = FakeTransport::new();
        fake.respond(Method::POST, "user/signon", 401, json!({"errorCode": "username_password_not_match"}));
        let err = Session::login(fake, &ClientConfig::default(), &creds()).await.err().unwrap();
        assert!(matches!(err, Error::Auth { status: StatusCode::UNAUTHORIZED, .. }));
    }

    #[tokio::test]
    async fn success_without_credential_is_auth_error() {
        let fake = FakeTransport::new();
        fake.respond(Method::POST, "user/signon", 200, json!({}));
        let err = Session::login(fake, &ClientConfig::default(), &creds()).await.err().unwrap();
        assert!(matches!(err, Error::Auth { .. }));
    }

    #[tokio::test]
    async fn requests_carry_cookie_and_map_status() {
        let fake = FakeTransport::new();
        fake.respond(Method::POST, "user/signon", 200, json!({"token": "tok"}));
        fake.respond(Method::GET, "projects", 503, json!({}));
        let session = Session::login(fake.clone(), &ClientConfig::default(), &creds())
            .await
            .unwrap();

        let err = session.request(Endpoint::Lists, Vec::new(), None).await.err().unwrap();
        assert!(matches!(
            err,
            Error::Remote { endpoint: Endpoint::Lists, status: StatusCode::SERVICE_UNAVAILABLE }
        ));
        assert_eq!(fake.calls_to("projects")[0].cookie.as_deref(), Some("t=tok"));
    }

    #[tokio::test]
    async fn missing_response_is_transport_error() {
        let fake = FakeTransport::new();
        fake.respond(Method::POST, "user/signon", 200, json!({"token": "tok"}));
        let session = Session::login(fake, &ClientConfig::default(), &creds()).await.unwrap();
        let err = session.request(Endpoint::BatchCheck, Vec::new(), None).await.err().unwrap();
        assert!(matches!(err, Error::Transport { endpoint: Endpoint::BatchCheck, .. }));
    }
}
