use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::config::ClientConfig;
use shared::{Error, Result};
use shared_http::api::{ApiEnvelope, ErrorResponse, LoginRequest, LoginResponse};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cookie the server stores the CSRF token in
pub const CSRF_COOKIE: &str = "csrfToken";
/// Header the CSRF token is echoed back in
pub const CSRF_HEADER: &str = "X-CSRF-Token";

const REFRESH_PATH: &[&str] = &["auth", "refresh-token"];

/// A refresh-token exchange awaited by every request that hit `401` meanwhile
type RefreshFlight = Shared<BoxFuture<'static, Result<()>>>;

/// Authenticated REST client shared by every API binding.
///
/// Session cookies live in one jar for the lifetime of the client. Every
/// request echoes the `csrfToken` cookie in `X-CSRF-Token`. A `401` triggers
/// a single refresh-token call and one replay of the original request; if that
/// does not help the session is over and `Error::SessionExpired` is returned.
/// Requests rejected while a refresh is running wait for that refresh instead
/// of starting their own.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    cookies: Arc<Jar>,
    base_url: Url,
    refreshing: Arc<Mutex<Option<RefreshFlight>>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        // A trailing slash keeps Url::join/path_segments_mut from dropping the last segment
        let base_url = Url::parse(&format!("{}/", config.api_base_url.trim_end_matches('/')))
            .map_err(|e| Error::Config(format!("invalid api base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "api base url cannot be a base: {base_url}"
            )));
        }

        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            cookies,
            base_url,
            refreshing: Arc::new(Mutex::new(None)),
        })
    }

    /// Build an endpoint url from raw path segments; each segment is percent-encoded.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.url(segments))
    }

    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.execute(self.request(Method::GET, segments)).await
    }

    pub async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::POST, segments).json(body))
            .await
    }

    /// Current CSRF token from the cookie jar, if the server has issued one.
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.cookies.cookies(&self.base_url)?;
        let cookies = header.to_str().ok()?;
        cookies
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == CSRF_COOKIE)
            .map(|(_, value)| value.to_string())
    }

    /// Send a request, refreshing the session once on `401`.
    pub async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let replay = request.try_clone();
        let response = self.dispatch(request).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        let Some(replay) = replay else {
            warn!("Unauthorized response for a request that cannot be replayed");
            return Err(Error::Unauthorized);
        };

        if let Err(e) = self.refresh().await {
            warn!("Session refresh failed: {e}");
            return Err(Error::SessionExpired);
        }

        let response = self.dispatch(replay).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Request still unauthorized after refresh");
            return Err(Error::SessionExpired);
        }
        decode(response).await
    }

    /// Exchange the refresh cookie for a new access cookie, joining the
    /// exchange already in flight if there is one.
    pub async fn refresh(&self) -> Result<()> {
        let flight = {
            let mut refreshing = self.refreshing.lock();
            match refreshing.as_ref() {
                Some(flight) => flight.clone(),
                None => {
                    info!("Access expired, refreshing session");
                    let request = self.with_csrf(self.request(Method::POST, REFRESH_PATH));
                    let flight = async move { acknowledge(send(request).await?).await }
                        .boxed()
                        .shared();
                    *refreshing = Some(flight.clone());
                    flight
                }
            }
        };

        let outcome = flight.clone().await;

        let mut refreshing = self.refreshing.lock();
        if refreshing
            .as_ref()
            .is_some_and(|current| current.ptr_eq(&flight))
        {
            *refreshing = None;
        }
        outcome
    }

    fn with_csrf(&self, request: RequestBuilder) -> RequestBuilder {
        match self.csrf_token() {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        }
    }

    async fn dispatch(&self, request: RequestBuilder) -> Result<Response> {
        send(self.with_csrf(request)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .dispatch(self.request(Method::POST, &["auth", "login"]).json(&payload))
            .await?;
        let viewer: LoginResponse = decode(response).await.inspect_err(|_| {
            warn!("Login failed for: {email}");
        })?;
        info!("Signed in as {}", viewer.username);
        Ok(viewer)
    }

    pub async fn logout(&self) -> Result<()> {
        let response = self
            .dispatch(self.request(Method::POST, &["auth", "logout"]))
            .await?;
        acknowledge(response).await?;
        info!("Signed out");
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await.map_err(|e| {
        warn!("Request failed: {e}");
        Error::Transport(e.to_string())
    })?;
    debug!("{} {}", response.status(), response.url().path());
    Ok(response)
}

/// Map a response to its envelope payload or to the matching error.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(status_error(status, &body));
    }

    let envelope: ApiEnvelope<T> = serde_json::from_slice(&body)?;
    envelope
        .into_result()
        .map_err(|e| Error::Api { message: e.message })
}

/// Like `decode` for endpoints that answer without a payload.
async fn acknowledge(response: Response) -> Result<()> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(status_error(status, &body));
    }

    match serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(&body) {
        Ok(envelope) if !envelope.success => Err(Error::Api {
            message: envelope
                .message
                .unwrap_or_else(|| "Request failed".to_string()),
        }),
        _ => Ok(()),
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> Error {
    if status == StatusCode::UNAUTHORIZED {
        return Error::Unauthorized;
    }
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(error) => Error::Api {
            message: error.message,
        },
        Err(_) => Error::Status {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("unknown").to_string(),
        },
    }
}
