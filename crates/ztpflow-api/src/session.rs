// Authenticated session against the Catalyst Center REST surface.
//
// Wraps `reqwest::Client` with token lifecycle management (lazy renewal
// behind a mutex), retry/backoff for idempotent requests, and JSON
// response handling. Endpoint modules (pnp, sites, templates, tasks)
// are implemented as inherent methods via separate files to keep this
// module focused on transport mechanics.

use std::time::{Duration, Instant};

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Renew the token this long before its actual expiry so in-flight
/// requests never race the controller-side cutoff.
const TOKEN_SAFETY_MARGIN: Duration = Duration::from_secs(30);

/// Catalyst Center tokens live for one hour.
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

const TOKEN_PATH: &str = "dna/system/api/v1/auth/token";

/// Username/password pair for the token exchange.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Retry policy for idempotent requests and the token exchange.
///
/// Transient failures (timeouts, connection errors, 5xx) are retried
/// with exponential backoff. Non-idempotent requests are never retried
/// automatically -- the caller decides.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before retry number `attempt` (0-based), doubling
    /// each time and capped at `max_delay`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// A bearer token plus the bookkeeping needed to renew it on time.
struct TokenState {
    token: String,
    issued_at: Instant,
    ttl: Duration,
}

impl TokenState {
    fn expires_within(&self, margin: Duration) -> bool {
        self.issued_at.elapsed() + margin >= self.ttl
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    #[serde(rename = "Token")]
    token: String,
}

/// Authenticated HTTP session for a Catalyst Center controller.
///
/// Owns the token exclusively: callers never see an expired-token error
/// on the happy path because every request lazily renews the token when
/// it is within [`TOKEN_SAFETY_MARGIN`] of expiry. The renewal runs
/// under a mutex so concurrent requests that discover expiry
/// simultaneously refresh at most once.
pub struct ControllerSession {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    token: Mutex<Option<TokenState>>,
    token_ttl: Duration,
    retry: RetryPolicy,
}

impl ControllerSession {
    /// Create a session from a controller base URL and credentials.
    ///
    /// Does not contact the controller; the first request (or an
    /// explicit [`authenticate`](Self::authenticate)) performs the
    /// token exchange.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
            credentials,
            token: Mutex::new(None),
            token_ttl: DEFAULT_TOKEN_TTL,
            retry: RetryPolicy::default(),
        })
    }

    /// Override the retry policy (defaults to 3 attempts, 500ms base).
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the assumed token lifetime.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Token lifecycle ──────────────────────────────────────────────

    /// Exchange credentials for a fresh bearer token and cache it.
    ///
    /// `POST /dna/system/api/v1/auth/token` with HTTP Basic auth.
    /// Fails with [`Error::Authentication`] on HTTP 401/403, or on
    /// network failure once retries are exhausted.
    pub async fn authenticate(&self) -> Result<(), Error> {
        let mut guard = self.token.lock().await;
        let token = self.fetch_token().await?;
        *guard = Some(TokenState {
            token,
            issued_at: Instant::now(),
            ttl: self.token_ttl,
        });
        debug!("authenticated with controller");
        Ok(())
    }

    /// Return a valid token, renewing it first if expired or about to
    /// expire. The lock is held across renewal so racing callers see
    /// the fresh token instead of renewing again.
    async fn current_token(&self) -> Result<String, Error> {
        let mut guard = self.token.lock().await;
        if let Some(state) = guard.as_ref() {
            if !state.expires_within(TOKEN_SAFETY_MARGIN) {
                return Ok(state.token.clone());
            }
            trace!("token expired or expiring soon, renewing");
        }
        let token = self.fetch_token().await?;
        *guard = Some(TokenState {
            token: token.clone(),
            issued_at: Instant::now(),
            ttl: self.token_ttl,
        });
        Ok(token)
    }

    /// Drop the cached token so the next request re-authenticates.
    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// Perform the raw token exchange, retrying transient failures.
    async fn fetch_token(&self) -> Result<String, Error> {
        let url = self.base_url.join(TOKEN_PATH)?;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(attempt, "requesting auth token");

            let result = self
                .http
                .post(url.clone())
                .basic_auth(
                    &self.credentials.username,
                    Some(self.credentials.password.expose_secret()),
                )
                .send()
                .await;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(Error::Authentication {
                            message: format!("token exchange rejected (HTTP {status}): {body}"),
                        });
                    }
                    if status.is_server_error() {
                        if attempt < self.retry.max_attempts {
                            let delay = self.retry.delay(attempt - 1);
                            warn!(%status, ?delay, "token endpoint error, backing off");
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        return Err(Error::Authentication {
                            message: format!(
                                "token endpoint failing (HTTP {status}) after {attempt} attempts"
                            ),
                        });
                    }
                    if !status.is_success() {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(Error::Api {
                            status: status.as_u16(),
                            body,
                        });
                    }
                    let body = resp.text().await.map_err(Error::Transport)?;
                    let parsed: TokenResponse = parse_json(&body)?;
                    return Ok(parsed.token);
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    if attempt < self.retry.max_attempts {
                        let delay = self.retry.delay(attempt - 1);
                        warn!(error = %e, ?delay, "token exchange failed, backing off");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(Error::Authentication {
                        message: format!("controller unreachable after {attempt} attempts: {e}"),
                    });
                }
                Err(e) => return Err(Error::Transport(e)),
            }
        }
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated GET and parse the JSON response.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        self.execute(Method::GET, url, None::<&serde_json::Value>, true)
            .await
    }

    /// GET with query parameters.
    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let mut url = self.api_url(path)?;
        for (key, value) in params {
            url.query_pairs_mut().append_pair(key, value);
        }
        self.execute(Method::GET, url, None::<&serde_json::Value>, true)
            .await
    }

    /// Send an authenticated POST with a JSON body.
    ///
    /// Never retried on transient failure -- claiming a device twice is
    /// worse than reporting one failed claim.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        self.execute(Method::POST, url, Some(body), false).await
    }

    /// Send an authenticated PUT with a JSON body. Not retried.
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        self.execute(Method::PUT, url, Some(body), false).await
    }

    /// Core request loop: token injection, one re-authentication on a
    /// server-side 401, and (for idempotent requests) transient-failure
    /// retry with exponential backoff.
    async fn execute<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        idempotent: bool,
    ) -> Result<T, Error> {
        let mut attempt: u32 = 0;
        let mut reauthenticated = false;

        loop {
            attempt += 1;
            let token = self.current_token().await?;

            debug!(%method, %url, attempt, "sending request");

            let mut builder = self
                .http
                .request(method.clone(), url.clone())
                .header("X-Auth-Token", &token);
            if let Some(body) = body {
                builder = builder.json(body);
            }

            match builder.send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        // The controller may revoke tokens before our
                        // computed expiry. Re-authenticate once, then
                        // retry the original request.
                        if !reauthenticated {
                            warn!("token rejected by controller, re-authenticating");
                            self.invalidate_token().await;
                            reauthenticated = true;
                            attempt -= 1;
                            continue;
                        }
                        return Err(Error::Authentication {
                            message: "token rejected after re-authentication".into(),
                        });
                    }

                    if status.is_server_error() {
                        let body_text = resp.text().await.unwrap_or_default();
                        if idempotent && attempt < self.retry.max_attempts {
                            let delay = self.retry.delay(attempt - 1);
                            warn!(%status, ?delay, "server error, backing off");
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        if idempotent {
                            return Err(Error::ControllerUnavailable {
                                attempts: attempt,
                                last_error: format!("HTTP {status}: {body_text}"),
                            });
                        }
                        return Err(Error::Api {
                            status: status.as_u16(),
                            body: body_text,
                        });
                    }

                    if !status.is_success() {
                        let body_text = resp.text().await.unwrap_or_default();
                        return Err(Error::Api {
                            status: status.as_u16(),
                            body: body_text,
                        });
                    }

                    let body_text = resp.text().await.map_err(Error::Transport)?;
                    return parse_json(&body_text);
                }
                Err(e) if idempotent && (e.is_timeout() || e.is_connect()) => {
                    if attempt < self.retry.max_attempts {
                        let delay = self.retry.delay(attempt - 1);
                        warn!(error = %e, ?delay, "transient failure, backing off");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(Error::ControllerUnavailable {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => return Err(Error::Transport(e)),
            }
        }
    }

    /// Join an intent API path onto the base URL.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(Error::InvalidUrl)
    }
}

/// Force a trailing slash so relative joins keep the full base path.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Deserialize with a truncated body preview in the error.
fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview = &body[..body.len().min(200)];
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}
