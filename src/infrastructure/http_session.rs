//! Authenticated Moodle session over reqwest.
//!
//! Each worker gets its own session: its own cookie store, its own login
//! handshake, its own rate limiter. The handshake mirrors the site's form
//! flow: fetch the login page, lift the `logintoken` hidden input, post the
//! credentials, and retry when the site bounces the request back to the login
//! form instead of through to the front page.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, direct::NotKeyed},
};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::session::{CourseSession, FetchedPage, SessionError, SessionProvider};
use crate::infrastructure::config::AppConfig;

/// Builds one authenticated [`MoodleSession`] per worker.
pub struct MoodleSessionProvider {
    config: AppConfig,
}

impl MoodleSessionProvider {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionProvider for MoodleSessionProvider {
    async fn acquire(&self) -> Result<Box<dyn CourseSession>, SessionError> {
        let session = MoodleSession::connect(&self.config).await?;
        Ok(Box::new(session))
    }
}

/// One logged-in session. Owned by a single worker; the cookie store goes away
/// with it.
pub struct MoodleSession {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    enrol_url: Url,
}

impl MoodleSession {
    /// Build a client and run the login handshake.
    async fn connect(config: &AppConfig) -> Result<Self, SessionError> {
        let base = Url::parse(&config.site.base_url)
            .map_err(|e| SessionError::auth(format!("invalid base URL: {e}")))?;
        let login_url = base
            .join("login/index.php")
            .map_err(|e| SessionError::auth(format!("invalid login URL: {e}")))?;
        let enrol_url = base
            .join("enrol/index.php")
            .map_err(|e| SessionError::auth(format!("invalid enrol URL: {e}")))?;

        let client = Client::builder()
            .cookie_store(true)
            .user_agent(config.request.user_agent.clone())
            .timeout(Duration::from_secs(config.request.timeout_seconds))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| SessionError::auth(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.request.max_requests_per_second)
                .ok_or_else(|| SessionError::auth("rate limit must be greater than 0"))?,
        );
        let rate_limiter = RateLimiter::direct(quota);

        let session = Self {
            client,
            rate_limiter,
            enrol_url,
        };
        session.login(&login_url, config).await?;
        Ok(session)
    }

    /// Form-based login with bounded bounce handling.
    async fn login(&self, login_url: &Url, config: &AppConfig) -> Result<(), SessionError> {
        for attempt in 1..=config.request.login_max_attempts {
            let login_page = self
                .client
                .get(login_url.clone())
                .send()
                .await
                .map_err(|e| SessionError::auth(format!("failed to load login page: {e}")))?
                .text()
                .await
                .map_err(|e| SessionError::auth(format!("failed to read login page: {e}")))?;

            let Some(token) = extract_login_token(&login_page) else {
                return Err(SessionError::auth("no logintoken found on login page"));
            };
            debug!("extracted logintoken: {token}");

            let response = self
                .client
                .post(login_url.clone())
                .form(&[
                    ("username", config.credentials.username.as_str()),
                    ("password", config.credentials.password.as_str()),
                    ("logintoken", token.as_str()),
                ])
                .send()
                .await
                .map_err(|e| SessionError::auth(format!("login request failed: {e}")))?;

            // A successful login redirects off the login page; a bounce back
            // means a stale token or a flaky handshake, so take it again.
            if response.url().path().contains("login") {
                warn!(attempt, "redirected back to login page, retrying handshake");
                continue;
            }

            info!("logged in successfully");
            return Ok(());
        }

        Err(SessionError::auth(format!(
            "login kept redirecting after {} attempts",
            config.request.login_max_attempts
        )))
    }
}

#[async_trait]
impl CourseSession for MoodleSession {
    async fn fetch(&mut self, course_id: u32) -> Result<FetchedPage, SessionError> {
        self.rate_limiter.until_ready().await;

        let mut url = self.enrol_url.clone();
        url.query_pairs_mut()
            .append_pair("id", &course_id.to_string());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SessionError::fetch(course_id, e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionError::fetch(
                course_id,
                format!("HTTP status {}", response.status()),
            ));
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| SessionError::fetch(course_id, e.to_string()))?;

        Ok(FetchedPage { final_url, body })
    }
}

/// Pull the `logintoken` hidden input out of the login form.
fn extract_login_token(html: &str) -> Option<String> {
    let selector = Selector::parse(r#"input[name="logintoken"]"#).ok()?;
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(|value| value.to_string())
}
