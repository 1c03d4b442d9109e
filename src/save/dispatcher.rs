use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::multipart::Form;
use url::Url;

use super::error::TransportError;
use super::response::{MissingStatusPolicy, RawResponse, SaveResult, classify_response};
use crate::config::EngineConfig;
use crate::model::FormSnapshot;

/// Header that marks a request as programmatic rather than a page navigation.
const REQUESTED_WITH: &str = "X-Requested-With";

/// Something that can save a snapshot.
///
/// [`SaveDispatcher`] is the HTTP implementation; the autosave scheduler and
/// action dispatcher only see this trait.
pub trait Saver {
    /// Sends `snapshot` to `endpoint` and classifies the answer.
    ///
    /// Expected failures are `Ok` variants of [`SaveResult`]; `Err` means no
    /// answer arrived at all.
    fn save(
        &self,
        snapshot: FormSnapshot,
        endpoint: &Url,
    ) -> impl Future<Output = Result<SaveResult, TransportError>> + Send;
}

/// Builds the HTTP client used for saves.
pub fn build_http_client(
    timeout: Duration,
    connect_timeout: Duration,
) -> Result<Client, TransportError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(TransportError::Client)
}

/// Extracts the cookie called `name` from a `Cookie` header value
/// (`"a=1; csrftoken=abc"`).
pub fn csrf_from_cookie_header<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

/// Saves snapshots with a multipart POST to the page URL.
#[derive(Debug, Clone)]
pub struct SaveDispatcher {
    client: Client,
    cookies: String,
    csrf_cookie_name: String,
    csrf_field_name: String,
    requested_with: String,
    missing_status: MissingStatusPolicy,
}

impl SaveDispatcher {
    /// Creates a dispatcher with a client built from `config`'s timeouts.
    pub fn new(config: &EngineConfig) -> Result<Self, TransportError> {
        let client = build_http_client(config.request_timeout(), config.connect_timeout())?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a dispatcher around an existing client.
    pub fn with_client(client: Client, config: &EngineConfig) -> Self {
        Self {
            client,
            cookies: String::new(),
            csrf_cookie_name: config.csrf_cookie_name.clone(),
            csrf_field_name: config.csrf_field_name.clone(),
            requested_with: config.requested_with_header.clone(),
            missing_status: config.missing_status,
        }
    }

    /// Sets the page's cookies, sent with every save and searched for the CSRF token.
    #[must_use]
    pub fn with_cookies(mut self, cookie_header: impl Into<String>) -> Self {
        self.cookies = cookie_header.into();
        self
    }

    /// Returns the CSRF token found in the page cookies, if any.
    pub fn csrf_token(&self) -> Option<&str> {
        csrf_from_cookie_header(&self.cookies, &self.csrf_cookie_name)
    }

    /// Returns the snapshot that goes on the wire: the CSRF token is appended
    /// from the cookie when the form did not carry one.
    fn outgoing(&self, snapshot: FormSnapshot) -> FormSnapshot {
        if snapshot.contains(&self.csrf_field_name) {
            return snapshot;
        }
        match self.csrf_token() {
            Some(token) => snapshot.with_entry(self.csrf_field_name.clone(), token),
            None => {
                tracing::debug!("no CSRF token in form or cookies");
                snapshot
            }
        }
    }

    fn multipart(snapshot: &FormSnapshot) -> Form {
        let mut form = Form::new();
        for (name, value) in snapshot.wire_entries() {
            form = form.text(name.to_string(), value.to_string());
        }
        form
    }
}

impl Saver for SaveDispatcher {
    async fn save(
        &self,
        snapshot: FormSnapshot,
        endpoint: &Url,
    ) -> Result<SaveResult, TransportError> {
        let snapshot = self.outgoing(snapshot);
        let mut request = self
            .client
            .post(endpoint.clone())
            .header(REQUESTED_WITH, self.requested_with.as_str())
            .multipart(Self::multipart(&snapshot));
        if !self.cookies.is_empty() {
            request = request.header(COOKIE, self.cookies.as_str());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                tracing::warn!(%endpoint, "save request timed out");
                return Ok(SaveResult::timed_out());
            }
            Err(e) => return Err(TransportError::Request(e)),
        };

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => return Ok(SaveResult::timed_out()),
            Err(e) => return Err(TransportError::Body(e)),
        };

        let result = classify_response(
            &RawResponse {
                status,
                content_type: content_type.as_deref(),
                body: &body,
            },
            self.missing_status,
        );
        tracing::debug!(%endpoint, status, ?result, "save response classified");
        Ok(result)
    }
}
