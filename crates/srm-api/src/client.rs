// SRM web API HTTP client
//
// Wraps `reqwest::Client` with SRM-specific URL construction, session id
// handling, and `{success, data, error}` envelope unwrapping. Endpoint
// groups (network, mesh, wifi, traffic) are implemented as inherent
// methods in separate files to keep this module about transport mechanics.

use std::sync::RwLock;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Error codes the router returns when the session is gone:
/// 106 session timeout, 107 interrupted by duplicate login, 119 SID not found.
const SESSION_LOST_CODES: [i64; 3] = [106, 107, 119];

#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: i64,
}

/// HTTP client for a Synology SRM router.
///
/// Holds the session id obtained by [`login`](Self::login); every endpoint
/// call fails fast with [`Error::NotConnected`] when there is none.
pub struct SrmClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    sid: RwLock<Option<String>>,
}

impl SrmClient {
    /// Create a client for the router at `base_url`, e.g.
    /// `https://192.168.1.1:8001`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            timeout: transport.timeout,
            sid: RwLock::new(None),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: TransportConfig::default().timeout,
            sid: RwLock::new(None),
        }
    }

    /// The router base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Whether a session id is currently held.
    pub fn is_logged_in(&self) -> bool {
        self.sid.read().expect("SID lock poisoned").is_some()
    }

    // ── Session id management ─────────────────────────────────────────

    pub(crate) fn set_sid(&self, sid: Option<String>) {
        *self.sid.write().expect("SID lock poisoned") = sid;
    }

    pub(crate) fn sid(&self) -> Option<String> {
        self.sid.read().expect("SID lock poisoned").clone()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/webapi/auth.cgi`
    pub(crate) fn auth_url(&self) -> Result<Url, Error> {
        self.base_url.join("/webapi/auth.cgi").map_err(Error::InvalidUrl)
    }

    /// `{base}/webapi/entry.cgi`
    pub(crate) fn entry_url(&self) -> Result<Url, Error> {
        self.base_url.join("/webapi/entry.cgi").map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Call an `entry.cgi` API and return its `data` payload.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        api: &str,
        method: &str,
        version: u32,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        self.request(api, method, version, params)
            .await?
            .ok_or_else(|| Error::Deserialization {
                message: format!("{api}.{method}: response carried no data"),
                body: String::new(),
            })
    }

    /// Call an `entry.cgi` API whose response carries no meaningful data.
    pub(crate) async fn call_unit(
        &self,
        api: &str,
        method: &str,
        version: u32,
        params: &[(&str, String)],
    ) -> Result<(), Error> {
        let _: Option<serde_json::Value> = self.request(api, method, version, params).await?;
        Ok(())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        api: &str,
        method: &str,
        version: u32,
        params: &[(&str, String)],
    ) -> Result<Option<T>, Error> {
        let sid = self.sid().ok_or(Error::NotConnected)?;
        let url = self.entry_url()?;

        let mut form: Vec<(&str, String)> = vec![
            ("api", api.to_owned()),
            ("method", method.to_owned()),
            ("version", version.to_string()),
            ("_sid", sid),
        ];
        form.extend(params.iter().map(|(k, v)| (*k, v.clone())));

        debug!(api, method, "POST {}", url);
        let body = self.post_form(url, &form).await?;
        self.parse_envelope(api, &body)
    }

    /// POST a urlencoded form and return the raw response body.
    pub(crate) async fn post_form(
        &self,
        url: Url,
        form: &[(&str, String)],
    ) -> Result<String, Error> {
        let resp = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            self.set_sid(None);
            return Err(Error::NotConnected);
        }
        if !status.is_success() {
            return Err(Error::Api {
                api: format!("HTTP {status}"),
                code: i64::from(status.as_u16()),
            });
        }

        resp.text().await.map_err(|e| self.map_send_error(e))
    }

    /// Parse the `{ success, data, error }` envelope.
    ///
    /// Session-loss codes clear the stored SID and surface as
    /// [`Error::NotConnected`] so callers can re-authenticate.
    pub(crate) fn parse_envelope<T: DeserializeOwned>(
        &self,
        api: &str,
        body: &str,
    ) -> Result<Option<T>, Error> {
        let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| {
            let preview = body.char_indices().nth(200).map_or(body, |(i, _)| &body[..i]);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.to_owned(),
            }
        })?;

        if envelope.success {
            trace!(api, "envelope ok");
            return Ok(envelope.data);
        }

        let code = envelope.error.map_or(100, |e| e.code);
        if SESSION_LOST_CODES.contains(&code) {
            debug!(api, code, "session lost");
            self.set_sid(None);
            return Err(Error::NotConnected);
        }
        Err(Error::Api {
            api: api.to_owned(),
            code,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            Error::Transport(e)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> SrmClient {
        SrmClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://192.168.1.1:8001").unwrap(),
        )
    }

    #[test]
    fn malformed_body_preview_stops_on_char_boundary() {
        let body = format!("{}\u{e9} rest of an html error page", "x".repeat(199));
        let err = client()
            .parse_envelope::<serde_json::Value>("SYNO.Mesh.Node.List", &body)
            .unwrap_err();
        match err {
            Error::Deserialization { message, body: full } => {
                assert!(message.contains("\u{e9}"), "message: {message}");
                assert_eq!(full, body);
            }
            other => panic!("expected Deserialization error, got: {other:?}"),
        }
    }

    #[test]
    fn session_lost_code_clears_sid() {
        let client = client();
        client.set_sid(Some("sid-1".into()));
        let err = client
            .parse_envelope::<serde_json::Value>(
                "SYNO.Mesh.Node.List",
                r#"{"success":false,"error":{"code":106}}"#,
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotConnected));
        assert!(!client.is_logged_in());
    }
}
