// Session authentication
//
// `SYNO.API.Auth` login/logout against `auth.cgi`. A successful login
// yields a session id that every `entry.cgi` call carries as `_sid`.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::client::SrmClient;
use crate::error::Error;

const AUTH_API: &str = "SYNO.API.Auth";
const AUTH_VERSION: &str = "2";
const SESSION_NAME: &str = "webui";

#[derive(Deserialize)]
struct LoginData {
    sid: String,
}

#[derive(Deserialize)]
struct AuthEnvelope {
    success: bool,
    data: Option<LoginData>,
    error: Option<AuthErrorBody>,
}

#[derive(Deserialize)]
struct AuthErrorBody {
    code: i64,
}

fn describe_login_error(code: i64) -> &'static str {
    match code {
        400 => "no such account or incorrect password",
        401 => "account disabled",
        402 => "permission denied",
        403 | 404 => "two-factor authentication required",
        407 => "blocked by auto-block",
        _ => "login rejected",
    }
}

impl SrmClient {
    /// Authenticate with username/password.
    ///
    /// `POST /webapi/auth.cgi` with `api=SYNO.API.Auth&method=Login`.
    /// On success the session id is stored and the router's `id` cookie
    /// lands in the cookie jar.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.auth_url()?;
        debug!("logging in at {}", url);

        let form: Vec<(&str, String)> = vec![
            ("api", AUTH_API.into()),
            ("method", "Login".into()),
            ("version", AUTH_VERSION.into()),
            ("account", username.to_owned()),
            ("passwd", password.expose_secret().to_owned()),
            ("session", SESSION_NAME.into()),
            ("format", "cookie".into()),
        ];

        let body = match self.post_form(url, &form).await {
            // The router answers bad credentials with 403 on some firmware.
            Err(Error::NotConnected) => {
                return Err(Error::Authentication {
                    message: "login refused by router".into(),
                });
            }
            other => other?,
        };

        let envelope: AuthEnvelope =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("login response: {e}"),
                body: body.clone(),
            })?;

        match (envelope.success, envelope.data) {
            (true, Some(data)) => {
                self.set_sid(Some(data.sid));
                debug!("login successful");
                Ok(())
            }
            (true, None) => Err(Error::Authentication {
                message: "login succeeded without a session id".into(),
            }),
            (false, _) => {
                let code = envelope.error.map_or(100, |e| e.code);
                Err(Error::Authentication {
                    message: format!("{} (code {code})", describe_login_error(code)),
                })
            }
        }
    }

    /// End the current session.
    ///
    /// The local session id is cleared even if the router call fails, so a
    /// later call never reuses a half-dead session. A client that never
    /// logged in returns `Ok(())` without a request.
    pub async fn logout(&self) -> Result<(), Error> {
        let Some(sid) = self.sid() else {
            debug!("logout skipped: no session");
            return Ok(());
        };
        self.set_sid(None);

        let url = self.auth_url()?;
        debug!("logging out at {}", url);

        let form: Vec<(&str, String)> = vec![
            ("api", AUTH_API.into()),
            ("method", "Logout".into()),
            ("version", AUTH_VERSION.into()),
            ("session", SESSION_NAME.into()),
            ("_sid", sid),
        ];
        let _body = self.post_form(url, &form).await?;

        debug!("logout complete");
        Ok(())
    }
}
