// Helper pages for fetching an access token by hand from the identity
// provider's implicit flow. Only mounted when a client id is configured.

use axum::{extract::State, response::Html};
use url::Url;

use crate::config::{AuthConfig, ConfigError};
use crate::context::AppContext;
use crate::error::ApiError;

/// Pre-built provider URLs for the login helper pages
#[derive(Debug, Clone)]
pub struct LoginPages {
    authorize_url: Url,
    logout_url: Url,
}

impl LoginPages {
    /// `base_url` is where this API is reachable, e.g. `http://localhost:5000`
    pub fn new(config: &AuthConfig, client_id: &str, base_url: &str) -> Result<Self, ConfigError> {
        let base = base_url.trim_end_matches('/');
        let callback = config
            .callback_url
            .clone()
            .unwrap_or_else(|| format!("{}/login-results", base));
        let invalid = |_| ConfigError::Invalid {
            name: "AUTH0_DOMAIN",
            value: config.domain.clone(),
        };

        let authorize_url = Url::parse_with_params(
            &format!("https://{}/authorize", config.domain),
            &[
                ("audience", config.audience.as_str()),
                ("response_type", "token"),
                ("client_id", client_id),
                ("redirect_uri", callback.as_str()),
            ],
        )
        .map_err(invalid)?;

        let return_to = format!("{}/logout", base);
        let logout_url = Url::parse_with_params(
            &format!("https://{}/v2/logout", config.domain),
            &[("client_id", client_id), ("returnTo", return_to.as_str())],
        )
        .map_err(invalid)?;

        Ok(Self {
            authorize_url,
            logout_url,
        })
    }

    pub fn login_page(&self) -> String {
        format!(r#"<a href="{}">Go to Login</a>"#, self.authorize_url)
    }

    /// Reads the token from the redirect fragment and shows it
    pub fn results_page(&self) -> String {
        let script = r#"<script>token = window.location.href.split("access_token=")[1].split("&")[0]; document.getElementById("token").innerHTML = "Access Token is: " + token;</script>"#;
        format!(
            r#"<p id="token"></p>{}<a href="{}">Logout</a>"#,
            script, self.logout_url
        )
    }
}

fn pages(ctx: &AppContext) -> Result<&LoginPages, ApiError> {
    ctx.login
        .as_deref()
        .ok_or_else(|| ApiError::not_found("Login pages are not configured."))
}

/// GET /login and GET /logout
pub async fn login(State(ctx): State<AppContext>) -> Result<Html<String>, ApiError> {
    Ok(Html(pages(&ctx)?.login_page()))
}

/// GET /login-results
pub async fn results(State(ctx): State<AppContext>) -> Result<Html<String>, ApiError> {
    Ok(Html(pages(&ctx)?.results_page()))
}
