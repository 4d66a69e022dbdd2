//! Login state as the engine consumes it: a boolean plus a redirect URL.
//!
//! Auth failures never reach the user as errors. A failed status check simply
//! means "logged out" and the renderer shows the login prompt.

use crate::api::DashboardApi;
use crate::error::ApiError;
use anyhow::{anyhow, Result};

/// Ask the backend whether the session cookie is still valid
pub async fn check_auth_status(api: &dyn DashboardApi) -> bool {
    match api.auth_status().await {
        Ok(authenticated) => {
            log::info!("[session] auth status: authenticated={authenticated}");
            authenticated
        }
        Err(ApiError::Unauthorized) => {
            log::info!("[session] auth status: 401, treating as logged out");
            false
        }
        Err(e) => {
            log::warn!("[session] auth check failed, treating as logged out: {e}");
            false
        }
    }
}

/// Start the OAuth flow; the caller redirects the user to the returned URL
pub async fn login_url(api: &dyn DashboardApi) -> Result<String> {
    let url = api
        .login_url()
        .await
        .map_err(|e| anyhow!("Login error: {e}"))?;
    if url.is_empty() {
        return Err(anyhow!("Login error: backend returned an empty auth_url"));
    }
    log::debug!("[session] login redirect prepared");
    Ok(url)
}
