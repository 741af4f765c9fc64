use super::credentials::{ClientCredentials, UserCredentials};
use super::types::*;
use super::TimelineSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use url::Url;

/// Out-of-band redirect: the instance shows the code for the user to paste.
pub const OOB_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";
pub const SCOPES: &str = "read write";

pub struct MastodonRest {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl MastodonRest {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    pub fn with_user(client: Client, user: &UserCredentials) -> Self {
        let mut rest = Self::new(client, &user.api_base);
        rest.access_token = Some(user.access_token.clone());
        rest
    }

    fn authed(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.access_token {
            Some(token) => Ok(req.bearer_auth(token)),
            None => anyhow::bail!("no access token; run `toot --auth` first"),
        }
    }

    async fn check(resp: Response, what: &str) -> Result<Response> {
        let status = resp.status();
        if status.as_u16() == 401 {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("{} rejected (401 Unauthorized), re-run `toot --auth`: {}", what, body);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("{} failed ({}): {}", what, status, body);
        }
        Ok(resp)
    }

    /// Register this client application with the instance.
    pub async fn register_app(&self, app_name: &str, website: Option<&str>) -> Result<ClientCredentials> {
        let url = format!("{}/api/v1/apps", self.base_url);
        let mut form = vec![
            ("client_name", app_name),
            ("redirect_uris", OOB_REDIRECT),
            ("scopes", SCOPES),
        ];
        if let Some(site) = website {
            form.push(("website", site));
        }
        let resp = self.client.post(&url).form(&form).send().await.context("app registration request failed")?;
        let app: RegisteredApp = Self::check(resp, "app registration")
            .await?
            .json()
            .await
            .context("failed to parse app registration response")?;
        Ok(ClientCredentials {
            client_id: app.client_id,
            client_secret: app.client_secret,
            api_base: self.base_url.clone(),
            app_name: if app.name.is_empty() { app_name.to_string() } else { app.name },
        })
    }

    /// Page the user opens in a browser to approve the app.
    pub fn authorize_url(client: &ClientCredentials) -> Result<Url> {
        let base = client.api_base.trim_end_matches('/');
        Url::parse_with_params(
            &format!("{}/oauth/authorize", base),
            &[
                ("client_id", client.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", OOB_REDIRECT),
                ("scope", SCOPES),
            ],
        )
        .context("failed to build authorization URL")
    }

    /// Trade the authorization code for an access token.
    pub async fn exchange_code(&self, client: &ClientCredentials, code: &str) -> Result<UserCredentials> {
        let url = format!("{}/oauth/token", self.base_url);
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret.as_str()),
            ("redirect_uri", OOB_REDIRECT),
            ("scope", SCOPES),
        ];
        let resp = self.client.post(&url).form(&form).send().await.context("token request failed")?;
        let token: TokenResponse = Self::check(resp, "token exchange")
            .await?
            .json()
            .await
            .context("failed to parse token response")?;
        Ok(UserCredentials {
            access_token: token.access_token,
            api_base: self.base_url.clone(),
        })
    }

    /// Publish a status and return it.
    pub async fn post_status(&self, text: &str) -> Result<Status> {
        let url = format!("{}/api/v1/statuses", self.base_url);
        let req = self.authed(self.client.post(&url).form(&[("status", text)]))?;
        let resp = req.send().await.context("status request failed")?;
        Self::check(resp, "posting status")
            .await?
            .json()
            .await
            .context("failed to parse status response")
    }
}

#[async_trait]
impl TimelineSource for MastodonRest {
    async fn home_page(&self, max_id: Option<&str>, limit: usize) -> Result<Vec<Status>> {
        let mut url = format!("{}/api/v1/timelines/home?limit={}", self.base_url, limit);
        if let Some(id) = max_id {
            url.push_str(&format!("&max_id={}", id));
        }
        let req = self.authed(self.client.get(&url))?;
        let resp = req.send().await.context("GET home timeline failed")?;
        Self::check(resp, "reading home timeline")
            .await?
            .json()
            .await
            .context("failed to parse timeline response")
    }
}
