use super::types::{Identity, RemoteArtifact};
use super::{ContentGateway, IdentityVerifier};
use crate::config::UploaderConfig;
use crate::error::GatewayError;
use async_trait::async_trait;
use derivative::Derivative;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = concat!("word2md-uploader/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Serialize)]
struct WritePayload<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// Unauthenticated handle on the GitHub REST API for one repository name.
#[derive(Debug, Clone)]
pub struct GitHubApi {
    http: reqwest::Client,
    base: Url,
    repo: String,
    branch: String,
}

impl GitHubApi {
    pub fn new(config: &UploaderConfig) -> Result<Self, GatewayError> {
        let base = Url::parse(&config.api_base)
            .map_err(|e| GatewayError::BaseUrl(format!("{}: {}", config.api_base, e)))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::BaseUrl(config.api_base.clone()));
        }
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base,
            repo: config.repo.clone(),
            branch: config.branch.clone(),
        })
    }

    /// Scopes the API to `identity`'s copy of the repository, authenticated with `secret`.
    pub fn gateway(&self, secret: &str, identity: &Identity) -> Result<GitHubGateway, GatewayError> {
        Ok(GitHubGateway {
            api: self.clone(),
            headers: auth_headers(secret)?,
            owner: identity.login.clone(),
        })
    }

    fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, GatewayError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| GatewayError::BaseUrl(self.base.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

#[async_trait]
impl IdentityVerifier for GitHubApi {
    async fn verify(&self, secret: &str) -> Result<Identity, GatewayError> {
        let url = self.endpoint(["user"])?;
        let response = self
            .http
            .get(url)
            .headers(auth_headers(secret)?)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = remote_message(response).await;
            return Err(GatewayError::Read { status, message });
        }
        Ok(response.json::<Identity>().await?)
    }
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct GitHubGateway {
    api: GitHubApi,
    #[derivative(Debug = "ignore")]
    headers: HeaderMap,
    owner: String,
}

impl GitHubGateway {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn contents_url(&self, path: &str) -> Result<Url, GatewayError> {
        let segments = ["repos", self.owner.as_str(), self.api.repo.as_str(), "contents"]
            .into_iter()
            .chain(path.split('/').filter(|s| !s.is_empty()));
        self.api.endpoint(segments)
    }

    async fn get_contents(&self, path: &str) -> Result<Response, GatewayError> {
        let url = self.contents_url(path)?;
        Ok(self
            .api
            .http
            .get(url)
            .query(&[("ref", self.api.branch.as_str())])
            .headers(self.headers.clone())
            .send()
            .await?)
    }
}

#[async_trait]
impl ContentGateway for GitHubGateway {
    async fn write_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<(), GatewayError> {
        let url = self.contents_url(path)?;
        let payload = WritePayload {
            message,
            content,
            branch: &self.api.branch,
            sha,
        };

        let response = self
            .api
            .http
            .put(url)
            .headers(self.headers.clone())
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            tracing::debug!("Wrote {} ({} base64 bytes)", path, content.len());
            return Ok(());
        }
        let (status, message) = remote_message(response).await;
        Err(GatewayError::Write { status, message })
    }

    async fn read_file(&self, path: &str) -> Result<RemoteArtifact, GatewayError> {
        let response = self.get_contents(path).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound),
            status if status.is_success() => Ok(response.json::<RemoteArtifact>().await?),
            _ => {
                let (status, message) = remote_message(response).await;
                Err(GatewayError::Read { status, message })
            }
        }
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<RemoteArtifact>, GatewayError> {
        let response = self.get_contents(path).await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::debug!("Directory {} does not exist yet", path);
                Ok(Vec::new())
            }
            status if status.is_success() => Ok(response.json::<Vec<RemoteArtifact>>().await?),
            _ => {
                let (status, message) = remote_message(response).await;
                Err(GatewayError::Read { status, message })
            }
        }
    }
}

fn auth_headers(secret: &str) -> Result<HeaderMap, GatewayError> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", secret.trim()))
        .map_err(|_| GatewayError::InvalidHeader)?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        HeaderName::from_static("x-github-api-version"),
        HeaderValue::from_static("2022-11-28"),
    );
    Ok(headers)
}

/// Status code plus the API's `message` field, falling back to the status reason.
async fn remote_message(response: Response) -> (u16, String) {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_string();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|body| body.message)
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback);
    (status.as_u16(), message)
}
