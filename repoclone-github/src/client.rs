//! GitHub API client using octocrab

use crate::{Error, Result};
use octocrab::Octocrab;
use repoclone_core::Credentials;
use tracing::info;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub API client for listing repositories
#[derive(Clone)]
pub struct GitHubClient {
    client: Octocrab,
    api_url: String,
    auth: &'static str,
}

impl GitHubClient {
    /// Create a new GitHub client
    ///
    /// Without credentials the client is anonymous and subject to the
    /// unauthenticated rate limit. `api_url` selects a GitHub Enterprise
    /// installation; the public API is used when it is `None`.
    pub fn new(credentials: Option<&Credentials>, api_url: Option<&str>) -> Result<Self> {
        let api_url = match api_url {
            Some(url) => normalize_api_url(url)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let mut builder = Octocrab::builder();
        if api_url != DEFAULT_API_URL {
            builder = builder.base_uri(api_url.as_str())?;
        }

        let auth = match credentials {
            Some(Credentials::Basic { username, password }) => {
                builder = builder.basic_auth(username.clone(), password.clone());
                "basic"
            }
            Some(Credentials::Token { token }) => {
                builder = builder.personal_token(token.clone());
                "token"
            }
            None => "anonymous",
        };

        let client = builder
            .build()
            .map_err(|e| Error::Auth(format!("Failed to create GitHub client: {}", e)))?;

        info!(api_url = %api_url, auth, "Created GitHub client");

        Ok(Self {
            client,
            api_url,
            auth,
        })
    }

    /// Get the API base URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Authentication scheme in use ("basic", "token" or "anonymous")
    pub fn auth(&self) -> &str {
        self.auth
    }

    /// Get the underlying octocrab client
    pub fn client(&self) -> &Octocrab {
        &self.client
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

/// Check an API base URL and strip any trailing slash
fn normalize_api_url(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url.trim())?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(Error::Parse(format!(
                "Unsupported API URL scheme '{}' in {}. Expected http or https",
                scheme, url
            )))
        }
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_api_url() {
        assert_eq!(
            normalize_api_url("https://api.github.com/").unwrap(),
            "https://api.github.com"
        );
        assert_eq!(
            normalize_api_url("https://ghe.example.com/api/v3").unwrap(),
            "https://ghe.example.com/api/v3"
        );
    }

    #[test]
    fn test_normalize_api_url_invalid() {
        assert!(matches!(normalize_api_url("not a url"), Err(Error::Parse(_))));
        assert!(matches!(
            normalize_api_url("ftp://ghe.example.com"),
            Err(Error::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_anonymous_client() {
        let client = GitHubClient::new(None, None).unwrap();
        assert_eq!(client.api_url(), DEFAULT_API_URL);
        assert_eq!(client.auth(), "anonymous");
    }

    #[tokio::test]
    async fn test_token_client_debug_hides_token() {
        let credentials = Credentials::token("ghp_secret");
        let client = GitHubClient::new(Some(&credentials), None).unwrap();
        assert_eq!(client.auth(), "token");
        assert!(!format!("{:?}", client).contains("ghp_secret"));
    }

    #[tokio::test]
    async fn test_enterprise_client() {
        let credentials = Credentials::basic("doowb", "hunter2");
        let client =
            GitHubClient::new(Some(&credentials), Some("https://ghe.example.com/api/v3/")).unwrap();
        assert_eq!(client.api_url(), "https://ghe.example.com/api/v3");
        assert_eq!(client.auth(), "basic");
    }
}
