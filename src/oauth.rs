//! OAuth 1.0a authentication module for Twitter API integration.
//!
//! Every API request carries an `Authorization: OAuth ...` header signed with
//! HMAC-SHA1 over the method, the base URL and all request parameters. The
//! same signer drives the PIN authorization flow, first with consumer
//! credentials only, then with the temporary request token.

use base64::Engine;
use hmac::{Hmac, Mac};
use log::debug;
use rand::RngCore;
use serde::Deserialize;
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

use crate::error::{CliError, Result};
use crate::rcfile::Credentials;

/// Token pair returned by the request-token and access-token endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub oauth_token: String,
    pub oauth_token_secret: String,
    #[serde(default)]
    pub screen_name: Option<String>,
}

impl TokenPair {
    /// Parses a form-encoded token response body.
    pub fn parse(body: &str) -> Result<Self> {
        serde_urlencoded::from_str(body.trim())
            .map_err(|e| CliError::OAuth(format!("unexpected token response: {}", e)))
    }
}

/// OAuth 1.0a signer for Twitter API requests.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    consumer_key: String,
    consumer_secret: String,
    token: Option<String>,
    token_secret: String,
}

impl OAuthSigner {
    /// Signer holding only the application's consumer credentials.
    pub fn consumer(consumer_key: &str, consumer_secret: &str) -> Self {
        OAuthSigner {
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
            token: None,
            token_secret: String::new(),
        }
    }

    /// Signer for a stored profile.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::consumer(&credentials.consumer_key, &credentials.consumer_secret)
            .with_token(&credentials.token, &credentials.secret)
    }

    pub fn with_token(mut self, token: &str, token_secret: &str) -> Self {
        self.token = Some(token.to_string());
        self.token_secret = token_secret.to_string();
        self
    }

    /// Builds the `Authorization` header value.
    ///
    /// # Parameters
    ///
    /// - `method`: HTTP method (GET, POST, DELETE)
    /// - `url`: URL without query string
    /// - `params`: query or form parameters sent with the request
    /// - `extra`: additional `oauth_*` parameters (`oauth_callback`, `oauth_verifier`)
    pub fn authorization(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        extra: &[(&str, &str)],
    ) -> Result<String> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
            .to_string();
        self.authorization_at(method, url, params, extra, &generate_nonce(), &timestamp)
    }

    fn authorization_at(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        extra: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String> {
        let mut oauth_params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".into(), self.consumer_key.clone()),
            ("oauth_nonce".into(), nonce.to_string()),
            ("oauth_signature_method".into(), "HMAC-SHA1".into()),
            ("oauth_timestamp".into(), timestamp.to_string()),
        ];
        if let Some(token) = &self.token {
            oauth_params.push(("oauth_token".into(), token.clone()));
        }
        oauth_params.push(("oauth_version".into(), "1.0".into()));
        for (key, value) in extra {
            oauth_params.push((key.to_string(), value.to_string()));
        }

        let signature = self.signature(method, url, params, &oauth_params)?;
        oauth_params.push(("oauth_signature".into(), signature));
        oauth_params.sort();

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {}", header))
    }

    fn signature(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        oauth_params: &[(String, String)],
    ) -> Result<String> {
        let mut encoded: Vec<(String, String)> = params
            .iter()
            .chain(oauth_params.iter())
            .map(|(k, v)| (encode(k), encode(v)))
            .collect();
        encoded.sort();

        let param_string = encoded
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            encode(url),
            encode(&param_string)
        );
        let signing_key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.token_secret)
        );
        debug!("OAuth signature base string: {} bytes", base_string.len());

        hmac_sha1(&signing_key, &base_string)
    }
}

/// URL of the page where the user approves the request token and receives a PIN.
pub fn authorize_url(api_url: &str, request_token: &str) -> Result<String> {
    let mut url = Url::parse(&format!("{}/oauth/authorize", api_url))
        .map_err(|e| CliError::OAuth(format!("invalid API URL '{}': {}", api_url, e)))?;
    url.query_pairs_mut()
        .append_pair("oauth_token", request_token);
    Ok(url.to_string())
}

/// RFC 3986 percent-encoding (unreserved characters pass through).
fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hmac_sha1(key: &str, data: &str) -> Result<String> {
    type HmacSha1 = Hmac<Sha1>;
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| CliError::OAuth(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_encode_is_rfc3986() {
        assert_eq!(encode("hello world"), "hello%20world");
        assert_eq!(encode("foo=bar&baz"), "foo%3Dbar%26baz");
        assert_eq!(encode("test-value_123.txt~"), "test-value_123.txt~");
        assert_eq!(encode("Ladies + Gentlemen!"), "Ladies%20%2B%20Gentlemen%21");
    }

    #[test]
    fn test_signature_matches_documented_example() {
        let signer = OAuthSigner::consumer(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
        )
        .with_token(
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        );
        let header = signer.authorization_at(
            "POST",
            "https://api.twitter.com/1/statuses/update.json",
            &pairs(&[
                ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
                ("include_entities", "true"),
            ]),
            &[],
            "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
            "1318622958",
        )
        .unwrap();

        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_signature=\"tnnArxj06cWHq44gCs1OSKk%2FjLY%3D\""));
        assert!(header.contains("oauth_token=\"370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb\""));
    }

    #[test]
    fn test_consumer_only_header_has_no_token() {
        let signer = OAuthSigner::consumer("abc123", "asdfasd223sd2");
        let header = signer.authorization(
            "POST",
            "https://api.twitter.com/oauth/request_token",
            &[],
            &[("oauth_callback", "oob")],
        )
        .unwrap();
        assert!(header.contains("oauth_callback=\"oob\""));
        assert!(header.contains("oauth_consumer_key=\"abc123\""));
        assert!(!header.contains("oauth_token="));
    }

    #[test]
    fn test_nonce_is_random_hex() {
        let a = generate_nonce();
        let b = generate_nonce();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_token_pair_parse() {
        let pair = TokenPair::parse(
            "oauth_token=7505382-cebdct6bwobn&oauth_token_secret=epzrjvxtumoc&user_id=7505382&screen_name=testcli\n",
        )
        .unwrap();
        assert_eq!(pair.oauth_token, "7505382-cebdct6bwobn");
        assert_eq!(pair.oauth_token_secret, "epzrjvxtumoc");
        assert_eq!(pair.screen_name.as_deref(), Some("testcli"));

        assert!(matches!(
            TokenPair::parse("<html>nope</html>"),
            Err(CliError::OAuth(_))
        ));
    }

    #[test]
    fn test_authorize_url() {
        let url = authorize_url("https://api.twitter.com", "abc def").unwrap();
        assert_eq!(
            url,
            "https://api.twitter.com/oauth/authorize?oauth_token=abc+def"
        );
    }
}
