//! OAuth 1.0a request signing.
//!
//! Mentions are a user-context endpoint, so every request carries an
//! `Authorization: OAuth ...` header signed with HMAC-SHA1.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;
use tweetstore_shared::TwitterSettings;
use uuid::Uuid;

use crate::error::{TwitterError, TwitterResult};

/// Everything except the RFC 3986 unreserved characters.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// OAuth 1.0a signer for Twitter API requests.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    consumer_key: String,
    consumer_secret: String,
    access_token: String,
    access_token_secret: String,
}

impl OAuthSigner {
    /// Create a signer from the configured credentials.
    #[must_use]
    pub fn new(settings: &TwitterSettings) -> Self {
        Self {
            consumer_key: settings.consumer_key.clone(),
            consumer_secret: settings.consumer_secret.clone(),
            access_token: settings.access_token.clone(),
            access_token_secret: settings.access_token_secret.clone(),
        }
    }

    /// Build the `Authorization` header value for a request.
    ///
    /// `url` must not carry a query string; query parameters go in `params`.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
    ) -> TwitterResult<String> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| TwitterError::OAuth(format!("Failed to get timestamp: {e}")))?
            .as_secs()
            .to_string();
        let nonce = Uuid::new_v4().simple().to_string();

        self.sign_with(method, url, params, &timestamp, &nonce)
    }

    /// Sign with a fixed timestamp and nonce.
    pub fn sign_with(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        timestamp: &str,
        nonce: &str,
    ) -> TwitterResult<String> {
        let mut oauth_params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            (
                "oauth_signature_method".to_string(),
                "HMAC-SHA1".to_string(),
            ),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.access_token.clone()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ];

        // Parameters are sorted by encoded key, then encoded value.
        let mut all_params: Vec<(String, String)> = oauth_params
            .iter()
            .chain(params)
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect();
        all_params.sort();

        let param_string = all_params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            percent_encode(url),
            percent_encode(&param_string)
        );
        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(&self.access_token_secret)
        );

        let signature = hmac_sha1(&signing_key, &base_string)?;
        oauth_params.push(("oauth_signature".to_string(), signature));

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {header}"))
    }
}

fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

fn hmac_sha1(key: &str, data: &str) -> TwitterResult<String> {
    type HmacSha1 = Hmac<Sha1>;

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| TwitterError::OAuth(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn settings(consumer_secret: &str, token_secret: &str) -> TwitterSettings {
        TwitterSettings {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".into(),
            consumer_secret: consumer_secret.into(),
            access_token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".into(),
            access_token_secret: token_secret.into(),
            user_id: "370773112".into(),
            api_url: "https://api.twitter.com".into(),
            timeout_secs: 30,
        }
    }

    #[rstest]
    #[case("hello world", "hello%20world")]
    #[case("foo=bar&baz", "foo%3Dbar%26baz")]
    #[case("test-value_123.txt", "test-value_123.txt")]
    #[case("~tilde", "~tilde")]
    #[case("a+b!", "a%2Bb%21")]
    fn test_percent_encode(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(percent_encode(input), expected);
    }

    #[test]
    fn test_known_signature() {
        // Reference request from Twitter's "Creating a signature" guide.
        let signer = OAuthSigner::new(&settings(
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        ));
        let params = vec![
            ("include_entities".to_string(), "true".to_string()),
            (
                "status".to_string(),
                "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
            ),
        ];

        let header = signer
            .sign_with(
                "post",
                "https://api.twitter.com/1.1/statuses/update.json",
                &params,
                "1318622958",
                "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
            )
            .unwrap();

        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
    }

    #[test]
    fn test_sign_creates_valid_header() {
        let signer = OAuthSigner::new(&settings("secret", "token_secret"));
        let header = signer
            .sign("GET", "https://api.twitter.com/2/users/1/mentions", &[])
            .unwrap();

        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_consumer_key="));
        assert!(header.contains("oauth_signature="));
        assert!(header.contains("oauth_timestamp="));
        assert!(header.contains("oauth_nonce="));
    }

    #[test]
    fn test_nonces_differ() {
        let signer = OAuthSigner::new(&settings("secret", "token_secret"));
        let url = "https://api.twitter.com/2/users/1/mentions";
        let first = signer.sign("GET", url, &[]).unwrap();
        let second = signer.sign("GET", url, &[]).unwrap();
        assert_ne!(first, second);
    }
}
