//! OAuth1 HMAC-SHA1 request signing, used only for the two token
//! endpoints of the Garmin SSO handshake.

use crate::error::{Result, SyncError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::Rng;
use sha1::Sha1;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

/// RFC 3986 unreserved characters stay literal; everything else is encoded.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Consumer key pair published for the Garmin mobile app
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OAuthConsumer {
    #[serde(rename = "consumer_key")]
    pub key: String,
    #[serde(rename = "consumer_secret")]
    pub secret: String,
}

pub struct OAuth1Signer<'a> {
    consumer: &'a OAuthConsumer,
    token: Option<(&'a str, &'a str)>,
}

impl<'a> OAuth1Signer<'a> {
    pub fn new(consumer: &'a OAuthConsumer) -> Self {
        Self {
            consumer,
            token: None,
        }
    }

    /// Sign on behalf of a token holder
    pub fn with_token(mut self, token: &'a str, secret: &'a str) -> Self {
        self.token = Some((token, secret));
        self
    }

    /// Build the `Authorization` header for a request. Query parameters in
    /// `url` and form parameters in `form` both enter the signature.
    pub fn authorization(&self, method: &str, url: &str, form: &[(&str, &str)]) -> Result<String> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
            .to_string();
        self.authorization_at(method, url, form, &timestamp, &nonce())
    }

    pub fn authorization_at(
        &self,
        method: &str,
        url: &str,
        form: &[(&str, &str)],
        timestamp: &str,
        nonce: &str,
    ) -> Result<String> {
        let parsed = Url::parse(url)
            .map_err(|e| SyncError::auth(format!("Cannot sign malformed URL {}: {}", url, e)))?;
        let mut base_url = format!(
            "{}://{}",
            parsed.scheme(),
            parsed.host_str().unwrap_or_default()
        );
        if let Some(port) = parsed.port() {
            base_url.push_str(&format!(":{}", port));
        }
        base_url.push_str(parsed.path());

        let mut oauth: BTreeMap<String, String> = BTreeMap::new();
        oauth.insert("oauth_consumer_key".into(), self.consumer.key.clone());
        oauth.insert("oauth_nonce".into(), nonce.to_string());
        oauth.insert("oauth_signature_method".into(), "HMAC-SHA1".into());
        oauth.insert("oauth_timestamp".into(), timestamp.to_string());
        oauth.insert("oauth_version".into(), "1.0".into());
        if let Some((token, _)) = self.token {
            oauth.insert("oauth_token".into(), token.to_string());
        }

        let mut signed: Vec<(String, String)> = oauth
            .iter()
            .map(|(k, v)| (encode(k), encode(v)))
            .chain(
                parsed
                    .query_pairs()
                    .map(|(k, v)| (encode(&k), encode(&v))),
            )
            .chain(form.iter().map(|(k, v)| (encode(k), encode(v))))
            .collect();
        signed.sort();

        let param_string = signed
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            encode(&base_url),
            encode(&param_string)
        );

        let token_secret = self.token.map(|(_, s)| s).unwrap_or_default();
        let key = format!("{}&{}", encode(&self.consumer.secret), encode(token_secret));
        let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
            .map_err(|e| SyncError::auth(format!("HMAC key rejected: {}", e)))?;
        mac.update(base_string.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        oauth.insert("oauth_signature".into(), signature);
        let header = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", header))
    }
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, UNRESERVED).to_string()
}

fn nonce() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Parse a `key=value&key=value` token response
pub fn parse_token_response(body: &str) -> BTreeMap<String, String> {
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| {
            (
                urlencoding::decode(k).map(|c| c.into_owned()).unwrap_or_default(),
                urlencoding::decode(v).map(|c| c.into_owned()).unwrap_or_default(),
            )
        })
        .collect()
}
