//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! The connect API's token endpoints still expect OAuth1-signed requests
//! from the mobile app consumer. Only header-based signing is supported.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;
use sha1::Sha1;

/// Characters left unescaped by RFC 3986 section 2.3.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LENGTH: usize = 32;

/// Consumer credentials of the Garmin Connect mobile app.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConsumer {
    pub consumer_key: String,
    pub consumer_secret: String,
}

/// Builds `Authorization: OAuth ...` header values.
pub struct OAuth1Signer<'a> {
    consumer: &'a OAuthConsumer,
    token: Option<(&'a str, &'a str)>,
}

impl<'a> OAuth1Signer<'a> {
    /// Signer for requests made with the consumer credentials only.
    pub fn new(consumer: &'a OAuthConsumer) -> Self {
        Self {
            consumer,
            token: None,
        }
    }

    /// Sign on behalf of a resource owner token.
    pub fn with_token(mut self, token: &'a str, token_secret: &'a str) -> Self {
        self.token = Some((token, token_secret));
        self
    }

    /// Authorization header for a request.
    ///
    /// `url` must not contain a query string; query parameters and
    /// form-encoded body parameters are passed in `params` unencoded.
    pub fn authorization(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LENGTH)
            .map(char::from)
            .collect();
        let timestamp = Utc::now().timestamp().to_string();
        self.authorization_with(method, url, params, &nonce, &timestamp)
    }

    pub(crate) fn authorization_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> String {
        let mut oauth_params = vec![
            ("oauth_consumer_key", self.consumer.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp),
            ("oauth_version", OAUTH_VERSION),
        ];
        if let Some((token, _)) = self.token {
            oauth_params.push(("oauth_token", token));
        }

        let mut all_params = oauth_params.clone();
        all_params.extend_from_slice(params);
        let base = signature_base_string(method, url, &all_params);
        let signature = sign(&base, &self.signing_key());

        let mut header = String::from("OAuth ");
        let fields = oauth_params
            .iter()
            .map(|(k, v)| (*k, *v))
            .chain(std::iter::once(("oauth_signature", signature.as_str())))
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        header.push_str(&fields);
        header
    }

    fn signing_key(&self) -> String {
        let token_secret = self.token.map(|(_, secret)| secret).unwrap_or_default();
        format!(
            "{}&{}",
            encode(&self.consumer.consumer_secret),
            encode(token_secret)
        )
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

/// The signature base string: method, base URL and normalized parameters.
fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&normalized)
    )
}

/// HMAC-SHA1 over the base string, base64 encoded.
fn sign(base_string: &str, key: &str) -> String {
    // new_from_slice only fails for fixed-size keys; HMAC pads or hashes any length
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes()).expect("HMAC takes any key length");
    mac.update(base_string.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Photo-sharing example from the OAuth Core 1.0 specification, Appendix A.
    fn photos_consumer() -> OAuthConsumer {
        OAuthConsumer {
            consumer_key: "dpf43f3p2l4k3l03".to_string(),
            consumer_secret: "kd94hf93k423kf44".to_string(),
        }
    }

    const PHOTOS_URL: &str = "http://photos.example.net/photos";
    const PHOTOS_QUERY: &[(&str, &str)] = &[("file", "vacation.jpg"), ("size", "original")];

    #[test]
    fn test_signature_base_string() {
        let mut params = vec![
            ("oauth_consumer_key", "dpf43f3p2l4k3l03"),
            ("oauth_token", "nnch734d00sl2jdk"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1191242096"),
            ("oauth_nonce", "kllo9940pd9333jh"),
            ("oauth_version", "1.0"),
        ];
        params.extend_from_slice(PHOTOS_QUERY);

        let base = signature_base_string("GET", PHOTOS_URL, &params);
        assert_eq!(
            base,
            "GET&http%3A%2F%2Fphotos.example.net%2Fphotos&file%3Dvacation.jpg\
             %26oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3Dkllo9940pd9333jh\
             %26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1191242096\
             %26oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0%26size%3Doriginal"
        );
    }

    #[test]
    fn test_authorization_header_matches_reference_signature() {
        let consumer = photos_consumer();
        let signer = OAuth1Signer::new(&consumer).with_token("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");

        let header = signer.authorization_with(
            "GET",
            PHOTOS_URL,
            PHOTOS_QUERY,
            "kllo9940pd9333jh",
            "1191242096",
        );

        assert!(header.starts_with("OAuth oauth_consumer_key=\"dpf43f3p2l4k3l03\", "));
        assert!(header.contains("oauth_token=\"nnch734d00sl2jdk\""));
        assert!(header.ends_with("oauth_signature=\"tR3%2BTy81lMeYAr%2FFid0kMTYa%2FWM%3D\""));
    }

    #[test]
    fn test_consumer_only_signing_key() {
        let consumer = photos_consumer();
        let signer = OAuth1Signer::new(&consumer);
        assert_eq!(signer.signing_key(), "kd94hf93k423kf44&");

        let header = signer.authorization("GET", PHOTOS_URL, &[]);
        assert!(!header.contains("oauth_token="));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
    }

    #[test]
    fn test_encode_unreserved() {
        assert_eq!(encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(encode("a b*c"), "a%20b%2Ac");
        assert_eq!(encode("https://sso.garmin.com/sso/embed"), "https%3A%2F%2Fsso.garmin.com%2Fsso%2Fembed");
    }
}
