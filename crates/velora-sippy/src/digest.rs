//! HTTP Digest authentication (RFC 2617, MD5)

use crate::error::SippyError;
use std::collections::HashMap;

/// Nonce count; each challenge is answered exactly once
const NONCE_COUNT: &str = "00000001";

/// Source of client nonces
pub trait NonceSource: Send + Sync {
    fn cnonce(&self) -> String;
}

/// MD5 of a random float, as the softswitch's reference clients do
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomNonce;

impl NonceSource for RandomNonce {
    fn cnonce(&self) -> String {
        md5_hex(&rand::random::<f64>().to_string())
    }
}

/// Always returns the same client nonce
#[derive(Debug, Clone)]
pub struct FixedNonce(pub String);

impl NonceSource for FixedNonce {
    fn cnonce(&self) -> String {
        self.0.clone()
    }
}

pub(crate) fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Parameters of a `WWW-Authenticate: Digest ...` challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    pub qop: Option<String>,
}

impl DigestChallenge {
    /// Parse a `WWW-Authenticate` header value
    ///
    /// Returns `Ok(None)` when the header is not a Digest challenge.
    pub fn parse(header: &str) -> Result<Option<Self>, SippyError> {
        let header = header.trim_start();
        let Some(scheme) = header.get(..6) else {
            return Ok(None);
        };
        let rest = &header[6..];
        if !scheme.eq_ignore_ascii_case("digest")
            || rest.chars().next().map_or(false, |c| !c.is_whitespace())
        {
            return Ok(None);
        }

        let mut params = parse_params(rest);
        let realm = params
            .remove("realm")
            .ok_or_else(|| SippyError::Parse("Digest challenge without realm".to_string()))?;
        let nonce = params
            .remove("nonce")
            .ok_or_else(|| SippyError::Parse("Digest challenge without nonce".to_string()))?;

        Ok(Some(Self {
            realm,
            nonce,
            opaque: params.remove("opaque").filter(|o| !o.is_empty()),
            qop: params.remove("qop").filter(|q| !q.is_empty()).map(select_qop),
        }))
    }

    /// Build the `Authorization` header answering this challenge
    pub fn authorization(
        &self,
        username: &str,
        password: &str,
        method: &str,
        uri: &str,
        cnonce: &str,
    ) -> String {
        let response = self.response(username, password, method, uri, cnonce);

        let mut header = format!(
            r#"Digest username="{}", realm="{}", nonce="{}", uri="{}", response="{}""#,
            username, self.realm, self.nonce, uri, response
        );

        if let Some(qop) = &self.qop {
            header.push_str(&format!(
                r#", qop={}, nc={}, cnonce="{}""#,
                qop, NONCE_COUNT, cnonce
            ));
        }

        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(r#", opaque="{}""#, opaque));
        }

        header
    }

    /// `MD5(HA1:nonce:nc:cnonce:qop:HA2)`, with `auth` when no qop was offered
    pub fn response(
        &self,
        username: &str,
        password: &str,
        method: &str,
        uri: &str,
        cnonce: &str,
    ) -> String {
        let ha1 = md5_hex(&format!("{}:{}:{}", username, self.realm, password));
        let ha2 = md5_hex(&format!("{}:{}", method, uri));
        let qop = self.qop.as_deref().unwrap_or("auth");

        md5_hex(&format!(
            "{}:{}:{}:{}:{}:{}",
            ha1, self.nonce, NONCE_COUNT, cnonce, qop, ha2
        ))
    }
}

/// `key="quoted value"` or `key=token` pairs separated by commas
fn parse_params(input: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }

        let key_len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let key = &rest[..key_len];
        rest = &rest[key_len..];

        if key.is_empty() || !rest.starts_with('=') {
            // Skip an unparsable token
            let skip = rest.find(',').map(|i| i + 1).unwrap_or(rest.len()).max(1);
            rest = rest.get(skip..).unwrap_or("");
            continue;
        }
        rest = &rest[1..];

        let value = if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted.find('"').unwrap_or(quoted.len());
            rest = quoted.get(end + 1..).unwrap_or("");
            &quoted[..end]
        } else {
            let end = rest
                .find(|c: char| c == ',' || c.is_whitespace())
                .unwrap_or(rest.len());
            let token = &rest[..end];
            rest = &rest[end..];
            token
        };

        params.insert(key.to_ascii_lowercase(), value.to_string());
    }

    params
}

/// Prefer `auth` when the server offers a list such as `auth,auth-int`
fn select_qop(offered: String) -> String {
    let options: Vec<&str> = offered.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    if options.iter().any(|o| *o == "auth") {
        return "auth".to_string();
    }
    options.first().map(|s| s.to_string()).unwrap_or(offered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_challenge() {
        let challenge = DigestChallenge::parse(
            r#"Digest realm="sippy@switch", nonce="dcd98b7102dd2f0e", qop="auth", opaque=5ccc069c403ebaf9"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(challenge.realm, "sippy@switch");
        assert_eq!(challenge.nonce, "dcd98b7102dd2f0e");
        assert_eq!(challenge.qop.as_deref(), Some("auth"));
        assert_eq!(challenge.opaque.as_deref(), Some("5ccc069c403ebaf9"));
    }

    #[test]
    fn test_parse_challenge_without_qop() {
        let challenge = DigestChallenge::parse(r#"Digest realm="r", nonce="n""#)
            .unwrap()
            .unwrap();
        assert_eq!(challenge.qop, None);
        assert_eq!(challenge.opaque, None);
    }

    #[test]
    fn test_qop_list_prefers_auth() {
        let challenge = DigestChallenge::parse(r#"Digest realm="r", nonce="n", qop="auth-int,auth""#)
            .unwrap()
            .unwrap();
        assert_eq!(challenge.qop.as_deref(), Some("auth"));
    }

    #[test]
    fn test_non_digest_scheme() {
        assert_eq!(DigestChallenge::parse(r#"Basic realm="x""#).unwrap(), None);
        assert_eq!(DigestChallenge::parse("").unwrap(), None);
        assert_eq!(
            DigestChallenge::parse(r#"Digestfoo realm="x", nonce="n""#).unwrap(),
            None
        );
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let challenge = DigestChallenge::parse(r#"DIGEST realm="x", nonce="n""#)
            .unwrap()
            .unwrap();
        assert_eq!(challenge.realm, "x");
    }

    #[test]
    fn test_missing_nonce_is_error() {
        assert!(matches!(
            DigestChallenge::parse(r#"Digest realm="r""#),
            Err(SippyError::Parse(_))
        ));
    }

    #[test]
    fn test_response_matches_md5_chain() {
        let challenge = DigestChallenge {
            realm: "testrealm@host.com".to_string(),
            nonce: "dcd98b7102dd2f0e8b11d0f600bfb0c093".to_string(),
            opaque: Some("5ccc069c403ebaf9f0171e9517f40e41".to_string()),
            qop: Some("auth".to_string()),
        };

        let ha1 = format!("{:x}", md5::compute("Mufasa:testrealm@host.com:Circle Of Life"));
        let ha2 = format!("{:x}", md5::compute("POST:/xmlapi/xmlapi"));
        let expected = format!(
            "{:x}",
            md5::compute(format!(
                "{}:dcd98b7102dd2f0e8b11d0f600bfb0c093:00000001:0a4f113b:auth:{}",
                ha1, ha2
            ))
        );

        let response = challenge.response("Mufasa", "Circle Of Life", "POST", "/xmlapi/xmlapi", "0a4f113b");
        assert_eq!(response, expected);

        let header = challenge.authorization(
            "Mufasa",
            "Circle Of Life",
            "POST",
            "/xmlapi/xmlapi",
            "0a4f113b",
        );
        assert_eq!(
            header,
            format!(
                r#"Digest username="Mufasa", realm="testrealm@host.com", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", uri="/xmlapi/xmlapi", response="{}", qop=auth, nc=00000001, cnonce="0a4f113b", opaque="5ccc069c403ebaf9f0171e9517f40e41""#,
                expected
            )
        );
    }

    #[test]
    fn test_header_without_qop_or_opaque() {
        let challenge = DigestChallenge {
            realm: "r".to_string(),
            nonce: "n".to_string(),
            opaque: None,
            qop: None,
        };
        let header = challenge.authorization("u", "p", "POST", "/x", "c");
        assert!(!header.contains("qop="));
        assert!(!header.contains("opaque="));
        assert!(header.ends_with(&format!(r#"response="{}""#, challenge.response("u", "p", "POST", "/x", "c"))));
    }

    #[test]
    fn test_random_nonce_is_md5_hex() {
        let nonce = RandomNonce.cnonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
