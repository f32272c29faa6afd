//! Bearer token encoding.
//!
//! The context only ever talks to [`TokenCodec`]; swapping the unsigned demo
//! codec for a signed scheme does not touch session logic.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use campus_shared::types::{TokenClaims, TokenError};
use serde::{Deserialize, Serialize};

pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &TokenClaims) -> Result<String, TokenError>;

    fn decode(&self, token: &str) -> Result<TokenClaims, TokenError>;

    /// Decode, then reject once `now` has reached the expiry instant.
    fn validate(&self, token: &str, now: i64) -> Result<TokenClaims, TokenError> {
        let claims = self.decode(token)?;
        if claims.is_expired(now) {
            return Err(TokenError::Expired { exp: claims.exp });
        }
        Ok(claims)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// `header.payload.signature`, each segment URL-safe base64 without padding.
///
/// The header is `{"alg":"none","typ":"JWT"}` and the signature segment is 16
/// random bytes. Decoding checks shape and payload but never the signature,
/// so anyone holding storage can forge a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsignedTokenCodec;

impl UnsignedTokenCodec {
    const ALG: &'static str = "none";
    const TYP: &'static str = "JWT";
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Encoding(format!("{}: {}", name, e)))
}

impl TokenCodec for UnsignedTokenCodec {
    fn encode(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let header = serde_json::to_vec(&Header {
            alg: Self::ALG.to_string(),
            typ: Self::TYP.to_string(),
        })?;
        let payload = serde_json::to_vec(claims)?;
        let signature: [u8; 16] = rand::random();

        Ok(format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let segments: Vec<&str> = token.trim().split('.').collect();

        let [header, payload, signature] = segments.as_slice() else {
            return Err(TokenError::Malformed(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };

        if signature.is_empty() {
            return Err(TokenError::Malformed("empty signature segment".into()));
        }

        let header: Header = serde_json::from_slice(&decode_segment(header, "header")?)?;
        if header.typ != Self::TYP {
            return Err(TokenError::Malformed(format!(
                "unexpected token type: {}",
                header.typ
            )));
        }

        let claims: TokenClaims = serde_json::from_slice(&decode_segment(payload, "payload")?)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_shared::types::Role;

    fn claims() -> TokenClaims {
        TokenClaims {
            sub: "3".into(),
            email: "student@university.edu".into(),
            role: Role::Student,
            session_id: "6f1c2c1e-0a4b-4d3e-9c1a-2b7f0e5d9a11".into(),
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        }
    }

    #[test]
    fn encoded_token_has_three_base64_segments() {
        let token = UnsignedTokenCodec.encode(&claims()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        for part in parts {
            assert!(!part.is_empty());
            assert!(URL_SAFE_NO_PAD.decode(part).is_ok());
        }
    }

    #[test]
    fn two_encodings_differ_only_in_signature() {
        let a = UnsignedTokenCodec.encode(&claims()).unwrap();
        let b = UnsignedTokenCodec.encode(&claims()).unwrap();
        let (a_body, a_sig) = a.rsplit_once('.').unwrap();
        let (b_body, b_sig) = b.rsplit_once('.').unwrap();
        assert_eq!(a_body, b_body);
        assert_ne!(a_sig, b_sig);
    }

    #[test]
    fn decode_recovers_claims() {
        let token = UnsignedTokenCodec.encode(&claims()).unwrap();
        assert_eq!(UnsignedTokenCodec.decode(&token).unwrap(), claims());
    }

    #[test]
    fn validate_rejects_at_expiry() {
        let token = UnsignedTokenCodec.encode(&claims()).unwrap();
        assert!(UnsignedTokenCodec.validate(&token, 1_700_086_399).is_ok());
        let err = UnsignedTokenCodec
            .validate(&token, 1_700_086_400)
            .unwrap_err();
        assert!(matches!(err, TokenError::Expired { exp: 1_700_086_400 }));
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        for bad in ["", "abc", "a.b", "a.b.c.d"] {
            let err = UnsignedTokenCodec.decode(bad).unwrap_err();
            assert!(matches!(err, TokenError::Malformed(_)), "input {:?}", bad);
        }
    }

    #[test]
    fn garbage_payload_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let token = format!("{}.{}.c2ln", header, URL_SAFE_NO_PAD.encode(b"nope"));
        assert!(matches!(
            UnsignedTokenCodec.decode(&token),
            Err(TokenError::Payload(_))
        ));

        let token = format!("{}.!!!.c2ln", header);
        assert!(matches!(
            UnsignedTokenCodec.decode(&token),
            Err(TokenError::Encoding(_))
        ));
    }
}
