//! Registry token issuer.
//!
//! Every forwarded request gets its own RS256 token. Tokens are never cached:
//! signing is cheap next to the network hop and no token state is shared
//! between requests.

use std::fmt;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::proxy::config::SigningKeyConfig;

/// Token lifetime (15 minutes)
pub const TOKEN_TTL_SECS: i64 = 15 * 60;
pub const TOKEN_AUDIENCE: &str = "object-registry";
pub const TOKEN_ISSUER: &str = "object-registry-ui";
pub const TOKEN_SUBJECT: &str = "object-registry";

/// Claims asserted to the registry backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryClaims {
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
    pub iss: String,
    pub sub: String,
}

impl RegistryClaims {
    pub fn issued_at(now: i64) -> Self {
        Self {
            iat: now,
            exp: now + TOKEN_TTL_SECS,
            aud: TOKEN_AUDIENCE.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            sub: TOKEN_SUBJECT.to_string(),
        }
    }
}

/// Signing configuration faults. Fatal for token issuance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing OBJECT_REGISTRY_KEY_ID or OBJECT_REGISTRY_PRIVATE_KEY environment variables.")]
    MissingKeyMaterial,
    #[error("Invalid OBJECT_REGISTRY_PRIVATE_KEY: {0}")]
    InvalidPrivateKey(String),
}

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to sign registry token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

struct Signer {
    key_id: String,
    key: EncodingKey,
}

pub struct TokenIssuer {
    signer: Result<Signer, ConfigError>,
    clock: fn() -> i64,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.signer {
            Ok(signer) => format!("kid={}", signer.key_id),
            Err(err) => err.to_string(),
        };
        f.debug_struct("TokenIssuer").field("signer", &state).finish()
    }
}

fn system_clock() -> i64 {
    chrono::Utc::now().timestamp()
}

impl TokenIssuer {
    /// Build an issuer from optional key material.
    ///
    /// A missing or unparsable key does not fail construction: the fault is
    /// kept and reported by every [`TokenIssuer::issue`] call, so the server can
    /// start and answer requests with an explicit error.
    pub fn new(signing: Option<&SigningKeyConfig>) -> Self {
        Self::with_clock(signing, system_clock)
    }

    /// Same as [`TokenIssuer::new`] with a fixed time source
    pub fn with_clock(signing: Option<&SigningKeyConfig>, clock: fn() -> i64) -> Self {
        let signer = match signing {
            Some(cfg) if !cfg.key_id.is_empty() && !cfg.private_key_pem.is_empty() => {
                EncodingKey::from_rsa_pem(cfg.private_key_pem.as_bytes())
                    .map(|key| Signer {
                        key_id: cfg.key_id.clone(),
                        key,
                    })
                    .map_err(|e| ConfigError::InvalidPrivateKey(e.to_string()))
            }
            _ => Err(ConfigError::MissingKeyMaterial),
        };
        Self { signer, clock }
    }

    /// The configuration fault, if any
    pub fn config_error(&self) -> Option<&ConfigError> {
        self.signer.as_ref().err()
    }

    pub fn is_configured(&self) -> bool {
        self.signer.is_ok()
    }

    pub fn key_id(&self) -> Option<&str> {
        self.signer.as_ref().ok().map(|s| s.key_id.as_str())
    }

    /// Mint a fresh signed token
    pub fn issue(&self) -> Result<String, IssueError> {
        let signer = self.signer.as_ref().map_err(|e| e.clone())?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(signer.key_id.clone());

        let claims = RegistryClaims::issued_at((self.clock)());
        Ok(jsonwebtoken::encode(&header, &claims, &signer.key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

    const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/registry_test_key.pem");
    const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/registry_test_key.pub.pem");

    fn signing() -> SigningKeyConfig {
        SigningKeyConfig {
            key_id: "ui-signing-key".to_string(),
            private_key_pem: PRIVATE_KEY.to_string(),
        }
    }

    fn fixed_clock() -> i64 {
        1_700_000_000
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation
    }

    #[test]
    fn test_missing_key_material() {
        let issuer = TokenIssuer::new(None);
        assert!(!issuer.is_configured());
        assert_eq!(issuer.config_error(), Some(&ConfigError::MissingKeyMaterial));

        let err = issuer.issue().unwrap_err();
        assert!(matches!(err, IssueError::Config(ConfigError::MissingKeyMaterial)));
        assert!(err.to_string().contains("OBJECT_REGISTRY_KEY_ID"));
    }

    #[test]
    fn test_empty_key_id_is_missing() {
        let cfg = SigningKeyConfig {
            key_id: String::new(),
            private_key_pem: PRIVATE_KEY.to_string(),
        };
        let issuer = TokenIssuer::new(Some(&cfg));
        assert_eq!(issuer.config_error(), Some(&ConfigError::MissingKeyMaterial));
    }

    #[test]
    fn test_garbage_pem_is_config_error() {
        let cfg = SigningKeyConfig {
            key_id: "k".to_string(),
            private_key_pem: "not a pem".to_string(),
        };
        let issuer = TokenIssuer::new(Some(&cfg));
        assert!(matches!(
            issuer.config_error(),
            Some(ConfigError::InvalidPrivateKey(_))
        ));
        assert!(issuer.issue().is_err());
    }

    #[test]
    fn test_token_claims_and_header() {
        let issuer = TokenIssuer::with_clock(Some(&signing()), system_clock);
        let token = issuer.issue().unwrap();

        let header = decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("ui-signing-key"));

        let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap();
        let data = decode::<RegistryClaims>(&token, &key, &validation()).unwrap();
        assert_eq!(data.claims.exp - data.claims.iat, 900);
        assert_eq!(data.claims.aud, "object-registry");
        assert_eq!(data.claims.iss, "object-registry-ui");
        assert_eq!(data.claims.sub, "object-registry");
    }

    #[test]
    fn test_fixed_clock_pins_iat() {
        let issuer = TokenIssuer::with_clock(Some(&signing()), fixed_clock);
        let token = issuer.issue().unwrap();

        let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap();
        let mut validation = validation();
        // pinned clock is in the past
        validation.validate_exp = false;
        let data = decode::<RegistryClaims>(&token, &key, &validation).unwrap();
        assert_eq!(data.claims, RegistryClaims::issued_at(1_700_000_000));
        assert_eq!(data.claims.exp, 1_700_000_900);
    }

    #[test]
    fn test_every_call_signs_again() {
        let issuer = TokenIssuer::with_clock(Some(&signing()), fixed_clock);
        let first = issuer.issue().unwrap();
        let second = issuer.issue().unwrap();
        // Identical claims are allowed; both must verify independently
        let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap();
        let mut validation = validation();
        validation.validate_exp = false;
        assert!(decode::<RegistryClaims>(&first, &key, &validation).is_ok());
        assert!(decode::<RegistryClaims>(&second, &key, &validation).is_ok());
    }
}
