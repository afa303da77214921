//! GitHub App JWT signing
//!
//! An app JWT authenticates as the app itself and is only good for calling
//! app-level endpoints such as the installation token exchange.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, Header, encode};
use serde::{Deserialize, Serialize};

use crate::constants::{JWT_CLOCK_DRIFT_SECS, JWT_LIFETIME_SECS};
use crate::error::{Error, Result};
use crate::identity::AppIdentity;

/// Claims GitHub requires: issued-at, expiry, and the app id as issuer.
#[derive(Debug, Serialize, Deserialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

/// Sign an RS256 app JWT valid from one minute before `now` for ten minutes.
pub fn generate_app_jwt(identity: &AppIdentity, now: DateTime<Utc>) -> Result<String> {
    let claims = AppClaims {
        iat: (now - Duration::seconds(JWT_CLOCK_DRIFT_SECS)).timestamp(),
        exp: (now + Duration::seconds(JWT_LIFETIME_SECS)).timestamp(),
        iss: identity.app_id().to_string(),
    };

    encode(
        &Header::new(Algorithm::RS256),
        &claims,
        identity.signing_key(),
    )
    .map_err(|e| Error::Signing(format!("app {}: {e}", identity.app_id())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::tests::test_identity;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    const TEST_PUBLIC_KEY: &str = include_str!("../testdata/app-key.pub.pem");

    fn decode_claims(jwt: &str) -> AppClaims {
        let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&["12345"]);
        decode::<AppClaims>(jwt, &key, &validation).unwrap().claims
    }

    #[test]
    fn jwt_verifies_with_app_public_key() {
        let jwt = generate_app_jwt(&test_identity(), Utc::now()).unwrap();
        let claims = decode_claims(&jwt);
        assert_eq!(claims.iss, "12345");
    }

    #[test]
    fn jwt_window_is_backdated_and_ten_minutes_long() {
        let now = Utc::now();
        let jwt = generate_app_jwt(&test_identity(), now).unwrap();
        let claims = decode_claims(&jwt);
        assert_eq!(claims.iat, now.timestamp() - 60);
        assert_eq!(claims.exp, now.timestamp() + 600);
    }

    #[test]
    fn jwt_header_uses_rs256() {
        let jwt = generate_app_jwt(&test_identity(), Utc::now()).unwrap();
        let header = jsonwebtoken::decode_header(&jwt).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
    }
}
