//! HS256 JWT handling

use super::models::Claims;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use omnivore_core::AppError;

/// Verify `token` against `secret` and return its claims.
///
/// `exp` is checked when present but not required.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token has expired".to_string())
        }
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            AppError::Unauthorized("Invalid token signature".to_string())
        }
        _ => AppError::Unauthorized(format!("Invalid token: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Sign `claims` with HS256.
pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const SECRET: &str = "jwt-test-secret-with-at-least-32-characters";

    #[test]
    fn test_token_without_exp_is_accepted() {
        let claims = Claims {
            uid: Uuid::new_v4(),
            iat: None,
            exp: None,
        };
        let token = encode_token(&claims, SECRET).unwrap();
        assert_eq!(decode_token(&token, SECRET).unwrap(), claims);
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            uid: Uuid::new_v4(),
            iat: Some(now - 7200),
            exp: Some(now - 3600),
        };
        let token = encode_token(&claims, SECRET).unwrap();
        let err = decode_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Token has expired"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims {
            uid: Uuid::new_v4(),
            iat: None,
            exp: None,
        };
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, "some-other-secret-of-sufficient-length").is_err());
        assert!(decode_token("not.a.jwt", SECRET).is_err());
    }
}
