use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Claims {
    pub sub: i64, // instructor id
    pub exp: usize,
}

//function to create a JWT token valid for `ttl_days`
pub fn create_jwt(
    instructor_id: i64,
    secret: &str,
    ttl_days: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    // lifetime is clamped to a year so the addition cannot overflow
    let expiration = (Utc::now() + Duration::days(ttl_days.clamp(1, 365))).timestamp() as usize;

    encode(
        &Header::default(),
        &Claims {
            sub: instructor_id,
            exp: expiration,
        },
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

//function to decode and validate a JWT token
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
