use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

pub const SESSION_TTL_DAYS: i64 = 1;

/// Session claims. `name` is the display name at sign-in time and is what
/// quiz completion writes back to the user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub name: String,
    pub exp: i64,
}

impl UserClaims {
    pub fn for_user(id: uuid::Uuid, name: &str) -> Self {
        let exp = (chrono::Utc::now() + chrono::Duration::days(SESSION_TTL_DAYS)).timestamp();
        Self {
            sub: id.to_string(),
            name: name.to_string(),
            exp,
        }
    }
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: UserClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, &claims, &key)?;
    Ok(token)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<UserClaims>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<UserClaims>(token, &key, &validation)?;
    Ok(claims)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn token_carries_id_and_name() {
        let id = uuid::Uuid::new_v4();
        let token = generate_token(UserClaims::for_user(id, "Ada"), "key").unwrap();
        let data = process_token(&token, "key").unwrap();
        assert_eq!(data.claims.sub, id.to_string());
        assert_eq!(data.claims.name, "Ada");
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = generate_token(UserClaims::for_user(uuid::Uuid::new_v4(), "Ada"), "key").unwrap();
        assert!(process_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = UserClaims {
            sub: uuid::Uuid::new_v4().to_string(),
            name: String::from("Ada"),
            exp: (chrono::Utc::now() - chrono::Duration::days(2)).timestamp(),
        };
        let token = generate_token(claims, "key").unwrap();
        assert!(process_token(&token, "key").is_err());
    }
}
