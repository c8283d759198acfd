use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

// The single seeded staff account of the mock login flow.
const MOCK_EMAIL: &str = "professor@g.com";
const MOCK_PASSWORD: &str = "1234";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// One in-memory session per process. The token is an opaque bearer value;
/// there is no real protocol behind it and no expiry beyond process lifetime.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: User,
    pub issued_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    InvalidCredentials,
}

pub fn login(email: &str, password: &str) -> Result<Session, LoginError> {
    if email != MOCK_EMAIL || password != MOCK_PASSWORD {
        return Err(LoginError::InvalidCredentials);
    }
    let issued_at = chrono::Utc::now().to_rfc3339();
    Ok(Session {
        token: mint_token(email, &issued_at),
        user: User {
            id: "1".to_string(),
            email: MOCK_EMAIL.to_string(),
            name: "Professor Doutor".to_string(),
        },
        issued_at,
    })
}

// Opaque digest over the identity, issue time and a random nonce. Not a JWT;
// the UI only echoes it back as a bearer value.
fn mint_token(email: &str, issued_at: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(issued_at.as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
