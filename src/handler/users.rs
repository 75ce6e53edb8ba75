//! Fixed user lookup
//!
//! The API exposes exactly one user record. There is no backing store.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

const KNOWN_USER_ID: &str = "123";

/// Look up a user by id. Only `"123"` exists.
pub fn find_user(id: &str) -> Option<User> {
    (id == KNOWN_USER_ID).then(|| User {
        id: KNOWN_USER_ID.to_string(),
        name: "John Doe".to_string(),
        email: "john@example.com".to_string(),
    })
}
