use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Address, check_length};
use crate::error::DomainError;

/// User entity - a wallet address and its current username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub address: Address,
    pub username: String,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(address: Address, username: String) -> Self {
        Self {
            address,
            username,
            updated_at: Utc::now(),
        }
    }

    pub fn validate_username(username: &str) -> Result<(), DomainError> {
        check_length("username", username, 3, 20)
    }
}
