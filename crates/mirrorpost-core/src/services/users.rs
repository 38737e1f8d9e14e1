use std::sync::Arc;

use crate::domain::{Address, User};
use crate::error::DomainError;
use crate::ports::{ContractReader, Repositories};

#[derive(Clone)]
pub struct UserService {
    repos: Repositories,
    chain: Arc<dyn ContractReader>,
    verify_writes: bool,
}

impl UserService {
    pub fn new(repos: Repositories, chain: Arc<dyn ContractReader>, verify_writes: bool) -> Self {
        Self {
            repos,
            chain,
            verify_writes,
        }
    }

    /// Set a username through the write API.
    ///
    /// The name must not be held by another address in the cache. Re-setting
    /// one's own name, or renaming, is always allowed.
    pub async fn set_username(&self, address: Address, username: String) -> Result<User, DomainError> {
        let username = username.trim().to_string();
        User::validate_username(&username)?;

        if let Some(holder) = self.repos.users.find_by_username(&username).await? {
            if holder.address != address {
                return Err(DomainError::Duplicate("Username already taken".into()));
            }
        }

        if self.verify_writes {
            let on_chain = self.chain.get_user(&address).await?;
            if !on_chain.is_some_and(|u| u.exists && u.username == username) {
                return Err(DomainError::Validation(
                    "Username is not set on blockchain".into(),
                ));
            }
        }

        self.record_username(address, username).await
    }

    /// `UsernameSet` path: the contract already enforced uniqueness.
    pub async fn record_username(&self, address: Address, username: String) -> Result<User, DomainError> {
        let upserted = self.repos.users.upsert(User::new(address, username)).await?;
        tracing::debug!(
            address = %upserted.record.address,
            created = upserted.created,
            "Username recorded"
        );
        Ok(upserted.record)
    }

    pub async fn get(&self, address: &Address) -> Result<User, DomainError> {
        self.repos
            .users
            .find_by_id(address.clone())
            .await?
            .ok_or_else(|| DomainError::not_found("User", address))
    }
}
