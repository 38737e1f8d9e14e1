use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Address, check_length};
use crate::error::DomainError;

pub type SubCommunityId = u64;

/// SubCommunity entity - immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCommunity {
    pub sub_community_id: SubCommunityId,
    pub name: String,
    pub description: String,
    pub creator: Address,
    pub created_at: DateTime<Utc>,
}

impl SubCommunity {
    pub fn new(
        sub_community_id: SubCommunityId,
        name: String,
        description: String,
        creator: Address,
    ) -> Self {
        Self {
            sub_community_id,
            name,
            description,
            creator,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.sub_community_id == 0 {
            return Err(DomainError::Validation(
                "subCommunityId must be positive".into(),
            ));
        }
        check_length("name", &self.name, 3, 50)?;
        check_length("description", &self.description, 10, 200)
    }

    /// Case-insensitive substring match over name and description.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
    }
}
