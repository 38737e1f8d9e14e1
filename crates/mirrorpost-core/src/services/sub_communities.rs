use std::sync::Arc;

use crate::domain::{SubCommunity, SubCommunityId};
use crate::error::DomainError;
use crate::ports::{ContractReader, Repositories, Upserted};
use crate::sync::ExistenceValidator;

#[derive(Clone)]
pub struct SubCommunityService {
    repos: Repositories,
    chain: Arc<dyn ContractReader>,
    validator: ExistenceValidator,
    verify_writes: bool,
}

impl SubCommunityService {
    pub fn new(
        repos: Repositories,
        chain: Arc<dyn ContractReader>,
        validator: ExistenceValidator,
        verify_writes: bool,
    ) -> Self {
        Self {
            repos,
            chain,
            validator,
            verify_writes,
        }
    }

    /// Create through the write API. An id already cached is a duplicate.
    pub async fn create(&self, sub_community: SubCommunity) -> Result<SubCommunity, DomainError> {
        sub_community.validate()?;
        let id = sub_community.sub_community_id;

        if self.verify_writes && self.chain.get_sub_community(id).await?.is_none() {
            return Err(DomainError::Validation(
                "SubCommunity does not exist on blockchain".into(),
            ));
        }

        let upserted = self.record_created(sub_community).await?;
        if !upserted.created {
            return Err(DomainError::Duplicate(format!(
                "SubCommunityId {id} already exists"
            )));
        }
        Ok(upserted.record)
    }

    /// Insert-if-absent shared with `SubCommunityCreated`.
    pub async fn record_created(
        &self,
        sub_community: SubCommunity,
    ) -> Result<Upserted<SubCommunity>, DomainError> {
        let upserted = self.repos.sub_communities.upsert(sub_community).await?;
        tracing::debug!(
            sub_community_id = upserted.record.sub_community_id,
            created = upserted.created,
            "Sub-community upserted"
        );
        Ok(upserted)
    }

    pub async fn list(&self) -> Result<Vec<SubCommunity>, DomainError> {
        let cached = self.repos.sub_communities.find_all().await?;
        self.validator.filter_sub_communities(cached).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SubCommunity>, DomainError> {
        let cached = self.repos.sub_communities.search(query.trim()).await?;
        self.validator.filter_sub_communities(cached).await
    }

    pub async fn get(&self, id: SubCommunityId) -> Result<SubCommunity, DomainError> {
        let cached = self
            .repos
            .sub_communities
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("SubCommunity", id))?;

        self.validator
            .check_sub_community(cached)
            .await?
            .ok_or_else(|| DomainError::not_found("SubCommunity", id))
    }
}
