//! The two-stage intake workflow.

use crate::error::IntakeError;
use crate::staging::StagingStore;
use chrono::Utc;
use guildlink_store::{ApplicationStore, IdentityStore, MemberStore};
use guildlink_types::{
    ApplicationDraft, ApplicationRecord, PlatformId, StageOneAnswers, StageTwoAnswers,
};
use std::sync::Arc;
use tracing::info;

/// Application intake over the identity store and the staging store.
pub struct IntakeService {
    store: Arc<dyn IdentityStore>,
    staging: StagingStore,
}

impl IntakeService {
    pub fn new(store: Arc<dyn IdentityStore>, staging: StagingStore) -> Self {
        Self { store, staging }
    }

    /// Stage the first survey page. The submitter must have a linked game
    /// identity; its value is snapshotted now so a later relink does not
    /// rewrite the application.
    pub async fn submit_stage_one(
        &self,
        submitter: &PlatformId,
        answers: StageOneAnswers,
    ) -> Result<(), IntakeError> {
        self.staging.evict_expired();

        let record = self.store.get_member(submitter).await?;
        let Some(game_id) = record.and_then(|r| r.main.game_id) else {
            return Err(IntakeError::IdentityRequired);
        };

        self.staging.stage(submitter.clone(), game_id, answers);
        Ok(())
    }

    /// Merge the staged answers with the second page and persist one
    /// immutable application record; staging state is cleared either way.
    pub async fn submit_stage_two(
        &self,
        submitter: &PlatformId,
        answers: StageTwoAnswers,
    ) -> Result<ApplicationRecord, IntakeError> {
        let (game_id, stage_one) = self
            .staging
            .take(submitter)
            .ok_or(IntakeError::StageOneMissing)?;

        let record = self
            .store
            .insert_application(
                ApplicationDraft {
                    platform_id: submitter.clone(),
                    game_id,
                    stage_one,
                    stage_two: answers,
                },
                Utc::now(),
            )
            .await?;
        info!(submitter = %submitter, id = record.id, "application submitted");
        Ok(record)
    }

    /// Newest first.
    pub async fn list_applications(&self) -> Result<Vec<ApplicationRecord>, IntakeError> {
        Ok(self.store.list_applications().await?)
    }

    pub async fn get_application(&self, id: i64) -> Result<ApplicationRecord, IntakeError> {
        self.store
            .get_application(id)
            .await?
            .ok_or(IntakeError::NotFound(id))
    }

    pub async fn remove_application(&self, id: i64) -> Result<(), IntakeError> {
        if !self.store.delete_application(id).await? {
            return Err(IntakeError::NotFound(id));
        }
        info!(id, "application removed");
        Ok(())
    }
}
