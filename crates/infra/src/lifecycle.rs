//! Club creation and teardown as single units of work.

use std::sync::Arc;

use thiserror::Error;

use clubhouse_auth::Role;
use clubhouse_core::{ClubId, UserId};

use crate::store::{Club, ClubDetails, StoreError, StoreTx, Transactional};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("club {0} not found")]
    ClubNotFound(ClubId),

    #[error("club {0} still has memberships")]
    MembershipsRemain(ClubId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Counts reported by a successful teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Teardown {
    pub memberships_removed: u64,
    pub events_removed: u64,
}

/// Drives the multi-step club lifecycle through one store transaction.
///
/// Either every step commits or none does: any failure rolls the
/// transaction back before the error is returned.
#[derive(Clone)]
pub struct ClubLifecycle {
    store: Arc<dyn Transactional>,
}

impl ClubLifecycle {
    pub fn new(store: Arc<dyn Transactional>) -> Self {
        Self { store }
    }

    /// Insert the club and make `owner` its owner.
    pub async fn create_club(&self, owner: &UserId, details: ClubDetails) -> Result<Club, LifecycleError> {
        let mut tx = self.store.begin().await?;

        let club = match tx.insert_club(details).await {
            Ok(club) => club,
            Err(e) => return Err(abort(tx, e).await.into()),
        };
        if let Err(e) = tx.insert_membership(club.id, owner, Role::Owner).await {
            return Err(abort(tx, e).await.into());
        }
        tx.commit().await?;

        tracing::info!(club_id = %club.id, owner = %owner, "club created");
        Ok(Club {
            member_count: 1,
            ..club
        })
    }

    /// Remove the club's events and memberships, then the club itself.
    pub async fn teardown(&self, club_id: ClubId) -> Result<Teardown, LifecycleError> {
        let mut tx = self.store.begin().await?;

        let events_removed = match tx.delete_club_events(club_id).await {
            Ok(n) => n,
            Err(e) => return Err(fail(tx, club_id, e).await),
        };
        let memberships_removed = match tx.remove_all_memberships(club_id).await {
            Ok(n) => n,
            Err(e) => return Err(fail(tx, club_id, e).await),
        };
        if let Err(e) = tx.delete_club(club_id).await {
            return Err(fail(tx, club_id, e).await);
        }
        tx.commit().await?;

        tracing::info!(
            club_id = %club_id,
            memberships_removed,
            events_removed,
            "club deleted"
        );
        Ok(Teardown {
            memberships_removed,
            events_removed,
        })
    }
}

async fn abort(tx: Box<dyn StoreTx>, cause: StoreError) -> StoreError {
    if let Err(rollback) = tx.rollback().await {
        tracing::error!(error = %rollback, cause = %cause, "rollback failed");
    }
    cause
}

async fn fail(tx: Box<dyn StoreTx>, club_id: ClubId, cause: StoreError) -> LifecycleError {
    match abort(tx, cause).await {
        StoreError::NotFound(_) => LifecycleError::ClubNotFound(club_id),
        StoreError::MembershipsRemain(id) => LifecycleError::MembershipsRemain(id),
        other => LifecycleError::Store(other),
    }
}
