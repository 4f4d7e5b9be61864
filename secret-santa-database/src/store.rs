use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::models::{Gift, NewGift, NewParticipant, Participant};

/// Persistence of participants, their gifts and the record of past draws.
///
/// Implementations enforce the uniqueness of a participant's email and of a
/// participant's gift, reporting the former as
/// [`DatabaseError::UniqueViolation`].
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn insert_participant(
        &self,
        participant: NewParticipant<'_>,
    ) -> Result<Participant, DatabaseError>;

    async fn find_participant_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Participant>, DatabaseError>;

    /// Removes the participant together with their gift.
    async fn delete_participant(&self, id: i32) -> Result<(), DatabaseError>;

    /// Inserts the gift or replaces the participant's existing one.
    async fn upsert_gift(&self, gift: NewGift<'_>) -> Result<Gift, DatabaseError>;

    async fn find_gift(&self, participant_id: i32) -> Result<Option<Gift>, DatabaseError>;

    /// Every participant that has saved a gift, ordered by participant id.
    async fn qualifying_participants(&self) -> Result<Vec<(Participant, Gift)>, DatabaseError>;

    async fn lottery_run_count(&self) -> Result<i64, DatabaseError>;

    /// Records a draw over `participant_count` entrants before anyone is
    /// notified.
    ///
    /// With `only_first` set the run is recorded only if no earlier run
    /// exists, and `false` is returned otherwise. The check and the insert
    /// are one atomic step, so of two concurrent callers at most one wins.
    async fn claim_lottery_run(
        &self,
        participant_count: i32,
        only_first: bool,
    ) -> Result<bool, DatabaseError>;
}
