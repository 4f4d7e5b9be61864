//! A process-local store with the same constraints as the relational schema.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::DatabaseError;
use crate::models::{Gift, NewGift, NewParticipant, Participant};
use crate::store::ParticipantStore;

#[derive(Default)]
struct Tables {
    participants: Vec<Participant>,
    gifts: Vec<Gift>,
    lottery_runs: Vec<i32>,
    next_participant_id: i32,
    next_gift_id: i32,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParticipantStore for MemoryStore {
    async fn insert_participant(
        &self,
        participant: NewParticipant<'_>,
    ) -> Result<Participant, DatabaseError> {
        let mut tables = self.tables.lock().await;
        if tables
            .participants
            .iter()
            .any(|existing| existing.email == participant.email)
        {
            return Err(DatabaseError::UniqueViolation(format!(
                "duplicate key value violates unique constraint \"participants_email_key\": {}",
                participant.email
            )));
        }
        tables.next_participant_id += 1;
        let created = Participant {
            id: tables.next_participant_id,
            name: participant.name.to_owned(),
            email: participant.email.to_owned(),
            phone: participant.phone.map(ToOwned::to_owned),
        };
        tables.participants.push(created.clone());
        Ok(created)
    }

    async fn find_participant_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Participant>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .participants
            .iter()
            .find(|participant| participant.email == email)
            .cloned())
    }

    async fn delete_participant(&self, id: i32) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().await;
        tables.participants.retain(|participant| participant.id != id);
        tables.gifts.retain(|gift| gift.participant_id != id);
        Ok(())
    }

    async fn upsert_gift(&self, gift: NewGift<'_>) -> Result<Gift, DatabaseError> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables
            .gifts
            .iter_mut()
            .find(|existing| existing.participant_id == gift.participant_id)
        {
            existing.description = gift.description.to_owned();
            existing.link = gift.link.map(ToOwned::to_owned);
            existing.price = gift.price;
            return Ok(existing.clone());
        }
        tables.next_gift_id += 1;
        let created = Gift {
            id: tables.next_gift_id,
            participant_id: gift.participant_id,
            description: gift.description.to_owned(),
            link: gift.link.map(ToOwned::to_owned),
            price: gift.price,
        };
        tables.gifts.push(created.clone());
        Ok(created)
    }

    async fn find_gift(&self, participant_id: i32) -> Result<Option<Gift>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .gifts
            .iter()
            .find(|gift| gift.participant_id == participant_id)
            .cloned())
    }

    async fn qualifying_participants(&self) -> Result<Vec<(Participant, Gift)>, DatabaseError> {
        let tables = self.tables.lock().await;
        // participants are kept in id order
        Ok(tables
            .participants
            .iter()
            .filter_map(|participant| {
                tables
                    .gifts
                    .iter()
                    .find(|gift| gift.participant_id == participant.id)
                    .map(|gift| (participant.clone(), gift.clone()))
            })
            .collect())
    }

    async fn lottery_run_count(&self) -> Result<i64, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(i64::try_from(tables.lottery_runs.len()).unwrap_or(i64::MAX))
    }

    async fn claim_lottery_run(
        &self,
        participant_count: i32,
        only_first: bool,
    ) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.lock().await;
        if only_first && !tables.lottery_runs.is_empty() {
            return Ok(false);
        }
        tables.lottery_runs.push(participant_count);
        Ok(true)
    }
}
