use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::error::DatabaseError;
use crate::models::{Gift, NewGift, NewParticipant, Participant};
use crate::schema::{gifts, lottery_runs, participants};
use crate::store::ParticipantStore;
use crate::Pool;

#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantStore for PgStore {
    async fn insert_participant(
        &self,
        participant: NewParticipant<'_>,
    ) -> Result<Participant, DatabaseError> {
        let mut connection = self.pool.get().await?;
        diesel::insert_into(participants::table)
            .values(&participant)
            .returning(Participant::as_returning())
            .get_result(&mut connection)
            .await
            .map_err(DatabaseError::from_write)
    }

    async fn find_participant_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Participant>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(participants::table
            .filter(participants::email.eq(email))
            .select(Participant::as_select())
            .first(&mut connection)
            .await
            .optional()?)
    }

    async fn delete_participant(&self, id: i32) -> Result<(), DatabaseError> {
        let mut connection = self.pool.get().await?;
        diesel::delete(participants::table.find(id))
            .execute(&mut connection)
            .await?;
        Ok(())
    }

    async fn upsert_gift(&self, gift: NewGift<'_>) -> Result<Gift, DatabaseError> {
        let mut connection = self.pool.get().await?;
        diesel::insert_into(gifts::table)
            .values(&gift)
            .on_conflict(gifts::participant_id)
            .do_update()
            .set((
                gifts::description.eq(excluded(gifts::description)),
                gifts::link.eq(excluded(gifts::link)),
                gifts::price.eq(excluded(gifts::price)),
            ))
            .returning(Gift::as_returning())
            .get_result(&mut connection)
            .await
            .map_err(DatabaseError::from_write)
    }

    async fn find_gift(&self, participant_id: i32) -> Result<Option<Gift>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(gifts::table
            .filter(gifts::participant_id.eq(participant_id))
            .select(Gift::as_select())
            .first(&mut connection)
            .await
            .optional()?)
    }

    async fn qualifying_participants(&self) -> Result<Vec<(Participant, Gift)>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(participants::table
            .inner_join(gifts::table)
            .select((Participant::as_select(), Gift::as_select()))
            .order(participants::id.asc())
            .load(&mut connection)
            .await?)
    }

    async fn lottery_run_count(&self) -> Result<i64, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(lottery_runs::table
            .count()
            .get_result(&mut connection)
            .await?)
    }

    async fn claim_lottery_run(
        &self,
        participant_count: i32,
        only_first: bool,
    ) -> Result<bool, DatabaseError> {
        let mut connection = self.pool.get().await?;
        connection
            .transaction::<_, DatabaseError, _>(|connection| {
                async move {
                    // blocks concurrent claims until this transaction ends
                    diesel::sql_query("LOCK TABLE lottery_runs IN EXCLUSIVE MODE")
                        .execute(connection)
                        .await?;
                    if only_first {
                        let earlier: i64 = lottery_runs::table
                            .count()
                            .get_result(connection)
                            .await?;
                        if earlier > 0 {
                            return Ok(false);
                        }
                    }
                    diesel::insert_into(lottery_runs::table)
                        .values(lottery_runs::participant_count.eq(participant_count))
                        .execute(connection)
                        .await?;
                    Ok(true)
                }
                .scope_boxed()
            })
            .await
    }
}
