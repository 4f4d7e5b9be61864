//! Draws the Secret Santa assignment and tells every buyer who they got.

use core::future::Future;
use std::sync::Arc;

use futures_util::future::{join, join_all};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use secret_santa_config::{LotteryConfig, NotificationFailurePolicy, RerunPolicy};
use secret_santa_database::models::{Gift, Participant};
use secret_santa_database::ParticipantStore;
use secret_santa_matching::assign;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::notify::{assignment_email, assignment_message, Mailer, Messenger, NotifyError};

type Entrant = (Participant, Gift);

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Delivery {
    Delivered,
    Failed { reason: String },
}

impl Delivery {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// How the notifications of one buyer went. `message` is absent when the
/// buyer has no phone.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReport {
    pub participant_name: String,
    pub email: Delivery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Delivery>,
}

impl NotificationReport {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.email.is_failed() || self.message.as_ref().is_some_and(Delivery::is_failed)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDetail {
    pub participant_name: String,
    pub own_gift: String,
    pub assigned_gift: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LotterySummary {
    pub message: String,
    pub details: Vec<AssignmentDetail>,
    pub notifications: Vec<NotificationReport>,
}

pub struct LotteryService {
    store: Arc<dyn ParticipantStore>,
    mailer: Arc<dyn Mailer>,
    messenger: Arc<dyn Messenger>,
    config: LotteryConfig,
}

impl LotteryService {
    #[must_use]
    pub fn new(
        store: Arc<dyn ParticipantStore>,
        mailer: Arc<dyn Mailer>,
        messenger: Arc<dyn Messenger>,
        config: LotteryConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            messenger,
            config,
        }
    }

    pub async fn run_lottery(&self) -> Result<LotterySummary, ServiceError> {
        let mut rng = StdRng::from_entropy();
        self.run_lottery_with(&mut rng).await
    }

    /// Draws with the given randomness source, records the run, then
    /// notifies every buyer concurrently. Nothing is sent when the draw or
    /// the recording fails, or when a run already exists and reruns are
    /// refused.
    pub async fn run_lottery_with<R>(&self, rng: &mut R) -> Result<LotterySummary, ServiceError>
    where
        R: Rng + Send + ?Sized,
    {
        let entrants = self.store.qualifying_participants().await?;
        info!(participants = entrants.len(), "drawing lottery");
        if entrants.len() < 2 {
            return Err(ServiceError::InsufficientParticipants {
                found: entrants.len(),
            });
        }

        let assignments = assign(
            &entrants,
            |entrant: &Entrant| entrant.0.id,
            rng,
            self.config.max_attempts,
        )?;

        // the run is on record before the first notification leaves
        let participant_count = i32::try_from(entrants.len()).unwrap_or(i32::MAX);
        let only_first = self.config.rerun == RerunPolicy::Once;
        if !self
            .store
            .claim_lottery_run(participant_count, only_first)
            .await?
        {
            return Err(ServiceError::AlreadyDrawn);
        }

        let notifications = join_all(
            assignments
                .iter()
                .map(|assignment| self.notify(assignment.buyer, assignment.recipient)),
        )
        .await;

        let failed = notifications.iter().filter(|report| report.is_failed()).count();
        if failed > 0 {
            warn!(failed, total = notifications.len(), "some buyers were not notified");
            if self.config.on_notification_failure == NotificationFailurePolicy::Fail {
                return Err(ServiceError::Notification(format!(
                    "{failed} of {} participants could not be notified",
                    notifications.len()
                )));
            }
        }

        let details = assignments
            .iter()
            .map(|assignment| AssignmentDetail {
                participant_name: assignment.buyer.0.name.clone(),
                own_gift: assignment.buyer.1.description.clone(),
                assigned_gift: assignment.recipient.1.description.clone(),
            })
            .collect();
        let notified = notifications.len() - failed;
        info!(notified, "lottery drawn");

        Ok(LotterySummary {
            message: format!(
                "Lottery drawn. Notified {notified} of {} participants.",
                notifications.len()
            ),
            details,
            notifications,
        })
    }

    async fn notify(&self, buyer: &Entrant, recipient: &Entrant) -> NotificationReport {
        let (participant, _) = buyer;
        let (recipient, wish) = recipient;

        let email = self.deliver(
            &participant.name,
            self.mailer
                .send(assignment_email(participant, recipient, wish)),
        );
        let message = async {
            match participant.phone.as_deref() {
                Some(phone) => {
                    let body = assignment_message(participant, recipient, wish);
                    Some(
                        self.deliver(&participant.name, self.messenger.send(phone, &body))
                            .await,
                    )
                }
                None => None,
            }
        };
        let (email, message) = join(email, message).await;

        NotificationReport {
            participant_name: participant.name.clone(),
            email,
            message,
        }
    }

    async fn deliver(
        &self,
        participant: &str,
        dispatch: impl Future<Output = Result<(), NotifyError>> + Send,
    ) -> Delivery {
        let timeout = self.config.notification_timeout();
        let error = match tokio::time::timeout(timeout, dispatch).await {
            Ok(Ok(())) => return Delivery::Delivered,
            Ok(Err(error)) => error,
            Err(_elapsed) => NotifyError::TimedOut(timeout),
        };
        warn!(%participant, %error, "notification failed");
        Delivery::Failed {
            reason: error.to_string(),
        }
    }
}
