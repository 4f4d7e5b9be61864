//! Signing up participants and recording the gift each of them wishes for.

use std::sync::Arc;

use secret_santa_config::GiftConfig;
use secret_santa_database::models::{
    Gift, NewGift, NewParticipant, Participant, DESCRIPTION_MAX_CHARS, EMAIL_MAX_CHARS,
    LINK_MAX_CHARS, NAME_MAX_CHARS, PHONE_MAX_CHARS,
};
use secret_santa_database::{DatabaseError, ParticipantStore};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::ServiceError;

/// A price as submitted by a client, either a JSON number or a numeric string.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl Price {
    fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
        };
        value.filter(|value| value.is_finite())
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GiftRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub gift_name: String,
    #[serde(default)]
    pub gift_url: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
}

/// Registration and gift in a single submission.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gift_name: String,
    #[serde(default)]
    pub gift_url: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
}

impl JoinRequest {
    #[must_use]
    pub fn split(self) -> (RegisterRequest, GiftRequest) {
        (
            RegisterRequest {
                name: self.name,
                email: self.email.clone(),
                phone: self.phone,
            },
            GiftRequest {
                email: self.email,
                gift_name: self.gift_name,
                gift_url: self.gift_url,
                price: self.price,
            },
        )
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Joined {
    pub participant: Participant,
    pub gift: Gift,
}

/// A gift that passed validation, borrowing from its request.
struct ValidGift<'a> {
    email: &'a str,
    description: &'a str,
    link: Option<&'a str>,
    price: f64,
}

pub struct RegistrationService {
    store: Arc<dyn ParticipantStore>,
    prices: GiftConfig,
}

fn within(value: &str, field: &str, max_chars: usize) -> Result<(), ServiceError> {
    if value.chars().count() > max_chars {
        return Err(ServiceError::Validation(format!(
            "{field} too long, the maximum is {max_chars} characters"
        )));
    }
    Ok(())
}

fn required<'a>(value: &'a str, field: &str, max_chars: usize) -> Result<&'a str, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Validation(format!("{field} required")));
    }
    within(value, field, max_chars)?;
    Ok(value)
}

fn optional<'a>(
    value: Option<&'a str>,
    field: &str,
    max_chars: usize,
) -> Result<Option<&'a str>, ServiceError> {
    let value = value.map(str::trim).filter(|value| !value.is_empty());
    if let Some(value) = value {
        within(value, field, max_chars)?;
    }
    Ok(value)
}

impl RegistrationService {
    #[must_use]
    pub fn new(store: Arc<dyn ParticipantStore>, prices: GiftConfig) -> Self {
        Self { store, prices }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Participant, ServiceError> {
        let name = required(&request.name, "name", NAME_MAX_CHARS)?;
        let email = required(&request.email, "email", EMAIL_MAX_CHARS)?;
        let phone = optional(request.phone.as_deref(), "phone", PHONE_MAX_CHARS)?;

        let participant = self
            .store
            .insert_participant(NewParticipant { name, email, phone })
            .await
            .map_err(|error| match error {
                DatabaseError::UniqueViolation(_) => ServiceError::EmailTaken,
                other => other.into(),
            })?;
        info!(id = participant.id, "participant registered");
        Ok(participant)
    }

    /// Price bounds are checked before the email is looked up.
    fn validate_gift<'a>(&self, request: &'a GiftRequest) -> Result<ValidGift<'a>, ServiceError> {
        let price = request
            .price
            .as_ref()
            .and_then(Price::value)
            .ok_or_else(|| ServiceError::Validation("price must be a number".to_owned()))?;
        if price < self.prices.min_price {
            return Err(ServiceError::PriceTooLow {
                min: self.prices.min_price,
            });
        }
        if price > self.prices.max_price {
            return Err(ServiceError::PriceTooHigh {
                max: self.prices.max_price,
            });
        }
        let description = required(&request.gift_name, "gift name", DESCRIPTION_MAX_CHARS)?;
        let email = required(&request.email, "email", EMAIL_MAX_CHARS)?;
        let link = optional(request.gift_url.as_deref(), "gift link", LINK_MAX_CHARS)?;
        Ok(ValidGift {
            email,
            description,
            link,
            price,
        })
    }

    async fn store_gift(&self, gift: ValidGift<'_>) -> Result<Gift, ServiceError> {
        let participant = self
            .store
            .find_participant_by_email(gift.email)
            .await?
            .ok_or(ServiceError::EmailNotFound)?;
        let saved = self
            .store
            .upsert_gift(NewGift {
                participant_id: participant.id,
                description: gift.description,
                link: gift.link,
                price: gift.price,
            })
            .await?;
        info!(participant = participant.id, "gift saved");
        Ok(saved)
    }

    /// Creates or replaces the gift of the participant with the given email.
    pub async fn save_gift(&self, request: &GiftRequest) -> Result<Gift, ServiceError> {
        let gift = self.validate_gift(request)?;
        self.store_gift(gift).await
    }

    /// Registers the participant and saves their gift. Nothing is kept when
    /// either step fails.
    pub async fn join(&self, request: JoinRequest) -> Result<Joined, ServiceError> {
        let (registration, gift) = request.split();
        let valid_gift = self.validate_gift(&gift)?;
        let participant = self.register(&registration).await?;

        match self.store_gift(valid_gift).await {
            Ok(gift) => Ok(Joined { participant, gift }),
            Err(failure) => {
                warn!(id = participant.id, %failure, "saving gift failed, removing participant");
                if let Err(cleanup) = self.store.delete_participant(participant.id).await {
                    error!(id = participant.id, %cleanup, "could not remove participant");
                }
                Err(failure)
            }
        }
    }
}
