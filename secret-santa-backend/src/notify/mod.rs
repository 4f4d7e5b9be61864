//! Delivery of the draw result to the buyers.
//!
//! Every buyer gets an email, and a short message on their phone when they
//! registered one. The transports sit behind [`Mailer`] and [`Messenger`] so
//! the lottery does not care whether a message leaves the process or only
//! ends up in the log.

mod log;
mod smtp;
mod webhook;

use core::time::Duration;

use async_trait::async_trait;
pub use log::{LogMailer, LogMessenger};
use secret_santa_database::models::{Gift, Participant};
pub use smtp::SmtpMailer;
pub use webhook::WebhookMessenger;

pub const EMAIL_SUBJECT: &str = "🎄 Your Secret Santa is...";

#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build email: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("messaging endpoint answered {0}")]
    Status(reqwest::StatusCode),
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), NotifyError>;
}

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, phone: &str, body: &str) -> Result<(), NotifyError>;
}

/// The email telling `buyer` who they drew and what that person wishes for.
#[must_use]
pub fn assignment_email(buyer: &Participant, recipient: &Participant, wish: &Gift) -> Email {
    let mut html = format!(
        "<h2>Hi {buyer}!</h2>\
         <p>Your Secret Santa is <strong>{recipient}</strong>.</p>\
         <p>They would like: <strong>{gift}</strong> (approx ${price})</p>",
        buyer = escape_html(&buyer.name),
        recipient = escape_html(&recipient.name),
        gift = escape_html(&wish.description),
        price = wish.price,
    );
    match wish.link.as_deref() {
        Some(link) => html.push_str(&format!(
            "<p><a href=\"{link}\">See the gift</a></p>",
            link = escape_html(link)
        )),
        None => html.push_str("<p>No link</p>"),
    }

    Email {
        to: buyer.email.clone(),
        to_name: buyer.name.clone(),
        subject: EMAIL_SUBJECT.to_owned(),
        html,
    }
}

/// The phone message telling `buyer` who they drew.
#[must_use]
pub fn assignment_message(buyer: &Participant, recipient: &Participant, wish: &Gift) -> String {
    format!(
        "Hi {}! 🎁 your Secret Santa is {}. They would like: {} (approx ${})",
        buyer.name, recipient.name, wish.description, wish.price
    )
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for character in input.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
