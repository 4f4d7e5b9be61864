use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secret_santa_config::SmtpConfig;
use tracing::debug;

use super::{Email, Mailer, NotifyError};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let sender_address: Address = config.sender_address().parse()?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?.credentials(
            Credentials::new(config.username.clone(), config.password.clone()),
        );
        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        Ok(Self {
            transport: builder.build(),
            sender: Mailbox::new(Some(config.sender_name.clone()), sender_address),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: Email) -> Result<(), NotifyError> {
        let recipient = Mailbox::new(Some(email.to_name), email.to.parse()?);
        let message = Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)?;
        let response = self.transport.send(message).await?;
        debug!(to = %email.to, code = %response.code(), "email accepted by smtp server");
        Ok(())
    }
}
