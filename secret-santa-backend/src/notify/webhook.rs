use async_trait::async_trait;
use secret_santa_config::MessagingConfig;
use serde::Serialize;
use tracing::debug;

use super::{Messenger, NotifyError};

/// Posts every message as JSON to an HTTP messaging gateway.
pub struct WebhookMessenger {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct OutgoingMessage<'a> {
    to: &'a str,
    body: &'a str,
}

impl WebhookMessenger {
    #[must_use]
    pub fn new(config: &MessagingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        }
    }
}

#[async_trait]
impl Messenger for WebhookMessenger {
    async fn send(&self, phone: &str, body: &str) -> Result<(), NotifyError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&OutgoingMessage { to: phone, body });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status));
        }
        debug!(to = %phone, %status, "message accepted by gateway");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn messenger(server: &MockServer, token: Option<&str>) -> WebhookMessenger {
        WebhookMessenger::new(&MessagingConfig {
            endpoint: server.url("/messages"),
            token: token.map(ToOwned::to_owned),
        })
    }

    #[tokio::test]
    async fn posts_recipient_and_body_with_token() {
        let server = MockServer::start();
        let gateway = server.mock(|when, then| {
            when.method(POST)
                .path("/messages")
                .header("authorization", "Bearer secret")
                .json_body(json!({"to": "+56911111111", "body": "your Secret Santa is Beto"}));
            then.status(202);
        });

        messenger(&server, Some("secret"))
            .send("+56911111111", "your Secret Santa is Beto")
            .await
            .unwrap();

        gateway.assert();
    }

    #[tokio::test]
    async fn sends_without_authorization_when_no_token() {
        let server = MockServer::start();
        let gateway = server.mock(|when, then| {
            when.method(POST).path("/messages");
            then.status(200);
        });

        messenger(&server, None).send("+1", "hello").await.unwrap();

        gateway.assert();
    }

    #[tokio::test]
    async fn error_status_is_a_failure() {
        let server = MockServer::start();
        let gateway = server.mock(|when, then| {
            when.method(POST).path("/messages");
            then.status(500);
        });

        let result = messenger(&server, None).send("+1", "hello").await;

        gateway.assert();
        assert!(matches!(
            result,
            Err(NotifyError::Status(status)) if status.as_u16() == 500
        ));
    }
}
