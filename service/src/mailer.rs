use log::{error, info};
use serde::Serialize;

use crate::config::Settings;
use crate::error::{AuthError, GenericError};

/// Delivers sign-in links.
#[rocket::async_trait]
pub trait MagicLinkMailer: Send + Sync {
    async fn send_magic_link(&self, email: &str, link: &str) -> Result<(), GenericError>;
}

/// Writes the link to the log instead of sending it. Used when no mail
/// webhook is configured.
pub struct LogMailer;

#[rocket::async_trait]
impl MagicLinkMailer for LogMailer {
    async fn send_magic_link(&self, email: &str, link: &str) -> Result<(), GenericError> {
        info!("Magic link for {email}: {link}");
        Ok(())
    }
}

/// Posts the message as JSON to a mail relay.
pub struct WebhookMailer {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize, Debug)]
struct OutgoingMail<'a> {
    to: &'a str,
    subject: &'a str,
    text: String,
}

impl WebhookMailer {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[rocket::async_trait]
impl MagicLinkMailer for WebhookMailer {
    async fn send_magic_link(&self, email: &str, link: &str) -> Result<(), GenericError> {
        let mail = OutgoingMail {
            to: email,
            subject: "Your sign-in link",
            text: format!("Click to sign in to the league:\n\n{link}\n\nThe link can be used once."),
        };
        let response = self
            .client
            .post(&self.url)
            .json(&mail)
            .send()
            .await
            .and_then(|r| r.error_for_status());
        match response {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Unable to send magic link to {email}: {:#?}", e);
                Err(AuthError::MailFailed("Unable to send the sign-in email").into())
            }
        }
    }
}

pub fn mailer_from_settings(settings: &Settings) -> Box<dyn MagicLinkMailer> {
    match &settings.mail_webhook_url {
        Some(url) => Box::new(WebhookMailer::new(url.clone())),
        None => {
            info!("MAIL_WEBHOOK_URL not set, magic links will only be logged");
            Box::new(LogMailer)
        }
    }
}
