use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::SmtpConfig;
use crate::models::PriceRecord;
use crate::plugins::traits::{CredentialProvider, Mailer, PriceAlert, SenderCredentials};
use crate::utils::error::Result;

/// What the notifier decided for one price record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    NoPrice,
    AboveThreshold,
    MissingCredentials,
}

/// Reads sender credentials from two environment variables.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    address_var: String,
    password_var: String,
}

impl EnvCredentials {
    pub fn new(address_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        Self {
            address_var: address_var.into(),
            password_var: password_var.into(),
        }
    }

    pub fn from_config(config: &SmtpConfig) -> Self {
        Self::new(&config.username_env, &config.password_env)
    }
}

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Option<SenderCredentials> {
        let address = non_empty(std::env::var(&self.address_var).ok())?;
        let password = non_empty(std::env::var(&self.password_var).ok())?;
        Some(SenderCredentials { address, password })
    }
}

/// Fixed credentials; either half may be absent.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    pub address: Option<String>,
    pub password: Option<String>,
}

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> Option<SenderCredentials> {
        Some(SenderCredentials {
            address: non_empty(self.address.clone())?,
            password: non_empty(self.password.clone())?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// STARTTLS SMTP delivery. The alert is sent from and to the sender address.
pub struct SmtpMailer {
    host: String,
    port: u16,
}

impl SmtpMailer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn from_config(config: &SmtpConfig) -> Self {
        Self::new(&config.host, config.port)
    }

    fn build_message(credentials: &SenderCredentials, alert: &PriceAlert) -> Result<Message> {
        let mailbox: Mailbox = credentials.address.parse()?;
        let message = Message::builder()
            .from(mailbox.clone())
            .to(mailbox)
            .subject(alert.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.body())?;
        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, credentials: &SenderCredentials, alert: &PriceAlert) -> Result<()> {
        let message = Self::build_message(credentials, alert)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
            .port(self.port)
            .credentials(Credentials::new(
                credentials.address.clone(),
                credentials.password.clone(),
            ))
            .build();

        transport.send(message).await?;
        Ok(())
    }
}

/// Emails an alert when a recorded price is below the target.
pub struct PriceAlertNotifier {
    target_price: Decimal,
    credentials: Box<dyn CredentialProvider>,
    mailer: Box<dyn Mailer>,
}

impl PriceAlertNotifier {
    pub fn new(
        target_price: Decimal,
        credentials: Box<dyn CredentialProvider>,
        mailer: Box<dyn Mailer>,
    ) -> Self {
        Self {
            target_price,
            credentials,
            mailer,
        }
    }

    /// Sends at most one message. Missing credentials silently skip the alert;
    /// delivery failures are returned as errors.
    pub async fn notify(&self, record: &PriceRecord) -> Result<NotifyOutcome> {
        let Some(price) = record.price else {
            debug!("no price recorded, skipping alert");
            return Ok(NotifyOutcome::NoPrice);
        };

        if price >= self.target_price {
            debug!(%price, target = %self.target_price, "price not below target");
            return Ok(NotifyOutcome::AboveThreshold);
        }

        let Some(credentials) = self.credentials.credentials() else {
            debug!("sender credentials not configured, skipping alert");
            return Ok(NotifyOutcome::MissingCredentials);
        };

        let alert = PriceAlert {
            title: record.title.clone(),
            price,
            target_price: self.target_price,
            url: record.url.clone(),
        };
        self.mailer.send(&credentials, &alert).await?;

        info!(%price, target = %self.target_price, "price alert sent");
        Ok(NotifyOutcome::Sent)
    }
}
