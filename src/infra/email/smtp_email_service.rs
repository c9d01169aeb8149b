use crate::domain::ports::EmailService;
use crate::error::AppError;
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::error;

pub struct SmtpEmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpEmailService {
    pub fn new(host: &str, port: u16, username: Option<String>, password: Option<String>, from: String) -> Result<Self, AppError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid SMTP relay {}: {}", host, e)))?
            .port(port);

        if let (Some(user), Some(pass)) = (username, password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        let from: Mailbox = self.from.parse()
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid sender address {}: {}", self.from, e)))?;
        let to: Mailbox = recipient.parse()
            .map_err(|e| AppError::Validation(format!("Invalid recipient address {}: {}", recipient, e)))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| AppError::InternalWithMsg(format!("Cannot build email: {}", e)))?;

        self.transport.send(message).await.map_err(|e| {
            let msg = format!("SMTP delivery failed: {}", e);
            error!("{}", msg);
            AppError::InternalWithMsg(msg)
        })?;

        Ok(())
    }
}
