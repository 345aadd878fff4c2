//! Email service for transactional notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Two
//! flows: the welcome mail after registration (best-effort, dispatched by
//! the caller on a detached task) and the contact-form relay to the
//! configured inbox.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::validate::ContactMessage;

/// HTML template for the registration welcome email.
#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeEmailHtml<'a> {
    email: &'a str,
}

/// Plain text template for the registration welcome email.
#[derive(Template)]
#[template(path = "email/welcome.txt")]
struct WelcomeEmailText<'a> {
    email: &'a str,
}

/// HTML template for the contact-form relay.
#[derive(Template)]
#[template(path = "email/contact.html")]
struct ContactEmailHtml<'a> {
    email: &'a str,
    message: &'a str,
}

/// Plain text template for the contact-form relay.
#[derive(Template)]
#[template(path = "email/contact.txt")]
struct ContactEmailText<'a> {
    email: &'a str,
    message: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    inbox_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            inbox_address: config.inbox_address.clone(),
        })
    }

    /// Send a welcome email after successful registration.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to
    /// render.
    pub async fn send_welcome(&self, to: &str) -> Result<(), EmailError> {
        let html = WelcomeEmailHtml { email: to }.render()?;
        let text = WelcomeEmailText { email: to }.render()?;

        let email = self
            .message_builder(to)?
            .subject("¡Bienvenido/a a la tienda!")
            .multipart(alternative(&text, &html))?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, "welcome email sent");
        Ok(())
    }

    /// Relay a contact-form submission to the configured inbox.
    ///
    /// The `Reply-To` header carries the submitter's address so the store
    /// can answer directly. Returns whether the relay accepted the
    /// message.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to
    /// render.
    pub async fn send_contact(&self, contact: &ContactMessage) -> Result<bool, EmailError> {
        let html = ContactEmailHtml {
            email: contact.reply_to.as_str(),
            message: &contact.message,
        }
        .render()?;
        let text = ContactEmailText {
            email: contact.reply_to.as_str(),
            message: &contact.message,
        }
        .render()?;

        let email = self
            .message_builder(&self.inbox_address)?
            .reply_to(
                contact
                    .reply_to
                    .as_str()
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(contact.reply_to.to_string()))?,
            )
            .subject(&contact.subject)
            .multipart(alternative(&text, &html))?;

        let response = self.mailer.send(email).await?;

        tracing::info!(
            reply_to = %contact.reply_to,
            subject = %contact.subject,
            "contact email relayed"
        );
        Ok(response.is_positive())
    }

    /// Start a message builder with From and To set.
    fn message_builder(
        &self,
        to: &str,
    ) -> Result<lettre::message::MessageBuilder, EmailError> {
        Ok(Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?))
    }
}

/// Build a multipart body with both plain text and HTML versions.
fn alternative(text_body: &str, html_body: &str) -> MultiPart {
    MultiPart::alternative()
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(text_body.to_string()),
        )
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html_body.to_string()),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shoplink_core::Email;

    #[test]
    fn test_welcome_templates_render_recipient() {
        let html = WelcomeEmailHtml { email: "a@b.com" }.render().unwrap();
        assert!(html.contains("a@b.com"));
        assert!(html.contains("Bienvenido"));

        let text = WelcomeEmailText { email: "a@b.com" }.render().unwrap();
        assert!(text.contains("a@b.com"));
    }

    #[test]
    fn test_contact_templates_render_body() {
        let html = ContactEmailHtml {
            email: "a@b.com",
            message: "Hola, tengo una consulta",
        }
        .render()
        .unwrap();
        assert!(html.contains("a@b.com"));
        assert!(html.contains("Hola, tengo una consulta"));
    }

    #[test]
    fn test_contact_html_escapes_markup() {
        let html = ContactEmailHtml {
            email: "a@b.com",
            message: "<script>alert(1)</script>",
        }
        .render()
        .unwrap();
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_contact_message_shape() {
        let contact = ContactMessage {
            subject: "Consulta".to_owned(),
            reply_to: Email::parse("a@b.com").unwrap(),
            message: "Hola".to_owned(),
        };
        assert_eq!(contact.reply_to.as_str(), "a@b.com");
    }
}
