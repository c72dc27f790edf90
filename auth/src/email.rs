//! Email delivery providers.

use critique_core::{DomainError, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

/// Email delivery.
///
/// This trait abstracts over delivery so the signup flow does not care
/// whether codes go out over SMTP, to the console, or into a test
/// buffer.
pub trait EmailProvider: Send + Sync {
    /// Send a confirmation code to a freshly signed-up (or returning)
    /// user.
    ///
    /// # Errors
    ///
    /// `Delivery` when the message cannot be handed to the transport.
    /// The caller keeps any already-persisted state on failure.
    fn send_confirmation_code(
        &self,
        to: &str,
        username: &str,
        code: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Console email provider.
///
/// Logs the code instead of sending it. Useful for development where
/// no SMTP relay is available.
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmailProvider;

impl ConsoleEmailProvider {
    /// Create a new console email provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EmailProvider for ConsoleEmailProvider {
    async fn send_confirmation_code(&self, to: &str, username: &str, code: &str) -> Result<()> {
        info!(
            to = %to,
            username = %username,
            code = %code,
            "confirmation code email (development mode)"
        );
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                CONFIRMATION CODE EMAIL                       ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ To: {to:<57}║");
        println!("║ Subject: Your Critique confirmation code{:<21}║", "");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║                                                              ║");
        println!("║ Hello {username:<55}║");
        println!("║                                                              ║");
        println!("║ Your confirmation code: {code:<37}║");
        println!("║                                                              ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        Ok(())
    }
}

/// SMTP email provider using Lettre.
///
/// Sends real mail, suitable for production.
#[derive(Clone)]
pub struct SmtpEmailProvider {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl SmtpEmailProvider {
    /// Create a new SMTP email provider.
    #[must_use]
    pub fn new(
        smtp_server: String,
        smtp_port: u16,
        smtp_username: String,
        smtp_password: String,
        from_email: String,
        from_name: String,
    ) -> Self {
        Self {
            smtp_server,
            smtp_port,
            credentials: Credentials::new(smtp_username, smtp_password),
            from_email,
            from_name,
        }
    }

    /// Build an SMTP transport.
    ///
    /// A new transport per message avoids connection pooling issues.
    fn build_transport(&self) -> Result<SmtpTransport> {
        Ok(SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| DomainError::Delivery(format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

impl EmailProvider for SmtpEmailProvider {
    async fn send_confirmation_code(&self, to: &str, username: &str, code: &str) -> Result<()> {
        let body = format!(
            "Hello {username},\n\n\
             Your Critique confirmation code is: {code}\n\n\
             Post it together with your username to /api/v1/auth/token/ \
             to receive an access token.\n\n\
             If you didn't request this email, you can safely ignore it.\n"
        );

        let email = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| DomainError::Delivery(format!("invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| DomainError::Delivery(format!("invalid to address: {e}")))?)
            .subject("Your Critique confirmation code")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| DomainError::Delivery(format!("failed to build email: {e}")))?;

        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map(|_| ())
                .map_err(|e| DomainError::Delivery(format!("failed to send email: {e}")))
        })
        .await
        .map_err(|e| DomainError::Delivery(format!("email task failed: {e}")))?
    }
}
