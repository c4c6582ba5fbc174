//! Email service for welcome and password reset messages.

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::path::Path;

use crate::{config::Config, errors::Error};

pub struct EmailService {
    transport: EmailTransport,
    from_email: String,
    from_name: String,
    public_url: String,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let email_config = &config.email;

        let transport = match &email_config.transport {
            crate::config::EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            } => {
                if !use_tls {
                    tracing::warn!("SMTP TLS is disabled - this is not recommended for production");
                }

                let smtp_builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                } else {
                    Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host))
                }
                .map_err(|e| Error::Internal {
                    operation: format!("create SMTP transport: {e}"),
                })?
                .port(*port)
                .credentials(Credentials::new(username.clone(), password.clone()));

                EmailTransport::Smtp(smtp_builder.build())
            }
            crate::config::EmailTransportConfig::File { path } => {
                // File transport for development/testing
                let emails_dir = Path::new(path);
                if !emails_dir.exists() {
                    std::fs::create_dir_all(emails_dir).map_err(|e| Error::Internal {
                        operation: format!("create emails directory: {e}"),
                    })?;
                }
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(emails_dir))
            }
        };

        Ok(Self {
            transport,
            from_email: email_config.from_email.clone(),
            from_name: email_config.from_name.clone(),
            public_url: config.public_url.clone(),
        })
    }

    /// Welcome message sent after signup. Callers treat failures as
    /// best-effort: a lost welcome email never fails the signup.
    pub async fn send_welcome_email(&self, to_email: &str, to_name: &str) -> Result<(), Error> {
        let subject = "Welcome to Trailbook";
        let body = self.create_welcome_body(to_name);
        self.send_email(to_email, Some(to_name), subject, &body).await
    }

    /// Password reset message carrying the plaintext token. This is the only
    /// place the plaintext leaves the server.
    pub async fn send_password_reset_email(&self, to_email: &str, to_name: Option<&str>, token: &str) -> Result<(), Error> {
        let reset_link = format!("{}/reset-password/{}", self.public_url, token);

        let subject = "Your password reset token (valid for 10 minutes)";
        let body = self.create_password_reset_body(to_name, &reset_link);

        self.send_email(to_email, to_name, subject, &body).await
    }

    async fn send_email(&self, to_email: &str, to_name: Option<&str>, subject: &str, body: &str) -> Result<(), Error> {
        let from = format!("{} <{}>", self.from_name, self.from_email)
            .parse::<Mailbox>()
            .map_err(|e| Error::Internal {
                operation: format!("parse from email: {e}"),
            })?;

        let to = if let Some(name) = to_name {
            format!("{name} <{to_email}>")
        } else {
            to_email.to_string()
        }
        .parse::<Mailbox>()
        .map_err(|e| Error::Internal {
            operation: format!("parse to email: {e}"),
        })?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| Error::Internal {
                operation: format!("build email message: {e}"),
            })?;

        // Transport failures surface as dispatch errors so callers can
        // compensate (the forgot-password flow rolls its token back)
        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message).await.map_err(|e| Error::EmailDispatch {
                    operation: format!("send SMTP email: {e}"),
                })?;
            }
            EmailTransport::File(file) => {
                file.send(message).await.map_err(|e| Error::EmailDispatch {
                    operation: format!("send file email: {e}"),
                })?;
            }
        }

        Ok(())
    }

    fn create_welcome_body(&self, to_name: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Welcome to Trailbook</title>
</head>
<body>
    <div style="max-width: 600px; margin: 0 auto; padding: 20px; font-family: Arial, sans-serif;">
        <h2>Welcome to Trailbook, {to_name}!</h2>
        <p>Your account is ready. Browse the tours, pick one, and see you out there.</p>
        <p><a href="{url}">Go to Trailbook</a></p>
    </div>
</body>
</html>"#,
            to_name = to_name,
            url = self.public_url,
        )
    }

    fn create_password_reset_body(&self, to_name: Option<&str>, reset_link: &str) -> String {
        let greeting = if let Some(name) = to_name {
            format!("Hello {name},")
        } else {
            "Hello,".to_string()
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Password Reset Request</title>
</head>
<body>
    <div style="max-width: 600px; margin: 0 auto; padding: 20px; font-family: Arial, sans-serif;">
        <h2>Password Reset Request</h2>

        <p>{greeting}</p>

        <p>We received a request to reset your password. If you didn't make this request, you can safely ignore this email.</p>

        <p>To reset your password, click the link below:</p>

        <p><a href="{reset_link}">Reset your password</a></p>

        <p>Or copy and paste this link into your browser:</p>
        <p>{reset_link}</p>

        <p>This link will expire in 10 minutes.</p>

        <p style="margin-top: 30px; font-size: 12px; color: #666;">This is an automated message, please do not reply to this email.</p>
    </div>
</body>
</html>"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let temp_dir = std::env::temp_dir().join(format!("trailbook-test-emails-{}", std::process::id()));
        let mut config = Config {
            secret_key: Some("test-secret".to_string()),
            ..Default::default()
        };
        config.email.transport = crate::config::EmailTransportConfig::File {
            path: temp_dir.to_string_lossy().to_string(),
        };
        config
    }

    #[tokio::test]
    async fn test_email_service_creation() {
        let config = test_config();
        let email_service = EmailService::new(&config);
        assert!(email_service.is_ok());
    }

    #[tokio::test]
    async fn test_password_reset_email_body() {
        let config = test_config();
        let email_service = EmailService::new(&config).unwrap();

        let body = email_service.create_password_reset_body(Some("John Doe"), "https://example.com/reset-password/abc123");

        assert!(body.contains("Hello John Doe,"));
        assert!(body.contains("https://example.com/reset-password/abc123"));
        assert!(body.contains("Reset your password"));
    }

    #[tokio::test]
    async fn test_password_reset_email_body_no_name() {
        let config = test_config();
        let email_service = EmailService::new(&config).unwrap();

        let body = email_service.create_password_reset_body(None, "https://example.com/reset-password/abc123");

        assert!(body.contains("Hello,"));
        assert!(body.contains("https://example.com/reset-password/abc123"));
    }

    #[tokio::test]
    async fn test_welcome_email_sends_via_file_transport() {
        let config = test_config();
        let email_service = EmailService::new(&config).unwrap();

        email_service
            .send_welcome_email("new@example.com", "New User")
            .await
            .expect("file transport send should succeed");
    }
}
