//! System email service for sending password-reset emails.
//!
//! Uses the SMTP settings from the main config file; when SMTP is not
//! configured the service reports itself disabled and callers decide what
//! to do instead.

use anyhow::Result;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;

use crate::config::EmailConfig;

/// Service for sending system emails
pub struct SystemEmailService {
    config: EmailConfig,
}

impl SystemEmailService {
    /// Create a new system email service
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Check if email sending is configured and enabled
    pub fn is_enabled(&self) -> bool {
        self.config.is_configured()
    }

    /// Send a password-reset email carrying the redemption link.
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        reset_url: &str,
        expires_in_minutes: i64,
    ) -> Result<()> {
        let subject = "Password Reset Request";
        let html_body = render_reset_html(reset_url, expires_in_minutes);
        let text_body = render_reset_text(reset_url, expires_in_minutes);

        self.send_email(to_email, subject, &html_body, &text_body)
            .await
    }

    /// Send an email with HTML and plain text versions
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<()> {
        let smtp_host = self
            .config
            .smtp_host
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("SMTP host not configured"))?;
        let from_address = self
            .config
            .from_address
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("From address not configured"))?;

        let from_mailbox = format!("{} <{}>", self.config.from_name, from_address);
        let from: Mailbox = from_mailbox.parse()?;
        let to: Mailbox = to_email.parse()?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
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
                    ),
            )?;

        // Build SMTP transport; sends are timeout-bounded
        let mailer = if self.config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp_host)
        }
        .port(self.config.smtp_port)
        .timeout(Some(Duration::from_secs(self.config.send_timeout_secs)));

        let mailer = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer
        };

        mailer.build().send(email).await?;

        tracing::info!(
            to = %to_email,
            subject = %subject,
            "Email sent successfully"
        );

        Ok(())
    }
}

/// Render the HTML version of the reset email
fn render_reset_html(reset_url: &str, expires_in_minutes: i64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Password Reset</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
            margin: 0;
            padding: 0;
            background-color: #f5f5f5;
        }}
        .container {{
            max-width: 560px;
            margin: 0 auto;
            padding: 40px 20px;
        }}
        .card {{
            background-color: #ffffff;
            border-radius: 8px;
            box-shadow: 0 2px 8px rgba(0, 0, 0, 0.06);
            padding: 32px 24px;
        }}
        .card p {{
            margin: 0 0 16px;
            color: #374151;
            line-height: 1.6;
        }}
        .button-container {{
            text-align: center;
            margin: 32px 0;
        }}
        .button {{
            display: inline-block;
            background: linear-gradient(135deg, #3b82f6 0%, #2563eb 100%);
            color: white !important;
            text-decoration: none;
            padding: 14px 32px;
            border-radius: 6px;
            font-weight: 500;
            font-size: 16px;
        }}
        .note {{
            color: #6b7280;
            font-size: 13px;
            text-align: center;
            margin-top: 24px;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="card">
            <p>You requested a password reset.</p>
            <p>Click the button below to choose a new password.</p>

            <div class="button-container">
                <a href="{reset_url}" class="button">Reset Password</a>
            </div>

            <p class="note">This link expires in {expires_in_minutes} minutes. If you didn't request a reset, you can safely ignore this email.</p>
        </div>
    </div>
</body>
</html>"#,
        reset_url = reset_url,
        expires_in_minutes = expires_in_minutes,
    )
}

/// Render the plain text version of the reset email
fn render_reset_text(reset_url: &str, expires_in_minutes: i64) -> String {
    format!(
        r#"Password Reset Request

You requested a password reset.

To choose a new password, visit:
{reset_url}

This link expires in {expires_in_minutes} minutes.

If you didn't request a reset, you can safely ignore this email."#,
        reset_url = reset_url,
        expires_in_minutes = expires_in_minutes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_reset_text() {
        let text = render_reset_text("https://example.com/reset-password.html?token=abc", 60);
        assert!(text.contains("https://example.com/reset-password.html?token=abc"));
        assert!(text.contains("60 minutes"));
    }

    #[test]
    fn test_render_reset_html() {
        let html = render_reset_html("https://example.com/reset-password.html?token=abc", 60);
        assert!(html.contains("https://example.com/reset-password.html?token=abc"));
        assert!(html.contains("60 minutes"));
        assert!(html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_disabled_without_smtp_config() {
        let service = SystemEmailService::new(EmailConfig::default());
        assert!(!service.is_enabled());
    }
}
