use std::sync::Arc;

use serde_json::{json, Value};

use crate::workflows::onboarding::{
    EmailTemplate, NotificationDispatcher, RepositoryError, SmtpConfigRepository, SmtpSecurity,
    SmtpSettings, TemplateRepository,
};

/// Settings-table key holding the site-display configuration document.
pub const FRONTEND_SETTINGS_KEY: &str = "frontend_settings";

/// Placeholder returned instead of the stored SMTP password; writes carrying
/// it (or nothing) keep the stored secret.
pub const SMTP_PASSWORD_MASK: &str = "********";

/// Key/value storage for free-form settings documents.
pub trait PortalSettingsRepository: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<Value>, RepositoryError>;
    fn write(&self, key: &str, value: Value) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Unknown email template '{0}'")]
    UnknownTemplate(String),
    #[error("Missing required fields: {0}")]
    MissingFields(&'static str),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Admin-facing configuration surface: site-display settings, notification
/// templates, and the SMTP singleton.
pub struct SettingsService {
    settings: Arc<dyn PortalSettingsRepository>,
    templates: Arc<dyn TemplateRepository>,
    smtp: Arc<dyn SmtpConfigRepository>,
    dispatcher: Arc<NotificationDispatcher>,
    admin_email: String,
}

impl SettingsService {
    pub fn new(
        settings: Arc<dyn PortalSettingsRepository>,
        templates: Arc<dyn TemplateRepository>,
        smtp: Arc<dyn SmtpConfigRepository>,
        dispatcher: Arc<NotificationDispatcher>,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            settings,
            templates,
            smtp,
            dispatcher,
            admin_email: admin_email.into(),
        }
    }

    /// Stored site-display settings, or the seeded defaults when none have
    /// been saved yet.
    pub fn frontend_settings(&self) -> Result<Value, SettingsError> {
        Ok(self
            .settings
            .read(FRONTEND_SETTINGS_KEY)?
            .unwrap_or_else(default_frontend_settings))
    }

    pub fn save_frontend_settings(&self, value: Value) -> Result<(), SettingsError> {
        self.settings.write(FRONTEND_SETTINGS_KEY, value)?;
        Ok(())
    }

    pub fn email_templates(&self) -> Result<Vec<EmailTemplate>, SettingsError> {
        Ok(self.templates.list()?)
    }

    /// Update one template in place. Id, subject, and body must be present;
    /// the template key set is fixed at seeding time, so unknown keys are
    /// rejected rather than silently created.
    pub fn update_email_template(&self, template: EmailTemplate) -> Result<(), SettingsError> {
        if template.id.is_empty() || template.subject.is_empty() || template.body.is_empty() {
            return Err(SettingsError::MissingFields("id, subject, body"));
        }
        if self.templates.get(&template.id)?.is_none() {
            return Err(SettingsError::UnknownTemplate(template.id));
        }
        self.templates.upsert(template)?;
        Ok(())
    }

    /// SMTP settings with the password masked; the secret never leaves the
    /// store.
    pub fn smtp_settings(&self) -> Result<SmtpSettings, SettingsError> {
        let mut settings = self.smtp.load()?.unwrap_or_default();
        settings.password = if settings.password.is_empty() {
            String::new()
        } else {
            SMTP_PASSWORD_MASK.to_string()
        };
        Ok(settings)
    }

    /// Persist SMTP settings. Host and username must be present (the port is
    /// typed and always carries a value); an empty or masked incoming
    /// password keeps the stored one.
    pub fn save_smtp_settings(&self, update: SmtpSettingsUpdate) -> Result<(), SettingsError> {
        if update.host.is_empty() || update.username.is_empty() {
            return Err(SettingsError::MissingFields("host, port, username"));
        }
        let current = self.smtp.load()?.unwrap_or_default();
        let password = match update.password {
            Some(ref password) if !password.is_empty() && password != SMTP_PASSWORD_MASK => {
                password.clone()
            }
            _ => current.password,
        };

        self.smtp.store(SmtpSettings {
            host: update.host,
            port: update.port,
            username: update.username,
            password,
            security: update.security,
            from_name: update.from_name,
            from_address: update.from_address,
        })?;
        Ok(())
    }

    /// Send a fixed test message to `recipient`, or the configured admin
    /// address when none is given. Returns the resolved recipient and
    /// whether delivery succeeded.
    pub fn send_test_email(&self, recipient: Option<String>) -> (String, bool) {
        let recipient = recipient
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.admin_email.clone());
        let delivered = self.dispatcher.send_test(&recipient);
        (recipient, delivered)
    }
}

/// Incoming SMTP configuration write. Password is optional so admins can
/// edit the connection without re-entering the secret.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpSettingsUpdate {
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub security: SmtpSecurity,
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub from_address: String,
}

/// Seeded site-display configuration.
pub fn default_frontend_settings() -> Value {
    json!({
        "logoUrl": "",
        "faviconUrl": "",
        "seoTitle": "VERCUL | €500 Bonus",
        "seoMetaDescription": "An expertly designed landing page to onboard European businesses to VERCUL Business",
        "copyrightText": "© {YEAR} VERCUL HOLDINGS LTD. All rights reserved.",
        "contactEmail": "contact@vercul.com",
        "contactPhone": "+44 20 8275 6432",
        "contactAddress": "VER-CUL HOLDINGS LTD\n41 Somerset Gardens, Creighton Road\nLondon, United Kingdom N17 8JX",
        "primaryColor": "#2563eb",
        "secondaryColor": "#1d4ed8",
        "baseFontSize": 16,
        "fontFamily": "Inter",
        "borderRadius": "0.75rem",
        "enableGradients": true,
        "showFeaturesSection": true,
        "showWhyUsSection": true,
        "showProcessSection": true,
        "showCountriesSection": true,
        "showTestimonialsSection": true,
        "showTrustpilotSection": true,
        "showFaqSection": true,
        "showSecuritySection": true
    })
}
