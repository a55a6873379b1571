//! Back-office capabilities: admin authentication and portal settings.

pub mod auth;
pub mod settings;

pub use auth::{
    hash_password, verify_password, AdminAuthService, AdminCredentialRepository, AdminToken,
    AuthError,
};
pub use settings::{
    default_frontend_settings, PortalSettingsRepository, SettingsError, SettingsService,
    SmtpSettingsUpdate, FRONTEND_SETTINGS_KEY, SMTP_PASSWORD_MASK,
};
