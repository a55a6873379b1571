//! Business-account onboarding: intake validation, the status workflow, and
//! the templated notification pipeline.

pub mod domain;
pub mod identifier;
pub mod notification;
pub mod repository;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    ActionRequiredDetails, Application, ApplicationId, ApplicationStats, ApplicationStatus,
    EmailTemplate, SmtpSecurity, SmtpSettings, SubmissionInput,
};
pub use notification::{
    default_templates, DeliveryDisposition, DeliveryRecord, MailError, Mailer,
    NotificationDispatcher, OutgoingEmail,
};
pub use repository::{
    ApplicationRepository, RepositoryError, SmtpConfigRepository, TemplateRepository,
};
pub use service::{OnboardingError, OnboardingService};
pub use validation::FieldErrors;
