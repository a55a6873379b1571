use super::domain::{Application, ApplicationId, ApplicationStatus, EmailTemplate, SmtpSettings};

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for application records. Inserts are atomic: the
/// record embeds its uploaded-document references, so an application and its
/// documents commit together or not at all.
pub trait ApplicationRepository: Send + Sync {
    /// Insert a new record; `Conflict` when the identifier is already taken.
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    /// Replace an existing record (last write wins); `NotFound` when absent.
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    /// All applications, newest submission first.
    fn list_all(&self) -> Result<Vec<Application>, RepositoryError>;
    fn count(&self) -> Result<u64, RepositoryError>;
    fn count_by_status(&self, status: ApplicationStatus) -> Result<u64, RepositoryError>;
}

/// Read/write access to stored notification templates. The workflow only
/// reads; the admin settings surface edits.
pub trait TemplateRepository: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<EmailTemplate>, RepositoryError>;
    fn list(&self) -> Result<Vec<EmailTemplate>, RepositoryError>;
    fn upsert(&self, template: EmailTemplate) -> Result<(), RepositoryError>;
}

/// Singleton SMTP configuration storage.
pub trait SmtpConfigRepository: Send + Sync {
    fn load(&self) -> Result<Option<SmtpSettings>, RepositoryError>;
    fn store(&self, settings: SmtpSettings) -> Result<(), RepositoryError>;
}
