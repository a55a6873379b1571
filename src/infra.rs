//! In-memory infrastructure adapters. These back the binary's default
//! wiring and the test suites; a relational store slots in behind the same
//! traits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::info;

use crate::admin::{AdminCredentialRepository, PortalSettingsRepository};
use crate::workflows::onboarding::{
    default_templates, Application, ApplicationId, ApplicationRepository, ApplicationStatus,
    EmailTemplate, MailError, Mailer, OutgoingEmail, RepositoryError, SmtpConfigRepository,
    SmtpSettings, TemplateRepository,
};

#[derive(Default, Clone)]
pub struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.id) {
            guard.insert(application.id.clone(), application);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_all(&self) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut applications: Vec<Application> = guard.values().cloned().collect();
        applications.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(applications)
    }

    fn count(&self) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.len() as u64)
    }

    fn count_by_status(&self, status: ApplicationStatus) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().filter(|app| app.status == status).count() as u64)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryTemplateRepository {
    templates: Arc<Mutex<HashMap<String, EmailTemplate>>>,
}

impl InMemoryTemplateRepository {
    /// Repository pre-populated with the stock notification templates.
    pub fn seeded() -> Self {
        let repository = Self::default();
        {
            let mut guard = repository.templates.lock().expect("template mutex poisoned");
            for template in default_templates() {
                guard.insert(template.id.clone(), template);
            }
        }
        repository
    }
}

impl TemplateRepository for InMemoryTemplateRepository {
    fn get(&self, key: &str) -> Result<Option<EmailTemplate>, RepositoryError> {
        let guard = self.templates.lock().expect("template mutex poisoned");
        Ok(guard.get(key).cloned())
    }

    fn list(&self) -> Result<Vec<EmailTemplate>, RepositoryError> {
        let guard = self.templates.lock().expect("template mutex poisoned");
        let mut templates: Vec<EmailTemplate> = guard.values().cloned().collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(templates)
    }

    fn upsert(&self, template: EmailTemplate) -> Result<(), RepositoryError> {
        let mut guard = self.templates.lock().expect("template mutex poisoned");
        guard.insert(template.id.clone(), template);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemorySmtpConfigRepository {
    settings: Arc<Mutex<Option<SmtpSettings>>>,
}

impl SmtpConfigRepository for InMemorySmtpConfigRepository {
    fn load(&self) -> Result<Option<SmtpSettings>, RepositoryError> {
        let guard = self.settings.lock().expect("smtp mutex poisoned");
        Ok(guard.clone())
    }

    fn store(&self, settings: SmtpSettings) -> Result<(), RepositoryError> {
        let mut guard = self.settings.lock().expect("smtp mutex poisoned");
        *guard = Some(settings);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPortalSettingsRepository {
    documents: Arc<Mutex<HashMap<String, Value>>>,
}

impl PortalSettingsRepository for InMemoryPortalSettingsRepository {
    fn read(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let guard = self.documents.lock().expect("settings mutex poisoned");
        Ok(guard.get(key).cloned())
    }

    fn write(&self, key: &str, value: Value) -> Result<(), RepositoryError> {
        let mut guard = self.documents.lock().expect("settings mutex poisoned");
        guard.insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryAdminCredentialRepository {
    hash: Arc<Mutex<Option<String>>>,
}

impl AdminCredentialRepository for InMemoryAdminCredentialRepository {
    fn load_hash(&self) -> Result<Option<String>, RepositoryError> {
        let guard = self.hash.lock().expect("credential mutex poisoned");
        Ok(guard.clone())
    }

    fn store_hash(&self, hash: &str) -> Result<(), RepositoryError> {
        let mut guard = self.hash.lock().expect("credential mutex poisoned");
        *guard = Some(hash.to_string());
        Ok(())
    }
}

/// Mailer that records every hand-off instead of talking to a transport;
/// can be flipped to fail for exercising the best-effort paths.
#[derive(Default, Clone)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().expect("mailer mutex poisoned") = fail;
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, _settings: &SmtpSettings, mail: &OutgoingEmail) -> Result<(), MailError> {
        if *self.fail.lock().expect("mailer mutex poisoned") {
            return Err(MailError::Transport("connection refused".to_string()));
        }
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(mail.clone());
        Ok(())
    }
}

/// Default transport stand-in: logs the hand-off and reports success. A real
/// SMTP client implements [`Mailer`] in its place.
#[derive(Default, Clone)]
pub struct LoggingMailer;

impl Mailer for LoggingMailer {
    fn send(&self, settings: &SmtpSettings, mail: &OutgoingEmail) -> Result<(), MailError> {
        info!(
            host = %settings.host,
            port = settings.port,
            to = %mail.to,
            subject = %mail.subject,
            "handing message to mail transport"
        );
        Ok(())
    }
}
