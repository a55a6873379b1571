use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::infra::{
    InMemoryApplicationRepository, InMemorySmtpConfigRepository, InMemoryTemplateRepository,
    RecordingMailer,
};
use crate::workflows::onboarding::{
    Application, ApplicationId, ApplicationRepository, ApplicationStatus, NotificationDispatcher,
    OnboardingService, RepositoryError, SmtpConfigRepository, SmtpSettings, SubmissionInput,
};

pub(super) const ADMIN_EMAIL: &str = "admin@vercul.com";
pub(super) const BASE_URL: &str = "https://portal.vercul.com";

pub(super) fn submission() -> SubmissionInput {
    SubmissionInput {
        company_name: Some("Acme GmbH".to_string()),
        registration_number: Some("HRB 12345".to_string()),
        country: Some("Germany".to_string()),
        business_address: Some("Hauptstrasse 1".to_string()),
        city: Some("Berlin".to_string()),
        postal_code: Some("10115".to_string()),
        applicant_name: Some("Jo Doe".to_string()),
        applicant_role: Some("Director".to_string()),
        applicant_dob: Some("1990-04-12".to_string()),
        applicant_email: Some("jo@acme.example".to_string()),
        applicant_phone: Some("+49 30 1234567".to_string()),
        uploaded_documents: vec!["registration.pdf".to_string()],
    }
}

pub(super) fn application(id: &str) -> Application {
    Application {
        id: ApplicationId(id.to_string()),
        status: ApplicationStatus::Submitted,
        submitted_at: Utc::now(),
        company_name: "Acme GmbH".to_string(),
        registration_number: "HRB 12345".to_string(),
        country: "Germany".to_string(),
        business_address: "Hauptstrasse 1".to_string(),
        city: "Berlin".to_string(),
        postal_code: "10115".to_string(),
        applicant_name: "Jo".to_string(),
        applicant_role: "Director".to_string(),
        applicant_dob: "1990-04-12".to_string(),
        applicant_email: "jo@acme.example".to_string(),
        applicant_phone: "+49 30 1234567".to_string(),
        admin_notes: String::new(),
        action_required_details: None,
        uploaded_documents: Vec::new(),
    }
}

pub(super) fn configured_smtp() -> Arc<InMemorySmtpConfigRepository> {
    let smtp = Arc::new(InMemorySmtpConfigRepository::default());
    smtp.store(SmtpSettings {
        host: "smtp.example.com".to_string(),
        port: 587,
        username: "mailer".to_string(),
        password: "secret".to_string(),
        ..SmtpSettings::default()
    })
    .expect("store smtp settings");
    smtp
}

pub(super) struct Harness {
    pub(super) service: OnboardingService,
    pub(super) repository: Arc<InMemoryApplicationRepository>,
    pub(super) mailer: Arc<RecordingMailer>,
    pub(super) dispatcher: Arc<NotificationDispatcher>,
}

pub(super) fn harness() -> Harness {
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::new(InMemoryTemplateRepository::seeded()),
        configured_smtp(),
        mailer.clone(),
        BASE_URL,
    ));
    let service = OnboardingService::new(repository.clone(), dispatcher.clone(), ADMIN_EMAIL);
    Harness {
        service,
        repository,
        mailer,
        dispatcher,
    }
}

/// Repository double that reports a configurable number of id conflicts
/// before delegating to an in-memory store.
pub(super) struct CollidingRepository {
    inner: InMemoryApplicationRepository,
    conflicts_left: Mutex<u32>,
}

impl CollidingRepository {
    pub(super) fn new(conflicts: u32) -> Self {
        Self {
            inner: InMemoryApplicationRepository::default(),
            conflicts_left: Mutex::new(conflicts),
        }
    }
}

impl ApplicationRepository for CollidingRepository {
    fn insert(&self, app: Application) -> Result<Application, RepositoryError> {
        let mut left = self.conflicts_left.lock().expect("conflict mutex poisoned");
        if *left > 0 {
            *left -= 1;
            return Err(RepositoryError::Conflict);
        }
        self.inner.insert(app)
    }

    fn update(&self, app: Application) -> Result<(), RepositoryError> {
        self.inner.update(app)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list_all(&self) -> Result<Vec<Application>, RepositoryError> {
        self.inner.list_all()
    }

    fn count(&self) -> Result<u64, RepositoryError> {
        self.inner.count()
    }

    fn count_by_status(&self, status: ApplicationStatus) -> Result<u64, RepositoryError> {
        self.inner.count_by_status(status)
    }
}
