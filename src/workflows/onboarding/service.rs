use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    ActionRequiredDetails, Application, ApplicationId, ApplicationStats, ApplicationStatus,
    SubmissionInput,
};
use super::identifier::generate_application_id;
use super::notification::{
    NotificationDispatcher, TEMPLATE_ADMIN_NEW_APPLICATION, TEMPLATE_APPLICATION_SUBMITTED,
};
use super::repository::{ApplicationRepository, RepositoryError};
use super::validation::{validate_submission, FieldErrors};

/// Identifier collisions are practically absent in a 36^6 space; the retry
/// loop exists so a collision degrades to a regeneration instead of a user
/// visible failure.
const MAX_ID_ATTEMPTS: u32 = 5;

/// Error raised by the onboarding workflow.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("application not found")]
    NotFound,
    #[error("invalid status value")]
    InvalidStatus(String),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for OnboardingError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// The application workflow: validates intake, owns every status transition,
/// and triggers best-effort notifications after each persisted change.
pub struct OnboardingService {
    repository: Arc<dyn ApplicationRepository>,
    dispatcher: Arc<NotificationDispatcher>,
    admin_email: String,
}

impl OnboardingService {
    pub fn new(
        repository: Arc<dyn ApplicationRepository>,
        dispatcher: Arc<NotificationDispatcher>,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            admin_email: admin_email.into(),
        }
    }

    /// Submit a new application. On validation failure the complete field
    /// error map is returned and nothing is persisted. On success the record
    /// starts in `Submitted`, the applicant receives a confirmation, and the
    /// admin address receives an alert; neither email outcome affects the
    /// result.
    pub fn submit(&self, input: SubmissionInput) -> Result<Application, OnboardingError> {
        validate_submission(&input).map_err(OnboardingError::Validation)?;

        let application = Application {
            id: ApplicationId(String::new()),
            status: ApplicationStatus::Submitted,
            submitted_at: Utc::now(),
            company_name: input.company_name.unwrap_or_default(),
            registration_number: input.registration_number.unwrap_or_default(),
            country: input.country.unwrap_or_default(),
            business_address: input.business_address.unwrap_or_default(),
            city: input.city.unwrap_or_default(),
            postal_code: input.postal_code.unwrap_or_default(),
            applicant_name: input.applicant_name.unwrap_or_default(),
            applicant_role: input.applicant_role.unwrap_or_default(),
            applicant_dob: input.applicant_dob.unwrap_or_default(),
            applicant_email: input.applicant_email.unwrap_or_default(),
            applicant_phone: input.applicant_phone.unwrap_or_default(),
            admin_notes: String::new(),
            action_required_details: None,
            uploaded_documents: input.uploaded_documents,
        };

        let stored = self.insert_with_fresh_id(application)?;
        info!(id = %stored.id, company = %stored.company_name, "application submitted");

        self.dispatcher.dispatch(
            TEMPLATE_APPLICATION_SUBMITTED,
            &stored,
            &stored.applicant_email,
        );
        self.dispatcher
            .dispatch(TEMPLATE_ADMIN_NEW_APPLICATION, &stored, &self.admin_email);

        Ok(stored)
    }

    /// Transition an application to `new_status` (any target is legal).
    /// `ActionRequired` attaches the optional details payload; every other
    /// target clears it. The matching status template, when one exists, is
    /// dispatched to the applicant after the write; delivery is best-effort.
    pub fn change_status(
        &self,
        id: &ApplicationId,
        new_status: &str,
        details: Option<ActionRequiredDetails>,
    ) -> Result<Application, OnboardingError> {
        let status = ApplicationStatus::parse(new_status)
            .ok_or_else(|| OnboardingError::InvalidStatus(new_status.to_string()))?;

        let mut application = self
            .repository
            .fetch(id)?
            .ok_or(OnboardingError::NotFound)?;

        application.status = status;
        application.action_required_details = if status == ApplicationStatus::ActionRequired {
            details
        } else {
            None
        };

        self.repository.update(application.clone())?;
        info!(id = %application.id, status = status.label(), "application status changed");

        if let Some(template_key) = status.template_key() {
            self.dispatcher
                .dispatch(template_key, &application, &application.applicant_email);
        }

        Ok(application)
    }

    /// Overwrite the free-text admin notes. No notification side effect.
    pub fn update_notes(
        &self,
        id: &ApplicationId,
        notes: &str,
    ) -> Result<Application, OnboardingError> {
        let mut application = self
            .repository
            .fetch(id)?
            .ok_or(OnboardingError::NotFound)?;

        application.admin_notes = notes.to_string();
        self.repository.update(application.clone())?;

        Ok(application)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<Application, OnboardingError> {
        self.repository
            .fetch(id)?
            .ok_or(OnboardingError::NotFound)
    }

    /// All applications, newest submission first.
    pub fn list_all(&self) -> Result<Vec<Application>, OnboardingError> {
        Ok(self.repository.list_all()?)
    }

    pub fn stats(&self) -> Result<ApplicationStats, OnboardingError> {
        Ok(ApplicationStats {
            total: self.repository.count()?,
            submitted: self
                .repository
                .count_by_status(ApplicationStatus::Submitted)?,
            in_review: self
                .repository
                .count_by_status(ApplicationStatus::InReview)?,
            action_required: self
                .repository
                .count_by_status(ApplicationStatus::ActionRequired)?,
            approved: self
                .repository
                .count_by_status(ApplicationStatus::Approved)?,
            declined: self
                .repository
                .count_by_status(ApplicationStatus::Declined)?,
        })
    }

    pub fn pending_count(&self) -> Result<u64, OnboardingError> {
        Ok(self
            .repository
            .count_by_status(ApplicationStatus::Submitted)?)
    }

    fn insert_with_fresh_id(
        &self,
        mut application: Application,
    ) -> Result<Application, OnboardingError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            application.id = generate_application_id();
            match self.repository.insert(application.clone()) {
                Ok(stored) => return Ok(stored),
                Err(RepositoryError::Conflict) if attempt < MAX_ID_ATTEMPTS => {
                    warn!(id = %application.id, attempt, "application id collision, regenerating");
                }
                Err(err) => return Err(OnboardingError::Repository(err)),
            }
        }
        Err(OnboardingError::Repository(RepositoryError::Conflict))
    }
}
