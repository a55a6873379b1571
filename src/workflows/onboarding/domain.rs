use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for onboarding applications (`VC-BIZ-XXXXXX`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of an application. Any direct transition between states is
/// legal; `ActionRequired` is the only state carrying extra payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Submitted,
    #[serde(rename = "In Review")]
    InReview,
    #[serde(rename = "Action Required")]
    ActionRequired,
    Approved,
    Declined,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::InReview,
        ApplicationStatus::ActionRequired,
        ApplicationStatus::Approved,
        ApplicationStatus::Declined,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::InReview => "In Review",
            ApplicationStatus::ActionRequired => "Action Required",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Declined => "Declined",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == label)
    }

    /// Notification template fired when an application enters this state.
    /// `Submitted` has no transition template; submission confirmations are
    /// dispatched by the submit operation itself.
    pub const fn template_key(self) -> Option<&'static str> {
        match self {
            ApplicationStatus::Submitted => None,
            ApplicationStatus::InReview => Some("application-in-review"),
            ApplicationStatus::ActionRequired => Some("application-action-required"),
            ApplicationStatus::Approved => Some("application-approved"),
            ApplicationStatus::Declined => Some("application-declined"),
        }
    }
}

/// Payload attached when a reviewer requests further action from the applicant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequiredDetails {
    pub message: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
}

/// A persisted onboarding application. Company and applicant fields are
/// immutable after creation; only status, the action-required payload, and
/// admin notes change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub company_name: String,
    pub registration_number: String,
    pub country: String,
    pub business_address: String,
    pub city: String,
    pub postal_code: String,
    pub applicant_name: String,
    pub applicant_role: String,
    pub applicant_dob: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    #[serde(default)]
    pub admin_notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_required_details: Option<ActionRequiredDetails>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uploaded_documents: Vec<String>,
}

/// Raw intake payload as submitted by the public form. Fields are optional
/// strings so the validation gate can report every missing or malformed field
/// in one pass instead of failing at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionInput {
    pub company_name: Option<String>,
    pub registration_number: Option<String>,
    pub country: Option<String>,
    pub business_address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub applicant_name: Option<String>,
    pub applicant_role: Option<String>,
    pub applicant_dob: Option<String>,
    pub applicant_email: Option<String>,
    pub applicant_phone: Option<String>,
    #[serde(default)]
    pub uploaded_documents: Vec<String>,
}

/// A stored notification template, addressed by its logical event key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub body: String,
}

/// Transport security for outbound mail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    None,
    Ssl,
    #[default]
    Starttls,
}

/// Singleton SMTP configuration. The password is write-only: readers receive
/// a masked value, and writes carrying the mask keep the stored secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub security: SmtpSecurity,
    pub from_name: String,
    pub from_address: String,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            username: String::new(),
            password: String::new(),
            security: SmtpSecurity::Starttls,
            from_name: "VERCUL Support".to_string(),
            from_address: "no-reply@vercul.com".to_string(),
        }
    }
}

/// Per-status application counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub total: u64,
    pub submitted: u64,
    pub in_review: u64,
    pub action_required: u64,
    pub approved: u64,
    pub declined: u64,
}
