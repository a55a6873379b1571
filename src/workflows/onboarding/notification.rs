use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::domain::{Application, EmailTemplate, SmtpSettings};
use super::repository::{SmtpConfigRepository, TemplateRepository};

/// Template fired to the applicant when a submission is accepted.
pub const TEMPLATE_APPLICATION_SUBMITTED: &str = "application-submitted";
/// Template fired to the configured admin address on every new submission.
pub const TEMPLATE_ADMIN_NEW_APPLICATION: &str = "admin-new-application";

const TRACKING_PATH: &str = "/#/track/";

/// Upper bound on retained delivery records; the oldest entries are dropped
/// once the log is full.
pub const DELIVERY_LOG_CAP: usize = 256;

/// A rendered message ready for hand-off to the mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub to_name: String,
    pub subject: String,
    pub body: String,
    pub from_name: String,
    pub from_address: String,
}

/// Mail transport failure.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// Pluggable mail-sending capability. Raw SMTP plumbing lives behind this
/// trait; the dispatcher only decides what to send and records the outcome.
pub trait Mailer: Send + Sync {
    fn send(&self, settings: &SmtpSettings, mail: &OutgoingEmail) -> Result<(), MailError>;
}

/// How a single dispatch attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryDisposition {
    Sent,
    /// Delivery skipped because no SMTP host is configured. Reported as a
    /// best-effort success to workflow callers.
    SkippedNoSmtpHost,
    TemplateMissing,
    Failed(String),
}

/// Delivery-log entry: every attempt is recorded independently of the
/// triggering operation's outcome.
#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub template_key: String,
    pub recipient: String,
    pub disposition: DeliveryDisposition,
    pub attempted_at: DateTime<Utc>,
}

/// Resolves templates, substitutes placeholders, and hands rendered mail to
/// the transport. Never raises delivery problems to its caller; failures are
/// logged and recorded in the delivery log.
pub struct NotificationDispatcher {
    templates: Arc<dyn TemplateRepository>,
    smtp: Arc<dyn SmtpConfigRepository>,
    mailer: Arc<dyn Mailer>,
    base_url: String,
    log: Mutex<Vec<DeliveryRecord>>,
}

impl NotificationDispatcher {
    pub fn new(
        templates: Arc<dyn TemplateRepository>,
        smtp: Arc<dyn SmtpConfigRepository>,
        mailer: Arc<dyn Mailer>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            templates,
            smtp,
            mailer,
            base_url: base_url.into(),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Render the template addressed by `template_key` for `application` and
    /// deliver it to `recipient`. Returns whether the notification should be
    /// considered successfully attempted.
    pub fn dispatch(&self, template_key: &str, application: &Application, recipient: &str) -> bool {
        let template = match self.templates.get(template_key) {
            Ok(Some(template)) => template,
            Ok(None) => {
                warn!(template_key, "email template not found");
                self.record(template_key, recipient, DeliveryDisposition::TemplateMissing);
                return false;
            }
            Err(err) => {
                error!(template_key, %err, "failed to load email template");
                self.record(
                    template_key,
                    recipient,
                    DeliveryDisposition::Failed(err.to_string()),
                );
                return false;
            }
        };

        let subject = render_placeholders(&template.subject, application, &self.base_url);
        let body = render_placeholders(&template.body, application, &self.base_url);
        let disposition = self.deliver(OutgoingEmail {
            to: recipient.to_string(),
            to_name: application.applicant_name.clone(),
            subject,
            body,
            from_name: String::new(),
            from_address: String::new(),
        });

        let outcome = matches!(
            disposition,
            DeliveryDisposition::Sent | DeliveryDisposition::SkippedNoSmtpHost
        );
        self.record(template_key, recipient, disposition);
        outcome
    }

    /// Send a fixed test message. Unlike workflow notifications, a skipped
    /// delivery counts as failure here: the whole point is verifying the
    /// SMTP configuration.
    pub fn send_test(&self, recipient: &str) -> bool {
        let disposition = self.deliver(OutgoingEmail {
            to: recipient.to_string(),
            to_name: String::new(),
            subject: "VERCUL Test Email".to_string(),
            body: "This is a test email from the VERCUL Business Onboarding system. \
                   If you received this, your SMTP configuration is working correctly!"
                .to_string(),
            from_name: String::new(),
            from_address: String::new(),
        });
        let outcome = disposition == DeliveryDisposition::Sent;
        self.record("test-email", recipient, disposition);
        outcome
    }

    /// Snapshot of every recorded dispatch attempt, oldest first.
    pub fn delivery_log(&self) -> Vec<DeliveryRecord> {
        self.log.lock().expect("delivery log mutex poisoned").clone()
    }

    fn deliver(&self, mut mail: OutgoingEmail) -> DeliveryDisposition {
        let settings = match self.smtp.load() {
            Ok(settings) => settings.unwrap_or_default(),
            Err(err) => {
                error!(%err, "failed to load SMTP settings");
                return DeliveryDisposition::Failed(err.to_string());
            }
        };

        if settings.host.is_empty() {
            warn!(to = %mail.to, "no SMTP host configured, skipping delivery");
            return DeliveryDisposition::SkippedNoSmtpHost;
        }

        mail.from_name = settings.from_name.clone();
        mail.from_address = settings.from_address.clone();

        match self.mailer.send(&settings, &mail) {
            Ok(()) => {
                info!(to = %mail.to, subject = %mail.subject, "notification delivered");
                DeliveryDisposition::Sent
            }
            Err(err) => {
                error!(to = %mail.to, %err, "notification delivery failed");
                DeliveryDisposition::Failed(err.to_string())
            }
        }
    }

    fn record(&self, template_key: &str, recipient: &str, disposition: DeliveryDisposition) {
        let mut log = self.log.lock().expect("delivery log mutex poisoned");
        log.push(DeliveryRecord {
            template_key: template_key.to_string(),
            recipient: recipient.to_string(),
            disposition,
            attempted_at: Utc::now(),
        });
        if log.len() > DELIVERY_LOG_CAP {
            let overflow = log.len() - DELIVERY_LOG_CAP;
            log.drain(..overflow);
        }
    }
}

/// Substitute the recognized `{{token}}` placeholders. Unrecognized tokens
/// are left verbatim.
pub fn render_placeholders(text: &str, application: &Application, base_url: &str) -> String {
    let tracking_link = format!("{base_url}{TRACKING_PATH}{}", application.id);
    let replacements = [
        ("{{applicantName}}", application.applicant_name.as_str()),
        ("{{applicationId}}", application.id.0.as_str()),
        ("{{companyName}}", application.company_name.as_str()),
        ("{{applicantEmail}}", application.applicant_email.as_str()),
        ("{{country}}", application.country.as_str()),
        ("{{trackingLink}}", tracking_link.as_str()),
    ];

    let mut rendered = text.to_string();
    for (token, value) in replacements {
        rendered = rendered.replace(token, value);
    }
    rendered
}

/// Templates seeded at startup; editable afterwards through the settings
/// surface.
pub fn default_templates() -> Vec<EmailTemplate> {
    vec![
        EmailTemplate {
            id: TEMPLATE_APPLICATION_SUBMITTED.to_string(),
            name: "Application Submitted".to_string(),
            subject: "We received your application {{applicationId}}".to_string(),
            body: "Hi {{applicantName}},\n\nThanks for applying on behalf of {{companyName}}. \
                   Your application id is {{applicationId}}. Track its progress at {{trackingLink}}.\n\n\
                   The VERCUL Team"
                .to_string(),
        },
        EmailTemplate {
            id: TEMPLATE_ADMIN_NEW_APPLICATION.to_string(),
            name: "Admin: New Application".to_string(),
            subject: "New application {{applicationId}} from {{companyName}}".to_string(),
            body: "A new business application was submitted.\n\nCompany: {{companyName}}\n\
                   Applicant: {{applicantName}} ({{applicantEmail}})\nCountry: {{country}}\n\
                   Id: {{applicationId}}"
                .to_string(),
        },
        EmailTemplate {
            id: "application-in-review".to_string(),
            name: "Application In Review".to_string(),
            subject: "Your application {{applicationId}} is in review".to_string(),
            body: "Hi {{applicantName}},\n\nYour application is now being reviewed by our team. \
                   Track its progress at {{trackingLink}}.\n\nThe VERCUL Team"
                .to_string(),
        },
        EmailTemplate {
            id: "application-action-required".to_string(),
            name: "Action Required".to_string(),
            subject: "Action required on application {{applicationId}}".to_string(),
            body: "Hi {{applicantName}},\n\nWe need additional information to continue with your \
                   application. Please visit {{trackingLink}} for details.\n\nThe VERCUL Team"
                .to_string(),
        },
        EmailTemplate {
            id: "application-approved".to_string(),
            name: "Application Approved".to_string(),
            subject: "Your application {{applicationId}} has been approved".to_string(),
            body: "Hi {{applicantName}},\n\nGreat news: the application for {{companyName}} has \
                   been approved. Welcome aboard!\n\nThe VERCUL Team"
                .to_string(),
        },
        EmailTemplate {
            id: "application-declined".to_string(),
            name: "Application Declined".to_string(),
            subject: "Update on your application {{applicationId}}".to_string(),
            body: "Hi {{applicantName}},\n\nAfter careful review we are unable to approve the \
                   application for {{companyName}} at this time.\n\nThe VERCUL Team"
                .to_string(),
        },
    ]
}
