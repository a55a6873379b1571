use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::domain::SubmissionInput;

/// Field name to human-readable message, covering every failing field.
pub type FieldErrors = BTreeMap<String, String>;

/// Accumulating validation gate. Every rule records its failure and moves on,
/// so a single pass reports the complete set of problems.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails on absent or empty values. The literal string `"0"` is present
    /// and must pass.
    pub fn required(&mut self, field: &str, value: Option<&str>) -> bool {
        match value {
            Some(raw) if !raw.is_empty() => true,
            _ => {
                self.errors
                    .insert(field.to_string(), format!("{} is required", ucfirst(field)));
                false
            }
        }
    }

    pub fn email(&mut self, field: &str, value: &str) -> bool {
        if is_email(value) {
            true
        } else {
            self.errors
                .insert(field.to_string(), "Invalid email format".to_string());
            false
        }
    }

    /// Exact `YYYY-MM-DD` only: the value must parse and format back to
    /// itself, so calendar-invalid dates like `2023-02-30` and unpadded
    /// inputs both fail.
    pub fn date(&mut self, field: &str, value: &str) -> bool {
        let round_trips = NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|date| date.format("%Y-%m-%d").to_string() == value)
            .unwrap_or(false);
        if round_trips {
            true
        } else {
            self.errors.insert(
                field.to_string(),
                "Invalid date format. Use YYYY-MM-DD".to_string(),
            );
            false
        }
    }

    pub fn phone(&mut self, field: &str, value: &str) -> bool {
        if is_phone(value) {
            true
        } else {
            self.errors
                .insert(field.to_string(), "Invalid phone number format".to_string());
            false
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

/// Validate a public submission: all company/applicant fields required, plus
/// format rules on email, date of birth, and phone.
pub fn validate_submission(input: &SubmissionInput) -> Result<(), FieldErrors> {
    let mut validator = Validator::new();

    let required_fields: [(&str, Option<&str>); 11] = [
        ("companyName", input.company_name.as_deref()),
        ("registrationNumber", input.registration_number.as_deref()),
        ("country", input.country.as_deref()),
        ("businessAddress", input.business_address.as_deref()),
        ("city", input.city.as_deref()),
        ("postalCode", input.postal_code.as_deref()),
        ("applicantName", input.applicant_name.as_deref()),
        ("applicantRole", input.applicant_role.as_deref()),
        ("applicantDob", input.applicant_dob.as_deref()),
        ("applicantEmail", input.applicant_email.as_deref()),
        ("applicantPhone", input.applicant_phone.as_deref()),
    ];

    for (field, value) in required_fields {
        validator.required(field, value);
    }

    if let Some(email) = input.applicant_email.as_deref() {
        validator.email("applicantEmail", email);
    }
    if let Some(dob) = input.applicant_dob.as_deref() {
        validator.date("applicantDob", dob);
    }
    if let Some(phone) = input.applicant_phone.as_deref() {
        validator.phone("applicantPhone", phone);
    }

    if validator.has_errors() {
        Err(validator.into_errors())
    } else {
        Ok(())
    }
}

fn ucfirst(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Local-part `@` domain, where the domain carries at least one interior dot
/// and every label is non-empty.
fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    domain
        .split('.')
        .all(|label| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
}

/// Digits plus an optional leading `+`, spaces, hyphens, and parentheses.
fn is_phone(value: &str) -> bool {
    if value.is_empty() || value == "+" {
        return false;
    }
    value.char_indices().all(|(index, c)| match c {
        '+' => index == 0,
        '0'..='9' | ' ' | '-' | '(' | ')' => true,
        _ => false,
    })
}
