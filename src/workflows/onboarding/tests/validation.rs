use super::common::submission;
use crate::workflows::onboarding::validation::{validate_submission, Validator};
use crate::workflows::onboarding::SubmissionInput;

#[test]
fn valid_submission_passes() {
    assert!(validate_submission(&submission()).is_ok());
}

#[test]
fn reports_every_failing_field_in_one_pass() {
    let mut input = submission();
    input.company_name = None;
    input.applicant_email = Some("not-an-email".to_string());
    input.applicant_phone = Some("abc123".to_string());

    let errors = validate_submission(&input).expect_err("invalid submission");
    assert_eq!(errors.get("companyName").map(String::as_str), Some("CompanyName is required"));
    assert_eq!(errors.get("applicantEmail").map(String::as_str), Some("Invalid email format"));
    assert_eq!(
        errors.get("applicantPhone").map(String::as_str),
        Some("Invalid phone number format")
    );
    assert_eq!(errors.len(), 3);
}

#[test]
fn empty_submission_flags_all_required_fields() {
    let errors = validate_submission(&SubmissionInput::default()).expect_err("empty submission");
    for field in [
        "companyName",
        "registrationNumber",
        "country",
        "businessAddress",
        "city",
        "postalCode",
        "applicantName",
        "applicantRole",
        "applicantDob",
        "applicantEmail",
        "applicantPhone",
    ] {
        assert!(errors.contains_key(field), "missing error for {field}");
    }
}

#[test]
fn required_accepts_literal_zero() {
    let mut validator = Validator::new();
    assert!(validator.required("registrationNumber", Some("0")));
    assert!(!validator.has_errors());
}

#[test]
fn required_rejects_empty_and_absent() {
    let mut validator = Validator::new();
    assert!(!validator.required("companyName", Some("")));
    assert!(!validator.required("country", None));
    assert_eq!(validator.into_errors().len(), 2);
}

#[test]
fn date_requires_exact_round_trip() {
    let mut validator = Validator::new();
    assert!(validator.date("applicantDob", "2023-02-28"));
    assert!(!validator.date("applicantDob", "2023-02-30"));
    assert!(!validator.date("applicantDob", "2023-13-01"));
    assert!(!validator.date("applicantDob", "2023-2-3"));
    assert!(!validator.date("applicantDob", "28-02-2023"));
}

#[test]
fn phone_allows_international_formatting() {
    let mut validator = Validator::new();
    assert!(validator.phone("applicantPhone", "+44 20 8275 6432"));
    assert!(validator.phone("applicantPhone", "(030) 123-4567"));
    assert!(!validator.phone("applicantPhone", "abc123"));
    assert!(!validator.phone("applicantPhone", "12+34"));
    assert!(!validator.phone("applicantPhone", "+"));
}

#[test]
fn email_requires_dotted_domain() {
    let mut validator = Validator::new();
    assert!(validator.email("applicantEmail", "jo@acme.example"));
    assert!(!validator.email("applicantEmail", "jo@localhost"));
    assert!(!validator.email("applicantEmail", "@acme.example"));
    assert!(!validator.email("applicantEmail", "jo doe@acme.example"));
    assert!(!validator.email("applicantEmail", "jo@.example"));
}
