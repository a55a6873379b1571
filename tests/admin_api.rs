//! Integration specifications for the admin surface: password sessions,
//! site-display settings, notification templates, and the SMTP singleton.

mod common {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, Response, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use vercul_onboarding::admin::{
        hash_password, AdminAuthService, AdminCredentialRepository, SettingsService,
    };
    use vercul_onboarding::http::{router, AppState};
    use vercul_onboarding::infra::{
        InMemoryAdminCredentialRepository, InMemoryApplicationRepository,
        InMemoryPortalSettingsRepository, InMemorySmtpConfigRepository,
        InMemoryTemplateRepository, RecordingMailer,
    };
    use vercul_onboarding::workflows::onboarding::{NotificationDispatcher, OnboardingService};

    pub(super) const ADMIN_EMAIL: &str = "admin@vercul.com";
    pub(super) const ADMIN_PASSWORD: &str = "letmein";

    pub(super) struct Portal {
        pub(super) router: Router,
        pub(super) smtp: Arc<InMemorySmtpConfigRepository>,
        pub(super) mailer: Arc<RecordingMailer>,
    }

    pub(super) fn portal() -> Portal {
        let templates = Arc::new(InMemoryTemplateRepository::seeded());
        let smtp = Arc::new(InMemorySmtpConfigRepository::default());
        let credentials = Arc::new(InMemoryAdminCredentialRepository::default());
        credentials
            .store_hash(&hash_password(ADMIN_PASSWORD))
            .expect("store admin hash");
        let mailer = Arc::new(RecordingMailer::default());

        let dispatcher = Arc::new(NotificationDispatcher::new(
            templates.clone(),
            smtp.clone(),
            mailer.clone(),
            "http://localhost:8080",
        ));
        let state = AppState {
            onboarding: Arc::new(OnboardingService::new(
                Arc::new(InMemoryApplicationRepository::default()),
                dispatcher.clone(),
                ADMIN_EMAIL,
            )),
            auth: Arc::new(AdminAuthService::new(credentials)),
            settings: Arc::new(SettingsService::new(
                Arc::new(InMemoryPortalSettingsRepository::default()),
                templates,
                smtp.clone(),
                dispatcher,
                ADMIN_EMAIL,
            )),
            readiness: Arc::new(AtomicBool::new(true)),
        };

        Portal {
            router: router(state),
            smtp,
            mailer,
        }
    }

    pub(super) async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&body).expect("serialize request body"),
                ))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        router.clone().oneshot(request).await.expect("dispatch")
    }

    pub(super) async fn read_json(response: Response<Body>) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json body")
    }

    pub(super) async fn login(router: &Router) -> String {
        let response = send(
            router,
            "POST",
            "/auth/verify",
            None,
            Some(json!({ "password": ADMIN_PASSWORD })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        read_json(response).await["data"]["token"]
            .as_str()
            .expect("session token")
            .to_string()
    }
}

mod sessions {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn verify_issues_token_for_correct_password() {
        let portal = portal();
        let response = send(
            &portal.router,
            "POST",
            "/auth/verify",
            None,
            Some(json!({ "password": ADMIN_PASSWORD })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let payload = read_json(response).await;
        assert_eq!(payload["message"], json!("Authentication successful"));
        assert_eq!(payload["data"]["authenticated"], json!(true));
        assert!(payload["data"]["token"].as_str().is_some());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let portal = portal();
        let response = send(
            &portal.router,
            "POST",
            "/auth/verify",
            None,
            Some(json!({ "password": "nope" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let payload = read_json(response).await;
        assert_eq!(payload["success"], json!(false));
        assert_eq!(payload["message"], json!("Invalid password"));
    }

    #[tokio::test]
    async fn check_reflects_token_state() {
        let portal = portal();
        let token = login(&portal.router).await;

        let response = send(&portal.router, "GET", "/auth/check", Some(&token), None).await;
        let payload = read_json(response).await;
        assert_eq!(payload["data"]["authenticated"], json!(true));

        let response = send(&portal.router, "GET", "/auth/check", None, None).await;
        let payload = read_json(response).await;
        assert_eq!(payload["data"]["authenticated"], json!(false));

        let response = send(
            &portal.router,
            "GET",
            "/auth/check",
            Some("forged-token"),
            None,
        )
        .await;
        let payload = read_json(response).await;
        assert_eq!(payload["data"]["authenticated"], json!(false));
    }

    #[tokio::test]
    async fn logout_revokes_session() {
        let portal = portal();
        let token = login(&portal.router).await;

        let response = send(&portal.router, "POST", "/auth/logout", Some(&token), None).await;
        let payload = read_json(response).await;
        assert_eq!(payload["message"], json!("Logged out successfully"));

        let response = send(&portal.router, "GET", "/auth/check", Some(&token), None).await;
        let payload = read_json(response).await;
        assert_eq!(payload["data"]["authenticated"], json!(false));
    }

    #[tokio::test]
    async fn update_password_requires_live_session() {
        let portal = portal();
        let response = send(
            &portal.router,
            "POST",
            "/auth/update-password",
            None,
            Some(json!({ "newPassword": "new-pass" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let token = login(&portal.router).await;
        let response = send(
            &portal.router,
            "POST",
            "/auth/update-password",
            Some(&token),
            Some(json!({ "newPassword": "abc" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &portal.router,
            "POST",
            "/auth/update-password",
            Some(&token),
            Some(json!({ "newPassword": "new-pass" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &portal.router,
            "POST",
            "/auth/verify",
            None,
            Some(json!({ "password": ADMIN_PASSWORD })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(
            &portal.router,
            "POST",
            "/auth/verify",
            None,
            Some(json!({ "password": "new-pass" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

mod site_settings {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn frontend_settings_default_until_saved() {
        let portal = portal();
        let response = send(&portal.router, "GET", "/settings/frontend", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload["data"]["seoTitle"], json!("VERCUL | €500 Bonus"));

        let response = send(
            &portal.router,
            "POST",
            "/settings/frontend",
            None,
            Some(json!({ "seoTitle": "New Title", "primaryColor": "#000000" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload["message"], json!("Settings saved successfully"));

        let response = send(&portal.router, "GET", "/settings/frontend", None, None).await;
        let payload = read_json(response).await;
        assert_eq!(payload["data"]["seoTitle"], json!("New Title"));
        assert!(payload["data"].get("contactEmail").is_none());
    }

    #[tokio::test]
    async fn frontend_settings_reject_non_object_payload() {
        let portal = portal();
        let response = send(
            &portal.router,
            "POST",
            "/settings/frontend",
            None,
            Some(json!(["not", "an", "object"])),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json(response).await;
        assert_eq!(payload["message"], json!("Invalid settings data"));
    }
}

mod templates {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn seeded_templates_are_listed() {
        let portal = portal();
        let response = send(
            &portal.router,
            "GET",
            "/settings/email-templates",
            None,
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let payload = read_json(response).await;
        let templates = payload["data"].as_array().expect("template array");
        assert_eq!(templates.len(), 6);
        assert!(templates
            .iter()
            .any(|template| template["id"] == json!("application-approved")));
    }

    #[tokio::test]
    async fn known_template_can_be_edited() {
        let portal = portal();
        let response = send(
            &portal.router,
            "POST",
            "/settings/email-templates",
            None,
            Some(json!({
                "id": "application-approved",
                "name": "Application Approved",
                "subject": "Welcome to VERCUL, {{applicantName}}",
                "body": "You are in."
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(
            payload["message"],
            json!("Email template updated successfully")
        );

        let response = send(
            &portal.router,
            "GET",
            "/settings/email-templates",
            None,
            None,
        )
        .await;
        let payload = read_json(response).await;
        let updated = payload["data"]
            .as_array()
            .expect("template array")
            .iter()
            .find(|template| template["id"] == json!("application-approved"))
            .expect("approved template present")
            .clone();
        assert_eq!(
            updated["subject"],
            json!("Welcome to VERCUL, {{applicantName}}")
        );
    }

    #[tokio::test]
    async fn empty_subject_or_body_is_rejected() {
        let portal = portal();
        let response = send(
            &portal.router,
            "POST",
            "/settings/email-templates",
            None,
            Some(json!({
                "id": "application-approved",
                "name": "Application Approved",
                "subject": "",
                "body": ""
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json(response).await;
        assert_eq!(
            payload["message"],
            json!("Missing required fields: id, subject, body")
        );

        let response = send(
            &portal.router,
            "GET",
            "/settings/email-templates",
            None,
            None,
        )
        .await;
        let payload = read_json(response).await;
        let kept = payload["data"]
            .as_array()
            .expect("template array")
            .iter()
            .find(|template| template["id"] == json!("application-approved"))
            .expect("approved template present")
            .clone();
        assert_ne!(kept["subject"], json!(""));
    }

    #[tokio::test]
    async fn unknown_template_key_is_rejected() {
        let portal = portal();
        let response = send(
            &portal.router,
            "POST",
            "/settings/email-templates",
            None,
            Some(json!({
                "id": "no-such-template",
                "name": "Mystery",
                "subject": "s",
                "body": "b"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let payload = read_json(response).await;
        assert_eq!(
            payload["message"],
            json!("Unknown email template 'no-such-template'")
        );
    }
}

mod smtp {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use vercul_onboarding::workflows::onboarding::SmtpConfigRepository;

    #[tokio::test]
    async fn password_is_masked_on_read_and_kept_on_masked_write() {
        let portal = portal();
        let response = send(
            &portal.router,
            "POST",
            "/settings/smtp",
            None,
            Some(json!({
                "host": "smtp.example.com",
                "port": 587,
                "username": "mailer",
                "password": "secret",
                "security": "starttls",
                "fromName": "VERCUL Support",
                "fromAddress": "no-reply@vercul.com"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&portal.router, "GET", "/settings/smtp", None, None).await;
        let payload = read_json(response).await;
        assert_eq!(payload["data"]["host"], json!("smtp.example.com"));
        assert_eq!(payload["data"]["password"], json!("********"));

        let response = send(
            &portal.router,
            "POST",
            "/settings/smtp",
            None,
            Some(json!({
                "host": "smtp.example.org",
                "port": 465,
                "username": "mailer",
                "password": "********",
                "security": "ssl",
                "fromName": "VERCUL Support",
                "fromAddress": "no-reply@vercul.com"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let stored = portal
            .smtp
            .load()
            .expect("load smtp settings")
            .expect("settings stored");
        assert_eq!(stored.host, "smtp.example.org");
        assert_eq!(stored.port, 465);
        assert_eq!(stored.password, "secret");
    }

    #[tokio::test]
    async fn save_rejects_empty_host_and_username() {
        let portal = portal();
        let response = send(
            &portal.router,
            "POST",
            "/settings/smtp",
            None,
            Some(json!({
                "host": "",
                "port": 587,
                "username": "",
                "password": "secret"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let payload = read_json(response).await;
        assert_eq!(payload["success"], json!(false));
        assert_eq!(
            payload["message"],
            json!("Missing required fields: host, port, username")
        );
        assert!(portal
            .smtp
            .load()
            .expect("load smtp settings")
            .is_none());
    }

    #[tokio::test]
    async fn unconfigured_read_returns_empty_password() {
        let portal = portal();
        let response = send(&portal.router, "GET", "/settings/smtp", None, None).await;
        let payload = read_json(response).await;
        assert_eq!(payload["data"]["host"], json!(""));
        assert_eq!(payload["data"]["password"], json!(""));
        assert_eq!(payload["data"]["port"], json!(587));
    }

    #[tokio::test]
    async fn test_email_fails_without_configured_host() {
        let portal = portal();
        let response = send(&portal.router, "POST", "/settings/test-email", None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let payload = read_json(response).await;
        assert_eq!(
            payload["message"],
            json!("Failed to send test email. Check SMTP configuration.")
        );
        assert!(portal.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_email_goes_to_requested_or_admin_recipient() {
        let portal = portal();
        send(
            &portal.router,
            "POST",
            "/settings/smtp",
            None,
            Some(json!({
                "host": "smtp.example.com",
                "port": 587,
                "username": "mailer",
                "password": "secret"
            })),
        )
        .await;

        let response = send(&portal.router, "POST", "/settings/test-email", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(
            payload["message"],
            json!(format!("Test email sent successfully to {ADMIN_EMAIL}"))
        );

        let response = send(
            &portal.router,
            "POST",
            "/settings/test-email",
            None,
            Some(json!({ "email": "ops@vercul.com" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let sent = portal.mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, ADMIN_EMAIL);
        assert_eq!(sent[1].to, "ops@vercul.com");
        assert_eq!(sent[1].subject, "VERCUL Test Email");
    }
}
