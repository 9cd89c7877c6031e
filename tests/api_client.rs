mod common;

use common::{Behavior, MockBackend};
use nurture::api::{ComplimentApi, ComplimentRequest, EmailRequest, LlmService};
use nurture::form::{Relationship, Tone};
use nurture::{ClientError, Result};

fn alice(context: Option<&str>) -> ComplimentRequest {
    ComplimentRequest {
        recipient_name: "Alice".to_string(),
        relationship: Relationship::Friend,
        qualities: vec!["creative".to_string(), "persistent".to_string()],
        context: context.map(str::to_string),
        tone: Tone::Warm,
    }
}

fn email() -> EmailRequest {
    EmailRequest {
        recipient_email: "test@example.com".to_string(),
        recipient_name: "Test".to_string(),
        sender_name: "Test".to_string(),
        compliment: "Test compliment".to_string(),
    }
}

#[tokio::test]
async fn generates_with_and_without_context() -> Result<()> {
    let backend = MockBackend::start(Behavior::Healthy).await;
    let api = backend.client();

    let with = api
        .generate_compliment(&alice(Some("finished a challenging project")))
        .await?;
    assert!(with.mentions("Alice"));
    assert_eq!(with.generated_at.as_deref(), Some("2025-01-31T09:15:42.123456"));
    assert_eq!(with.extra["model"], "llama3.2:1b");

    let without = api.generate_compliment(&alice(None)).await?;
    assert!(without.mentions("Alice"));

    let bodies = backend.generate_bodies();
    assert_eq!(bodies[0]["context"], "finished a challenging project");
    assert_eq!(bodies[0]["relationship"], "friend");
    assert_eq!(bodies[0]["tone"], "warm");
    assert!(bodies[1].get("context").is_none());
    Ok(())
}

#[tokio::test]
async fn blank_context_is_not_sent() -> Result<()> {
    let backend = MockBackend::start(Behavior::Healthy).await;
    backend.client().generate_compliment(&alice(Some("   "))).await?;
    assert!(backend.generate_bodies()[0].get("context").is_none());
    Ok(())
}

#[tokio::test]
async fn health_reports_services_without_credentials() -> Result<()> {
    let backend = MockBackend::start(Behavior::Healthy).await;
    let health = backend.client().check_health().await?;
    assert_eq!(health.version, "1.2.0");
    assert_eq!(health.llm.service, LlmService::Ollama);
    assert!(!health.llm.installed_models.is_empty());
    assert!(health.email_service.leaked_credentials().is_empty());
    assert!(health.email_service.ready());
    Ok(())
}

#[tokio::test]
async fn leaked_credentials_are_detected_and_not_echoed() -> Result<()> {
    let backend = MockBackend::start(Behavior::LeakCredentials).await;
    let health = backend.client().check_health().await?;
    assert_eq!(
        health.email_service.leaked_credentials(),
        vec!["smtp_user", "smtp_password"]
    );
    let echoed = serde_json::to_string(&health).unwrap();
    assert!(!echoed.contains("hunter2"));
    Ok(())
}

#[tokio::test]
async fn models_are_listed() -> Result<()> {
    let backend = MockBackend::start(Behavior::Healthy).await;
    let models = backend.client().list_models().await?;
    assert!(models.available);
    assert_eq!(models.installed_models.len(), 2);
    assert_eq!(models.service, Some(LlmService::Ollama));
    Ok(())
}

#[tokio::test]
async fn send_email_answers_either_way() -> Result<()> {
    let backend = MockBackend::start(Behavior::Healthy).await;
    let sent = backend.client().send_email(&email()).await?;
    assert!(sent.success);
    assert_eq!(sent.message, "Compliment sent to test@example.com");

    let backend = MockBackend::start(Behavior::EmailNotConfigured).await;
    let soft = backend.client().send_email(&email()).await?;
    assert!(!soft.success);
    assert_eq!(
        soft.into_delivery(),
        Err(ClientError::EmailSoftFailure("Email service not configured".into()))
    );
    assert_eq!(backend.email_bodies()[0]["sender_name"], "Test");
    Ok(())
}

#[tokio::test]
async fn rejected_address_carries_the_server_message() {
    let backend = MockBackend::start(Behavior::EmailAddressRejected).await;
    let mut request = email();
    request.recipient_email = "a@b..c".to_string();
    let err = backend.client().send_email(&request).await.unwrap_err();
    assert_eq!(err, ClientError::EmailRejected("value is not a valid email address".into()));
    assert_eq!(err.user_message(), "value is not a valid email address");
}

#[tokio::test]
async fn structured_generation_errors_keep_the_backend_message() {
    let backend = MockBackend::start(Behavior::GenerateDetail500).await;
    let err = backend.client().generate_compliment(&alice(None)).await.unwrap_err();
    assert_eq!(err, ClientError::GenerationFailed("Model llama3.2:1b is not loaded".into()));

    let backend = MockBackend::start(Behavior::GenerateSoftFailure).await;
    let err = backend.client().generate_compliment(&alice(None)).await.unwrap_err();
    assert_eq!(err, ClientError::GenerationFailed("LLM produced an empty reply".into()));
}

#[tokio::test]
async fn gateway_errors_are_unavailable() {
    let backend = MockBackend::start(Behavior::BadGateway).await;
    let api = backend.client();
    assert!(matches!(
        api.generate_compliment(&alice(None)).await,
        Err(ClientError::ServiceUnavailable(_))
    ));
    assert!(matches!(api.check_health().await, Err(ClientError::ServiceUnavailable(_))));
    assert!(matches!(api.send_email(&email()).await, Err(ClientError::ServiceUnavailable(_))));
}

#[tokio::test]
async fn wrong_shapes_are_unexpected() {
    let backend = MockBackend::start(Behavior::Malformed).await;
    let api = backend.client();
    assert!(matches!(api.check_health().await, Err(ClientError::UnexpectedResponse(_))));
    assert!(matches!(api.list_models().await, Err(ClientError::UnexpectedResponse(_))));
    assert!(matches!(
        api.generate_compliment(&alice(None)).await,
        Err(ClientError::UnexpectedResponse(_))
    ));
}

#[tokio::test]
async fn timeouts_are_unavailable() {
    let backend = MockBackend::start(Behavior::Slow).await;
    let api = backend.impatient_client();
    let err = api.generate_compliment(&alice(None)).await.unwrap_err();
    assert!(matches!(err, ClientError::ServiceUnavailable(_)), "{err:?}");
    assert_eq!(err.user_message(), nurture::error::TRY_AGAIN_MESSAGE);
}

#[tokio::test]
async fn unreachable_backend_is_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let api = nurture::api::ApiClient::new(Some(&url)).unwrap();
    assert!(matches!(api.check_health().await, Err(ClientError::ServiceUnavailable(_))));
}
