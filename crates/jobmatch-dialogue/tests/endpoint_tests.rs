mod common;

use std::sync::Arc;

use common::{job, resolver_over, resolver_with, QueryFailingEmbedder};
use jobmatch_core::session_details::SessionDetails;
use jobmatch_core::{ChatRequest, Sender};
use jobmatch_dialogue::endpoint::INTERNAL_ERROR;
use jobmatch_dialogue::resolver::{FALLBACK, HELP};
use jobmatch_dialogue::ChatService;

fn corpus() -> Vec<jobmatch_core::JobRecord> {
    vec![job("Data Analyst", "Acme", ""), job("Chef", "Bistro", "")]
}

#[tokio::test]
async fn successful_turn_is_200() -> anyhow::Result<()> {
    let service = ChatService::new(Arc::new(resolver_over(corpus(), &["data", "chef"]).await?));
    let outcome = service.handle(ChatRequest::new("s1", "help")).await;
    assert_eq!(outcome.status, 200);
    assert!(outcome.is_success());
    assert_eq!(outcome.body.response, HELP);
    Ok(())
}

#[tokio::test]
async fn resolver_error_becomes_generic_500() -> anyhow::Result<()> {
    let embedder = Arc::new(QueryFailingEmbedder { panic: false });
    let service = ChatService::new(Arc::new(resolver_with(corpus(), embedder, SessionDetails::default()).await?));

    let outcome = service.handle(ChatRequest::new("s1", "show me jobs")).await;
    assert_eq!(outcome.status, 500);
    assert_eq!(outcome.body.response, INTERNAL_ERROR);

    // The session survives the failure.
    let next = service.handle(ChatRequest::new("s1", "help")).await;
    assert_eq!(next.status, 200);
    let history = service.resolver().history("s1").await;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].sender, Sender::User);
    Ok(())
}

#[tokio::test]
async fn panicking_embedder_becomes_generic_500() -> anyhow::Result<()> {
    let embedder = Arc::new(QueryFailingEmbedder { panic: true });
    let service = ChatService::new(Arc::new(resolver_with(corpus(), embedder, SessionDetails::default()).await?));

    let outcome = service.handle(ChatRequest::new("s1", "salary for the chef")).await;
    assert_eq!(outcome.status, 500);
    assert_eq!(outcome.body.response, INTERNAL_ERROR);
    Ok(())
}

#[tokio::test]
async fn missing_request_fields_use_defaults() -> anyhow::Result<()> {
    let service = ChatService::new(Arc::new(resolver_over(corpus(), &["data", "chef"]).await?));
    let request: ChatRequest = serde_json::from_str("{}")?;
    assert_eq!(request.session_id, "default");

    let outcome = service.handle(request).await;
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body.response, FALLBACK);
    assert_eq!(service.resolver().history("default").await.len(), 2);

    let body = serde_json::to_value(&outcome.body)?;
    assert_eq!(body, serde_json::json!({ "response": FALLBACK }));
    Ok(())
}
