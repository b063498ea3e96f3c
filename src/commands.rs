use crate::client::QueryClient;
use crate::config::{ApiEndpoint, CHAT_PATH, HEALTH_PATH};
use crate::ui::conversation::ConversationManager;
use anyhow::{Result, bail};

/// Send one query through the same path the chat view uses and print the
/// assistant's reply
pub async fn ask(client: &QueryClient, query: &str) -> Result<()> {
    let mut manager = ConversationManager::new(client.endpoint().chat_target(), false);
    manager.composer_mut().set_content(query);

    if !manager.submit_with(client).await {
        bail!("Nothing to ask: the query is empty");
    }

    if let Some(reply) = manager.history().last() {
        println!("{}", reply.text());
    }

    if let Some(failure) = manager.last_failure() {
        bail!("Request to {} failed ({}): {}", client.chat_url(), failure.kind, failure.detail);
    }

    Ok(())
}

/// Probe the backend's health route
pub async fn health(client: &QueryClient) -> Result<()> {
    let target = client.endpoint().target(HEALTH_PATH);
    match client.health().await {
        Ok(body) => {
            println!("✅ {} is up", target);
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Err(err) => {
            println!("❌ {} is unreachable", target);
            Err(err.into())
        }
    }
}

/// Show where chat requests will go, including a setting that does not parse
pub fn endpoint(endpoint: &ApiEndpoint) -> Result<()> {
    for line in endpoint_report(endpoint) {
        println!("{}", line);
    }
    Ok(())
}

fn endpoint_report(endpoint: &ApiEndpoint) -> Vec<String> {
    let mut lines = vec![format!("📍 Chat target: {}", endpoint.target(CHAT_PATH))];
    match endpoint.url(CHAT_PATH) {
        Ok(url) => lines.push(format!("🌐 Resolved URL: {}", url)),
        Err(err) => lines.push(format!("⚠️ Not a usable URL: {:#}", err)),
    }
    match endpoint.base() {
        Some(base) => lines.push(format!("🔧 Base URL: {}", base)),
        None => lines.push(format!(
            "🔧 No base URL set; relative to origin {}",
            endpoint.origin()
        )),
    }
    lines
}
