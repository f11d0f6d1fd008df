use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use questline::auth::{ManualClock, ACCESS_SECRET_VAR, REFRESH_SECRET_VAR};
use questline::prelude::*;

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Secrets used when the environment doesn't provide any. Demo only.
fn demo_default(name: &str) -> Option<String> {
    match name {
        ACCESS_SECRET_VAR => Some("walkthrough-access-secret-not-for-production".into()),
        REFRESH_SECRET_VAR => Some("walkthrough-refresh-secret-not-for-production".into()),
        _ => None,
    }
}

fn seeded_accounts() -> Arc<InMemoryAccountStore> {
    let wanderer = Identity {
        id: UserId::new("7f1c3a52-0b5e-4d8e-9c61-2a7b9e4d1f00"),
        username: "Wanderer".into(),
        email: "wanderer@example.com".into(),
        created_at: Utc::now(),
    };
    Arc::new(InMemoryAccountStore::single(Account::new(wanderer, "lantern-light")))
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), QuestlineError> {
    questline::logging::init("info");

    let config =
        AuthConfig::from_lookup(|name| std::env::var(name).ok().or_else(|| demo_default(name)))?;
    let clock = Arc::new(ManualClock::new(Utc::now().timestamp().max(0) as u64));
    let auth = AuthService::with_clock(&config, seeded_accounts(), clock.clone())?;
    let gateway = Gateway::new(auth).route(Method::Get, "/puzzles", |identity, request| {
        let body = format!("puzzles for {} ({})", identity.username, request.path);
        ApiResponse::ok(body.into_bytes())
    });

    let client = RefreshCoordinator::new(gateway, Arc::new(MemorySessionStore::new()));

    let identity = client.login("wanderer@example.com", "lantern-light").await?;
    tracing::info!(user = %identity.username, "walkthrough: logged in");

    let profile = client.send(ApiRequest::get(PROFILE_PATH)).await?;
    tracing::info!(status = profile.status, "walkthrough: profile fetched");

    // Jump past the access token's lifetime, then fire several requests at
    // once. They all hit 401; exactly one refresh exchange runs.
    clock.advance(config.access_ttl + Duration::from_secs(1));
    tracing::info!("walkthrough: access token expired, sending 5 requests");

    let requests = (1..=5).map(|page| {
        let client = client.clone();
        async move { client.send(ApiRequest::get(format!("/puzzles?page={page}"))).await }
    });
    for result in join_all(requests).await {
        let response = result?;
        tracing::info!(
            status = response.status,
            body = %String::from_utf8_lossy(&response.body),
            "walkthrough: request completed"
        );
    }

    // Past the refresh token's lifetime nothing can be recovered.
    clock.advance(config.refresh_ttl);
    match client.send(ApiRequest::get("/puzzles")).await {
        Err(SessionError::SessionExpired) => {
            tracing::info!("walkthrough: refresh token expired, login required")
        }
        other => tracing::warn!(?other, "walkthrough: unexpected outcome"),
    }

    client.logout()?;
    Ok(())
}
