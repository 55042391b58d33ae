use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use career_types::models::Profile;
use tracing::{info, warn};

use crate::client::ChatClient;
use crate::error::AdvisorError;
use crate::prompt::{SYSTEM_PROMPT, build_prompt, missing_sections};

/// Produces advice text for a profile, allowing at most one request in
/// flight per user.
pub struct AdviceGenerator {
    client: ChatClient,
    in_flight: Mutex<HashSet<String>>,
}

/// Holds a user's in-flight slot. Dropping it (including when the request
/// future is cancelled) frees the slot.
struct InFlightSlot<'a> {
    set: &'a Mutex<HashSet<String>>,
    username: String,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(PoisonError::into_inner);
        set.remove(&self.username);
    }
}

impl AdviceGenerator {
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Generate advice for `profile` on behalf of `username`.
    ///
    /// The service's text is returned unmodified. Any failure from the
    /// completion call is passed through without retry.
    pub async fn generate(&self, username: &str, profile: &Profile) -> Result<String, AdvisorError> {
        let _slot = self.claim(username)?;

        let prompt = build_prompt(profile);
        let advice = self.client.complete(SYSTEM_PROMPT, &prompt).await?;

        let missing = missing_sections(&advice);
        if !missing.is_empty() {
            warn!("Advice for {} is missing sections: {:?}", username, missing);
        }

        info!("Generated {} bytes of advice for {} using {}", advice.len(), username, self.client.model());
        Ok(advice)
    }

    fn claim(&self, username: &str) -> Result<InFlightSlot<'_>, AdvisorError> {
        let mut set = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        if !set.insert(username.to_string()) {
            return Err(AdvisorError::Busy {
                username: username.to_string(),
            });
        }

        Ok(InFlightSlot {
            set: &self.in_flight,
            username: username.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{Json, Router, routing::post};
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    use crate::client::ChatClientConfig;
    use crate::prompt::SECTION_HEADINGS;

    const ADVICE: &str = "1. Suitable Career Paths\n2. Missing Skills\n3. Recommended Resources\n4. Learning Roadmap\n";

    /// Completion stand-in that reports each request body on `tx`, waits
    /// `delay`, then answers with [`ADVICE`].
    async fn spawn_stub(delay: Duration) -> (String, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(body): Json<Value>| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(body);
                    tokio::time::sleep(delay).await;
                    Json(json!({ "choices": [{ "message": { "role": "assistant", "content": ADVICE } }] }))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{}/v1", addr), rx)
    }

    fn generator_at(base_url: String, timeout: Duration) -> AdviceGenerator {
        AdviceGenerator::new(
            ChatClient::new(ChatClientConfig {
                base_url,
                timeout,
                ..ChatClientConfig::openai("sk-test")
            })
            .unwrap(),
        )
    }

    fn generator() -> AdviceGenerator {
        generator_at(crate::client::OPENAI_BASE_URL.into(), Duration::from_secs(60))
    }

    fn profile() -> Profile {
        Profile {
            name: "Alice".into(),
            education: "BSc Mathematics".into(),
            skills: "Python, SQL".into(),
            interests: "data pipelines".into(),
            goals: "become a data engineer".into(),
        }
    }

    #[test]
    fn one_slot_per_user() {
        let g = generator();
        let slot = g.claim("alice").unwrap();

        assert!(matches!(g.claim("alice"), Err(AdvisorError::Busy { .. })));
        // Other users are unaffected.
        let _bob = g.claim("bob").unwrap();

        drop(slot);
        assert!(g.claim("alice").is_ok());
    }

    #[test]
    fn poisoned_lock_still_tracks_slots() {
        let g = generator();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = g.in_flight.lock().unwrap();
            panic!("poison the in-flight set");
        }));
        assert!(result.is_err());
        assert!(g.in_flight.is_poisoned());

        let slot = g.claim("alice").unwrap();
        assert!(matches!(g.claim("alice"), Err(AdvisorError::Busy { .. })));
        drop(slot);
        assert!(g.claim("alice").is_ok());
    }

    #[tokio::test]
    async fn prompt_sent_names_sections_and_fields() {
        let (url, mut rx) = spawn_stub(Duration::ZERO).await;
        let g = generator_at(url, Duration::from_secs(10));

        let advice = g.generate("alice", &profile()).await.unwrap();
        assert_eq!(advice, ADVICE);

        let body = rx.recv().await.unwrap();
        let sent = body["messages"][1]["content"].as_str().unwrap();
        for heading in SECTION_HEADINGS {
            assert!(sent.contains(heading), "prompt lacks {heading}");
        }
        let p = profile();
        for field in [&p.name, &p.education, &p.skills, &p.interests, &p.goals] {
            assert!(sent.contains(field.as_str()), "prompt lacks {field}");
        }
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let (url, _rx) = spawn_stub(Duration::from_secs(3)).await;
        let g = generator_at(url, Duration::from_millis(200));

        let err = g.generate("alice", &profile()).await.unwrap_err();
        assert!(matches!(err, AdvisorError::Timeout));
        assert!(g.claim("alice").is_ok());
    }

    #[tokio::test]
    async fn concurrent_request_busy_and_cancel_releases_slot() {
        let (url, mut rx) = spawn_stub(Duration::from_secs(5)).await;
        let g = Arc::new(generator_at(url, Duration::from_secs(30)));

        let first = {
            let g = g.clone();
            tokio::spawn(async move { g.generate("alice", &profile()).await })
        };
        // The stub has the request, so the first call holds the slot.
        rx.recv().await.unwrap();

        let err = g.generate("alice", &profile()).await.unwrap_err();
        assert!(matches!(err, AdvisorError::Busy { .. }));

        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());

        assert!(g.claim("alice").is_ok());
    }

    #[tokio::test]
    async fn slot_released_after_failed_call() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let g = generator_at(format!("http://{}/v1", addr), Duration::from_secs(10));
        assert!(g.generate("alice", &profile()).await.is_err());
        assert!(g.claim("alice").is_ok());
    }
}
