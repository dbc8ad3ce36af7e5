//! Fakes shared by the recommendation tests. No network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm_client::{LlmError, TextGenerator};
use crate::models::profile::RawProfile;
use crate::recommendations::generative::GenerativeCandidateSource;
use crate::recommendations::links::{LinkCheck, LinkProbe, LinkValidator};

pub struct AlwaysLive;

#[async_trait]
impl LinkProbe for AlwaysLive {
    async fn check(&self, _url: &str) -> LinkCheck {
        LinkCheck::Live
    }
}

pub struct ScriptedGenerator {
    reply: Option<String>,
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.reply.clone().ok_or(LlmError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}

pub fn always_live_validator() -> LinkValidator {
    LinkValidator::new(
        Arc::new(AlwaysLive),
        Duration::from_secs(10),
        Duration::from_secs(20),
        4,
    )
}

pub fn generator_replying(reply: &str) -> GenerativeCandidateSource {
    GenerativeCandidateSource::new(
        Arc::new(ScriptedGenerator {
            reply: Some(reply.to_string()),
        }),
        Duration::from_secs(30),
        7,
    )
}

pub fn generator_failing() -> GenerativeCandidateSource {
    GenerativeCandidateSource::new(
        Arc::new(ScriptedGenerator { reply: None }),
        Duration::from_secs(30),
        7,
    )
}

pub fn raw_profile(value: Value) -> RawProfile {
    value.as_object().cloned().unwrap_or_default()
}
