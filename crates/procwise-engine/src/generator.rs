//! Optional free-text answer collaborator.
//!
//! The engine treats the generator as a black box that may be absent, slow,
//! or broken.  Calls go through [`answer_bounded`], which applies a timeout
//! and converts every failure mode into `None` so the caller can fall back
//! to templated responses.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use procwise_store::{HistoryEntry, Language};

use crate::error::EngineResult;

/// Generator calls are abandoned after this long.
pub const GENERATOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Session context passed to the generator alongside the utterance.
#[derive(Debug, Clone)]
pub struct GeneratorContext {
    pub current_procedure: Option<String>,
    pub current_step: Option<String>,
    pub completed_steps: Vec<String>,
    /// Most recent conversation turns, newest last.
    pub recent_history: Vec<HistoryEntry>,
    pub language: Language,
}

/// Produces a free-text answer for utterances no structured handler claims.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn answer(&self, utterance: &str, context: &GeneratorContext) -> EngineResult<String>;
}

/// Call the generator with a bounded timeout.
///
/// Timeouts, errors, and empty answers all collapse to `None`; the session
/// is never left waiting on or corrupted by a misbehaving generator.
pub async fn answer_bounded(
    generator: &dyn AnswerGenerator,
    utterance: &str,
    context: &GeneratorContext,
    timeout: Duration,
) -> Option<String> {
    match tokio::time::timeout(timeout, generator.answer(utterance, context)).await {
        Ok(Ok(answer)) if !answer.trim().is_empty() => Some(answer),
        Ok(Ok(_)) => {
            warn!("answer generator returned an empty answer");
            None
        }
        Ok(Err(err)) => {
            warn!(error = %err, "answer generator failed");
            None
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "answer generator timed out");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    struct Canned(&'static str);

    #[async_trait]
    impl AnswerGenerator for Canned {
        async fn answer(&self, _: &str, _: &GeneratorContext) -> EngineResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl AnswerGenerator for Failing {
        async fn answer(&self, _: &str, _: &GeneratorContext) -> EngineResult<String> {
            Err(EngineError::Generator("backend unavailable".into()))
        }
    }

    struct Stalled;

    #[async_trait]
    impl AnswerGenerator for Stalled {
        async fn answer(&self, _: &str, _: &GeneratorContext) -> EngineResult<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".into())
        }
    }

    fn context() -> GeneratorContext {
        GeneratorContext {
            current_procedure: None,
            current_step: None,
            completed_steps: Vec::new(),
            recent_history: Vec::new(),
            language: Language::En,
        }
    }

    #[tokio::test]
    async fn successful_answer_passes_through() {
        let answer = answer_bounded(&Canned("hello"), "q", &context(), GENERATOR_TIMEOUT).await;
        assert_eq!(answer.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn empty_answer_is_none() {
        let answer = answer_bounded(&Canned("   "), "q", &context(), GENERATOR_TIMEOUT).await;
        assert!(answer.is_none());
    }

    #[tokio::test]
    async fn failure_is_none() {
        let answer = answer_bounded(&Failing, "q", &context(), GENERATOR_TIMEOUT).await;
        assert!(answer.is_none());
    }

    #[tokio::test]
    async fn timeout_is_none() {
        let answer =
            answer_bounded(&Stalled, "q", &context(), Duration::from_millis(20)).await;
        assert!(answer.is_none());
    }
}
