use std::sync::Arc;

use crate::{
    error::Result,
    normalize::{LectureResponse, normalize_response},
    prompt::build_lecture_prompt,
    provider::TextGenerator,
    types::LectureRequest,
};

/// Prompt used by the connectivity check.
pub const PING_PROMPT: &str = "Say hello from Gemini!";

/// Validates lecture requests, calls the text generator once and normalizes the reply.
#[derive(Clone)]
pub struct LectureService {
    generator: Arc<dyn TextGenerator>,
}

impl LectureService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Validate raw input, then run [`LectureService::generate_lecture`].
    pub async fn generate(
        &self,
        topic: Option<&str>,
        subtopics: Option<&str>,
        output_mode: Option<&str>,
    ) -> Result<LectureResponse> {
        let request = LectureRequest::new(topic, subtopics, output_mode)?;
        self.generate_lecture(&request).await
    }

    pub async fn generate_lecture(&self, request: &LectureRequest) -> Result<LectureResponse> {
        let prompt = build_lecture_prompt(request);
        log::debug!(
            "Requesting lecture on '{}' ({} mode, {} subtopics) from {}",
            request.topic(),
            request.output_mode(),
            request.subtopics().len(),
            self.generator.model()
        );

        let raw = self.generator.generate(&prompt).await?;
        log::debug!("Received {} bytes of model output", raw.len());

        Ok(normalize_response(&raw))
    }

    /// Send a fixed greeting and return the reply verbatim.
    pub async fn ping(&self) -> Result<String> {
        self.generator.generate(PING_PROMPT).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::{error::LectureError, normalize::INVALID_JSON_WARNING};

    /// Replays a canned reply and records every prompt it receives.
    struct FakeGenerator {
        reply: std::result::Result<String, String>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        fn replying(reply: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.into()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.into()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(LectureError::Service)
        }

        fn model(&self) -> &str {
            "fake-model"
        }
    }

    fn lecture_json(mode: &str) -> String {
        json!({
            "title": "Mitosis",
            "big_topic": "Mitosis",
            "identified_subtopics": [{ "subtopic_title": "Prophase", "subtopic_role": "Condensation" }],
            "lectures": [],
            "output_mode": mode
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_well_formed_reply_is_delivered() {
        let fake = FakeGenerator::replying(lecture_json("concise"));
        let service = LectureService::new(fake.clone());

        let response = service.generate(Some("Mitosis"), None, Some("concise")).await.unwrap();

        assert_eq!(fake.calls(), 1);
        assert!(!response.is_fallback());
        assert_eq!(response.output_mode(), Some("concise"));
        let prompt = fake.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("**Mitosis**"));
    }

    #[tokio::test]
    async fn test_empty_topic_never_calls_generator() {
        let fake = FakeGenerator::replying(lecture_json("standard"));
        let service = LectureService::new(fake.clone());

        let err = service.generate(Some(""), None, None).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_long_topic_never_calls_generator() {
        let fake = FakeGenerator::replying(lecture_json("standard"));
        let service = LectureService::new(fake.clone());
        let topic = "x".repeat(250);

        let err = service.generate(Some(&topic), None, None).await.unwrap_err();

        assert!(err.is_validation());
        assert!(err.to_string().contains("Maximum 200 characters"));
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_fenced_reply_equals_inner_json() {
        let inner = lecture_json("standard");
        let fake = FakeGenerator::replying(format!("```json\n{}\n```", inner));
        let service = LectureService::new(fake);

        let response = service.generate(Some("Mitosis"), None, None).await.unwrap();

        let expected: Value = serde_json::from_str(&inner).unwrap();
        assert_eq!(response, LectureResponse::Document(expected));
    }

    #[tokio::test]
    async fn test_prose_reply_becomes_fallback() {
        let prose = "Mitosis is how cells divide. Let me know if you want more.";
        let fake = FakeGenerator::replying(prose);
        let service = LectureService::new(fake.clone());

        let response = service.generate(Some("Mitosis"), None, None).await.unwrap();

        assert_eq!(
            response,
            LectureResponse::Fallback {
                raw_output: prose.to_string(),
                warning: INVALID_JSON_WARNING.to_string(),
            }
        );
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_retried() {
        let fake = FakeGenerator::failing("Upstream error (429): Quota exceeded");
        let service = LectureService::new(fake.clone());

        let err = service.generate(Some("Mitosis"), None, None).await.unwrap_err();

        assert!(matches!(err, LectureError::Service(ref msg) if msg.contains("Quota exceeded")));
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_ping_uses_fixed_prompt() {
        let fake = FakeGenerator::replying("Hello!");
        let service = LectureService::new(fake.clone());

        assert_eq!(service.ping().await.unwrap(), "Hello!");
        assert_eq!(fake.prompts.lock().unwrap().as_slice(), [PING_PROMPT.to_string()]);
    }
}
