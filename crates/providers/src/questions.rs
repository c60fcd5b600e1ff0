use std::env;
use std::time::Duration;

use async_trait::async_trait;
use rand::rng;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use quest_core::model::{Difficulty, Question, QuestionError, QuestionId, QuestionKind};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors surfaced by question sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("question generation is not configured")]
    Disabled,

    #[error("a reference document is required to generate questions")]
    MissingDocument,

    #[error("the generation service returned no questions")]
    EmptyResponse,

    #[error("invalid agent base url: {0}")]
    InvalidBaseUrl(String),

    #[error("generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

//
// ─── QUESTION SOURCE ───────────────────────────────────────────────────────────
//

/// Contract for anything that can turn a topic into quiz questions.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Generate questions for a topic, optionally grounded in a reference
    /// document.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` when the source is unavailable, the request
    /// fails, or the response cannot be shaped into valid questions.
    async fn generate(
        &self,
        topic: &str,
        document: Option<&str>,
    ) -> Result<Vec<Question>, GenerationError>;
}

//
// ─── MOCK SOURCE ───────────────────────────────────────────────────────────────
//

/// Deterministic offline source: three fixed-shape questions per topic.
///
/// Ids follow `{topic}-gen-{n}` so callers can rely on them in tests and
/// demos. The reference document, if any, is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockQuestionSource;

impl MockQuestionSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QuestionSource for MockQuestionSource {
    async fn generate(
        &self,
        topic: &str,
        _document: Option<&str>,
    ) -> Result<Vec<Question>, GenerationError> {
        let invalid = |e: QuestionError| GenerationError::MalformedResponse(e.to_string());
        let lower = topic.to_lowercase();

        let questions = vec![
            Question::new(
                QuestionId::new(format!("{topic}-gen-1")),
                QuestionKind::MultipleChoice,
                format!("What is an important concept about {topic}?"),
                vec![
                    "It is fundamental to programming".into(),
                    "There is no need to learn it".into(),
                    "It only applies to JavaScript".into(),
                    "It is obsolete".into(),
                ],
                "It is fundamental to programming",
                format!("{topic} is an essential concept every developer should master."),
                75,
                Difficulty::Beginner,
                lower.clone(),
            )
            .map_err(invalid)?,
            Question::new(
                QuestionId::new(format!("{topic}-gen-2")),
                QuestionKind::CodeCompletion,
                format!("Complete this code related to {topic}:"),
                vec![
                    format!("// code about {topic}"),
                    format!("console.log(\"learning {topic}\");"),
                ],
                topic,
                format!("This is a basic implementation of {topic}."),
                100,
                Difficulty::Intermediate,
                lower.clone(),
            )
            .map_err(invalid)?,
            Question::new(
                QuestionId::new(format!("{topic}-gen-3")),
                QuestionKind::Debugging,
                format!("Find the bug in this code about {topic}:"),
                vec![
                    "Incorrect syntax".into(),
                    "Undefined variable".into(),
                    "Wrong logic".into(),
                ],
                "Incorrect syntax",
                format!("Here the error is in the syntax of the {topic} code."),
                125,
                Difficulty::Advanced,
                lower,
            )
            .map_err(invalid)?,
        ];

        Ok(questions)
    }
}

//
// ─── AGENT CONFIG ──────────────────────────────────────────────────────────────
//

/// Configuration for the AI agent backend.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub base_url: Url,
    pub min_questions: u32,
    pub difficulty: Difficulty,
    pub timeout: Duration,
    pub shuffle: bool,
}

const DEFAULT_MIN_QUESTIONS: u32 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl AgentConfig {
    /// Creates a config for the given base URL with defaults for the rest.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidBaseUrl` if the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, GenerationError> {
        let base_url = Url::parse(base_url)
            .map_err(|_| GenerationError::InvalidBaseUrl(base_url.to_string()))?;
        Ok(Self {
            base_url,
            min_questions: DEFAULT_MIN_QUESTIONS,
            difficulty: Difficulty::Advanced,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            shuffle: false,
        })
    }

    /// Reads configuration from the environment.
    ///
    /// `CODEQUEST_AGENT_URL` selects the backend; when unset the agent path
    /// is disabled and `Ok(None)` is returned. `CODEQUEST_AGENT_MIN_QUESTIONS`
    /// and `CODEQUEST_AGENT_TIMEOUT_SECS` tune the defaults.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidBaseUrl` if the URL is set but does
    /// not parse.
    pub fn from_env() -> Result<Option<Self>, GenerationError> {
        let Some(base_url) = env::var("CODEQUEST_AGENT_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
        else {
            return Ok(None);
        };

        let mut config = Self::new(base_url.trim())?;
        if let Some(min) = env::var("CODEQUEST_AGENT_MIN_QUESTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
        {
            config.min_questions = min;
        }
        if let Some(secs) = env::var("CODEQUEST_AGENT_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(Some(config))
    }

    /// Sets how many questions to ask the agent for.
    #[must_use]
    pub fn with_min_questions(mut self, min_questions: u32) -> Self {
        self.min_questions = min_questions;
        self
    }

    /// Sets the difficulty requested from the agent.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Bounds each request; a hung backend fails instead of blocking forever.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable shuffling of the returned questions.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }
}

//
// ─── AGENT CLIENT ──────────────────────────────────────────────────────────────
//

/// AI-backed question source speaking the agent backend's two-step protocol:
/// register an agent with the reference document, then ask it for questions.
#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    config: AgentConfig,
}

impl AgentClient {
    /// Builds a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Http` if the HTTP client cannot be built.
    pub fn new(config: AgentConfig) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn setup_agent(&self, topic: &str, document: &str) -> Result<String, GenerationError> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let payload = SetupAgentRequest {
            name: topic.to_string(),
            system_prompt: format!("You are a helpful assistant that specializes in {topic}"),
            documents: vec![document.to_string()],
        };

        debug!(topic, document_len = document.len(), "setting up quiz agent");
        let response = self
            .client
            .post(format!("{base}/api/setup-agent/"))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "agent setup failed");
            return Err(GenerationError::HttpStatus(response.status()));
        }

        let body: SetupAgentResponse = response.json().await?;
        body.id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| GenerationError::MalformedResponse("missing agent id".into()))
    }

    async fn request_questions(&self, agent_id: &str) -> Result<Vec<Question>, GenerationError> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let payload = GenerateQuestionsRequest {
            num_questions: self.config.min_questions,
            difficulty: self.config.difficulty,
        };

        debug!(agent_id, count = self.config.min_questions, "requesting questions");
        let response = self
            .client
            .post(format!("{base}/api/agent/{agent_id}/generate-questions"))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "question generation failed");
            return Err(GenerationError::HttpStatus(response.status()));
        }

        let body: serde_json::Value = response.json().await?;
        parse_questions(body)
    }
}

#[async_trait]
impl QuestionSource for AgentClient {
    async fn generate(
        &self,
        topic: &str,
        document: Option<&str>,
    ) -> Result<Vec<Question>, GenerationError> {
        let document = document
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::MissingDocument)?;

        let agent_id = self.setup_agent(topic, document).await?;
        let mut questions = self.request_questions(&agent_id).await?;

        if self.config.shuffle {
            questions.as_mut_slice().shuffle(&mut rng());
        }

        Ok(questions)
    }
}

//
// ─── WIRE TYPES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct SetupAgentRequest {
    name: String,
    system_prompt: String,
    documents: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SetupAgentResponse {
    #[serde(rename = "_id")]
    id: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateQuestionsRequest {
    num_questions: u32,
    difficulty: Difficulty,
}

#[derive(Debug, Deserialize)]
struct WireQuestion {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    correct_answer: usize,
    #[serde(default)]
    explanation: String,
    difficulty: String,
    topic: String,
    xp: u32,
}

/// Shapes the agent's wire payload into domain questions.
///
/// The wire marks the correct answer by option index; the domain stores the
/// option text. An empty explanation falls back to that text so feedback is
/// never blank.
fn parse_questions(body: serde_json::Value) -> Result<Vec<Question>, GenerationError> {
    let wire: Vec<WireQuestion> = serde_json::from_value(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    if wire.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let mut questions = Vec::with_capacity(wire.len());
    for item in wire {
        let correct = item.options.get(item.correct_answer).cloned().ok_or_else(|| {
            GenerationError::MalformedResponse(format!(
                "correctAnswer index {} out of range for {} options",
                item.correct_answer,
                item.options.len()
            ))
        })?;

        let kind: QuestionKind = item
            .kind
            .parse()
            .map_err(|e: QuestionError| GenerationError::MalformedResponse(e.to_string()))?;
        let difficulty: Difficulty = item
            .difficulty
            .parse()
            .map_err(|e: QuestionError| GenerationError::MalformedResponse(e.to_string()))?;

        let explanation = if item.explanation.trim().is_empty() {
            correct.clone()
        } else {
            item.explanation
        };

        let question = Question::new(
            QuestionId::new(item.id),
            kind,
            item.question,
            item.options,
            correct,
            explanation,
            item.xp,
            difficulty,
            item.topic,
        )
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        questions.push(question);
    }

    Ok(questions)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn mock_source_returns_three_questions() {
        let source = MockQuestionSource::new();
        let questions = source.generate("Closures", None).await.unwrap();

        assert_eq!(questions.len(), 3);
        let ids: Vec<&str> = questions.iter().map(|q| q.id().as_str()).collect();
        assert_eq!(ids, vec!["Closures-gen-1", "Closures-gen-2", "Closures-gen-3"]);

        let kinds: Vec<QuestionKind> = questions.iter().map(Question::kind).collect();
        assert_eq!(
            kinds,
            vec![
                QuestionKind::MultipleChoice,
                QuestionKind::CodeCompletion,
                QuestionKind::Debugging
            ]
        );

        let xp: Vec<u32> = questions.iter().map(Question::xp).collect();
        assert_eq!(xp, vec![75, 100, 125]);

        let tiers: Vec<Difficulty> = questions.iter().map(Question::difficulty).collect();
        assert_eq!(
            tiers,
            vec![
                Difficulty::Beginner,
                Difficulty::Intermediate,
                Difficulty::Advanced
            ]
        );
    }

    #[tokio::test]
    async fn mock_source_ignores_the_document() {
        let source = MockQuestionSource::new();
        let with = source.generate("Loops", Some("doc")).await.unwrap();
        let without = source.generate("Loops", None).await.unwrap();
        assert_eq!(with.len(), without.len());
    }

    #[test]
    fn config_rejects_invalid_url() {
        let err = AgentConfig::new("not a url").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidBaseUrl(_)));
    }

    #[test]
    fn config_builders_override_defaults() {
        let config = AgentConfig::new("http://localhost:8000")
            .unwrap()
            .with_min_questions(10)
            .with_difficulty(Difficulty::Beginner)
            .with_timeout(Duration::from_secs(5))
            .with_shuffle(true);

        assert_eq!(config.min_questions, 10);
        assert_eq!(config.difficulty, Difficulty::Beginner);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.shuffle);
    }

    fn wire_question() -> serde_json::Value {
        json!({
            "id": "agent-abc-1",
            "type": "multiple_choice",
            "question": "What does a closure capture?",
            "options": ["Its environment", "Nothing", "Only globals", "Only constants"],
            "correctAnswer": 0,
            "explanation": "A closure captures its defining environment.",
            "difficulty": "advanced",
            "topic": "closures",
            "xp": 140
        })
    }

    #[test]
    fn parse_turns_index_into_option_text() {
        let questions = parse_questions(json!([wire_question()])).unwrap();
        assert_eq!(questions[0].correct_answer(), "Its environment");
        assert_eq!(questions[0].kind(), QuestionKind::MultipleChoice);
        assert_eq!(questions[0].xp(), 140);
    }

    #[test]
    fn parse_falls_back_to_answer_when_explanation_empty() {
        let mut item = wire_question();
        item["explanation"] = json!("   ");
        let questions = parse_questions(json!([item])).unwrap();
        assert_eq!(questions[0].explanation(), "Its environment");
    }

    #[test]
    fn parse_rejects_out_of_range_index() {
        let mut item = wire_question();
        item["correctAnswer"] = json!(9);
        let err = parse_questions(json!([item])).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        let mut item = wire_question();
        item["type"] = json!("essay");
        let err = parse_questions(json!([item])).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[test]
    fn parse_rejects_missing_id() {
        let mut item = wire_question();
        item.as_object_mut().unwrap().remove("id");
        let err = parse_questions(json!([item])).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[test]
    fn parse_flags_empty_payload() {
        let err = parse_questions(json!([])).unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }
}
