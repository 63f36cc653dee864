//! The per-session turn state machine.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use luna_core::util::preview;
use luna_core::{
    EmotionClassifier, EmotionTag, PatternResponder, SpeechFailureKind, ToolAgent, Turn,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::session::ConversationSession;
use crate::speech::{SpeechSynthesizer, VoiceStatus};

/// Reply used when no agent is configured.
pub const NO_AGENT_REPLY: &str = "Waaah! My main brain isn't working right now! 😱";

/// Reply used when the agent fails or runs out of time.
pub const AGENT_FAILURE_REPLY: &str = "Eeeek! A tiny problem occurred! Let's try again!";

const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur while driving a conversation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("Luna is still answering the previous message")]
    AlreadyProcessing,

    #[error("A message is already waiting for Luna's reply")]
    TurnPending,

    #[error("Message is empty")]
    EmptyInput,

    #[error("There is no message waiting for a reply")]
    NothingPending,

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    AwaitingResponse,
}

/// Something the user should know about a turn that still went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// No LLM credential, only pattern replies are available.
    AgentUnavailable,
    /// The agent failed or timed out; the apology was used instead.
    AgentFailed(String),
    /// The reply could not be voiced.
    Speech(SpeechFailureKind),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AgentUnavailable => f.write_str(
                "🧠 Luna's main brain needs an LLM API key. Only her built-in replies work for now!",
            ),
            Self::AgentFailed(reason) => write!(f, "⚠️ Luna's main brain hiccuped: {reason}"),
            Self::Speech(kind) => f.write_str(kind.user_message()),
        }
    }
}

/// The agent turn a cycle produced, plus any warnings.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn: Turn,
    pub notices: Vec<Notice>,
}

/// Collaborators shared read-only by every session.
pub struct Pipeline {
    responder: Arc<PatternResponder>,
    agent: Option<Arc<dyn ToolAgent>>,
    agent_timeout: Duration,
    speech: SpeechSynthesizer,
    classifier: EmotionClassifier,
}

impl Pipeline {
    pub fn new(responder: Arc<PatternResponder>, speech: SpeechSynthesizer) -> Self {
        Self {
            responder,
            agent: None,
            agent_timeout: DEFAULT_AGENT_TIMEOUT,
            speech,
            classifier: EmotionClassifier::new(),
        }
    }

    #[must_use]
    pub fn with_agent(mut self, agent: Arc<dyn ToolAgent>) -> Self {
        self.agent = Some(agent);
        self
    }

    #[must_use]
    pub const fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn has_agent(&self) -> bool {
        self.agent.is_some()
    }

    #[must_use]
    pub const fn speech(&self) -> &SpeechSynthesizer {
        &self.speech
    }

    fn pattern_reply(&self, input: &str, rng: &mut StdRng) -> Option<String> {
        let reply = self.responder.respond(input, rng)?;
        info!("Answered from pattern rules");
        Some(reply.to_string())
    }

    /// Agent reply, or a fixed apology when there is no agent or it fails.
    async fn fallback_reply(&self, input: &str) -> (String, Option<Notice>) {
        let Some(agent) = &self.agent else {
            warn!("No pattern matched and no agent is configured");
            return (NO_AGENT_REPLY.to_string(), Some(Notice::AgentUnavailable));
        };

        info!("Falling back to agent for \"{}\"", preview(input, 60));
        let reason = match tokio::time::timeout(self.agent_timeout, agent.invoke(input)).await {
            Ok(Ok(reply)) if !reply.trim().is_empty() => return (reply.trim().to_string(), None),
            Ok(Ok(_)) => "the answer was empty".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("no answer within {}s", self.agent_timeout.as_secs()),
        };

        warn!("Agent failed: {reason}");
        (
            AGENT_FAILURE_REPLY.to_string(),
            Some(Notice::AgentFailed(reason)),
        )
    }
}

/// Marks a controller busy for as long as it lives.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl<'a> ProcessingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct SessionState {
    session: ConversationSession,
    rng: StdRng,
}

/// Drives one session through `Idle -> AwaitingResponse -> Idle`.
///
/// Only one cycle runs at a time. A second `respond` (or any `submit`,
/// `greet` or `reset`) issued while a cycle is running is rejected with
/// [`ConversationError::AlreadyProcessing`]; it is never queued.
pub struct ConversationController {
    id: Uuid,
    pipeline: Arc<Pipeline>,
    processing: AtomicBool,
    state: Mutex<SessionState>,
}

impl ConversationController {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self::with_rng(pipeline, StdRng::from_entropy())
    }

    /// Controller whose random choices are reproducible.
    pub fn with_seed(pipeline: Arc<Pipeline>, seed: u64) -> Self {
        Self::with_rng(pipeline, StdRng::seed_from_u64(seed))
    }

    fn with_rng(pipeline: Arc<Pipeline>, rng: StdRng) -> Self {
        let session = ConversationSession::new();
        info!("Opening conversation session: {}", session.id);
        Self {
            id: session.id,
            pipeline,
            processing: AtomicBool::new(false),
            state: Mutex::new(SessionState { session, rng }),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        if self.processing.load(Ordering::Acquire) {
            ControllerState::AwaitingResponse
        } else {
            ControllerState::Idle
        }
    }

    pub async fn history(&self) -> Vec<Turn> {
        self.state.lock().await.session.turns().to_vec()
    }

    pub async fn current_emotion(&self) -> EmotionTag {
        self.state.lock().await.session.current_emotion()
    }

    /// Append Luna's opening line, worded after the voice probe. Refused
    /// while a user turn is waiting for its reply.
    pub async fn greet(&self) -> Result<TurnOutcome, ConversationError> {
        let _guard = ProcessingGuard::acquire(&self.processing)
            .ok_or(ConversationError::AlreadyProcessing)?;

        if self.state.lock().await.session.pending_user_input().is_some() {
            return Err(ConversationError::TurnPending);
        }

        let text = match self.pipeline.speech.check_voice().await {
            VoiceStatus::Ready(_) => {
                "Kyaa~! Hello there, Master! ✨ My voice should work perfectly now! Let's chat! 🌟"
                    .to_string()
            }
            VoiceStatus::Shy(reason) => format!(
                "Kyaa~! Hello Master! ✨ My voice might be a bit shy today ({reason}), but I'm still here to help! 💖"
            ),
            VoiceStatus::TextOnly => {
                "Kyaa~! Hello there, Master! ✨ I'm in text-only mode today, but still ready to help! 🌟"
                    .to_string()
            }
        };

        Ok(self.finish_turn(text, EmotionTag::Excited, Vec::new()).await)
    }

    /// Append a user turn without answering it. Luna shows `thinking` until
    /// the turn is answered.
    pub async fn submit(&self, input: &str) -> Result<(), ConversationError> {
        if self.state() == ControllerState::AwaitingResponse {
            return Err(ConversationError::AlreadyProcessing);
        }

        let input = input.trim();
        if input.is_empty() {
            return Err(ConversationError::EmptyInput);
        }

        let mut state = self.state.lock().await;
        if state.session.pending_user_input().is_some() {
            return Err(ConversationError::TurnPending);
        }

        debug!("User said: {}", preview(input, 80));
        state.session.push(Turn::user(input));
        state.session.set_emotion(EmotionTag::Thinking);
        Ok(())
    }

    /// Answer the pending user turn, at most once.
    pub async fn respond(&self) -> Result<TurnOutcome, ConversationError> {
        let _guard = ProcessingGuard::acquire(&self.processing)
            .ok_or(ConversationError::AlreadyProcessing)?;

        let (input, pattern_reply) = {
            let mut guard = self.state.lock().await;
            let SessionState { session, rng } = &mut *guard;
            let input = session
                .pending_user_input()
                .ok_or(ConversationError::NothingPending)?
                .to_string();
            let reply = self.pipeline.pattern_reply(&input, rng);
            (input, reply)
        };

        let (reply, notice) = match pattern_reply {
            Some(reply) => (reply, None),
            None => self.pipeline.fallback_reply(&input).await,
        };

        let emotion = {
            let mut guard = self.state.lock().await;
            self.pipeline.classifier.classify(&reply, &mut guard.rng)
        };

        debug!("Reply classified as {emotion}");
        Ok(self
            .finish_turn(reply, emotion, notice.into_iter().collect())
            .await)
    }

    /// `submit` then `respond`.
    pub async fn process(&self, input: &str) -> Result<TurnOutcome, ConversationError> {
        self.submit(input).await?;
        self.respond().await
    }

    /// Drop the whole history and put the avatar back to idle.
    pub async fn reset(&self) -> Result<(), ConversationError> {
        let _guard = ProcessingGuard::acquire(&self.processing)
            .ok_or(ConversationError::AlreadyProcessing)?;

        self.state.lock().await.session.clear();
        info!("Conversation session {} reset", self.id);
        Ok(())
    }

    /// Voice `text` and append it as an agent turn. Callers hold the guard.
    async fn finish_turn(
        &self,
        text: String,
        emotion: EmotionTag,
        mut notices: Vec<Notice>,
    ) -> TurnOutcome {
        let synthesis = self.pipeline.speech.synthesize(&text).await;
        if let Some(kind) = synthesis.warning {
            notices.push(Notice::Speech(kind));
        }

        let turn = Turn::agent(text, emotion, synthesis.audio);
        self.state.lock().await.session.push(turn.clone());

        TurnOutcome { turn, notices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use luna_core::{SpeechBackend, SpeechError, TurnAudio, VoiceCheck, VoiceInfo};
    use std::sync::atomic::AtomicUsize;

    const GREETING: usize = 0;

    struct FakeAgent {
        reply: Result<String, String>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeAgent {
        fn answering(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err("model offline".to_string()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow(reply: &str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                delay,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ToolAgent for FakeAgent {
        async fn invoke(&self, _input: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    struct QuotaBackend;

    #[async_trait]
    impl SpeechBackend for QuotaBackend {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SpeechError> {
            Err(SpeechError::QuotaExceeded("quota_exceeded".into()))
        }

        async fn check_voice(&self) -> Result<VoiceCheck, SpeechError> {
            Ok(VoiceCheck::Missing {
                voice_id: "piTKgcLEGmPE4e6mEKli".into(),
                available: vec![VoiceInfo {
                    voice_id: "21m00Tcm4TlvDq8ikWAM".into(),
                    name: "Rachel".into(),
                }],
            })
        }

        fn audio_extension(&self) -> &str {
            "mp3"
        }
    }

    struct EchoBackend;

    #[async_trait]
    impl SpeechBackend for EchoBackend {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
            Ok(text.as_bytes().to_vec())
        }

        async fn check_voice(&self) -> Result<VoiceCheck, SpeechError> {
            Ok(VoiceCheck::Found(VoiceInfo {
                voice_id: "v".into(),
                name: "Nicole".into(),
            }))
        }

        fn audio_extension(&self) -> &str {
            "mp3"
        }
    }

    #[expect(clippy::expect_used, reason = "Built-in rules must compile")]
    fn responder() -> Arc<PatternResponder> {
        Arc::new(PatternResponder::luna().expect("built-in rules compile"))
    }

    fn text_only() -> Pipeline {
        Pipeline::new(responder(), SpeechSynthesizer::disabled())
    }

    fn controller(pipeline: Pipeline) -> ConversationController {
        ConversationController::with_seed(Arc::new(pipeline), 42)
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn hello_is_answered_from_the_greeting_pool() {
        let controller = controller(text_only());
        let outcome = controller.process("hello").await.expect("answered");

        let pool = responder().rules()[GREETING].replies().to_vec();
        assert!(pool.iter().any(|r| r == outcome.turn.text()));
        assert!(outcome.turn.emotion().is_some());
        assert!(outcome.notices.is_empty());

        let history = controller.history().await;
        assert_eq!(history.len(), 2);
        assert!(history[0].is_user());
        assert_eq!(history[0].emotion(), None);
        assert_eq!(controller.current_emotion().await, history[1].emotion().unwrap_or(EmotionTag::Idle));
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn kyaa_greeting_reads_as_cheerful() {
        let kyaa = responder().rules()[GREETING].replies()[0].clone();
        assert!(kyaa.starts_with("Kyaa~!"));
        let tag = EmotionClassifier::new().classify(&kyaa, &mut StdRng::seed_from_u64(1));
        assert!(matches!(
            tag,
            EmotionTag::Happy | EmotionTag::Excited | EmotionTag::Energetic
        ));
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn without_agent_rules_still_work_and_the_rest_apologizes() {
        let controller = controller(text_only());

        let outcome = controller.process("who are you?").await.expect("answered");
        assert!(outcome.notices.is_empty());

        let outcome = controller.process("calculate 2+2").await.expect("answered");
        assert_eq!(outcome.turn.text(), NO_AGENT_REPLY);
        assert_eq!(outcome.turn.emotion(), Some(EmotionTag::Sad));
        assert_eq!(outcome.notices, vec![Notice::AgentUnavailable]);
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn agent_answers_unmatched_input() {
        let agent = FakeAgent::answering("Ooh! Calc-kun says 4!");
        let controller = controller(text_only().with_agent(agent.clone()));

        let outcome = controller.process("calculate 2+2").await.expect("answered");
        assert_eq!(outcome.turn.text(), "Ooh! Calc-kun says 4!");
        assert_eq!(outcome.turn.emotion(), Some(EmotionTag::Curious));
        assert_eq!(agent.calls(), 1);

        controller.process("hi").await.expect("answered");
        assert_eq!(agent.calls(), 1);
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn agent_failure_becomes_apology() {
        let controller = controller(text_only().with_agent(FakeAgent::failing()));

        let outcome = controller.process("calculate 2+2").await.expect("answered");
        assert_eq!(outcome.turn.text(), AGENT_FAILURE_REPLY);
        assert_eq!(outcome.turn.emotion(), Some(EmotionTag::Confused));
        assert!(matches!(outcome.notices.as_slice(), [Notice::AgentFailed(r)] if r.contains("offline")));
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn slow_agent_times_out() {
        let agent = FakeAgent::slow("too late", Duration::from_secs(5));
        let pipeline = text_only()
            .with_agent(agent)
            .with_agent_timeout(Duration::from_millis(20));
        let controller = controller(pipeline);

        let outcome = controller.process("tell me a story").await.expect("answered");
        assert_eq!(outcome.turn.text(), AGENT_FAILURE_REPLY);
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn concurrent_triggers_produce_one_reply() {
        let agent = FakeAgent::slow("Hehe! Done!", Duration::from_millis(50));
        let controller = controller(text_only().with_agent(agent.clone()));
        controller.submit("write me a poem").await.expect("submitted");

        let (first, second) = tokio::join!(controller.respond(), controller.respond());
        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(ConversationError::AlreadyProcessing))));

        assert_eq!(agent.calls(), 1);
        assert_eq!(controller.history().await.len(), 2);
        assert_eq!(
            controller.respond().await.err(),
            Some(ConversationError::NothingPending)
        );
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn input_is_rejected_while_awaiting_response() {
        let agent = FakeAgent::slow("Yay!", Duration::from_millis(80));
        let controller = controller(text_only().with_agent(agent));
        controller.submit("plan my day").await.expect("submitted");

        let (outcome, rejected) = tokio::join!(controller.respond(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let state = controller.state();
            let emotion = controller.current_emotion().await;
            (
                state,
                emotion,
                controller.submit("hello?").await,
                controller.reset().await,
            )
        });

        assert!(outcome.is_ok());
        let (state, emotion, submit, reset) = rejected;
        assert_eq!(state, ControllerState::AwaitingResponse);
        assert_eq!(emotion, EmotionTag::Thinking);
        assert_eq!(submit, Err(ConversationError::AlreadyProcessing));
        assert_eq!(reset, Err(ConversationError::AlreadyProcessing));
        assert_eq!(controller.history().await.len(), 2);
    }

    #[tokio::test]
    async fn submit_validation() {
        let controller = controller(text_only());
        assert_eq!(controller.submit("   ").await, Err(ConversationError::EmptyInput));
        assert_eq!(controller.submit("hi").await, Ok(()));
        assert_eq!(controller.submit("hi again").await, Err(ConversationError::TurnPending));
        assert_eq!(
            controller.process("still there?").await.err(),
            Some(ConversationError::TurnPending)
        );
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn quota_failure_keeps_the_conversation_going() {
        let speech = SpeechSynthesizer::new(Arc::new(QuotaBackend), Duration::from_secs(1));
        let controller = controller(Pipeline::new(responder(), speech));

        let outcome = controller.process("hello").await.expect("answered");
        assert!(outcome.turn.audio().is_none());
        assert_eq!(outcome.notices, vec![Notice::Speech(SpeechFailureKind::Quota)]);
        assert!(outcome.notices[0].to_string().contains("quota"));

        let outcome = controller.process("bye").await.expect("answered");
        assert!(outcome.turn.audio().is_none());
        assert_eq!(controller.history().await.len(), 4);
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn replies_carry_their_own_audio() {
        let speech = SpeechSynthesizer::new(Arc::new(EchoBackend), Duration::from_secs(1));
        let controller = controller(Pipeline::new(responder(), speech));

        let outcome = controller.process("what can you do").await.expect("answered");
        let Some(TurnAudio::Bytes(bytes)) = outcome.turn.audio() else {
            panic!("expected audio");
        };
        assert_eq!(
            String::from_utf8_lossy(bytes),
            luna_core::util::sanitize_for_speech(outcome.turn.text())
        );
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn greeting_reflects_voice_status() {
        let greeting = controller(text_only()).greet().await.expect("greeted");
        assert!(greeting.turn.text().contains("text-only mode"));
        assert_eq!(greeting.turn.emotion(), Some(EmotionTag::Excited));

        let speech = SpeechSynthesizer::new(Arc::new(QuotaBackend), Duration::from_secs(1));
        let greeting = controller(Pipeline::new(responder(), speech))
            .greet()
            .await
            .expect("greeted");
        assert!(greeting.turn.text().contains("a bit shy today (Voice ID piTKgcLE... not found"));

        let speech = SpeechSynthesizer::new(Arc::new(EchoBackend), Duration::from_secs(1));
        let greeting = controller(Pipeline::new(responder(), speech))
            .greet()
            .await
            .expect("greeted");
        assert!(greeting.turn.text().contains("should work perfectly"));
        assert!(greeting.turn.audio().is_some());
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn pending_input_shows_thinking() {
        let controller = controller(text_only());
        controller.submit("hello").await.expect("submitted");
        assert_eq!(controller.current_emotion().await, EmotionTag::Thinking);
        assert_eq!(controller.state(), ControllerState::Idle);

        let outcome = controller.respond().await.expect("answered");
        assert_eq!(
            Some(controller.current_emotion().await),
            outcome.turn.emotion()
        );
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn greeting_never_skips_a_pending_message() {
        let controller = controller(text_only());
        controller.submit("hello").await.expect("submitted");

        assert_eq!(
            controller.greet().await.err(),
            Some(ConversationError::TurnPending)
        );
        assert_eq!(controller.history().await.len(), 1);

        let outcome = controller.respond().await.expect("answered");
        let pool = responder().rules()[GREETING].replies().to_vec();
        assert!(pool.iter().any(|r| r == outcome.turn.text()));

        let history = controller.history().await;
        assert_eq!(history.len(), 2);
        assert!(history[0].is_user());
        assert!(!history[1].is_user());
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn reset_clears_history() {
        let controller = controller(text_only());
        controller.greet().await.expect("greeted");
        controller.process("hello").await.expect("answered");

        controller.reset().await.expect("reset");
        assert!(controller.history().await.is_empty());
        assert_eq!(controller.current_emotion().await, EmotionTag::Idle);
    }
}
