//! Session registry: one controller per conversation id.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::controller::{ConversationController, ConversationError, Pipeline};

pub struct SessionRegistry {
    pipeline: Arc<Pipeline>,
    sessions: Mutex<HashMap<Uuid, Arc<ConversationController>>>,
}

impl SessionRegistry {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start a new session and return its controller.
    pub async fn open(&self) -> Arc<ConversationController> {
        self.insert(ConversationController::new(Arc::clone(&self.pipeline)))
            .await
    }

    /// Start a new session with reproducible random choices.
    pub async fn open_with_seed(&self, seed: u64) -> Arc<ConversationController> {
        self.insert(ConversationController::with_seed(
            Arc::clone(&self.pipeline),
            seed,
        ))
        .await
    }

    async fn insert(&self, controller: ConversationController) -> Arc<ConversationController> {
        let controller = Arc::new(controller);
        self.sessions
            .lock()
            .await
            .insert(controller.id(), Arc::clone(&controller));
        info!("Registered session {}", controller.id());
        controller
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<ConversationController>> {
        self.sessions.lock().await.get(&id).cloned()
    }

    /// Clear a session's history, keeping the session itself.
    pub async fn reset(&self, id: Uuid) -> Result<(), ConversationError> {
        let controller = self
            .get(id)
            .await
            .ok_or(ConversationError::SessionNotFound(id))?;
        controller.reset().await
    }

    /// Forget a session. Returns whether it existed.
    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&id).is_some();
        if removed {
            info!("Closed session {id}");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::SpeechSynthesizer;
    use luna_core::PatternResponder;

    #[expect(clippy::expect_used, reason = "Built-in rules must compile")]
    fn registry() -> SessionRegistry {
        let responder = Arc::new(PatternResponder::luna().expect("built-in rules compile"));
        SessionRegistry::new(Arc::new(Pipeline::new(
            responder,
            SpeechSynthesizer::disabled(),
        )))
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn sessions_are_independent() {
        let registry = registry();
        let a = registry.open_with_seed(1).await;
        let b = registry.open().await;
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.len().await, 2);

        a.process("hello").await.expect("answered");
        assert_eq!(a.history().await.len(), 2);
        assert!(b.history().await.is_empty());

        let same = registry.get(a.id()).await.expect("registered");
        assert_eq!(same.history().await.len(), 2);
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn reset_and_close() {
        let registry = registry();
        let session = registry.open().await;
        session.process("hi").await.expect("answered");

        registry.reset(session.id()).await.expect("reset");
        assert!(session.history().await.is_empty());

        assert!(registry.close(session.id()).await);
        assert!(!registry.close(session.id()).await);
        assert!(registry.is_empty().await);
        assert_eq!(
            registry.reset(session.id()).await,
            Err(ConversationError::SessionNotFound(session.id()))
        );
    }
}
