//! Chat orchestrator: validates a message, records both turns, and asks the
//! provider for the reply in between.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use relay_core::config::ChatConfig;
use relay_core::types::{Message, NewMessage};
use relay_storage::MessageStore;

use crate::error::ChatError;
use crate::provider::{CompletionProvider, ProviderError, ProviderMessage};
use crate::session::{SessionHint, SessionResolver};

/// The two messages produced by one successful exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatExchange {
    pub session_id: String,
    pub user: Message,
    pub assistant: Message,
}

impl ChatExchange {
    /// `[user, assistant]`, the order callers render them in.
    pub fn into_messages(self) -> Vec<Message> {
        vec![self.user, self.assistant]
    }
}

/// Coordinates the message store and the completion provider.
pub struct ChatOrchestrator {
    store: Arc<dyn MessageStore>,
    provider: Arc<dyn CompletionProvider>,
    resolver: SessionResolver,
    config: ChatConfig,
}

impl ChatOrchestrator {
    pub fn new(
        store: Arc<dyn MessageStore>,
        provider: Arc<dyn CompletionProvider>,
        config: ChatConfig,
    ) -> Self {
        Self {
            store,
            provider,
            resolver: SessionResolver::default(),
            config,
        }
    }

    /// Replace the session resolver (and with it the fallback session id).
    pub fn with_resolver(mut self, resolver: SessionResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn resolve_session(&self, hint: &SessionHint) -> String {
        self.resolver.resolve(hint)
    }

    /// Trim and length-check an incoming message.
    pub fn validate<'a>(&self, message: &'a str) -> Result<&'a str, ChatError> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if trimmed.chars().count() > self.config.max_message_chars {
            return Err(ChatError::MessageTooLong(self.config.max_message_chars));
        }
        Ok(trimmed)
    }

    /// Handle an incoming chat message.
    ///
    /// Nothing is stored when validation fails. Once the user turn is stored
    /// an assistant turn always follows: a failed provider call yields the
    /// configured fallback reply instead of an error.
    pub async fn handle_message(
        &self,
        message: &str,
        session: &SessionHint,
    ) -> Result<ChatExchange, ChatError> {
        let content = self.validate(message)?;
        let session_id = self.resolver.resolve(session);

        let user = self
            .store
            .append(NewMessage::user(session_id.as_str(), content))
            .await?;

        let history: Vec<ProviderMessage> = self
            .store
            .list_by_session(&session_id)
            .await?
            .iter()
            .map(ProviderMessage::from)
            .collect();

        let reply = match self.complete(&history).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(
                    session_id = %session_id,
                    provider = self.provider.name(),
                    kind = err.kind(),
                    error = %err,
                    "Provider call failed, storing fallback reply"
                );
                self.config.fallback_reply.clone()
            }
        };

        let assistant = self
            .store
            .append(NewMessage::assistant(session_id.as_str(), reply))
            .await?;

        debug!(
            session_id = %session_id,
            user_id = user.id,
            assistant_id = assistant.id,
            "Chat exchange recorded"
        );

        Ok(ChatExchange {
            session_id,
            user,
            assistant,
        })
    }

    /// Full transcript of the resolved session, oldest first.
    pub async fn history(&self, session: &SessionHint) -> Result<Vec<Message>, ChatError> {
        let session_id = self.resolver.resolve(session);
        Ok(self.store.list_by_session(&session_id).await?)
    }

    async fn complete(&self, history: &[ProviderMessage]) -> Result<String, ProviderError> {
        match self.config.provider_timeout_secs {
            0 => self.provider.complete(history).await,
            secs => {
                let limit = Duration::from_secs(secs);
                tokio::time::timeout(limit, self.provider.complete(history))
                    .await
                    .unwrap_or_else(|_| {
                        Err(ProviderError::Unavailable(format!(
                            "no reply within {}s",
                            secs
                        )))
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use relay_core::error::{RelayError, Result as RelayResult};
    use relay_core::text;
    use relay_core::types::Role;
    use relay_storage::InMemoryMessageStore;

    use super::*;
    use crate::provider::MockProvider;

    /// Replies with a fixed result and records every history it was given.
    struct Scripted {
        result: std::result::Result<String, ProviderError>,
        seen: Mutex<Vec<Vec<ProviderMessage>>>,
    }

    impl Scripted {
        fn failing(err: ProviderError) -> Self {
            Self {
                result: Err(err),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn replying(text: &str) -> Self {
            Self {
                result: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            history: &[ProviderMessage],
        ) -> std::result::Result<String, ProviderError> {
            self.seen.lock().unwrap().push(history.to_vec());
            self.result.clone()
        }
    }

    struct Slow;

    #[async_trait]
    impl CompletionProvider for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        async fn complete(
            &self,
            _history: &[ProviderMessage],
        ) -> std::result::Result<String, ProviderError> {
            tokio::time::sleep(Duration::from_secs(120)).await;
            Ok("too late".to_string())
        }
    }

    /// Store that rejects every operation.
    struct BrokenStore;

    #[async_trait]
    impl MessageStore for BrokenStore {
        async fn append(&self, _message: NewMessage) -> RelayResult<Message> {
            Err(RelayError::Storage("disk on fire".to_string()))
        }

        async fn list_by_session(&self, _session_id: &str) -> RelayResult<Vec<Message>> {
            Err(RelayError::Storage("disk on fire".to_string()))
        }

        async fn len(&self) -> RelayResult<usize> {
            Err(RelayError::Storage("disk on fire".to_string()))
        }
    }

    fn orchestrator_with(
        provider: Arc<dyn CompletionProvider>,
    ) -> (ChatOrchestrator, Arc<InMemoryMessageStore>) {
        let store = Arc::new(InMemoryMessageStore::new());
        let orch = ChatOrchestrator::new(store.clone(), provider, ChatConfig::default());
        (orch, store)
    }

    fn body(id: &str) -> SessionHint {
        SessionHint::from_body(Some(id.to_string()))
    }

    #[tokio::test]
    async fn test_exchange_stores_two_messages() {
        let (orch, store) = orchestrator_with(Arc::new(MockProvider::fixed("AI response")));
        let exchange = orch.handle_message("hello", &body("s1")).await.unwrap();

        assert_eq!(exchange.session_id, "s1");
        assert_eq!(exchange.user.role, Role::User);
        assert_eq!(exchange.user.content, "hello");
        assert_eq!(exchange.assistant.role, Role::Assistant);
        assert_eq!(exchange.assistant.content, "AI response");
        assert!(exchange.assistant.id > exchange.user.id);
        assert_eq!(store.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_message_is_trimmed_before_storage() {
        let (orch, _) = orchestrator_with(Arc::new(MockProvider::fixed("ok")));
        let exchange = orch
            .handle_message("  spaced out \n", &SessionHint::default())
            .await
            .unwrap();
        assert_eq!(exchange.user.content, "spaced out");
    }

    #[tokio::test]
    async fn test_empty_message_rejected_and_nothing_stored() {
        let provider = Arc::new(Scripted::replying("unused"));
        let (orch, store) = orchestrator_with(provider.clone());

        for input in ["", "   ", "\n\t"] {
            let err = orch.handle_message(input, &body("s")).await.unwrap_err();
            assert!(matches!(err, ChatError::EmptyMessage));
            assert!(err.is_invalid_request());
        }
        assert!(store.is_empty().await.unwrap());
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_length_limit_counts_chars() {
        let (orch, store) = orchestrator_with(Arc::new(MockProvider::fixed("ok")));

        let at_limit = "字".repeat(2000);
        assert!(orch.handle_message(&at_limit, &body("s")).await.is_ok());

        let over = "a".repeat(2001);
        let err = orch.handle_message(&over, &body("s")).await.unwrap_err();
        assert!(matches!(err, ChatError::MessageTooLong(2000)));
        assert_eq!(store.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_provider_failure_stores_fallback() {
        for err in [
            ProviderError::RateLimited,
            ProviderError::Unauthorized,
            ProviderError::Unavailable("boom".to_string()),
            ProviderError::EmptyInput,
        ] {
            let (orch, store) = orchestrator_with(Arc::new(Scripted::failing(err)));
            let exchange = orch.handle_message("hi", &body("s")).await.unwrap();
            assert_eq!(exchange.assistant.content, text::FALLBACK_REPLY);
            assert_eq!(store.len().await.unwrap(), 2);
        }
    }

    #[tokio::test]
    async fn test_custom_fallback_reply() {
        let store = Arc::new(InMemoryMessageStore::new());
        let config = ChatConfig {
            fallback_reply: "try later".to_string(),
            ..ChatConfig::default()
        };
        let orch = ChatOrchestrator::new(
            store,
            Arc::new(Scripted::failing(ProviderError::RateLimited)),
            config,
        );
        let exchange = orch.handle_message("hi", &body("s")).await.unwrap();
        assert_eq!(exchange.assistant.content, "try later");
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_timeout_uses_fallback() {
        let store = Arc::new(InMemoryMessageStore::new());
        let config = ChatConfig {
            provider_timeout_secs: 1,
            ..ChatConfig::default()
        };
        let orch = ChatOrchestrator::new(store, Arc::new(Slow), config);
        let exchange = orch.handle_message("hi", &body("s")).await.unwrap();
        assert_eq!(exchange.assistant.content, text::FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_provider_sees_session_history_only() {
        let provider = Arc::new(Scripted::replying("r"));
        let (orch, _) = orchestrator_with(provider.clone());

        orch.handle_message("first", &body("a")).await.unwrap();
        orch.handle_message("other", &body("b")).await.unwrap();
        orch.handle_message("second", &body("a")).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        let last = &seen[2];
        let contents: Vec<&str> = last.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "r", "second"]);
        assert_eq!(last[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_history_in_order_and_isolated() {
        let (orch, _) = orchestrator_with(Arc::new(MockProvider::fixed("r")));
        orch.handle_message("one", &body("a")).await.unwrap();
        orch.handle_message("two", &body("b")).await.unwrap();
        orch.handle_message("three", &body("a")).await.unwrap();

        let a = orch
            .history(&SessionHint::from_query(Some("a".to_string())))
            .await
            .unwrap();
        assert_eq!(a.len(), 4);
        assert!(a.windows(2).all(|w| w[0].id < w[1].id));
        assert!(a.iter().all(|m| m.session_id == "a"));

        let b = orch
            .history(&SessionHint::from_query(Some("b".to_string())))
            .await
            .unwrap();
        assert_eq!(b.len(), 2);

        let none = orch
            .history(&SessionHint::from_query(Some("zzz".to_string())))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_missing_session_uses_fallback_id() {
        let (orch, _) = orchestrator_with(Arc::new(MockProvider::fixed("r")));
        let exchange = orch.handle_message("x", &SessionHint::default()).await.unwrap();
        assert_eq!(exchange.session_id, "default");

        let orch = orch.with_resolver(SessionResolver::new("lobby"));
        let exchange = orch.handle_message("y", &SessionHint::default()).await.unwrap();
        assert_eq!(exchange.session_id, "lobby");
        assert_eq!(orch.resolve_session(&SessionHint::default()), "lobby");
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let provider = Arc::new(Scripted::replying("unused"));
        let orch = ChatOrchestrator::new(
            Arc::new(BrokenStore),
            provider.clone(),
            ChatConfig::default(),
        );

        let err = orch.handle_message("hi", &body("s")).await.unwrap_err();
        assert!(matches!(err, ChatError::Storage(_)));
        assert!(!err.is_invalid_request());
        assert!(provider.seen.lock().unwrap().is_empty());

        let err = orch.history(&SessionHint::default()).await.unwrap_err();
        assert!(matches!(err, ChatError::Storage(_)));
    }

    #[tokio::test]
    async fn test_concurrent_exchanges_keep_ids_unique() {
        let (orch, store) = orchestrator_with(Arc::new(MockProvider::fixed("r")));
        let orch = Arc::new(orch);

        let mut handles = Vec::new();
        for i in 0..16 {
            let orch = orch.clone();
            handles.push(tokio::spawn(async move {
                orch.handle_message(&format!("m{}", i), &body(&format!("s{}", i % 4)))
                    .await
                    .unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.len().await.unwrap(), 32);
        let mut ids = Vec::new();
        for s in 0..4 {
            let msgs = store.list_by_session(&format!("s{}", s)).await.unwrap();
            assert_eq!(msgs.len(), 8);
            ids.extend(msgs.iter().map(|m| m.id));
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 32);
    }

    #[test]
    fn test_into_messages_order() {
        let now = chrono::Utc::now();
        let msg = |id, role| Message {
            id,
            session_id: "s".to_string(),
            role,
            content: String::new(),
            timestamp: now,
        };
        let exchange = ChatExchange {
            session_id: "s".to_string(),
            user: msg(1, Role::User),
            assistant: msg(2, Role::Assistant),
        };
        let ids: Vec<u64> = exchange.into_messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_provider_name() {
        let (orch, _) = orchestrator_with(Arc::new(MockProvider::canned()));
        assert_eq!(orch.provider_name(), "mock");
    }
}
