//! Model backend: the black-box `complete(system, user, temperature)` call.

mod gate;
mod openai;
mod retry;

use async_trait::async_trait;

use crate::error::Result;

pub use gate::{GatedBackend, RateGate};
pub use openai::OpenAiClient;
pub use retry::RetryConfig;

/// One chat-completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

impl CompletionRequest {
    /// Create a request with temperature 0.2.
    pub fn new(model: impl Into<String>, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            user: user.into(),
            temperature: 0.2,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// A chat-completion backend.
///
/// Implementations return the trimmed text of the first choice. Any failure
/// is fatal for the call; retry policy lives in [`GatedBackend`].
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[async_trait]
impl<T: CompletionBackend + ?Sized> CompletionBackend for std::sync::Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    type Responder = Box<dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync>;

    /// Backend fake that answers with a closure and records every request.
    pub struct ScriptedBackend {
        responder: Responder,
        calls: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedBackend {
        pub fn new<F>(responder: F) -> Self
        where
            F: Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
        {
            Self {
                responder: Box::new(responder),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<CompletionRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.calls.lock().unwrap().push(request.clone());
            (self.responder)(request).map(|s| s.trim().to_string())
        }
    }
}
