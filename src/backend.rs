use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Common interface over every LLM backend.
///
/// A backend either produces generated text or it doesn't: transport errors,
/// bad payload shapes and missing credentials all collapse to `None` so the
/// dispatcher can treat all five integrations uniformly. Nothing escapes an
/// adapter as an error.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Backend name for log lines.
    fn name(&self) -> &'static str;

    /// Send one prompt, get back the generated text (trimmed) or `None`.
    async fn generate(&self, prompt: &str) -> Option<String>;
}

/// Tries backends in a fixed priority order until one answers.
///
/// The local backend and the primary cloud backend are also addressable on
/// their own: the debate step deliberately pins its "pro" persona to the
/// local model (no fallback) and its "against" persona to the primary, so
/// those routes are kept as named policies rather than special-cased at the
/// call sites.
pub struct Dispatcher {
    chain: Vec<Arc<dyn TextBackend>>,
    local: Arc<dyn TextBackend>,
    primary: Arc<dyn TextBackend>,
}

impl Dispatcher {
    /// Build a dispatcher. The fallback order is `local`, then `primary`,
    /// then `rest` in the given order.
    pub fn new(
        local: Arc<dyn TextBackend>,
        primary: Arc<dyn TextBackend>,
        rest: Vec<Arc<dyn TextBackend>>,
    ) -> Self {
        let mut chain: Vec<Arc<dyn TextBackend>> = vec![local.clone(), primary.clone()];
        chain.extend(rest);
        Self {
            chain,
            local,
            primary,
        }
    }

    /// Full fallback chain: first backend with a present result wins.
    /// Returns `None` only when every backend came back empty-handed.
    pub async fn dispatch(&self, prompt: &str) -> Option<String> {
        for backend in &self.chain {
            info!("Dispatching prompt to backend: {}", backend.name());
            if let Some(text) = backend.generate(prompt).await {
                return Some(text);
            }
            warn!(
                "Backend '{}' returned no result, falling back to the next one",
                backend.name()
            );
        }
        warn!("All backends exhausted without a result");
        None
    }

    /// Local backend only, no fallback.
    pub async fn dispatch_local(&self, prompt: &str) -> Option<String> {
        info!("Dispatching prompt to local backend: {}", self.local.name());
        self.local.generate(prompt).await
    }

    /// Primary cloud backend only, no fallback.
    pub async fn dispatch_primary(&self, prompt: &str) -> Option<String> {
        info!(
            "Dispatching prompt to primary backend: {}",
            self.primary.name()
        );
        self.primary.generate(prompt).await
    }
}
