//! Generation cache and in-flight deduplication.
//!
//! [`GenerationGateway::resolve`] hands out the artifact for a prompt and
//! guarantees the provider is called at most once per prompt that ever
//! succeeds, no matter how many callers ask for it at the same time.
//!
//! A prompt is in one of three states:
//!
//! - unseen: neither cached nor pending
//! - pending: one provider call in flight, every caller awaits the same
//!   shared outcome
//! - cached: terminal, served from memory forever
//!
//! A failed call moves the prompt back to unseen, so the next caller starts
//! a fresh attempt. Failures are never cached.
//!
//! The check-then-insert step runs under the pending map's entry lock with
//! the cache re-checked inside it. The owning task stores the artifact
//! before it clears the pending entry, so a caller that finds no pending
//! entry while holding the lock is guaranteed to see the cached artifact if
//! one exists.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::cache::{ArtifactCache, prompt_fingerprint};
use crate::error::ProviderError;
use crate::metrics::{CACHE_HITS, CACHE_MISSES, CACHE_SIZE, DEDUP_JOINS, PROVIDER_CALLS, PROVIDER_FAILURES};
use crate::models::Artifact;
use crate::provider::GenerationProvider;

pub type Outcome = Result<Arc<Artifact>, ProviderError>;

type SharedOutcome = Shared<BoxFuture<'static, Outcome>>;

struct Inner {
    provider: Arc<dyn GenerationProvider>,
    cache: ArtifactCache,
    pending: DashMap<String, SharedOutcome>,
}

/// Cheap to clone; all clones share one cache and one pending map.
#[derive(Clone)]
pub struct GenerationGateway {
    inner: Arc<Inner>,
}

impl GenerationGateway {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                cache: ArtifactCache::new(),
                pending: DashMap::new(),
            }),
        }
    }

    /// Artifact for `prompt`, generating it if nobody has yet.
    ///
    /// Errors are the provider's own, passed through unchanged. Dropping the
    /// returned future does not cancel the generation: it keeps running and
    /// its result still lands in the cache.
    pub async fn resolve(&self, prompt: &str) -> Outcome {
        if let Some(artifact) = self.inner.cache.get(prompt) {
            CACHE_HITS.inc();
            return Ok(artifact);
        }

        let (outcome, owner) = match self.inner.pending.entry(prompt.to_string()) {
            Entry::Occupied(entry) => {
                DEDUP_JOINS.inc();
                debug!(prompt = %prompt_fingerprint(prompt), "joining in-flight generation");
                (entry.get().clone(), None)
            }
            Entry::Vacant(entry) => {
                // the previous owner may have finished since the first check
                if let Some(artifact) = self.inner.cache.get(prompt) {
                    CACHE_HITS.inc();
                    return Ok(artifact);
                }
                CACHE_MISSES.inc();

                let (tx, rx) = oneshot::channel::<Outcome>();
                let outcome = async move { rx.await.unwrap_or(Err(ProviderError::Interrupted)) }
                    .boxed()
                    .shared();
                entry.insert(outcome.clone());
                (outcome, Some(tx))
            }
        };

        // spawned only after the entry lock is released
        if let Some(tx) = owner {
            self.spawn_generation(prompt.to_string(), tx);
        }

        outcome.await
    }

    fn spawn_generation(&self, prompt: String, tx: oneshot::Sender<Outcome>) {
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let fingerprint = prompt_fingerprint(&prompt);
            PROVIDER_CALLS.inc();
            info!(prompt = %fingerprint, "cache miss - calling provider");

            let result = AssertUnwindSafe(inner.provider.generate(&prompt))
                .catch_unwind()
                .await
                .unwrap_or(Err(ProviderError::Interrupted))
                .map(Arc::new);

            match &result {
                Ok(artifact) => {
                    inner.cache.insert(prompt.clone(), Arc::clone(artifact));
                    CACHE_SIZE.set(inner.cache.len() as f64);
                    info!(
                        prompt = %fingerprint,
                        bytes = artifact.data.len(),
                        mime_type = %artifact.mime_type,
                        "artifact cached"
                    );
                }
                Err(e) => {
                    PROVIDER_FAILURES.inc();
                    warn!(prompt = %fingerprint, error = %e, "generation failed");
                }
            }

            // after the cache insert, never before
            inner.pending.remove(&prompt);

            // every caller may be gone; the cache is already updated
            let _ = tx.send(result);
        });
    }

    pub fn is_cached(&self, prompt: &str) -> bool {
        self.inner.cache.contains(prompt)
    }

    pub fn cached_len(&self) -> usize {
        self.inner.cache.len()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.pending.len()
    }
}
