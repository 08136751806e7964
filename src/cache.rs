use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use crate::models::Artifact;

// Permanent prompt -> artifact store. Insert-only: nothing is ever
// overwritten, expired or evicted.
#[derive(Default)]
pub struct ArtifactCache {
    entries: DashMap<String, Arc<Artifact>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, prompt: &str) -> Option<Arc<Artifact>> {
        self.entries.get(prompt).map(|e| Arc::clone(e.value()))
    }

    // first write wins
    pub fn insert(&self, prompt: String, artifact: Arc<Artifact>) {
        self.entries.entry(prompt).or_insert(artifact);
    }

    pub fn contains(&self, prompt: &str) -> bool {
        self.entries.contains_key(prompt)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Short stable id for a prompt, so logs don't carry the full text
pub fn prompt_fingerprint(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}
