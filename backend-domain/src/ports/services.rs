use crate::value_objects::BroadcastKind;

/// Server side of the realtime bus. Publishing never fails the caller: the
/// bus is best-effort and clients reconcile by refetching.
pub trait Broadcaster: Send + Sync {
    /// Returns how many connected subscribers received the message.
    fn publish(&self, kind: BroadcastKind, payload: serde_json::Value) -> usize;
}

pub trait CredentialService: Send + Sync {
    fn hash_password(&self, password: &str) -> anyhow::Result<String>;
    fn verify_password(&self, password_hash: &str, password: &str) -> bool;
}
