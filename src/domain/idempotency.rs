//! Deterministic idempotency keys for retry-safe submissions.

/// Derive an idempotency key from its components.
///
/// The key is a djb2 hash over `"{prefix}:{a}:{b}:{quantity}"` rendered as
/// `{prefix}_{hex}`. It only deduplicates retries; it is not a secret.
pub fn idempotency_key(prefix: &str, a: &str, b: &str, quantity: f64) -> String {
    let input = format!("{prefix}:{a}:{b}:{quantity}");
    format!("{prefix}_{:x}", djb2(input.as_bytes()))
}

/// Key for the event at `index` of a batch when the caller supplied an external run id.
pub fn external_event_key(external_run_id: &str, event_type: &str, index: usize) -> String {
    format!("{external_run_id}:{event_type}:{index}")
}

/// Key for the event at `index` of a batch submitted to `run_id`.
pub fn run_event_key(run_id: &str, event_type: &str, index: usize) -> String {
    // Indices stay far below 2^53, so the conversion is exact.
    idempotency_key("run", run_id, event_type, index as f64)
}

fn djb2(bytes: &[u8]) -> u64 {
    bytes.iter().fold(5381u64, |hash, &byte| {
        (hash << 5).wrapping_add(hash).wrapping_add(u64::from(byte))
    })
}
