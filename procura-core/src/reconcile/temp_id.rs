use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a temporary card id: `{prefix}{unix micros}-{seq}`.
/// The counter makes ids unique within the process even when two cards are
/// created inside the same microsecond.
pub fn generate_temp_id(prefix: &str) -> String {
    let seq = TEMP_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let ts = chrono::Utc::now().timestamp_micros();
    format!("{}{}-{}", prefix, ts, seq)
}

/// Whether an id was minted locally rather than assigned by the server.
pub fn is_temp_id(id: &str, prefix: &str) -> bool {
    !prefix.is_empty() && id.starts_with(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_temp_id_has_prefix() {
        let id = generate_temp_id("temp-");
        assert!(id.starts_with("temp-"));
        assert!(is_temp_id(&id, "temp-"));
    }

    #[test]
    fn test_temp_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_temp_id("temp-")).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_server_ids_are_not_temp() {
        assert!(!is_temp_id("card-17", "temp-"));
        assert!(!is_temp_id("8f14e45f-ceea-467f-a0e6-b2c4b3f8d2a1", "temp-"));
        assert!(!is_temp_id("anything", ""));
    }
}
