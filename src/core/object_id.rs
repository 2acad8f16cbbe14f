use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

/// Per-process random component, picked once.
fn process_bytes() -> &'static [u8; 5] {
    static BYTES: OnceLock<[u8; 5]> = OnceLock::new();
    BYTES.get_or_init(|| {
        let random = Uuid::new_v4();
        let mut out = [0u8; 5];
        out.copy_from_slice(&random.as_bytes()[..5]);
        out
    })
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| {
        let seed = *Uuid::new_v4().as_bytes();
        AtomicU32::new(u32::from_be_bytes([0, seed[0], seed[1], seed[2]]))
    });
    counter.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff
}

/// Generate a 24-hex-char task id in the service's ObjectId layout:
/// seconds timestamp (4 bytes), process random (5 bytes), counter (3 bytes).
pub fn new_object_id() -> String {
    let secs = chrono::Utc::now().timestamp() as u32;
    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    bytes[4..9].copy_from_slice(process_bytes());
    bytes[9..].copy_from_slice(&next_counter().to_be_bytes()[1..]);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn shape_is_24_lowercase_hex() {
        let id = new_object_id();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn ids_do_not_repeat() {
        let ids: HashSet<String> = (0..10_000).map(|_| new_object_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn shares_process_component() {
        let a = new_object_id();
        let b = new_object_id();
        assert_eq!(a[8..18], b[8..18]);
    }
}
