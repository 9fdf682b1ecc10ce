//! Fuzz target for queue key parsing.
//!
//! This tests that parsing never panics on arbitrary input and that every
//! accepted key encodes back to exactly the input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use replication_assigner::{QueueKey, ReplicationTarget};

fuzz_target!(|data: (&str, &str, &str, &str)| {
    let (raw, file, peer, table) = data;

    // Should never panic
    if let Ok(key) = QueueKey::parse(raw) {
        assert_eq!(key.as_str(), raw);
        let rebuilt = QueueKey::new(key.file_name(), key.target()).expect("parsed components are valid");
        assert_eq!(rebuilt, key);
    }

    // Anything new() accepts must parse back to the same key
    let target = ReplicationTarget::new(peer, table);
    if let Ok(key) = QueueKey::new(file, &target) {
        let parsed = QueueKey::parse(key.as_str()).expect("encoded key must parse");
        assert_eq!(parsed.file_name(), file);
        assert_eq!(parsed.target(), &target);
    }
});
