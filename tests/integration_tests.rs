//! Integration tests for pwforge
//!
//! Exercise the public API the way a front end would.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use pwforge::{
    run_request, AlphabetKind, CryptoError, FailureLog, NoProgress, PasswordEngine,
    PasswordError, PasswordPolicy, PasswordRequest, TokenKey,
};
use tempfile::TempDir;

#[test]
fn test_generate_all_kinds_all_lengths() {
    let engine = PasswordEngine::default();
    for kind in AlphabetKind::ALL {
        for length in 16..=64 {
            let password = engine.generate(length, kind).unwrap();
            assert_eq!(password.as_str().chars().count(), length);
            assert!(engine.validate(password.as_str(), kind));
        }
    }
}

#[test]
fn test_generate_compact_policy_full_range() {
    let engine = PasswordEngine::new(PasswordPolicy::compact()).unwrap();
    for kind in AlphabetKind::ALL {
        for length in 8..=16 {
            let password = engine.generate(length, kind).unwrap();
            assert_eq!(password.len(), length);
            assert!(engine.validate(password.as_str(), kind));
        }
    }
}

#[test]
fn test_validate_rejects_foreign_characters() {
    let engine = PasswordEngine::default();
    assert!(!engine.validate_tag("zzzz", "hex"));
    assert!(!engine.validate_tag("zzzzzzzzzzzzzzzz", "hex"));
    assert!(!engine.validate_tag("0000000000000002", "bin"));
    assert!(!engine.validate_tag("AAAAAAAAAAAAAAA-", "base64"));
    assert!(!engine.validate_tag("!!!!!!!!!!!!!!!a", "special"));
}

#[test]
fn test_round_trip_law() {
    let engine = PasswordEngine::default();
    for kind in AlphabetKind::ALL {
        let password = engine.generate(32, kind).unwrap();
        let (encrypted, key) = engine.encrypt_round_trip(password.as_str()).unwrap();
        assert_eq!(engine.decrypt(&encrypted, &key).unwrap(), password.as_str());
    }
}

#[test]
fn test_mismatched_key_fails() {
    let engine = PasswordEngine::default();
    let (encrypted, _key) = engine.encrypt_round_trip("0123456789abcdef").unwrap();
    let unrelated = TokenKey::generate().unwrap();

    match engine.decrypt(&encrypted, &unrelated) {
        Err(PasswordError::Crypto(CryptoError::AuthenticationFailed)) => {}
        other => panic!("Expected AuthenticationFailed, got {:?}", other),
    }
}

#[test]
fn test_key_survives_base64_transfer() {
    let engine = PasswordEngine::default();
    let (encrypted, key) = engine.encrypt_round_trip("!\"#$%&'()*+,-./\\").unwrap();
    let shown = key.to_base64();
    drop(key);

    let restored = TokenKey::from_base64(&shown).unwrap();
    assert_eq!(engine.decrypt(&encrypted, &restored).unwrap(), "!\"#$%&'()*+,-./\\");
}

#[test]
fn test_no_collisions_over_many_draws() {
    // 10,000 draws from a 64-bit space: a collision has probability ~3e-12
    let engine = PasswordEngine::default();
    let mut seen = HashSet::with_capacity(10_000);
    for _ in 0..10_000 {
        let password = engine.generate(16, AlphabetKind::Hex).unwrap();
        assert!(seen.insert(password.into_string()), "duplicate password generated");
    }
}

#[test]
fn test_invalid_length_and_kind() {
    let engine = PasswordEngine::default();
    assert!(matches!(
        engine.generate(5, AlphabetKind::Hex),
        Err(PasswordError::InvalidLength { length: 5, .. })
    ));
    assert!(matches!(
        engine.generate_tag(16, "unknown"),
        Err(PasswordError::UnsupportedKind(_))
    ));
}

#[test]
fn test_engine_shared_across_threads() {
    let engine = Arc::new(PasswordEngine::default());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let kind = AlphabetKind::ALL[i % AlphabetKind::ALL.len()];
                let request = PasswordRequest::new(20, kind);
                let report = run_request(&engine, &request, &mut NoProgress).unwrap();
                report.password.clone()
            })
        })
        .collect();

    let passwords: HashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(passwords.len(), 8);
}

#[test]
fn test_front_end_flow_with_failure_log() {
    let temp_dir = TempDir::new().unwrap();
    let log = FailureLog::new(temp_dir.path().join("pwforge.log"));
    let engine = PasswordEngine::default();

    let requests = [(16, "hex"), (4, "bin"), (16, "octal"), (40, "especial")];
    let mut successes = 0;

    for (length, tag) in requests {
        let outcome = PasswordRequest::from_tag(length, tag)
            .and_then(|request| run_request(&engine, &request, &mut NoProgress));
        match outcome {
            Ok(report) => {
                assert_eq!(report.password.len(), length);
                successes += 1;
            }
            Err(error) => {
                log.record(length, tag, &error).unwrap();
            }
        }
    }

    assert_eq!(successes, 2);
    let entries = log.read_all().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, "bin");
    assert_eq!(entries[1].kind, "octal");
}
