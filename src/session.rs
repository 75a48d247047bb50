//! Request workflow for front ends
//!
//! Runs one complete request (generate, encrypt, decrypt back, validate)
//! and reports progress between the steps. Failures can be appended to a
//! JSON-lines log. None of this lives in the engine: the engine only
//! returns values and typed errors.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::alphabet::AlphabetKind;
use crate::engine::{EncryptedPassword, PasswordEngine};
use crate::error::{PasswordError, Result};

/// One password request from a front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRequest {
    pub length: usize,
    pub kind: AlphabetKind,
}

impl PasswordRequest {
    pub fn new(length: usize, kind: AlphabetKind) -> Self {
        Self { length, kind }
    }

    /// Build a request from a kind tag
    pub fn from_tag(length: usize, tag: &str) -> Result<Self> {
        Ok(Self::new(length, tag.parse()?))
    }
}

impl Default for PasswordRequest {
    fn default() -> Self {
        Self::new(crate::DEFAULT_PASSWORD_LENGTH, AlphabetKind::Hex)
    }
}

/// Steps of a request, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    GeneratingKey,
    ApplyingProtection,
    Encoding,
    Done,
}

impl ProgressStage {
    /// Text a front end can show next to its progress indicator
    pub fn description(&self) -> &'static str {
        match self {
            ProgressStage::GeneratingKey => "Generating encryption key",
            ProgressStage::ApplyingProtection => "Applying protection layers",
            ProgressStage::Encoding => "Encoding the password",
            ProgressStage::Done => "Password generated",
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Receives progress notifications
pub trait ProgressSink {
    fn notify(&mut self, stage: ProgressStage);
}

impl<F: FnMut(ProgressStage)> ProgressSink for F {
    fn notify(&mut self, stage: ProgressStage) {
        self(stage)
    }
}

/// Sink that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn notify(&mut self, _stage: ProgressStage) {}
}

/// Outcome of a successful request
///
/// The plaintext fields and the key are wiped when the report is dropped.
#[derive(Clone, Serialize)]
pub struct PasswordReport {
    pub kind: AlphabetKind,
    pub length: usize,
    pub password: String,
    pub encrypted: EncryptedPassword,
    pub decrypted: String,
    /// URL-safe base64 key; the only copy once the report is dropped
    pub key: String,
    pub created_at: DateTime<Utc>,
}

impl PasswordReport {
    /// Text block for display
    pub fn summary(&self) -> String {
        format!(
            "Generated password: {}\nEncrypted password: {}\nDecrypted password: {}\n\nEncryption key:\n{}",
            self.password, self.encrypted, self.decrypted, self.key
        )
    }
}

impl Zeroize for PasswordReport {
    fn zeroize(&mut self) {
        self.password.zeroize();
        self.decrypted.zeroize();
        self.key.zeroize();
    }
}

impl Drop for PasswordReport {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for PasswordReport {}

impl fmt::Debug for PasswordReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordReport")
            .field("kind", &self.kind)
            .field("length", &self.length)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Run one request end to end
///
/// # Errors
/// Whatever the engine reports, plus `RoundTripMismatch` if the decrypted
/// text differs and `ValidationFailed` if the password does not validate.
pub fn run_request<P: ProgressSink + ?Sized>(
    engine: &PasswordEngine,
    request: &PasswordRequest,
    progress: &mut P,
) -> Result<PasswordReport> {
    progress.notify(ProgressStage::GeneratingKey);
    let password = engine.generate(request.length, request.kind)?;
    let (encrypted, key) = engine.encrypt_round_trip(password.as_str())?;

    progress.notify(ProgressStage::ApplyingProtection);
    let decrypted = engine.decrypt(&encrypted, &key)?;
    if decrypted != password.as_str() {
        return Err(PasswordError::RoundTripMismatch);
    }

    progress.notify(ProgressStage::Encoding);
    if !engine.validate(password.as_str(), request.kind) {
        return Err(PasswordError::ValidationFailed(request.kind));
    }

    let report = PasswordReport {
        kind: request.kind,
        length: request.length,
        password: password.as_str().to_string(),
        encrypted,
        decrypted,
        key: key.to_base64(),
        created_at: Utc::now(),
    };

    progress.notify(ProgressStage::Done);
    Ok(report)
}

/// A failed request as stored in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub timestamp: DateTime<Utc>,
    pub length: usize,
    /// Kind tag as requested; may be unknown
    pub kind: String,
    pub error: String,
}

/// Append-only JSON-lines log of failed requests
///
/// Each entry is one line, flushed as soon as it is written.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a failure for a raw length/tag pair
    pub fn record(&self, length: usize, kind: &str, error: &PasswordError) -> Result<FailureEntry> {
        let entry = FailureEntry {
            timestamp: Utc::now(),
            length,
            kind: kind.to_string(),
            error: error.to_string(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(&entry)?;
        writeln!(file, "{}", json)?;
        file.flush()?;

        Ok(entry)
    }

    /// Append a failure for a parsed request
    pub fn record_request(
        &self,
        request: &PasswordRequest,
        error: &PasswordError,
    ) -> Result<FailureEntry> {
        self.record(request.length, request.kind.as_str(), error)
    }

    /// Read every entry. A missing log reads as empty.
    pub fn read_all(&self) -> Result<Vec<FailureEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = OpenOptions::new().read(true).open(&self.path)?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PasswordPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_run_request_success() {
        let engine = PasswordEngine::default();
        let request = PasswordRequest::new(24, AlphabetKind::Base64);
        let mut stages = Vec::new();

        let mut sink = |stage: ProgressStage| stages.push(stage);

        let report = run_request(&engine, &request, &mut sink).unwrap();

        assert_eq!(report.password.len(), 24);
        assert_eq!(report.decrypted, report.password);
        assert_eq!(report.kind, AlphabetKind::Base64);
        assert_eq!(report.key.len(), 44);
        assert_eq!(
            stages,
            vec![
                ProgressStage::GeneratingKey,
                ProgressStage::ApplyingProtection,
                ProgressStage::Encoding,
                ProgressStage::Done,
            ]
        );
    }

    #[test]
    fn test_run_request_invalid_length_stops_early() {
        let engine = PasswordEngine::default();
        let request = PasswordRequest::new(5, AlphabetKind::Hex);
        let mut stages = Vec::new();

        let mut sink = |stage: ProgressStage| stages.push(stage);

        let result = run_request(&engine, &request, &mut sink);

        assert!(matches!(result, Err(PasswordError::InvalidLength { .. })));
        assert_eq!(stages, vec![ProgressStage::GeneratingKey]);
    }

    #[test]
    fn test_run_request_lenient_policy() {
        let policy = PasswordPolicy {
            min_length: 4,
            strict_validation: false,
            ..Default::default()
        };
        let engine = PasswordEngine::new(policy).unwrap();
        let request = PasswordRequest::new(4, AlphabetKind::Bin);
        let report = run_request(&engine, &request, &mut NoProgress).unwrap();
        assert_eq!(report.password.len(), 4);
    }

    #[test]
    fn test_report_summary_and_debug() {
        let engine = PasswordEngine::default();
        let report = run_request(&engine, &PasswordRequest::default(), &mut NoProgress).unwrap();

        let summary = report.summary();
        assert!(summary.contains(&report.password));
        assert!(summary.contains(report.encrypted.as_str()));
        assert!(summary.contains(&report.key));

        let debug = format!("{:?}", report);
        assert!(!debug.contains(&report.password));
        assert!(!debug.contains(&report.key));
    }

    #[test]
    fn test_report_zeroize_clears_secrets() {
        let engine = PasswordEngine::default();
        let request = PasswordRequest::default();
        let mut report = run_request(&engine, &request, &mut NoProgress).unwrap();
        assert!(!report.password.is_empty());

        report.zeroize();

        assert!(report.password.is_empty());
        assert!(report.decrypted.is_empty());
        assert!(report.key.is_empty());
        assert!(!report.encrypted.as_str().is_empty());
    }

    #[test]
    fn test_report_serializes() {
        let engine = PasswordEngine::default();
        let report = run_request(&engine, &PasswordRequest::default(), &mut NoProgress).unwrap();
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "hex");
        assert_eq!(json["length"], 16);
        assert_eq!(json["encrypted"], report.encrypted.as_str());
    }

    #[test]
    fn test_request_from_tag() {
        let request = PasswordRequest::from_tag(16, "bin").unwrap();
        assert_eq!(request.kind, AlphabetKind::Bin);
        assert!(matches!(
            PasswordRequest::from_tag(16, "octal"),
            Err(PasswordError::UnsupportedKind(_))
        ));
    }

    #[test]
    fn test_failure_log_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let log = FailureLog::new(temp_dir.path().join("failures.jsonl"));

        assert!(log.read_all().unwrap().is_empty());

        let engine = PasswordEngine::default();
        let request = PasswordRequest::new(5, AlphabetKind::Hex);
        let error = engine.generate(request.length, request.kind).unwrap_err();
        log.record_request(&request, &error).unwrap();

        let error = engine.generate_tag(16, "octal").unwrap_err();
        log.record(16, "octal", &error).unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, "hex");
        assert_eq!(entries[0].length, 5);
        assert!(entries[0].error.contains("Invalid password length"));
        assert_eq!(entries[1].kind, "octal");
        assert!(entries[1].error.contains("octal"));
    }

    #[test]
    fn test_failure_log_one_line_per_entry() {
        let temp_dir = TempDir::new().unwrap();
        let log = FailureLog::new(temp_dir.path().join("failures.jsonl"));

        for _ in 0..3 {
            log.record(0, "hex", &PasswordError::RoundTripMismatch).unwrap();
        }

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_stage_descriptions() {
        assert_eq!(ProgressStage::GeneratingKey.to_string(), "Generating encryption key");
        assert_eq!(ProgressStage::ApplyingProtection.to_string(), "Applying protection layers");
        assert_eq!(ProgressStage::Encoding.to_string(), "Encoding the password");
        assert_eq!(ProgressStage::Done.to_string(), "Password generated");
    }
}
