//! Hash-chained audit log of ledger events.
//!
//! Every event the ledger emits is appended as an [`EventRecord`] whose hash
//! commits to its sequence number, the previous record's hash, the event
//! fields, and the emission time:
//!
//! ```text
//! hash[n] = SHA-256(domain || n || hash[n-1] || event || emitted_at)
//! ```
//!
//! The first record chains from the all-zero hash. Rewriting any record
//! breaks every hash after it, which [`AuditLog::verify`] detects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tranchelock_types::{LedgerEvent, Result, TranchelockError, constants};

/// One entry in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    pub event: LedgerEvent,
    pub emitted_at: DateTime<Utc>,
    pub prev_hash: [u8; 32],
    pub hash: [u8; 32],
}

impl EventRecord {
    /// Hex form of the record hash, for logs.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Append-only event log.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    records: Vec<EventRecord>,
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return the new record.
    pub fn append(&mut self, event: LedgerEvent, emitted_at: DateTime<Utc>) -> &EventRecord {
        let sequence = self.records.len() as u64;
        let prev_hash = self.head();
        let hash = compute_hash(sequence, &prev_hash, &event, emitted_at);
        self.records.push(EventRecord {
            sequence,
            event,
            emitted_at,
            prev_hash,
            hash,
        });
        &self.records[self.records.len() - 1]
    }

    /// Hash of the newest record, or all zeros for an empty log.
    #[must_use]
    pub fn head(&self) -> [u8; 32] {
        self.records.last().map_or([0u8; 32], |r| r.hash)
    }

    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Recompute the whole chain.
    ///
    /// # Errors
    /// Returns [`TranchelockError::AuditChainBroken`] at the first record
    /// whose link or hash does not match.
    pub fn verify(&self) -> Result<()> {
        let mut prev = [0u8; 32];
        for (pos, record) in self.records.iter().enumerate() {
            let expected = compute_hash(pos as u64, &prev, &record.event, record.emitted_at);
            if record.sequence != pos as u64
                || record.prev_hash != prev
                || record.hash != expected
            {
                return Err(TranchelockError::AuditChainBroken {
                    sequence: pos as u64,
                });
            }
            prev = record.hash;
        }
        Ok(())
    }
}

fn compute_hash(
    sequence: u64,
    prev_hash: &[u8; 32],
    event: &LedgerEvent,
    emitted_at: DateTime<Utc>,
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(constants::AUDIT_HASH_DOMAIN);
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash);
    hash_event(&mut hasher, event);
    hasher.update(emitted_at.timestamp().to_le_bytes());
    hasher.update(emitted_at.timestamp_subsec_nanos().to_le_bytes());
    hasher.finalize().into()
}

fn hash_event(hasher: &mut Sha256, event: &LedgerEvent) {
    hasher.update(event.name().as_bytes());
    match event {
        LedgerEvent::LockupCreated {
            user,
            index,
            short_amount,
            long_amount,
        } => {
            hasher.update(user.0.as_bytes());
            hasher.update(index.0.to_le_bytes());
            hasher.update(short_amount.to_string().as_bytes());
            hasher.update(b"/");
            hasher.update(long_amount.to_string().as_bytes());
        }
        LedgerEvent::ShortUnlocked {
            user,
            index,
            amount,
        }
        | LedgerEvent::LongUnlocked {
            user,
            index,
            amount,
        } => {
            hasher.update(user.0.as_bytes());
            hasher.update(index.0.to_le_bytes());
            hasher.update(amount.to_string().as_bytes());
        }
        LedgerEvent::ShortDurationChanged { value }
        | LedgerEvent::LongDurationChanged { value } => {
            hasher.update(value.as_secs().to_le_bytes());
            hasher.update(value.subsec_nanos().to_le_bytes());
        }
        LedgerEvent::ShortFractionChanged { value }
        | LedgerEvent::LongFractionChanged { value } => {
            hasher.update(value.to_string().as_bytes());
        }
    }
}
