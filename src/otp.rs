use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use dashmap::DashMap;
use rand::{rngs::OsRng, Rng};
use tracing::{debug, trace};

use crate::notify::mask_subject;

/// Lifetime of an issued code unless configured otherwise.
pub const DEFAULT_VALIDITY: Duration = Duration::from_secs(5 * 60);

const CODE_SPACE: u32 = 1_000_000;

#[derive(Debug, Clone)]
struct OtpRecord {
    code: String,
    expires_at: DateTime<Utc>,
}

impl OtpRecord {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// In-memory, process-local store of single-use codes keyed by subject
/// (usually a phone number).
///
/// Every operation on one subject runs under that subject's shard lock, so a
/// check and the delete that follows it can never interleave with another
/// `generate`/`validate` for the same key.
#[derive(Clone)]
pub struct OtpManager {
    records: Arc<DashMap<String, OtpRecord>>,
    validity: Duration,
    ttl: chrono::Duration,
}

impl Default for OtpManager {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDITY)
    }
}

impl OtpManager {
    pub fn new(validity: Duration) -> Self {
        let ttl = chrono::Duration::from_std(validity).unwrap_or(chrono::Duration::MAX);
        Self { records: Arc::new(DashMap::new()), validity, ttl }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issue a fresh 6-digit code for `subject`, replacing any code still pending.
    pub fn generate(&self, subject: &str) -> String {
        let code = format!("{:06}", OsRng.gen_range(0..CODE_SPACE));
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let replaced = self
            .records
            .insert(subject.to_owned(), OtpRecord { code: code.clone(), expires_at })
            .is_some();

        debug!(subject = %mask_subject(subject), replaced, %expires_at, "otp issued");
        metrics::counter!("otp_generated_total").increment(1);
        self.report_pending();
        code
    }

    /// Returns true only for an unexpired exact match, consuming the code.
    ///
    /// A wrong guess leaves the record in place; an expired record is dropped.
    /// Callers cannot tell the failure cases apart.
    pub fn validate(&self, subject: &str, candidate: &str) -> bool {
        let now = Utc::now();
        let mut expired = false;
        let mut matched = false;
        let removed = self.records.remove_if(subject, |_, rec| {
            if rec.is_expired(now) {
                expired = true;
                return true;
            }
            matched = constant_time_eq(rec.code.as_bytes(), candidate.as_bytes());
            matched
        });

        let accepted = removed.is_some() && matched && !expired;
        if expired {
            debug!(subject = %mask_subject(subject), "expired otp purged on validate");
        } else if !accepted {
            trace!(subject = %mask_subject(subject), "otp rejected");
        }
        let outcome = if accepted { "accepted" } else { "rejected" };
        metrics::counter!("otp_validation_total", "outcome" => outcome).increment(1);
        if removed.is_some() {
            self.report_pending();
        }
        accepted
    }

    /// Drop every expired record and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut purged = 0;
        self.records.retain(|_, rec| {
            let keep = !rec.is_expired(now);
            if !keep {
                purged += 1;
            }
            keep
        });
        if purged > 0 {
            metrics::counter!("otp_swept_total").increment(purged as u64);
            self.report_pending();
        }
        purged
    }

    /// Records currently held, expired ones included until they are reaped.
    pub fn pending(&self) -> usize {
        self.records.len()
    }

    fn report_pending(&self) {
        metrics::gauge!("otp_pending").set(self.records.len() as f64);
    }
}
