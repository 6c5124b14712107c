//! Minimal-disclosure projections of source credentials.
//!
//! Each projection copies a fixed set of subject attributes and computes
//! derived ones from a single `now`. Nothing else from the subject is ever
//! carried into an access delegation credential.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde_json::{Map, Value};

use warrant_identity::VerifiableCredential;

/// Elapsed time after which an employee counts as senior.
pub const SENIORITY_THRESHOLD_MONTHS: u32 = 60;

/// Signature shared by all projections.
pub type Projection = fn(&VerifiableCredential, DateTime<Utc>) -> Map<String, Value>;

fn copy_fields(subject: &Map<String, Value>, fields: &[&str], out: &mut Map<String, Value>) {
    for field in fields {
        if let Some(value) = subject.get(*field) {
            out.insert((*field).to_string(), value.clone());
        }
    }
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// Senior iff strictly more than the threshold has elapsed since `joined`.
///
/// A join date in the future is not senior. An absent or unparseable date
/// is not senior either.
pub fn is_senior(joined: Option<&Value>, now: DateTime<Utc>) -> bool {
    let Some(joined) = joined.and_then(parse_date) else {
        return false;
    };
    now.date_naive()
        .checked_sub_months(Months::new(SENIORITY_THRESHOLD_MONTHS))
        .is_some_and(|cutoff| joined < cutoff)
}

/// `EmployeeCredential` ⇒ `employeeId, position, isSeniorEmployee`.
pub fn employee_projection(source: &VerifiableCredential, now: DateTime<Utc>) -> Map<String, Value> {
    let subject = &source.credential_subject;
    let mut out = Map::new();
    copy_fields(subject, &["employeeId", "position"], &mut out);
    out.insert(
        "isSeniorEmployee".to_string(),
        Value::Bool(is_senior(subject.get("joinedDate"), now)),
    );
    out
}

/// `PerformanceCredential` ⇒ `keyType, credentialId`.
pub fn performance_projection(
    source: &VerifiableCredential,
    _now: DateTime<Utc>,
) -> Map<String, Value> {
    let mut out = Map::new();
    copy_fields(&source.credential_subject, &["keyType"], &mut out);
    if let Some(id) = &source.id {
        out.insert("credentialId".to_string(), Value::String(id.clone()));
    }
    out
}
