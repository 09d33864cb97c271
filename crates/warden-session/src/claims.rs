//! Token claims and expiry.
//!
//! [`Claims`] is the payload a session token carries: the standard
//! issuer/audience/issued-at/expiration fields, the [`Subject`] identity
//! pair, and arbitrary caller-defined session attributes flattened at the
//! top level of the payload object.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use warden_types::{EntityId, Subject, TenantId};

/// The claim set carried by a signed session token.
///
/// Extra session attributes serialize flattened, so the wire payload is a
/// single flat JSON object:
///
/// ```text
/// { "iss": "warden", "aud": "api", "iat": 1700000000, "exp": 1700003600,
///   "tid": "…", "eid": "…", "display_name": "Amina" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiration, unix seconds.
    pub exp: i64,
    /// Tenant the session belongs to.
    pub tid: TenantId,
    /// Entity the session speaks for.
    pub eid: EntityId,
    /// Caller-defined session attributes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Claims {
    /// The identity pair this token speaks for.
    #[must_use]
    pub fn subject(&self) -> Subject {
        Subject::new(self.tid, self.eid)
    }

    /// The expiration instant.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Failed to parse a relative duration string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid expiry '{input}': expected e.g. \"1 hour\", \"30 seconds\", \"2d\"")]
pub struct ExpiryParseError {
    /// The rejected input.
    pub input: String,
}

/// When an issued token should expire.
///
/// Accepts an absolute instant, a relative duration, or a relative
/// duration string.
///
/// # Example
///
/// ```
/// use warden_session::Expiry;
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
///
/// let absolute = Expiry::from(now + Duration::hours(2));
/// let relative = Expiry::from(Duration::hours(2));
/// let parsed: Expiry = "2 hours".parse().unwrap();
///
/// assert_eq!(absolute.resolve(now), relative.resolve(now));
/// assert_eq!(parsed.resolve(now), relative.resolve(now));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
    /// Expire at an absolute instant.
    At(DateTime<Utc>),
    /// Expire a duration after issuance.
    In(Duration),
}

impl Expiry {
    /// Resolves to the absolute expiration for a token issued at `now`.
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::At(instant) => *instant,
            Self::In(duration) => now + *duration,
        }
    }
}

impl From<DateTime<Utc>> for Expiry {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::At(instant)
    }
}

impl From<Duration> for Expiry {
    fn from(duration: Duration) -> Self {
        Self::In(duration)
    }
}

impl std::str::FromStr for Expiry {
    type Err = ExpiryParseError;

    /// Parses `"<count> <unit>"` (`"1 hour"`, `"30 seconds"`) or the
    /// compact form `"30s"`, `"15m"`, `"2h"`, `"7d"`, `"1w"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ExpiryParseError {
            input: s.to_string(),
        };
        let trimmed = s.trim();

        let (count, unit) = match trimmed.split_once(char::is_whitespace) {
            Some((count, unit)) => (count.trim(), unit.trim()),
            None => {
                let digits = trimmed
                    .find(|c: char| !c.is_ascii_digit())
                    .ok_or_else(error)?;
                trimmed.split_at(digits)
            }
        };

        let count: i64 = count.parse().map_err(|_| error())?;
        if count < 0 {
            return Err(error());
        }

        // Units are matched exactly; the try_* constructors return None
        // on out-of-range counts instead of panicking.
        let duration = match unit {
            "s" | "sec" | "secs" | "second" | "seconds" => Duration::try_seconds(count),
            "m" | "min" | "mins" | "minute" | "minutes" => Duration::try_minutes(count),
            "h" | "hr" | "hrs" | "hour" | "hours" => Duration::try_hours(count),
            "d" | "day" | "days" => Duration::try_days(count),
            "w" | "week" | "weeks" => Duration::try_weeks(count),
            _ => return Err(error()),
        };
        duration.map(Self::In).ok_or_else(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims() -> Claims {
        Claims {
            iss: "warden".to_string(),
            aud: "api".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
            tid: TenantId::new(),
            eid: EntityId::new(),
            extra: BTreeMap::from([("display_name".to_string(), json!("Amina"))]),
        }
    }

    #[test]
    fn extra_attributes_flatten_on_the_wire() {
        let claims = claims();
        let json = serde_json::to_value(&claims).expect("serialize");
        assert_eq!(json["display_name"], json!("Amina"));
        assert!(json.get("extra").is_none());

        let parsed: Claims = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, claims);
    }

    #[test]
    fn subject_pairs_tenant_and_entity() {
        let claims = claims();
        let subject = claims.subject();
        assert_eq!(subject.tenant, claims.tid);
        assert_eq!(subject.entity, claims.eid);
    }

    #[test]
    fn expiry_parse_verbose_units() {
        assert_eq!("1 hour".parse(), Ok(Expiry::In(Duration::hours(1))));
        assert_eq!("2 hours".parse(), Ok(Expiry::In(Duration::hours(2))));
        assert_eq!("30 seconds".parse(), Ok(Expiry::In(Duration::seconds(30))));
        assert_eq!("5 minutes".parse(), Ok(Expiry::In(Duration::minutes(5))));
        assert_eq!("1 day".parse(), Ok(Expiry::In(Duration::days(1))));
    }

    #[test]
    fn expiry_parse_compact_units() {
        assert_eq!("30s".parse(), Ok(Expiry::In(Duration::seconds(30))));
        assert_eq!("15m".parse(), Ok(Expiry::In(Duration::minutes(15))));
        assert_eq!("2h".parse(), Ok(Expiry::In(Duration::hours(2))));
        assert_eq!("7d".parse(), Ok(Expiry::In(Duration::days(7))));
        assert_eq!("1w".parse(), Ok(Expiry::In(Duration::weeks(1))));
    }

    #[test]
    fn expiry_parse_rejects_junk() {
        for junk in ["", "soon", "h2", "-5s", "1 fortnight", "12", "5ms", "5ss", "3 hs"] {
            assert!(junk.parse::<Expiry>().is_err(), "accepted {junk:?}");
        }
    }

    #[test]
    fn expiry_parse_out_of_range_count_is_an_error_not_a_panic() {
        for huge in [
            "9223372036854775807 hours",
            "9223372036854775807w",
            "9223372036854775807 days",
        ] {
            assert!(huge.parse::<Expiry>().is_err(), "accepted {huge:?}");
        }
    }

    #[test]
    fn resolve_is_relative_to_now() {
        let now = Utc::now();
        let expiry = Expiry::In(Duration::minutes(5));
        assert_eq!(expiry.resolve(now), now + Duration::minutes(5));

        let instant = now + Duration::days(1);
        assert_eq!(Expiry::At(instant).resolve(now), instant);
    }
}
