use chrono::{DateTime, Utc};

/// Time source for token expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// `true` when an RFC 3339 `expires_at` stamp is unparseable or not in the future.
    fn is_expired(&self, expires_at: &str) -> bool {
        match DateTime::parse_from_rfc3339(expires_at) {
            Ok(at) => at.with_timezone(&Utc) <= self.now(),
            Err(_) => true,
        }
    }
}

pub struct SystemClock;
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);
#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
