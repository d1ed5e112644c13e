use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use std::sync::Arc;

use crate::{error::TimeSyncError, transport::HttpTransport};

use super::TimeSource;

/// Host clock. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl TimeSource for SystemClock {
    async fn sync(&self) -> Result<DateTime<Utc>, TimeSyncError> {
        Ok(Utc::now())
    }
}

/// Takes the time from the `Date` header of an HTTP response.
#[derive(Debug, Clone)]
pub struct HttpDateClock {
    transport: Arc<dyn HttpTransport>,
    url: String,
}

impl HttpDateClock {
    pub fn new(transport: Arc<dyn HttpTransport>, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }
}

#[async_trait]
impl TimeSource for HttpDateClock {
    async fn sync(&self) -> Result<DateTime<Utc>, TimeSyncError> {
        let res = self.transport.get(&self.url).await?;
        // Any answer carries a Date header; only server errors are suspect.
        if res.status >= 500 {
            return Err(TimeSyncError::Status(res.status));
        }

        let value = res.date.ok_or(TimeSyncError::MissingDate)?;
        DateTime::parse_from_rfc2822(&value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|source| TimeSyncError::InvalidDate { value, source })
    }
}

/// Wall-clock time pinned to a monotonic instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncedClock {
    synced_at: DateTime<Utc>,
    at_ms: u64,
}

impl SyncedClock {
    pub fn new(synced_at: DateTime<Utc>, at_ms: u64) -> Self {
        Self { synced_at, at_ms }
    }

    /// UTC time at monotonic instant `now_ms`.
    pub fn utc_at(&self, now_ms: u64) -> DateTime<Utc> {
        let elapsed = now_ms.saturating_sub(self.at_ms);
        self.synced_at + Duration::milliseconds(i64::try_from(elapsed).unwrap_or(i64::MAX / 2))
    }

    /// Local time at `now_ms` for a whole-hour UTC offset.
    pub fn local_at(&self, now_ms: u64, utc_offset_hours: i32) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or(Utc.fix());
        self.utc_at(now_ms).with_timezone(&offset)
    }
}
