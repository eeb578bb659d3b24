//! Audit trail entries, queries and statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use signal_living_core::{ActivityAction, ActivityLogId, AdminUserId};

/// Default page size for audit queries.
pub const DEFAULT_PAGE_SIZE: u32 = 50;
/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Default number of entries returned per admin.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

/// Value recorded when the client address cannot be derived.
pub const UNKNOWN_IP: &str = "unknown";

/// One immutable audit entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: ActivityLogId,
    /// Acting admin; `None` for anonymous attempts such as unknown-user logins.
    pub admin_id: Option<AdminUserId>,
    /// Username at the time of the action (or the attempted username).
    pub admin_username: String,
    pub action: ActivityAction,
    /// Affected entity's name or number.
    pub target: Option<String>,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
}

/// An entry before the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivityLog {
    pub admin_id: Option<AdminUserId>,
    pub admin_username: String,
    pub action: ActivityAction,
    pub target: Option<String>,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
}

impl NewActivityLog {
    /// Attach the store-assigned id.
    #[must_use]
    pub fn with_id(self, id: ActivityLogId) -> ActivityLog {
        ActivityLog {
            id,
            admin_id: self.admin_id,
            admin_username: self.admin_username,
            action: self.action,
            target: self.target,
            details: self.details,
            timestamp: self.timestamp,
            ip_address: self.ip_address,
        }
    }
}

/// A validated, conjunctive audit query. Date bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityLogQuery {
    /// 1-indexed page.
    pub page: u32,
    pub limit: u32,
    pub admin_id: Option<AdminUserId>,
    pub action: Option<ActivityAction>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Default for ActivityLogQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            admin_id: None,
            action: None,
            start: None,
            end: None,
        }
    }
}

impl ActivityLogQuery {
    /// Number of entries to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Whether an entry passes every filter.
    #[must_use]
    pub fn matches(&self, entry: &ActivityLog) -> bool {
        self.admin_id.is_none_or(|id| entry.admin_id == Some(id))
            && self.action.is_none_or(|action| entry.action == action)
            && self.start.is_none_or(|start| entry.timestamp >= start)
            && self.end.is_none_or(|end| entry.timestamp <= end)
    }
}

/// Raw query string of `GET /api/admin/activity-logs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub admin_id: Option<i32>,
    pub action: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ActivityLogParams {
    /// Validate and normalize, interpreting bare dates in `tz`.
    ///
    /// `page` is clamped to at least 1 and `limit` to `1..=100`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending parameter.
    pub fn into_query<Tz: TimeZone>(self, tz: &Tz) -> Result<ActivityLogQuery, String> {
        let action = self
            .action
            .filter(|a| !a.is_empty())
            .map(|a| a.parse::<ActivityAction>())
            .transpose()?;
        let start = self
            .start_date
            .filter(|s| !s.is_empty())
            .map(|s| parse_bound(&s, Bound::Start, tz))
            .transpose()?;
        let end = self
            .end_date
            .filter(|s| !s.is_empty())
            .map(|s| parse_bound(&s, Bound::End, tz))
            .transpose()?;

        Ok(ActivityLogQuery {
            page: self.page.unwrap_or(1).max(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            admin_id: self.admin_id.map(AdminUserId::new),
            action,
            start,
            end,
        })
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date in `tz`.
///
/// A bare end date covers the whole day.
fn parse_bound<Tz: TimeZone>(value: &str, bound: Bound, tz: &Tz) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid date: {value}"))?;
    let start_of_day = |day: NaiveDate| {
        tz.from_local_datetime(&day.and_time(NaiveTime::MIN))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| format!("invalid date: {value}"))
    };

    match bound {
        Bound::Start => start_of_day(date),
        Bound::End => {
            let next = date
                .succ_opt()
                .ok_or_else(|| format!("invalid date: {value}"))?;
            Ok(start_of_day(next)? - Duration::nanoseconds(1))
        }
    }
}

/// One page of audit entries, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogPage {
    pub entries: Vec<ActivityLog>,
    /// Count of entries matching the filters.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl ActivityLogPage {
    #[must_use]
    pub fn new(entries: Vec<ActivityLog>, total: u64, query: &ActivityLogQuery) -> Self {
        Self {
            entries,
            total,
            page: query.page,
            limit: query.limit,
            total_pages: total.div_ceil(u64::from(query.limit.max(1))),
        }
    }
}

/// Time boundaries for [`ActivityStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindow {
    /// Local midnight of the current day.
    pub today_start: DateTime<Utc>,
    /// Seven days before now.
    pub week_start: DateTime<Utc>,
}

impl StatsWindow {
    /// Window as seen from `now` in `tz`.
    #[must_use]
    pub fn at<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Self {
        let local_today = now.with_timezone(tz).date_naive();
        let today_start = tz
            .from_local_datetime(&local_today.and_time(NaiveTime::MIN))
            .earliest()
            .map_or(now, |dt| dt.with_timezone(&Utc));

        Self {
            today_start,
            week_start: now - Duration::days(7),
        }
    }
}

/// Audit summary for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub total: u64,
    pub today: u64,
    pub this_week: u64,
    pub by_action: BTreeMap<ActivityAction, u64>,
}

impl ActivityStats {
    /// Tally entries against a window.
    pub fn tally<'a>(entries: impl IntoIterator<Item = &'a ActivityLog>, window: StatsWindow) -> Self {
        entries.into_iter().fold(Self::default(), |mut stats, entry| {
            stats.total += 1;
            if entry.timestamp >= window.today_start {
                stats.today += 1;
            }
            if entry.timestamp >= window.week_start {
                stats.this_week += 1;
            }
            *stats.by_action.entry(entry.action).or_default() += 1;
            stats
        })
    }
}
