//! Reads today's active (not-afk) time from a local ActivityWatch server.

use crate::error::AlertError;
use chrono::{DateTime, Local, LocalResult, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use reqwest::{blocking::Client, Url};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

pub const AFK_BUCKET_PREFIX: &str = "aw-watcher-afk";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5600;
pub const TESTING_PORT: u16 = 5666;
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AfkStatus {
    #[serde(rename = "not-afk")]
    NotAfk,
    #[serde(rename = "afk")]
    Afk,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AfkData {
    #[serde(default)]
    pub status: AfkStatus,
}

/// One interval from the AFK watcher's bucket
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityEvent {
    pub timestamp: DateTime<Utc>,
    /// Length of the interval in seconds
    pub duration: f64,
    #[serde(default)]
    pub data: AfkData,
}

impl ActivityEvent {
    pub fn is_active(&self) -> bool {
        self.data.status == AfkStatus::NotAfk
    }
}

/// Read-only view of the activity tracker's data store
pub trait ActivitySource {
    fn bucket_ids(&self) -> Result<Vec<String>, AlertError>;
    fn events(
        &self,
        bucket_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ActivityEvent>, AlertError>;
}

/// Blocking HTTP client for the ActivityWatch REST API
#[derive(Debug)]
pub struct AwClient {
    client: Client,
    base_url: Url,
}

impl AwClient {
    pub fn new(base_url: &str) -> Result<Self, AlertError> {
        let base_url = Url::parse(base_url).map_err(|_| AlertError::InvalidServerUrl {
            url: base_url.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AlertError::InvalidServerUrl {
                url: base_url.to_string(),
            });
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AlertError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AlertError::InvalidServerUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(["api", "0"])
            .extend(segments);
        Ok(url)
    }
}

impl ActivitySource for AwClient {
    fn bucket_ids(&self) -> Result<Vec<String>, AlertError> {
        // Trailing empty segment keeps the slash the server routes on
        let url = self.endpoint(&["buckets", ""])?;
        let buckets: BTreeMap<String, serde_json::Value> = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .json()?;

        Ok(buckets.into_keys().collect())
    }

    fn events(
        &self,
        bucket_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ActivityEvent>, AlertError> {
        let url = self.endpoint(&["buckets", bucket_id, "events"])?;
        let events = self
            .client
            .get(url)
            .query(&range_query(start, end))
            .send()?
            .error_for_status()?
            .json()?;

        Ok(events)
    }
}

/// Query for every event in `[start, end]`; `limit=-1` lifts the server's
/// default page size.
fn range_query(start: DateTime<Utc>, end: DateTime<Utc>) -> [(&'static str, String); 3] {
    [
        ("start", start.to_rfc3339_opts(SecondsFormat::Micros, true)),
        ("end", end.to_rfc3339_opts(SecondsFormat::Micros, true)),
        ("limit", "-1".to_string()),
    ]
}

/// The tracker the run talks to. A server address that cannot be turned into
/// a client behaves like an unreachable server: every query fails and the
/// run reports zero active time.
#[derive(Debug)]
pub enum Tracker {
    Connected(AwClient),
    Unavailable(String),
}

impl Tracker {
    pub fn connect(base_url: &str) -> Self {
        match AwClient::new(base_url) {
            Ok(client) => {
                log::debug!("Using ActivityWatch at {}", client.base_url());
                Tracker::Connected(client)
            }
            Err(e) => Tracker::Unavailable(e.to_string()),
        }
    }
}

impl ActivitySource for Tracker {
    fn bucket_ids(&self) -> Result<Vec<String>, AlertError> {
        match self {
            Tracker::Connected(client) => client.bucket_ids(),
            Tracker::Unavailable(reason) => Err(AlertError::TrackerUnavailable(reason.clone())),
        }
    }

    fn events(
        &self,
        bucket_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ActivityEvent>, AlertError> {
        match self {
            Tracker::Connected(client) => client.events(bucket_id, start, end),
            Tracker::Unavailable(reason) => Err(AlertError::TrackerUnavailable(reason.clone())),
        }
    }
}

/// Base URL for the server: explicit host/port win over the configured URL,
/// which wins over the default address (port 5666 in testing mode).
pub fn server_url(
    configured: Option<&str>,
    host: Option<&str>,
    port: Option<u16>,
    testing: bool,
) -> String {
    let default_port = if testing { TESTING_PORT } else { DEFAULT_PORT };
    match (configured, host, port) {
        (Some(url), None, None) => url.to_string(),
        (_, host, port) => format!(
            "http://{}:{}",
            host.unwrap_or(DEFAULT_HOST),
            port.unwrap_or(default_port)
        ),
    }
}

pub fn system_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|e| {
            log::warn!("Could not determine hostname: {}", e);
            "unknown".to_string()
        })
}

/// `aw-watcher-afk_<hostname>` if present, otherwise the first bucket whose id
/// mentions the AFK watcher.
pub fn resolve_afk_bucket<'a>(bucket_ids: &'a [String], hostname: &str) -> Option<&'a str> {
    let expected = format!("{}_{}", AFK_BUCKET_PREFIX, hostname);
    bucket_ids
        .iter()
        .find(|id| **id == expected)
        .or_else(|| bucket_ids.iter().find(|id| id.contains(AFK_BUCKET_PREFIX)))
        .map(String::as_str)
}

/// Events are summed at face value. An interval that began before midnight
/// still contributes its whole duration.
pub fn sum_active_seconds(events: &[ActivityEvent]) -> f64 {
    events
        .iter()
        .filter(|e| e.is_active())
        .map(|e| e.duration.max(0.0))
        .sum()
}

/// Local midnight of `now`'s day. When a DST gap swallows midnight the
/// first wall-clock time after the gap is used.
pub fn start_of_day(now: DateTime<Local>) -> DateTime<Local> {
    let midnight = now.date_naive().and_time(chrono::NaiveTime::MIN);
    first_valid_local(midnight, |t| Local.from_local_datetime(t)).unwrap_or(now)
}

/// Steps forward from `start` in quarter hours until `resolve` maps the wall
/// clock time to an instant. Gaps never exceed two hours.
fn first_valid_local<T>(
    start: NaiveDateTime,
    resolve: impl Fn(&NaiveDateTime) -> LocalResult<T>,
) -> Option<T> {
    (0..=8)
        .map(|quarter| start + chrono::Duration::minutes(15 * quarter))
        .find_map(|t| resolve(&t).earliest())
}

pub fn try_active_seconds_today<S: ActivitySource + ?Sized>(
    source: &S,
    hostname: &str,
    now: DateTime<Local>,
) -> Result<f64, AlertError> {
    let buckets = source.bucket_ids()?;
    let bucket_id = resolve_afk_bucket(&buckets, hostname).ok_or(AlertError::NoAfkBucket {
        prefix: AFK_BUCKET_PREFIX,
    })?;
    log::debug!("Using bucket {}", bucket_id);

    let start = start_of_day(now).with_timezone(&Utc);
    let events = source.events(bucket_id, start, now.with_timezone(&Utc))?;
    log::debug!("Fetched {} events since {}", events.len(), start);

    Ok(sum_active_seconds(&events))
}

/// Today's active seconds. Any failure talking to the tracker is logged and
/// reported as zero so the run simply does not alert.
pub fn get_active_seconds_today<S: ActivitySource + ?Sized>(
    source: &S,
    hostname: &str,
    now: DateTime<Local>,
) -> f64 {
    match try_active_seconds_today(source, hostname, now) {
        Ok(seconds) => seconds,
        Err(e) => {
            log::error!("Error querying ActivityWatch: {}", e);
            0.0
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::cell::RefCell;

    /// In-memory tracker recording which bucket and range were queried
    pub struct FakeSource {
        pub buckets: Vec<String>,
        pub events: Vec<ActivityEvent>,
        pub fail: bool,
        pub queried: RefCell<Option<(String, DateTime<Utc>, DateTime<Utc>)>>,
    }

    impl FakeSource {
        pub fn new(buckets: &[&str], events: Vec<ActivityEvent>) -> Self {
            Self {
                buckets: buckets.iter().map(|b| b.to_string()).collect(),
                events,
                fail: false,
                queried: RefCell::new(None),
            }
        }
    }

    impl ActivitySource for FakeSource {
        fn bucket_ids(&self) -> Result<Vec<String>, AlertError> {
            if self.fail {
                return Err(AlertError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )));
            }
            Ok(self.buckets.clone())
        }

        fn events(
            &self,
            bucket_id: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<ActivityEvent>, AlertError> {
            *self.queried.borrow_mut() = Some((bucket_id.to_string(), start, end));
            Ok(self.events.clone())
        }
    }

    pub fn event(status: AfkStatus, duration: f64) -> ActivityEvent {
        ActivityEvent {
            timestamp: Utc::now(),
            duration,
            data: AfkData { status },
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_exact_bucket_first() {
        let buckets = ids(&["aw-watcher-afk_other", "aw-watcher-afk_box", "aw-watcher-window_box"]);
        assert_eq!(resolve_afk_bucket(&buckets, "box"), Some("aw-watcher-afk_box"));
    }

    #[test]
    fn falls_back_to_first_afk_bucket() {
        let buckets = ids(&["aw-watcher-window_box", "aw-watcher-afk_laptop", "aw-watcher-afk_z"]);
        assert_eq!(
            resolve_afk_bucket(&buckets, "box"),
            Some("aw-watcher-afk_laptop")
        );
    }

    #[test]
    fn no_afk_bucket_resolves_to_none() {
        let buckets = ids(&["aw-watcher-window_box"]);
        assert_eq!(resolve_afk_bucket(&buckets, "box"), None);
        assert_eq!(resolve_afk_bucket(&[], "box"), None);
    }

    #[test]
    fn sums_only_not_afk_events() {
        let events = vec![
            event(AfkStatus::NotAfk, 600.0),
            event(AfkStatus::Afk, 1200.0),
            event(AfkStatus::NotAfk, 30.5),
            event(AfkStatus::Unknown, 99.0),
        ];
        assert_eq!(sum_active_seconds(&events), 630.5);
        assert_eq!(sum_active_seconds(&[]), 0.0);
    }

    #[test]
    fn deserializes_server_events() {
        let json = r#"[
            {"id": 1, "timestamp": "2024-03-01T08:00:00.000000+00:00", "duration": 1800.25, "data": {"status": "not-afk"}},
            {"id": 2, "timestamp": "2024-03-01T08:30:00+00:00", "duration": 300, "data": {"status": "afk"}},
            {"id": 3, "timestamp": "2024-03-01T08:35:00Z", "duration": 12, "data": {"status": "sleeping"}},
            {"id": 4, "timestamp": "2024-03-01T08:36:00Z", "duration": 5, "data": {}}
        ]"#;
        let events: Vec<ActivityEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].data.status, AfkStatus::NotAfk);
        assert_eq!(events[1].data.status, AfkStatus::Afk);
        assert_eq!(events[2].data.status, AfkStatus::Unknown);
        assert_eq!(events[3].data.status, AfkStatus::Unknown);
        assert_eq!(sum_active_seconds(&events), 1800.25);
    }

    #[test]
    fn malformed_event_is_an_error() {
        let json = r#"[{"timestamp": "yesterday", "duration": "long"}]"#;
        assert!(serde_json::from_str::<Vec<ActivityEvent>>(json).is_err());
    }

    #[test]
    fn queries_today_from_local_midnight() {
        let source = FakeSource::new(
            &["aw-watcher-afk_box"],
            vec![event(AfkStatus::NotAfk, 3600.0), event(AfkStatus::Afk, 60.0)],
        );
        let now = Local::now();
        let active = get_active_seconds_today(&source, "box", now);
        assert_eq!(active, 3600.0);

        let (bucket, start, end) = source.queried.borrow().clone().unwrap();
        assert_eq!(bucket, "aw-watcher-afk_box");
        assert_eq!(start, start_of_day(now).with_timezone(&Utc));
        assert_eq!(end, now.with_timezone(&Utc));
        assert!(start <= end);
    }

    #[test]
    fn missing_bucket_reports_zero() {
        let source = FakeSource::new(&["aw-watcher-window_box"], vec![event(AfkStatus::NotAfk, 10.0)]);
        assert_matches!(
            try_active_seconds_today(&source, "box", Local::now()),
            Err(AlertError::NoAfkBucket { .. })
        );
        assert_eq!(get_active_seconds_today(&source, "box", Local::now()), 0.0);
        assert!(source.queried.borrow().is_none());
    }

    #[test]
    fn unreachable_source_reports_zero() {
        let mut source = FakeSource::new(&["aw-watcher-afk_box"], vec![]);
        source.fail = true;
        assert_eq!(get_active_seconds_today(&source, "box", Local::now()), 0.0);
    }

    #[test]
    fn start_of_day_is_midnight() {
        let now = Local::now();
        let start = start_of_day(now);
        assert!(start <= now);
        assert_eq!(start.date_naive(), now.date_naive());
        assert!(now - start < chrono::Duration::hours(25));
    }

    #[test]
    fn midnight_inside_a_dst_gap_starts_after_the_gap() {
        use chrono::{NaiveDate, Timelike};
        let midnight = NaiveDate::from_ymd_opt(2024, 9, 8)
            .unwrap()
            .and_time(chrono::NaiveTime::MIN);

        // Clocks jump from 00:00 to 01:00, as in Santiago de Chile
        let gap = |t: &NaiveDateTime| {
            if t.hour() < 1 {
                LocalResult::None
            } else {
                LocalResult::Single(*t)
            }
        };
        let start = first_valid_local(midnight, gap).unwrap();
        assert_eq!(start.date(), midnight.date());
        assert_eq!((start.hour(), start.minute()), (1, 0));

        // Ambiguous midnight picks the earlier instant
        let fold = |t: &NaiveDateTime| LocalResult::Ambiguous(*t, *t + chrono::Duration::hours(1));
        assert_eq!(first_valid_local(midnight, fold), Some(midnight));

        let never = |_: &NaiveDateTime| LocalResult::<NaiveDateTime>::None;
        assert_eq!(first_valid_local(midnight, never), None);
    }

    #[test]
    fn events_query_covers_the_whole_range() {
        let start = Utc.with_ymd_and_hms(2024, 5, 2, 22, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 3, 9, 30, 15).unwrap();
        let query = range_query(start, end);
        assert_eq!(
            query,
            [
                ("start", "2024-05-02T22:00:00.000000Z".to_string()),
                ("end", "2024-05-03T09:30:15.000000Z".to_string()),
                ("limit", "-1".to_string()),
            ]
        );

        let client = AwClient::new("http://127.0.0.1:5600").unwrap();
        let request = client
            .client
            .get(client.endpoint(&["buckets", "aw-watcher-afk_box", "events"]).unwrap())
            .query(&query)
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://127.0.0.1:5600/api/0/buckets/aw-watcher-afk_box/events\
             ?start=2024-05-02T22%3A00%3A00.000000Z&end=2024-05-03T09%3A30%3A15.000000Z&limit=-1"
        );
    }

    #[test]
    fn unusable_address_reports_zero() {
        let tracker = Tracker::connect("definitely not a url");
        assert_matches!(tracker, Tracker::Unavailable(_));
        assert_matches!(
            tracker.bucket_ids(),
            Err(AlertError::TrackerUnavailable(reason)) if reason.contains("definitely not a url")
        );
        assert_eq!(get_active_seconds_today(&tracker, "box", Local::now()), 0.0);

        assert_matches!(Tracker::connect("http://127.0.0.1:5600"), Tracker::Connected(_));
    }

    #[test]
    fn server_url_precedence() {
        assert_eq!(server_url(None, None, None, false), "http://127.0.0.1:5600");
        assert_eq!(server_url(None, None, None, true), "http://127.0.0.1:5666");
        assert_eq!(
            server_url(Some("http://aw.local:9000"), None, None, false),
            "http://aw.local:9000"
        );
        assert_eq!(
            server_url(Some("http://aw.local:9000"), None, Some(5601), false),
            "http://127.0.0.1:5601"
        );
        assert_eq!(
            server_url(None, Some("localhost"), None, true),
            "http://localhost:5666"
        );
    }

    #[test]
    fn endpoints_are_built_under_api_prefix() {
        let client = AwClient::new("http://127.0.0.1:5600").unwrap();
        assert_eq!(
            client.endpoint(&["buckets", ""]).unwrap().as_str(),
            "http://127.0.0.1:5600/api/0/buckets/"
        );
        assert_eq!(
            client
                .endpoint(&["buckets", "aw-watcher-afk_my box", "events"])
                .unwrap()
                .as_str(),
            "http://127.0.0.1:5600/api/0/buckets/aw-watcher-afk_my%20box/events"
        );

        let prefixed = AwClient::new("http://example.com/aw/").unwrap();
        assert_eq!(
            prefixed.endpoint(&["buckets", ""]).unwrap().as_str(),
            "http://example.com/aw/api/0/buckets/"
        );
    }

    #[test]
    fn rejects_unusable_server_urls() {
        assert_matches!(
            AwClient::new("not a url"),
            Err(AlertError::InvalidServerUrl { .. })
        );
        assert_matches!(
            AwClient::new("mailto:someone@example.com"),
            Err(AlertError::InvalidServerUrl { .. })
        );
    }
}
