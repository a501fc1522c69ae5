use crate::errors::{AppError, AppResult};
use crate::models::CalendarEvent;
use chrono::{DateTime, Local, NaiveDate, Utc};
use std::sync::{Arc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Anything that can list the events for a day, e.g. the system calendar.
pub trait CalendarSource: Send + Sync {
    fn events_for(&self, day: NaiveDate) -> anyhow::Result<Vec<CalendarEvent>>;
}

/// Cached copy of one day's events, refreshed in the background.
#[derive(Clone)]
pub struct CalendarFeed {
    source: Arc<dyn CalendarSource>,
    events: Arc<RwLock<Vec<CalendarEvent>>>,
}

impl std::fmt::Debug for CalendarFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarFeed")
            .field("events", &self.events().len())
            .finish()
    }
}

impl CalendarFeed {
    pub fn new(source: Arc<dyn CalendarSource>) -> Self {
        Self {
            source,
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn refresh(&self) -> AppResult<usize> {
        self.refresh_for(Local::now().date_naive())
    }

    /// Replaces the cache with `day`'s events, sorted by start. The cache is untouched on error.
    pub fn refresh_for(&self, day: NaiveDate) -> AppResult<usize> {
        let mut events = self.source.events_for(day)?;
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        let count = events.len();

        let mut cache = self
            .events
            .write()
            .map_err(|_| AppError::Internal("calendar cache lock poisoned".to_string()))?;
        *cache = events;
        tracing::debug!(%day, count, "calendar refreshed");
        Ok(count)
    }

    pub fn events(&self) -> Vec<CalendarEvent> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events running at `now`. All-day events always count.
    pub fn in_progress(&self, now: DateTime<Utc>) -> Vec<CalendarEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.is_all_day || (event.start <= now && now < event.end))
            .collect()
    }

    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<CalendarEvent> {
        self.events()
            .into_iter()
            .filter(|event| !event.is_all_day && event.start > now)
            .collect()
    }

    /// Refreshes on every tick of `every` until the task is aborted. Failures are logged and retried.
    pub fn spawn_refresh(&self, every: Duration) -> JoinHandle<()> {
        let feed = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                if let Err(error) = feed.refresh() {
                    tracing::warn!(error = %error, "calendar refresh failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CalendarFeed, CalendarSource};
    use crate::models::{Calendar, CalendarEvent};
    use chrono::{Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Duration;

    struct FakeSource {
        calls: AtomicUsize,
        fail_first: bool,
    }

    impl CalendarSource for FakeSource {
        fn events_for(&self, _day: NaiveDate) -> anyhow::Result<Vec<CalendarEvent>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && call == 0 {
                anyhow::bail!("calendar access denied");
            }
            let start = Utc.with_ymd_and_hms(2024, 3, 14, 9, 0, 0).single().expect("valid time");
            let calendar = Calendar {
                title: "Work".to_string(),
                colour: "#336699".to_string(),
            };
            Ok(vec![
                CalendarEvent {
                    id: "late".to_string(),
                    title: "Review".to_string(),
                    start: start + ChronoDuration::hours(3),
                    end: start + ChronoDuration::hours(4),
                    is_all_day: false,
                    calendar: calendar.clone(),
                },
                CalendarEvent {
                    id: "early".to_string(),
                    title: "Standup".to_string(),
                    start,
                    end: start + ChronoDuration::minutes(15),
                    is_all_day: false,
                    calendar: calendar.clone(),
                },
                CalendarEvent {
                    id: "holiday".to_string(),
                    title: "Pi day".to_string(),
                    start,
                    end: start + ChronoDuration::hours(24),
                    is_all_day: true,
                    calendar,
                },
            ])
        }
    }

    fn feed(fail_first: bool) -> (CalendarFeed, Arc<FakeSource>) {
        let source = Arc::new(FakeSource {
            calls: AtomicUsize::new(0),
            fail_first,
        });
        (CalendarFeed::new(source.clone()), source)
    }

    #[test]
    fn refresh_sorts_and_filters_by_time() {
        let (feed, _) = feed(false);
        let day = NaiveDate::from_ymd_opt(2024, 3, 14).expect("valid date");
        assert_eq!(feed.refresh_for(day).expect("refresh"), 3);

        let events = feed.events();
        assert_eq!(events[2].id, "late");

        let now = Utc.with_ymd_and_hms(2024, 3, 14, 9, 5, 0).single().expect("valid time");
        let ids: Vec<String> = feed.in_progress(now).into_iter().map(|event| event.id).collect();
        assert!(ids.contains(&"early".to_string()));
        assert!(ids.contains(&"holiday".to_string()));
        assert_eq!(feed.upcoming(now).len(), 1);
    }

    #[test]
    fn failed_refresh_keeps_cache() {
        let (feed, _) = feed(true);
        let day = NaiveDate::from_ymd_opt(2024, 3, 14).expect("valid date");
        assert!(feed.refresh_for(day).is_err());
        assert!(feed.events().is_empty());
        assert_eq!(feed.refresh_for(day).expect("second refresh"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn background_refresh_survives_errors() {
        let (feed, source) = feed(true);
        let handle = feed.spawn_refresh(Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(61)).await;
        handle.abort();

        assert!(source.calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(feed.events().len(), 3);
    }
}
