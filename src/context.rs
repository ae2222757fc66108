use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use colored::Colorize;
use regex::Regex;

use crate::error::Result;

/// A calendar entry on the day of a transaction.
pub struct CalendarEvent {
    pub title: String,
    pub time: NaiveDateTime,
}

/// A photo taken on the day of a transaction.
pub struct PhotoEntry {
    pub path: PathBuf,
    pub taken: NaiveDateTime,
}

/// A location-history sample.
pub struct LocationFix {
    pub time: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
}

/// Collaborator lookups consumed by the review UI. Each takes a single date
/// and returns a possibly-empty collection; no results is not an error.
pub trait CalendarSource {
    fn events_on(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>>;
}

pub trait PhotoSource {
    fn photos_on(&self, date: NaiveDate) -> Result<Vec<PhotoEntry>>;
}

pub trait LocationSource {
    fn fixes_on(&self, date: NaiveDate) -> Result<Vec<LocationFix>>;
}

/// Stand-ins for integrations that are not configured.
pub struct NoCalendar;

impl CalendarSource for NoCalendar {
    fn events_on(&self, _date: NaiveDate) -> Result<Vec<CalendarEvent>> {
        Ok(Vec::new())
    }
}

pub struct NoPhotos;

impl PhotoSource for NoPhotos {
    fn photos_on(&self, _date: NaiveDate) -> Result<Vec<PhotoEntry>> {
        Ok(Vec::new())
    }
}

pub struct NoLocations;

impl LocationSource for NoLocations {
    fn fixes_on(&self, _date: NaiveDate) -> Result<Vec<LocationFix>> {
        Ok(Vec::new())
    }
}

/// Location history exported as `location-history.json`: an array of records
/// with a `startTime` field and a `geo:<lat>,<lon>` string buried somewhere
/// in the record body. The geo string is pulled out by regex rather than by
/// schema, because the export format nests it differently per record type.
pub struct TimelineFile {
    fixes: Vec<LocationFix>,
}

impl TimelineFile {
    pub fn open(path: &Path) -> Result<Self> {
        static GEO: OnceLock<Regex> = OnceLock::new();
        let geo = GEO.get_or_init(|| Regex::new(r#"geo:(?P<lat>[^,]+),(?P<lon>[^"]+)""#).unwrap());

        let content = std::fs::read_to_string(path)?;
        let records: Vec<serde_json::Value> = serde_json::from_str(&content)
            .map_err(|e| crate::error::KasboekError::Other(format!("{}: {e}", path.display())))?;

        let mut fixes = Vec::new();
        for record in &records {
            let Some(start) = record.get("startTime").and_then(|v| v.as_str()) else {
                continue;
            };
            let Ok(time) = DateTime::parse_from_rfc3339(start) else {
                continue;
            };
            let body = record.to_string();
            if let Some(caps) = geo.captures(&body) {
                let lat = caps["lat"].trim().parse::<f64>();
                let lon = caps["lon"].trim().parse::<f64>();
                if let (Ok(lat), Ok(lon)) = (lat, lon) {
                    fixes.push(LocationFix {
                        time: time.with_timezone(&Utc),
                        lat,
                        lon,
                    });
                }
            }
        }
        Ok(Self { fixes })
    }
}

impl LocationSource for TimelineFile {
    fn fixes_on(&self, date: NaiveDate) -> Result<Vec<LocationFix>> {
        Ok(self
            .fixes
            .iter()
            .filter(|f| f.time.date_naive() == date)
            .map(|f| LocationFix {
                time: f.time,
                lat: f.lat,
                lon: f.lon,
            })
            .collect())
    }
}

/// Everything known about the day a transaction happened.
#[derive(Default)]
pub struct DayContext {
    pub events: Vec<CalendarEvent>,
    pub photos: Vec<PhotoEntry>,
    pub fixes: Vec<LocationFix>,
}

/// Gather auxiliary data for one day. A failing collaborator degrades to an
/// empty result with a warning; context lookups never abort a review.
pub fn day_context(
    date: NaiveDate,
    calendar: &dyn CalendarSource,
    photos: &dyn PhotoSource,
    locations: &dyn LocationSource,
) -> DayContext {
    DayContext {
        events: fetch(calendar.events_on(date), "calendar"),
        photos: fetch(photos.photos_on(date), "photos"),
        fixes: fetch(locations.fixes_on(date), "location history"),
    }
}

fn fetch<T>(result: Result<Vec<T>>, what: &str) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            eprintln!("{} {what} lookup failed: {e}", "warning:".yellow());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMELINE: &str = r#"[
        {
            "startTime": "2023-03-15T09:30:00.000+01:00",
            "endTime": "2023-03-15T10:00:00.000+01:00",
            "visit": {
                "topCandidate": {
                    "placeLocation": "geo:52.370216,4.895168"
                }
            }
        },
        {
            "startTime": "2023-03-16T12:00:00.000+01:00",
            "activity": {
                "start": "geo:51.926517,4.462456"
            }
        },
        {
            "startTime": "not a timestamp",
            "visit": { "place": "geo:1.0,2.0" }
        }
    ]"#;

    #[test]
    fn test_timeline_parses_geo_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("location-history.json");
        std::fs::write(&path, TIMELINE).unwrap();

        let timeline = TimelineFile::open(&path).unwrap();
        let fixes = timeline
            .fixes_on(NaiveDate::from_ymd_opt(2023, 3, 15).unwrap())
            .unwrap();
        assert_eq!(fixes.len(), 1);
        assert!((fixes[0].lat - 52.370216).abs() < 1e-9);
        assert!((fixes[0].lon - 4.895168).abs() < 1e-9);
    }

    #[test]
    fn test_timeline_day_without_fixes_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("location-history.json");
        std::fs::write(&path, TIMELINE).unwrap();

        let timeline = TimelineFile::open(&path).unwrap();
        let fixes = timeline
            .fixes_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap();
        assert!(fixes.is_empty());
    }

    #[test]
    fn test_day_context_with_defaults() {
        let ctx = day_context(
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap(),
            &NoCalendar,
            &NoPhotos,
            &NoLocations,
        );
        assert!(ctx.events.is_empty());
        assert!(ctx.photos.is_empty());
        assert!(ctx.fixes.is_empty());
    }
}
