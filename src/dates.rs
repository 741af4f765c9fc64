//! Calendar-day filtering shared by the feed reader and the timeline reader.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Parse a `YYYY-MM-DD` day. Shaped for `clap`'s `value_parser`.
pub fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD (e.g. 2024-10-31)", raw))
}

/// Today in the local time zone.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Keep exactly the items whose timestamp falls on `day` in `tz`, ordered
/// oldest to newest. Items without a timestamp are dropped. The sort is
/// stable, so items sharing a timestamp keep their input order.
pub fn on_day<T, Tz, F>(items: Vec<T>, day: NaiveDate, tz: &Tz, timestamp: F) -> Vec<T>
where
    Tz: TimeZone,
    F: Fn(&T) -> Option<DateTime<Utc>>,
{
    let mut kept: Vec<(DateTime<Utc>, T)> = items
        .into_iter()
        .filter_map(|item| {
            let ts = timestamp(&item)?;
            (ts.with_timezone(tz).date_naive() == day).then_some((ts, item))
        })
        .collect();
    kept.sort_by_key(|(ts, _)| *ts);
    kept.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("2024-10-31"), Ok(NaiveDate::from_ymd_opt(2024, 10, 31).unwrap()));
        assert!(parse_day("31.10.2024").is_err());
        assert!(parse_day("2024-02-30").is_err());
    }

    #[test]
    fn test_on_day_filters_and_sorts() {
        let items = vec![
            ("late", Some(utc("2024-03-02T20:00:00Z"))),
            ("other-day", Some(utc("2024-03-01T12:00:00Z"))),
            ("early", Some(utc("2024-03-02T08:00:00Z"))),
            ("undated", None),
        ];
        let day = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let kept = on_day(items, day, &Utc, |(_, ts)| *ts);
        let names: Vec<_> = kept.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["early", "late"]);
    }

    #[test]
    fn test_on_day_uses_given_time_zone() {
        // 23:30 UTC on the 1st is already the 2nd at UTC+3.
        let items = vec![("x", utc("2024-03-01T23:30:00Z"))];
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(on_day(items.clone(), day, &moscow, |(_, ts)| Some(*ts)).len(), 1);
        assert!(on_day(items, day, &Utc, |(_, ts)| Some(*ts)).is_empty());
    }

    #[test]
    fn test_on_day_no_match_is_empty() {
        let items = vec![utc("2024-03-01T10:00:00Z")];
        let day = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(on_day(items, day, &Utc, |ts| Some(*ts)).is_empty());
    }
}
