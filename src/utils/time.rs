use anyhow::{bail, Result};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone};

/// Format used for dates in settings and in the checkpoint file.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const SECONDS_IN_HOUR: f64 = 60. * 60.;

/// This is the standard way of converting a date to a string in weekly-target.
pub fn date_to_string(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Returns the Monday of the week the date belongs to.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.weekday().num_days_from_monday() as u64)
}

/// Returns the Monday of the week `moment` belongs to. The week is evaluated in the time zone of
/// `moment`, so convert it beforehand if another zone is needed.
pub fn start_of_week<Tz: TimeZone>(moment: &DateTime<Tz>) -> NaiveDate {
    week_start_of(moment.date_naive())
}

/// Returns start of the next week.
pub fn next_week_start(week_start: NaiveDate) -> NaiveDate {
    week_start + Days::new(7)
}

/// Number of whole weeks between 2 week starts.
pub fn weeks_between(from: NaiveDate, to: NaiveDate) -> Result<i64> {
    let days = (to - from).num_days();
    if days % 7 != 0 {
        bail!("{from} and {to} are {days} days apart, which is not a whole number of weeks");
    }
    Ok(days / 7)
}

/// Midnight of `date` in `zone`. When a DST transition skips midnight, the first full hour of the
/// day that exists is used instead, so the result always falls on `date` locally.
pub fn midnight_in<Tz: TimeZone>(date: NaiveDate, zone: &Tz) -> DateTime<Tz> {
    (0..24)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|naive| zone.from_local_datetime(&naive).earliest())
        .unwrap_or_else(|| zone.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Hours elapsed between `start` and `now`, with both moments viewed in `zone`.
pub fn elapsed_hours_since<A: TimeZone, B: TimeZone, Tz: TimeZone>(
    start: &DateTime<A>,
    now: &DateTime<B>,
    zone: &Tz,
) -> f64 {
    let elapsed = now.with_timezone(zone) - start.with_timezone(zone);
    seconds_to_hours(elapsed.num_milliseconds() as f64 / 1000.)
}

pub fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / SECONDS_IN_HOUR
}

/// Formats hours as `HH:MM h`. Negative values get a single leading minus.
pub fn format_hours(hours: f64) -> String {
    if hours < 0. {
        return format!("-{}", format_hours(-hours));
    }
    let minutes = (hours * 60.).round() as i64;
    format!("{:02}:{:02} h", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};
    use chrono_tz::Europe::Berlin;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn start_of_week_returns_monday() {
        // 2023-03-29 is a Wednesday
        let moment = Utc.with_ymd_and_hms(2023, 3, 29, 13, 45, 0).unwrap();
        assert_eq!(start_of_week(&moment), date(2023, 3, 27));

        let monday = Utc.with_ymd_and_hms(2023, 3, 27, 0, 0, 0).unwrap();
        assert_eq!(start_of_week(&monday), date(2023, 3, 27));

        let sunday = Utc.with_ymd_and_hms(2023, 4, 2, 23, 59, 59).unwrap();
        assert_eq!(start_of_week(&sunday), date(2023, 3, 27));
    }

    #[test]
    fn start_of_week_uses_zone_of_moment() {
        // Sunday evening in UTC is already Monday in Berlin
        let moment = Utc.with_ymd_and_hms(2023, 4, 2, 22, 30, 0).unwrap();
        assert_eq!(start_of_week(&moment), date(2023, 3, 27));
        assert_eq!(start_of_week(&moment.with_timezone(&Berlin)), date(2023, 4, 3));
    }

    #[test]
    fn start_of_week_is_idempotent() {
        let mut day = date(2024, 1, 1);
        for _ in 0..30 {
            let once = week_start_of(day);
            assert_eq!(week_start_of(once), once);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn weeks_between_counts_whole_weeks() -> Result<()> {
        assert_eq!(weeks_between(date(2023, 2, 27), date(2023, 4, 3))?, 5);
        assert_eq!(weeks_between(date(2023, 4, 3), date(2023, 4, 3))?, 0);
        assert_eq!(weeks_between(date(2023, 4, 10), date(2023, 4, 3))?, -1);
        Ok(())
    }

    #[test]
    fn weeks_between_rejects_partial_weeks() {
        assert!(weeks_between(date(2023, 3, 27), date(2023, 3, 30)).is_err());
    }

    #[test]
    fn elapsed_hours_since_ignores_offsets() {
        let start = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2023, 3, 29, 10, 0, 0)
            .unwrap();
        let now = Utc.with_ymd_and_hms(2023, 3, 29, 10, 30, 0).unwrap();
        let elapsed = elapsed_hours_since(&start, &now, &Berlin);
        assert!((elapsed - 2.5).abs() < 1e-9);

        let later = now + Duration::minutes(90);
        assert!((elapsed_hours_since(&start, &later, &Utc) - 4.).abs() < 1e-9);
    }

    #[test]
    fn midnight_in_zone() {
        let midnight = midnight_in(date(2023, 3, 27), &Berlin);
        assert_eq!(
            midnight.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2023, 3, 26, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn midnight_skipped_by_dst_stays_on_same_day() {
        // Clocks in Sao Paulo jumped from 00:00 to 01:00 on 2018-11-04
        let zone = chrono_tz::America::Sao_Paulo;
        let midnight = midnight_in(date(2018, 11, 4), &zone);

        assert_eq!(midnight.date_naive(), date(2018, 11, 4));
        assert_eq!(midnight.time(), NaiveTime::from_hms_opt(1, 0, 0).unwrap());
        assert_eq!(
            midnight.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2018, 11, 4, 3, 0, 0).unwrap()
        );
    }

    #[test]
    fn format_hours_pads_and_rounds() {
        assert_eq!(format_hours(0.), "00:00 h");
        assert_eq!(format_hours(1.), "01:00 h");
        assert_eq!(format_hours(29.), "29:00 h");
        assert_eq!(format_hours(1.5), "01:30 h");
        assert_eq!(format_hours(123.25), "123:15 h");
        // 59.994 minutes rounds up into the next hour instead of showing 60 minutes
        assert_eq!(format_hours(0.9999), "01:00 h");
        assert_eq!(format_hours(1. / 60. * 0.4), "00:00 h");
    }

    #[test]
    fn format_hours_negative() {
        assert_eq!(format_hours(-1.5), "-01:30 h");
        for hours in [0.1, 0.75, 2., 17.333, 40.01] {
            assert_eq!(format_hours(-hours), format!("-{}", format_hours(hours)));
        }
    }

    #[test]
    fn format_hours_shape() {
        for hours in [0., 0.01, 5.5, 9.99, 10., 99.9, 1000.] {
            let formatted = format_hours(hours);
            let (clock, suffix) = formatted.split_once(' ').unwrap();
            assert_eq!(suffix, "h");
            let (h, m) = clock.split_once(':').unwrap();
            assert!(h.len() >= 2 && h.chars().all(|c| c.is_ascii_digit()));
            assert!(m.len() == 2 && m.parse::<u32>().unwrap() < 60);
        }
    }

    #[test]
    fn date_to_string_uses_iso_format() {
        assert_eq!(date_to_string(date(2023, 3, 1)), "2023-03-01");
    }
}
