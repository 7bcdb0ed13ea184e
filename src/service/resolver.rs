use chrono::NaiveDateTime;

use crate::model::{attendance::AttendanceStatus, shift_rule::ShiftRule};

/// Outcome of closing a day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub work_hours: f64,
    pub status: AttendanceStatus,
}

/// Hours between two wall-clock timestamps of the same zone, rounded to
/// hundredths (half to even). Negative when `punch_out` precedes `punch_in`.
pub fn work_hours(punch_in: NaiveDateTime, punch_out: NaiveDateTime) -> f64 {
    let seconds = (punch_out - punch_in).num_seconds();

    // one hundredth of an hour is 36 seconds
    let mut hundredths = seconds.div_euclid(36);
    let remainder = seconds.rem_euclid(36);
    if remainder > 18 || (remainder == 18 && hundredths % 2 != 0) {
        hundredths += 1;
    }

    hundredths as f64 / 100.0
}

/// First match wins: full day, then half day, then absent.
pub fn classify(work_hours: f64, full_day_hrs: f64, half_day_hrs: f64) -> AttendanceStatus {
    if work_hours >= full_day_hrs {
        AttendanceStatus::Present
    } else if work_hours >= half_day_hrs {
        AttendanceStatus::HalfDay
    } else {
        AttendanceStatus::Absent
    }
}

pub fn resolve(punch_in: NaiveDateTime, punch_out: NaiveDateTime, shift: &ShiftRule) -> Resolution {
    let work_hours = work_hours(punch_in, punch_out);
    Resolution {
        work_hours,
        status: classify(work_hours, shift.full_day_hrs, shift.half_day_hrs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(ts: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn general() -> ShiftRule {
        ShiftRule::new("General", 9.0, 4.5)
    }

    #[test]
    fn full_shift_is_present() {
        let r = resolve(at("2026-01-05 09:00:00"), at("2026-01-05 18:00:00"), &general());
        assert_eq!(r.work_hours, 9.0);
        assert_eq!(r.status, AttendanceStatus::Present);
    }

    #[test]
    fn half_threshold_is_half_day() {
        let r = resolve(at("2026-01-05 09:00:00"), at("2026-01-05 13:30:00"), &general());
        assert_eq!(r.work_hours, 4.5);
        assert_eq!(r.status, AttendanceStatus::HalfDay);
    }

    #[test]
    fn one_hour_is_absent() {
        let r = resolve(at("2026-01-05 09:00:00"), at("2026-01-05 10:00:00"), &general());
        assert_eq!(r.work_hours, 1.0);
        assert_eq!(r.status, AttendanceStatus::Absent);
    }

    #[test]
    fn just_below_half_is_absent() {
        // 4h29m -> 4.48
        let r = resolve(at("2026-01-05 09:00:00"), at("2026-01-05 13:29:00"), &general());
        assert_eq!(r.work_hours, 4.48);
        assert_eq!(r.status, AttendanceStatus::Absent);
    }

    #[test]
    fn equal_thresholds_prefer_present() {
        let flat = ShiftRule::new("Flat", 4.0, 4.0);
        assert_eq!(classify(4.0, flat.full_day_hrs, flat.half_day_hrs), AttendanceStatus::Present);
        assert_eq!(classify(3.99, flat.full_day_hrs, flat.half_day_hrs), AttendanceStatus::Absent);
    }

    #[test]
    fn reversed_timestamps_are_absent() {
        let r = resolve(at("2026-01-05 18:00:00"), at("2026-01-05 09:00:00"), &general());
        assert_eq!(r.work_hours, -9.0);
        assert_eq!(r.status, AttendanceStatus::Absent);
    }

    #[test]
    fn rounds_to_hundredths() {
        let start = at("2026-01-05 09:00:00");
        // 20 minutes = 0.3333.. h
        assert_eq!(work_hours(start, start + Duration::minutes(20)), 0.33);
        // 40 minutes = 0.6666.. h
        assert_eq!(work_hours(start, start + Duration::minutes(40)), 0.67);
        // 7m30s = 0.125 h, tie goes to even
        assert_eq!(work_hours(start, start + Duration::seconds(450)), 0.12);
        // 0.135 h, tie goes to even
        assert_eq!(work_hours(start, start + Duration::seconds(486)), 0.14);
        assert_eq!(work_hours(start, start), 0.0);
    }

    #[test]
    fn rounding_matches_exact_hours() {
        let start = at("2026-01-05 00:00:00");
        for seconds in (0..86_400).step_by(97) {
            let exact = seconds as f64 / 3600.0;
            let got = work_hours(start, start + Duration::seconds(seconds));
            assert!((got - exact).abs() <= 0.005 + 1e-9, "{seconds}s -> {got}");
            assert_eq!((got * 100.0).round() / 100.0, got);
        }
    }

    #[test]
    fn classification_never_moves_backwards() {
        let shift = general();
        let mut previous = AttendanceStatus::Absent;
        for hundredths in 0..=1200 {
            let hours = hundredths as f64 / 100.0;
            let status = classify(hours, shift.full_day_hrs, shift.half_day_hrs);
            assert!(status >= previous, "{hours}h went from {previous} to {status}");
            previous = status;
        }
        assert_eq!(previous, AttendanceStatus::Present);
    }
}
