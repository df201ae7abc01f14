//! Attendance rate and a short recent-trend signal.

use crate::grades::round2;
use crate::models::{AttendanceMark, AttendanceStatus, AttendanceSummary, TrendDirection};

/// Rate reported when there are no days to judge.
pub const UNMARKED_RATE: f64 = 100.0;

/// Fewest non-excused days needed before the halves are compared.
const MIN_TREND_DAYS: usize = 4;

/// Percent-point change between halves treated as noise.
const TREND_DEADBAND: f64 = 5.0;

fn attended(status: AttendanceStatus) -> bool {
    matches!(status, AttendanceStatus::Present | AttendanceStatus::Late)
}

fn rate_of(statuses: &[AttendanceStatus]) -> f64 {
    if statuses.is_empty() {
        return UNMARKED_RATE;
    }
    let attended_days = statuses.iter().filter(|status| attended(**status)).count();
    attended_days as f64 / statuses.len() as f64 * 100.0
}

/// Compare the earlier and later halves of the non-excused days.
pub fn attendance_trend(marks: &[AttendanceMark]) -> TrendDirection {
    let mut ordered: Vec<&AttendanceMark> = marks
        .iter()
        .filter(|mark| mark.status != AttendanceStatus::Excused)
        .collect();
    if ordered.len() < MIN_TREND_DAYS {
        return TrendDirection::Stable;
    }
    ordered.sort_by_key(|mark| mark.date);

    let statuses: Vec<AttendanceStatus> = ordered.iter().map(|mark| mark.status).collect();
    let (earlier, later) = statuses.split_at(statuses.len() / 2);
    let delta = rate_of(later) - rate_of(earlier);

    if delta > TREND_DEADBAND {
        TrendDirection::Improving
    } else if delta < -TREND_DEADBAND {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

pub fn summarize(marks: &[AttendanceMark]) -> AttendanceSummary {
    let mut present_days = 0;
    let mut absent_days = 0;
    let mut late_days = 0;
    let mut excused_days = 0;

    for mark in marks {
        match mark.status {
            AttendanceStatus::Present => present_days += 1,
            AttendanceStatus::Absent => absent_days += 1,
            AttendanceStatus::Late => late_days += 1,
            AttendanceStatus::Excused => excused_days += 1,
        }
    }

    let judged_days = present_days + absent_days + late_days;
    let rate = if judged_days > 0 {
        round2((present_days + late_days) as f64 / judged_days as f64 * 100.0)
    } else {
        UNMARKED_RATE
    };

    AttendanceSummary {
        total_days: marks.len(),
        present_days,
        absent_days,
        late_days,
        excused_days,
        rate,
        trend: attendance_trend(marks),
    }
}
