//! Time-driven status rules.
//!
//! Everything here is a pure function of a record's dates and a sampled
//! `now`. The store applies [`initial_status`] on create and the scheduler
//! applies [`advance`] on every pass.

use chrono::{DateTime, Utc};

use crate::store::AssignmentStatus;

/// Status a freshly created assignment starts in.
///
/// Creation never closes an assignment, even when `due_date` has already
/// passed; the next reconciliation pass does that.
pub fn initial_status(start_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> AssignmentStatus {
    match start_date {
        Some(start) if start > now => AssignmentStatus::Scheduled,
        _ => AssignmentStatus::Open,
    }
}

/// Next status dictated by time, or `None` if the record stays where it is.
///
/// Both conditions are checked against the same `now`. An overdue record
/// goes straight to `Closed` even if it never opened. `Closed` and
/// `Completed` are never advanced.
pub fn advance(
    current: AssignmentStatus,
    start_date: Option<DateTime<Utc>>,
    due_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<AssignmentStatus> {
    match current {
        AssignmentStatus::Completed | AssignmentStatus::Closed => None,
        _ if now > due_date => Some(AssignmentStatus::Closed),
        AssignmentStatus::Draft | AssignmentStatus::Scheduled
            if start_date.is_none_or(|start| now >= start) =>
        {
            Some(AssignmentStatus::Open)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn future_start_is_scheduled() {
        let now = t0();
        assert_eq!(
            initial_status(Some(now + Duration::seconds(1)), now),
            AssignmentStatus::Scheduled
        );
    }

    #[test]
    fn start_at_now_or_earlier_is_open() {
        let now = t0();
        assert_eq!(initial_status(Some(now), now), AssignmentStatus::Open);
        assert_eq!(
            initial_status(Some(now - Duration::hours(1)), now),
            AssignmentStatus::Open
        );
        assert_eq!(initial_status(None, now), AssignmentStatus::Open);
    }

    #[test]
    fn scheduled_opens_on_start_boundary() {
        let start = t0();
        let due = start + Duration::hours(1);
        assert_eq!(
            advance(AssignmentStatus::Scheduled, Some(start), due, start),
            Some(AssignmentStatus::Open)
        );
        assert_eq!(
            advance(
                AssignmentStatus::Scheduled,
                Some(start),
                due,
                start - Duration::milliseconds(1)
            ),
            None
        );
    }

    #[test]
    fn due_boundary_is_exclusive() {
        let due = t0();
        assert_eq!(advance(AssignmentStatus::Open, None, due, due), None);
        assert_eq!(
            advance(AssignmentStatus::Open, None, due, due + Duration::milliseconds(1)),
            Some(AssignmentStatus::Closed)
        );
    }

    // Closing without ever opening is intentional.
    #[test]
    fn overdue_scheduled_closes_directly() {
        let start = t0();
        let due = start + Duration::minutes(30);
        let now = start + Duration::hours(2);
        assert_eq!(
            advance(AssignmentStatus::Scheduled, Some(start), due, now),
            Some(AssignmentStatus::Closed)
        );
    }

    #[test]
    fn draft_follows_the_same_rules() {
        let now = t0();
        assert_eq!(
            advance(AssignmentStatus::Draft, None, now + Duration::hours(1), now),
            Some(AssignmentStatus::Open)
        );
        assert_eq!(
            advance(AssignmentStatus::Draft, None, now - Duration::hours(1), now),
            Some(AssignmentStatus::Closed)
        );
    }

    #[test]
    fn terminal_and_closed_never_advance() {
        let now = t0();
        let past = now - Duration::days(1);
        assert_eq!(advance(AssignmentStatus::Completed, None, past, now), None);
        assert_eq!(advance(AssignmentStatus::Closed, None, past, now), None);
        assert_eq!(
            advance(AssignmentStatus::Closed, None, now + Duration::days(1), now),
            None
        );
    }
}
