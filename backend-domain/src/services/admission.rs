// Check-in admission policy
// Pure decision over a guest's ledger; callers run it inside their storage transaction

use crate::entities::{CheckinAttempt, CheckinRecord, CheckinReversal, EventSettings};
use crate::value_objects::OperatorId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    Admit,
    Duplicate(String),
}

/// Identity a check-in is attributed to when counting per-counter repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterKey {
    Named(String),
    Operator(OperatorId),
    Anonymous,
}

impl CounterKey {
    pub fn of_attempt(attempt: &CheckinAttempt) -> Self {
        Self::resolve(attempt.counter_name.as_deref(), attempt.operator_id)
    }

    pub fn of_record(record: &CheckinRecord) -> Self {
        Self::resolve(record.counter_name.as_deref(), record.checkin_by_operator_id)
    }

    fn resolve(counter_name: Option<&str>, operator_id: Option<OperatorId>) -> Self {
        match counter_name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => CounterKey::Named(name.to_lowercase()),
            None => match operator_id {
                Some(id) => CounterKey::Operator(id),
                None => CounterKey::Anonymous,
            },
        }
    }
}

/// Records written after the latest reversal. Earlier cycles stay in history
/// but no longer count toward duplicate detection.
pub fn active_checkins<'a>(
    history: &'a [CheckinRecord],
    reversals: &[CheckinReversal],
) -> Vec<&'a CheckinRecord> {
    let closed_through = reversals
        .iter()
        .filter_map(|reversal| reversal.last_checkin_id)
        .max();
    history
        .iter()
        .filter(|record| match closed_through {
            Some(last) => record.id > last,
            None => true,
        })
        .collect()
}

pub fn decide_admission(
    settings: &EventSettings,
    active: &[&CheckinRecord],
    attempt: &CheckinAttempt,
) -> AdmissionDecision {
    if active.is_empty() {
        return AdmissionDecision::Admit;
    }
    if !settings.allow_multiple_checkin_per_counter {
        return AdmissionDecision::Duplicate(already_checked_in_message(active[0]));
    }
    let key = CounterKey::of_attempt(attempt);
    match active.iter().find(|record| CounterKey::of_record(record) == key) {
        Some(previous) => AdmissionDecision::Duplicate(already_checked_in_message(previous)),
        None => AdmissionDecision::Admit,
    }
}

fn already_checked_in_message(record: &CheckinRecord) -> String {
    let at = record.checkin_at.format("%Y-%m-%d %H:%M:%S");
    match (record.counter_name.as_deref(), record.checkin_by_name.as_deref()) {
        (Some(counter), _) => format!("already checked in at {} (counter {})", at, counter),
        (None, Some(operator)) => format!("already checked in at {} by {}", at, operator),
        (None, None) => format!("already checked in at {}", at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{CheckinId, GuestId, ReversalId};
    use chrono::{TimeZone, Utc};

    fn record(id: i64, counter: Option<&str>, operator: Option<i64>) -> CheckinRecord {
        CheckinRecord {
            id: CheckinId(id),
            guest_id: GuestId(1),
            checkin_at: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
            checkin_by_operator_id: operator.map(OperatorId),
            checkin_by_name: None,
            counter_name: counter.map(str::to_string),
        }
    }

    fn reversal(last: i64) -> CheckinReversal {
        CheckinReversal {
            id: ReversalId(1),
            guest_id: GuestId(1),
            reversed_at: Utc.timestamp_opt(1_800_000_000, 0).unwrap(),
            operator_id: OperatorId(1),
            operator_name: "lead".to_string(),
            reason: "wrong guest".to_string(),
            last_checkin_id: Some(CheckinId(last)),
        }
    }

    fn attempt(counter: Option<&str>, operator: Option<i64>) -> CheckinAttempt {
        CheckinAttempt {
            operator_id: operator.map(OperatorId),
            operator_name: None,
            counter_name: counter.map(str::to_string),
        }
    }

    fn per_counter() -> EventSettings {
        EventSettings {
            allow_multiple_checkin_per_counter: true,
            ..EventSettings::default()
        }
    }

    #[test]
    fn first_checkin_is_admitted() {
        let decision = decide_admission(&EventSettings::default(), &[], &attempt(None, None));
        assert_eq!(decision, AdmissionDecision::Admit);
    }

    #[test]
    fn default_policy_rejects_any_repeat() {
        let history = [record(1, Some("A"), None)];
        let active: Vec<_> = history.iter().collect();
        let decision = decide_admission(&EventSettings::default(), &active, &attempt(Some("B"), None));
        match decision {
            AdmissionDecision::Duplicate(message) => assert!(message.contains("already checked in")),
            other => panic!("unexpected decision {:?}", other),
        }
    }

    #[test]
    fn per_counter_policy_admits_other_counters_only() {
        let history = [record(1, Some("A"), None)];
        let active: Vec<_> = history.iter().collect();
        assert_eq!(
            decide_admission(&per_counter(), &active, &attempt(Some("B"), None)),
            AdmissionDecision::Admit
        );
        assert!(matches!(
            decide_admission(&per_counter(), &active, &attempt(Some(" a "), None)),
            AdmissionDecision::Duplicate(_)
        ));
    }

    #[test]
    fn per_counter_policy_falls_back_to_operator() {
        let history = [record(1, None, Some(3))];
        let active: Vec<_> = history.iter().collect();
        assert!(matches!(
            decide_admission(&per_counter(), &active, &attempt(None, Some(3))),
            AdmissionDecision::Duplicate(_)
        ));
        assert_eq!(
            decide_admission(&per_counter(), &active, &attempt(None, Some(4))),
            AdmissionDecision::Admit
        );
    }

    #[test]
    fn reversal_closes_earlier_records() {
        let history = [record(1, None, None), record(2, None, None), record(3, None, None)];
        let active = active_checkins(&history, &[reversal(2)]);
        let ids: Vec<_> = active.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![3]);
        assert!(active_checkins(&history[..2], &[reversal(2)]).is_empty());
    }
}
