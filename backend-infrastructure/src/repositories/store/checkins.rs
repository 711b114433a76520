use chrono::Utc;

use super::StoreState;
use backend_domain::{
    active_checkins,
    decide_admission,
    AdmissionDecision,
    AdmissionOutcome,
    CheckinAttempt,
    CheckinRecord,
    CheckinReversal,
    EventScope,
    GuestId,
    GuestTarget,
    OperatorIdentity,
    ReversalOutcome,
    StoreError,
    StoreResult,
};

impl StoreState {
    pub(crate) fn checkins_of(&self, guest_id: GuestId) -> Vec<CheckinRecord> {
        self.checkins
            .values()
            .filter(|record| record.guest_id == guest_id)
            .cloned()
            .collect()
    }

    pub(crate) fn reversals_of(&self, guest_id: GuestId) -> Vec<CheckinReversal> {
        self.reversals
            .values()
            .filter(|reversal| reversal.guest_id == guest_id)
            .cloned()
            .collect()
    }

    /// Resolve, decide and write one admission. Runs under the store lock, so
    /// of two racing attempts the later one always sees the earlier record.
    pub fn admit(
        &mut self,
        scope: EventScope,
        target: GuestTarget,
        attempt: CheckinAttempt,
    ) -> StoreResult<AdmissionOutcome> {
        let event = self.resolve_scope(scope)?;
        let event_id = event.id;
        let settings = event.settings.clone();
        let guest_id = self.resolve_target(event_id, &target)?;

        let history = self.checkins_of(guest_id);
        let reversals = self.reversals_of(guest_id);
        let active = active_checkins(&history, &reversals);

        if let AdmissionDecision::Duplicate(message) = decide_admission(&settings, &active, &attempt) {
            let guest = self.scoped_guest(event_id, guest_id)?.clone();
            return Ok(AdmissionOutcome {
                guest,
                checkins: history,
                created: None,
                message: Some(message),
            });
        }

        let now = Utc::now();
        let record = CheckinRecord {
            id: self.next_checkin_id(),
            guest_id,
            checkin_at: now,
            checkin_by_operator_id: attempt.operator_id,
            checkin_by_name: attempt.operator_name,
            counter_name: attempt.counter_name,
        };
        let guest = self
            .guests
            .get_mut(&guest_id)
            .ok_or_else(|| StoreError::not_found("guest", guest_id))?;
        guest.checked_in = true;
        // Set once per cycle; later per-counter admissions only add records.
        if guest.checked_in_at.is_none() {
            guest.checked_in_at = Some(now);
            guest.checked_in_by_id = record.checkin_by_operator_id;
        }
        let guest = guest.clone();
        self.checkins.insert(record.id, record.clone());

        let mut checkins = history;
        checkins.push(record.clone());
        Ok(AdmissionOutcome {
            guest,
            checkins,
            created: Some(record),
            message: None,
        })
    }

    /// Closes the current check-in cycle. History rows stay; the audit row
    /// remembers the last record of the closed cycle.
    pub fn reverse(
        &mut self,
        scope: EventScope,
        guest_id: GuestId,
        operator: &OperatorIdentity,
        reason: &str,
    ) -> StoreResult<ReversalOutcome> {
        let event_id = self.resolve_scope(scope)?.id;
        let guest = self.scoped_guest(event_id, guest_id)?;
        if !guest.checked_in {
            return Err(StoreError::Precondition(format!(
                "guest '{}' is not checked in",
                guest.guest_code
            )));
        }

        let last_checkin_id = self
            .checkins
            .values()
            .filter(|record| record.guest_id == guest_id)
            .map(|record| record.id)
            .max();
        let reversal = CheckinReversal {
            id: self.next_reversal_id(),
            guest_id,
            reversed_at: Utc::now(),
            operator_id: operator.id,
            operator_name: operator.name.clone(),
            reason: reason.to_string(),
            last_checkin_id,
        };
        let guest = self
            .guests
            .get_mut(&guest_id)
            .ok_or_else(|| StoreError::not_found("guest", guest_id))?;
        guest.checked_in = false;
        guest.checked_in_at = None;
        guest.checked_in_by_id = None;
        let guest = guest.clone();
        self.reversals.insert(reversal.id, reversal.clone());

        Ok(ReversalOutcome {
            guest,
            checkins: self.checkins_of(guest_id),
            reversal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use backend_domain::{EventSettings, OperatorId};

    fn at_counter(counter: &str) -> CheckinAttempt {
        CheckinAttempt {
            operator_id: Some(OperatorId(1)),
            operator_name: Some("Desk".to_string()),
            counter_name: Some(counter.to_string()),
        }
    }

    fn lead() -> OperatorIdentity {
        OperatorIdentity {
            id: OperatorId(9),
            name: "Lead".to_string(),
            counter_name: None,
        }
    }

    #[test]
    fn repeated_admission_is_a_duplicate() {
        let (mut state, _) = state_with_event(EventSettings::default());
        add_guest(&mut state, "G001");
        let target = GuestTarget::Code("G001".to_string());

        let first = state
            .admit(EventScope::active(), target.clone(), at_counter("A"))
            .expect("admit");
        assert!(!first.is_duplicate());
        assert!(first.guest.checked_in);

        let second = state
            .admit(EventScope::active(), target, at_counter("B"))
            .expect("admit");
        assert!(second.is_duplicate());
        assert!(second.message.is_some());
        assert_eq!(second.checkins.len(), 1);
        assert_eq!(state.checkins.len(), 1);
    }

    #[test]
    fn per_counter_policy_keeps_first_timestamp() {
        let (mut state, _) = state_with_event(EventSettings {
            allow_multiple_checkin_per_counter: true,
            ..EventSettings::default()
        });
        let guest = add_guest(&mut state, "G001");
        let target = GuestTarget::Id(guest.id);

        let first = state
            .admit(EventScope::active(), target.clone(), at_counter("A"))
            .expect("admit A");
        let stamped = first.guest.checked_in_at;
        let second = state
            .admit(EventScope::active(), target.clone(), at_counter("B"))
            .expect("admit B");
        assert!(!second.is_duplicate());
        assert_eq!(second.checkins.len(), 2);
        assert_eq!(second.guest.checked_in_at, stamped);

        let again = state
            .admit(EventScope::active(), target, at_counter("a"))
            .expect("admit A again");
        assert!(again.is_duplicate());
    }

    #[test]
    fn reversal_keeps_history_and_reopens_admission() {
        let (mut state, _) = state_with_event(EventSettings::default());
        let guest = add_guest(&mut state, "G001");
        let target = GuestTarget::Id(guest.id);
        state
            .admit(EventScope::active(), target.clone(), at_counter("A"))
            .expect("admit");

        let reversed = state
            .reverse(EventScope::active(), guest.id, &lead(), "wrong badge")
            .expect("reverse");
        assert!(!reversed.guest.checked_in);
        assert!(reversed.guest.checked_in_at.is_none());
        assert_eq!(reversed.checkins.len(), 1);
        assert_eq!(reversed.reversal.last_checkin_id, Some(reversed.checkins[0].id));

        let again = state
            .admit(EventScope::active(), target, at_counter("A"))
            .expect("re-admit");
        assert!(!again.is_duplicate());
        assert_eq!(again.checkins.len(), 2);
    }

    #[test]
    fn reversing_a_guest_who_is_not_checked_in_fails() {
        let (mut state, _) = state_with_event(EventSettings::default());
        let guest = add_guest(&mut state, "G001");
        let err = state
            .reverse(EventScope::active(), guest.id, &lead(), "no reason")
            .expect_err("not checked in");
        assert!(matches!(err, StoreError::Precondition(_)));
        assert!(state.reversals.is_empty());
    }
}
