use chrono::Utc;

use super::StoreState;
use backend_domain::{
    matches_query,
    normalize_code,
    EventId,
    EventScope,
    Guest,
    GuestId,
    GuestInput,
    GuestLedger,
    GuestListQuery,
    GuestPatch,
    GuestTarget,
    StoreError,
    StoreResult,
};

impl StoreState {
    /// Assigns the next queue number of the event and, when no code is
    /// supplied, derives the code from it. A derived code skips forward past
    /// codes already entered by hand.
    pub fn create_guest(&mut self, scope: EventScope, input: GuestInput) -> StoreResult<Guest> {
        let event = self.resolve_scope(scope)?;
        let event_id = event.id;
        let allow_duplicates = event.settings.allow_duplicate_guest_id;

        let queue_preview = self.queue_counters.get(&event_id).copied().unwrap_or(0) + 1;
        let code = match input
            .guest_code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
        {
            Some(code) => code,
            None => self.free_derived_code(event_id, queue_preview),
        };
        if !allow_duplicates && self.code_taken(event_id, &code, None) {
            return Err(StoreError::DuplicateGuestId(code));
        }

        let guest = Guest {
            id: self.next_guest_id(),
            event_id,
            guest_code: code,
            queue_number: self.next_queue_number(event_id),
            name: input.name,
            category: input.category,
            company: input.company,
            email: input.email,
            phone: input.phone,
            notes: input.notes,
            checked_in: false,
            checked_in_at: None,
            checked_in_by_id: None,
            souvenir_taken: false,
            created_at: Utc::now(),
        };
        self.guests.insert(guest.id, guest.clone());
        Ok(guest)
    }

    pub fn update_guest(&mut self, scope: EventScope, id: GuestId, patch: GuestPatch) -> StoreResult<Guest> {
        let event = self.resolve_scope(scope)?;
        let event_id = event.id;
        let allow_duplicates = event.settings.allow_duplicate_guest_id;
        self.scoped_guest(event_id, id)?;

        if let Some(code) = patch.guest_code.as_deref() {
            if !allow_duplicates && self.code_taken(event_id, code, Some(id)) {
                return Err(StoreError::DuplicateGuestId(code.to_string()));
            }
        }

        let guest = self
            .guests
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("guest", id))?;
        if let Some(code) = patch.guest_code {
            guest.guest_code = code;
        }
        if let Some(name) = patch.name {
            guest.name = name;
        }
        apply_optional(&mut guest.category, patch.category);
        apply_optional(&mut guest.company, patch.company);
        apply_optional(&mut guest.email, patch.email);
        apply_optional(&mut guest.phone, patch.phone);
        apply_optional(&mut guest.notes, patch.notes);
        Ok(guest.clone())
    }

    pub fn delete_guest(&mut self, scope: EventScope, id: GuestId) -> StoreResult<Guest> {
        let event_id = self.resolve_scope(scope)?.id;
        self.scoped_guest(event_id, id)?;
        self.remove_guest_cascade(id)
            .ok_or_else(|| StoreError::not_found("guest", id))
    }

    pub fn purge_guests(&mut self, scope: EventScope) -> StoreResult<usize> {
        let event_id = self.resolve_scope(scope)?.id;
        let ids: Vec<GuestId> = self
            .guests
            .values()
            .filter(|guest| guest.event_id == event_id)
            .map(|guest| guest.id)
            .collect();
        for id in &ids {
            self.remove_guest_cascade(*id);
        }
        Ok(ids.len())
    }

    pub fn get_guest(&self, scope: EventScope, id: GuestId) -> StoreResult<Guest> {
        let event_id = self.resolve_scope(scope)?.id;
        self.scoped_guest(event_id, id).cloned()
    }

    pub fn list_guests(&self, scope: EventScope, query: GuestListQuery) -> StoreResult<Vec<Guest>> {
        let event_id = self.resolve_scope(scope)?.id;
        let category = query.category.map(|value| value.trim().to_lowercase());
        let text = query.q.filter(|value| !value.trim().is_empty());

        let mut guests: Vec<Guest> = self
            .guests
            .values()
            .filter(|guest| guest.event_id == event_id)
            .filter(|guest| query.checked_in.map_or(true, |wanted| guest.checked_in == wanted))
            .filter(|guest| {
                category.as_deref().map_or(true, |wanted| {
                    guest
                        .category
                        .as_deref()
                        .map(|value| value.trim().to_lowercase() == wanted)
                        .unwrap_or(false)
                })
            })
            .filter(|guest| text.as_deref().map_or(true, |needle| matches_query(guest, needle)))
            .cloned()
            .collect();
        guests.sort_by_key(|guest| (guest.queue_number, guest.id));
        if let Some(limit) = query.limit {
            guests.truncate(limit);
        }
        Ok(guests)
    }

    pub fn search_guests(&self, scope: EventScope, query: &str, limit: usize) -> StoreResult<Vec<Guest>> {
        self.list_guests(
            scope,
            GuestListQuery {
                q: Some(query.to_string()),
                limit: Some(limit),
                ..GuestListQuery::default()
            },
        )
    }

    pub fn guest_ledger(&self, scope: EventScope, id: GuestId) -> StoreResult<GuestLedger> {
        let event_id = self.resolve_scope(scope)?.id;
        let guest = self.scoped_guest(event_id, id)?.clone();
        Ok(GuestLedger {
            checkins: self.checkins_of(id),
            reversals: self.reversals_of(id),
            guest,
        })
    }

    /// Resolves a check-in target inside `event_id`. Codes compare
    /// case-insensitively; when duplicate codes are allowed the earliest guest
    /// still waiting to check in wins, else the earliest guest.
    pub(crate) fn resolve_target(&self, event_id: EventId, target: &GuestTarget) -> StoreResult<GuestId> {
        match target {
            GuestTarget::Id(id) => self.scoped_guest(event_id, *id).map(|guest| guest.id),
            GuestTarget::Code(code) => {
                let wanted = normalize_code(code);
                let matching: Vec<&Guest> = self
                    .guests
                    .values()
                    .filter(|guest| guest.event_id == event_id)
                    .filter(|guest| normalize_code(&guest.guest_code) == wanted)
                    .collect();
                matching
                    .iter()
                    .find(|guest| !guest.checked_in)
                    .or_else(|| matching.first())
                    .map(|guest| guest.id)
                    .ok_or_else(|| StoreError::not_found("guest", code))
            }
        }
    }

    fn free_derived_code(&self, event_id: EventId, from: u32) -> String {
        (from..)
            .map(|number| format!("G{:03}", number))
            .find(|code| !self.code_taken(event_id, code, None))
            .unwrap_or_else(|| format!("G{}-{}", from, self.sequences.guest))
    }

    fn code_taken(&self, event_id: EventId, code: &str, except: Option<GuestId>) -> bool {
        let wanted = normalize_code(code);
        self.guests.values().any(|guest| {
            guest.event_id == event_id
                && Some(guest.id) != except
                && normalize_code(&guest.guest_code) == wanted
        })
    }
}

/// Blank strings in a patch clear the field.
fn apply_optional(field: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        let trimmed = value.trim();
        *field = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use backend_domain::EventSettings;

    #[test]
    fn queue_numbers_are_never_reused() {
        let (mut state, _) = state_with_event(EventSettings::default());
        let first = add_guest(&mut state, "G001");
        let second = add_guest(&mut state, "G002");
        assert_eq!((first.queue_number, second.queue_number), (1, 2));

        state
            .delete_guest(EventScope::active(), second.id)
            .expect("delete");
        let third = add_guest(&mut state, "G003");
        assert_eq!(third.queue_number, 3);
    }

    #[test]
    fn derived_codes_skip_codes_entered_by_hand() {
        let (mut state, _) = state_with_event(EventSettings::default());
        add_guest(&mut state, "G002");
        add_guest(&mut state, "g003");

        let derived = state
            .create_guest(
                EventScope::active(),
                GuestInput {
                    name: "No code".to_string(),
                    ..GuestInput::default()
                },
            )
            .expect("create without code");
        assert_eq!(derived.queue_number, 3);
        assert_eq!(derived.guest_code, "G004");
    }

    #[test]
    fn duplicate_codes_follow_event_policy() {
        let (mut state, _) = state_with_event(EventSettings::default());
        add_guest(&mut state, "VIP-1");
        let err = state
            .create_guest(
                EventScope::active(),
                GuestInput {
                    guest_code: Some("vip-1".to_string()),
                    name: "Copy".to_string(),
                    ..GuestInput::default()
                },
            )
            .expect_err("duplicate");
        assert!(matches!(err, StoreError::DuplicateGuestId(_)));

        let (mut lenient, _) = state_with_event(EventSettings {
            allow_duplicate_guest_id: true,
            ..EventSettings::default()
        });
        add_guest(&mut lenient, "VIP-1");
        add_guest(&mut lenient, "VIP-1");
        assert_eq!(lenient.guests.len(), 2);
    }

    #[test]
    fn missing_code_is_derived_from_queue_number() {
        let (mut state, _) = state_with_event(EventSettings::default());
        let guest = state
            .create_guest(
                EventScope::active(),
                GuestInput {
                    name: "Walk-in".to_string(),
                    ..GuestInput::default()
                },
            )
            .expect("create");
        assert_eq!(guest.guest_code, "G001");
    }

    #[test]
    fn list_filters_by_checkin_state_and_text() {
        let (mut state, _) = state_with_event(EventSettings::default());
        let ada = add_guest(&mut state, "G001");
        add_guest(&mut state, "G002");
        state.guests.get_mut(&ada.id).expect("guest").checked_in = true;

        let checked = state
            .list_guests(
                EventScope::active(),
                GuestListQuery {
                    checked_in: Some(true),
                    ..GuestListQuery::default()
                },
            )
            .expect("list");
        assert_eq!(checked.len(), 1);
        assert_eq!(checked[0].id, ada.id);

        let found = state
            .search_guests(EventScope::active(), "g002", 10)
            .expect("search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].guest_code, "G002");
    }

    #[test]
    fn codes_resolve_case_insensitively() {
        let (mut state, event_id) = state_with_event(EventSettings::default());
        let guest = add_guest(&mut state, "Abc-9");
        let resolved = state
            .resolve_target(event_id, &GuestTarget::Code(" abc-9 ".to_string()))
            .expect("resolve");
        assert_eq!(resolved, guest.id);
        assert!(matches!(
            state.resolve_target(event_id, &GuestTarget::Code("nope".to_string())),
            Err(StoreError::NotFound { .. })
        ));
    }
}
