use chrono::Utc;

use super::StoreState;
use backend_domain::{
    CheckinAttempt,
    EventScope,
    GiveOutcome,
    GuestId,
    GuestInput,
    GuestTarget,
    Souvenir,
    SouvenirGiven,
    SouvenirId,
    SouvenirInput,
    SouvenirPatch,
    SouvenirSummary,
    SouvenirTake,
    SouvenirTakeView,
    StoreError,
    StoreResult,
    TakeId,
    WalkInGiven,
};

impl StoreState {
    pub fn list_souvenirs(&self, scope: EventScope) -> StoreResult<Vec<SouvenirSummary>> {
        let event_id = self.resolve_scope(scope)?.id;
        Ok(self
            .souvenirs
            .values()
            .filter(|souvenir| souvenir.event_id == event_id)
            .map(|souvenir| self.souvenir_summary(souvenir))
            .collect())
    }

    pub fn get_souvenir(&self, scope: EventScope, id: SouvenirId) -> StoreResult<SouvenirSummary> {
        let event_id = self.resolve_scope(scope)?.id;
        let souvenir = self.scoped_souvenir(event_id, id)?;
        Ok(self.souvenir_summary(souvenir))
    }

    pub fn create_souvenir(&mut self, scope: EventScope, input: SouvenirInput) -> StoreResult<Souvenir> {
        let event_id = self.resolve_scope(scope)?.id;
        let souvenir = Souvenir {
            id: self.next_souvenir_id(),
            event_id,
            name: input.name,
            description: input.description,
            quantity: input.quantity,
            created_at: Utc::now(),
        };
        self.souvenirs.insert(souvenir.id, souvenir.clone());
        Ok(souvenir)
    }

    pub fn update_souvenir(
        &mut self,
        scope: EventScope,
        id: SouvenirId,
        patch: SouvenirPatch,
    ) -> StoreResult<Souvenir> {
        let event_id = self.resolve_scope(scope)?.id;
        self.scoped_souvenir(event_id, id)?;
        let taken = self.taken_count(id);
        if let Some(quantity) = patch.quantity {
            if quantity < taken {
                return Err(StoreError::Precondition(format!(
                    "quantity cannot drop below the {} already handed out",
                    taken
                )));
            }
        }

        let souvenir = self
            .souvenirs
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("souvenir", id))?;
        if let Some(name) = patch.name {
            souvenir.name = name;
        }
        if let Some(description) = patch.description {
            souvenir.description = Some(description).filter(|value| !value.trim().is_empty());
        }
        if let Some(quantity) = patch.quantity {
            souvenir.quantity = quantity;
        }
        Ok(souvenir.clone())
    }

    pub fn delete_souvenir(&mut self, scope: EventScope, id: SouvenirId) -> StoreResult<Souvenir> {
        let event_id = self.resolve_scope(scope)?.id;
        self.scoped_souvenir(event_id, id)?;
        let affected = self.drop_takes(|take| take.souvenir_id == id);
        for guest_id in affected {
            self.refresh_souvenir_flag(guest_id);
        }
        self.souvenirs
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("souvenir", id))
    }

    /// Check-in precondition, prior takes and remaining stock are all decided
    /// against the same state the insert lands in.
    pub fn give_souvenir(
        &mut self,
        scope: EventScope,
        souvenir_id: SouvenirId,
        guest_id: GuestId,
        taken_by_name: Option<String>,
    ) -> StoreResult<GiveOutcome> {
        let event = self.resolve_scope(scope)?;
        let event_id = event.id;
        let require_checkin = event.settings.require_checkin_for_souvenir;
        let souvenir = self.scoped_souvenir(event_id, souvenir_id)?.clone();
        let guest = self.scoped_guest(event_id, guest_id)?.clone();

        if require_checkin && !guest.checked_in {
            return Err(StoreError::Precondition(format!(
                "guest '{}' must check in before receiving a souvenir",
                guest.guest_code
            )));
        }
        let already = self
            .takes
            .values()
            .any(|take| take.souvenir_id == souvenir_id && take.guest_id == guest_id);
        if already {
            return Ok(GiveOutcome::AlreadyTaken {
                history: self.takes_of(guest_id),
                guest,
            });
        }
        if self.taken_count(souvenir_id) >= souvenir.quantity {
            return Err(StoreError::SoldOut);
        }

        let take = SouvenirTake {
            id: self.next_take_id(),
            souvenir_id,
            guest_id,
            taken_at: Utc::now(),
            taken_by_name,
        };
        self.takes.insert(take.id, take.clone());
        self.refresh_souvenir_flag(guest_id);
        let guest = self.scoped_guest(event_id, guest_id)?.clone();
        let remaining = souvenir.quantity.saturating_sub(self.taken_count(souvenir_id));
        Ok(GiveOutcome::Given(SouvenirGiven {
            souvenir,
            take,
            guest,
            remaining,
        }))
    }

    /// Walk-in registration at the souvenir desk. Stock is checked before the
    /// guest exists; any later failure restores the state as it was.
    pub fn give_to_new_guest(
        &mut self,
        scope: EventScope,
        souvenir_id: SouvenirId,
        input: GuestInput,
        attempt: CheckinAttempt,
        taken_by_name: Option<String>,
    ) -> StoreResult<WalkInGiven> {
        let event = self.resolve_scope(scope)?;
        let event_id = event.id;
        let require_checkin = event.settings.require_checkin_for_souvenir;
        let souvenir = self.scoped_souvenir(event_id, souvenir_id)?;
        if self.taken_count(souvenir_id) >= souvenir.quantity {
            return Err(StoreError::SoldOut);
        }

        let checkpoint = self.clone();
        let outcome = self.register_and_give(scope, souvenir_id, input, require_checkin, attempt, taken_by_name);
        if outcome.is_err() {
            *self = checkpoint;
        }
        outcome
    }

    fn register_and_give(
        &mut self,
        scope: EventScope,
        souvenir_id: SouvenirId,
        input: GuestInput,
        require_checkin: bool,
        attempt: CheckinAttempt,
        taken_by_name: Option<String>,
    ) -> StoreResult<WalkInGiven> {
        let guest = self.create_guest(scope, input)?;
        let admission = if require_checkin {
            Some(self.admit(scope, GuestTarget::Id(guest.id), attempt)?)
        } else {
            None
        };
        match self.give_souvenir(scope, souvenir_id, guest.id, taken_by_name)? {
            GiveOutcome::Given(given) => Ok(WalkInGiven {
                guest: given.guest.clone(),
                admission,
                given,
            }),
            GiveOutcome::AlreadyTaken { .. } => Err(StoreError::Conflict(format!(
                "new guest '{}' already holds souvenir {}",
                guest.guest_code, souvenir_id
            ))),
        }
    }

    pub fn remove_take(&mut self, scope: EventScope, take_id: TakeId) -> StoreResult<SouvenirTakeView> {
        let event_id = self.resolve_scope(scope)?.id;
        let not_found = || StoreError::not_found("souvenir take", take_id);
        let take = self.takes.get(&take_id).ok_or_else(not_found)?;
        let souvenir = self
            .souvenirs
            .get(&take.souvenir_id)
            .filter(|souvenir| souvenir.event_id == event_id)
            .ok_or_else(not_found)?;
        let view = SouvenirTakeView {
            take: take.clone(),
            souvenir_name: souvenir.name.clone(),
        };
        self.takes.remove(&take_id);
        self.refresh_souvenir_flag(view.take.guest_id);
        Ok(view)
    }

    pub fn reset_souvenir(&mut self, scope: EventScope, id: SouvenirId) -> StoreResult<usize> {
        let event_id = self.resolve_scope(scope)?.id;
        self.scoped_souvenir(event_id, id)?;
        let affected = self.drop_takes(|take| take.souvenir_id == id);
        for guest_id in &affected {
            self.refresh_souvenir_flag(*guest_id);
        }
        Ok(affected.len())
    }

    pub fn guest_takes(&self, scope: EventScope, guest_id: GuestId) -> StoreResult<Vec<SouvenirTakeView>> {
        let event_id = self.resolve_scope(scope)?.id;
        self.scoped_guest(event_id, guest_id)?;
        Ok(self.takes_of(guest_id))
    }

    /// Every take of the guest across all souvenirs, oldest first.
    fn takes_of(&self, guest_id: GuestId) -> Vec<SouvenirTakeView> {
        self.takes
            .values()
            .filter(|take| take.guest_id == guest_id)
            .filter_map(|take| {
                self.souvenirs.get(&take.souvenir_id).map(|souvenir| SouvenirTakeView {
                    take: take.clone(),
                    souvenir_name: souvenir.name.clone(),
                })
            })
            .collect()
    }

    fn taken_count(&self, souvenir_id: SouvenirId) -> u32 {
        self.takes
            .values()
            .filter(|take| take.souvenir_id == souvenir_id)
            .count() as u32
    }

    /// Removes matching takes and returns the guest of each removed row.
    fn drop_takes(&mut self, matches: impl Fn(&SouvenirTake) -> bool) -> Vec<GuestId> {
        let mut affected = Vec::new();
        self.takes.retain(|_, take| {
            if matches(take) {
                affected.push(take.guest_id);
                false
            } else {
                true
            }
        });
        affected
    }

    fn souvenir_summary(&self, souvenir: &Souvenir) -> SouvenirSummary {
        let taken = self.taken_count(souvenir.id);
        SouvenirSummary {
            souvenir: souvenir.clone(),
            taken,
            remaining: souvenir.quantity.saturating_sub(taken),
        }
    }
}
