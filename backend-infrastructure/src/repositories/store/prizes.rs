use std::collections::HashMap;

use chrono::Utc;

use super::StoreState;
use backend_domain::{
    eligible_pool,
    is_eligible,
    CollectOutcome,
    DrawPool,
    EventId,
    EventScope,
    Guest,
    GuestId,
    Prize,
    PrizeCollection,
    PrizeDrawResult,
    PrizeId,
    PrizeInput,
    PrizePatch,
    PrizeSummary,
    PrizeWinner,
    PrizeWinnerView,
    StoreError,
    StoreResult,
    WinnerId,
};

impl StoreState {
    pub fn list_prizes(&self, scope: EventScope) -> StoreResult<Vec<PrizeSummary>> {
        let event_id = self.resolve_scope(scope)?.id;
        Ok(self
            .prizes
            .values()
            .filter(|prize| prize.event_id == event_id)
            .map(|prize| self.prize_summary(prize))
            .collect())
    }

    pub fn get_prize(&self, scope: EventScope, id: PrizeId) -> StoreResult<PrizeSummary> {
        let event_id = self.resolve_scope(scope)?.id;
        let prize = self.scoped_prize(event_id, id)?;
        Ok(self.prize_summary(prize))
    }

    pub fn create_prize(&mut self, scope: EventScope, input: PrizeInput) -> StoreResult<Prize> {
        let event_id = self.resolve_scope(scope)?.id;
        let prize = Prize {
            id: self.next_prize_id(),
            event_id,
            name: input.name,
            description: input.description,
            category: input.category,
            image_url: input.image_url,
            quantity: input.quantity,
            allow_multiple_wins: input.allow_multiple_wins,
            created_at: Utc::now(),
        };
        self.prizes.insert(prize.id, prize.clone());
        Ok(prize)
    }

    pub fn update_prize(&mut self, scope: EventScope, id: PrizeId, patch: PrizePatch) -> StoreResult<Prize> {
        let event_id = self.resolve_scope(scope)?.id;
        self.scoped_prize(event_id, id)?;
        let won = self.won_count(id);
        if let Some(quantity) = patch.quantity {
            if quantity < won {
                return Err(StoreError::Precondition(format!(
                    "quantity cannot drop below the {} prizes already won",
                    won
                )));
            }
        }

        let prize = self
            .prizes
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("prize", id))?;
        if let Some(name) = patch.name {
            prize.name = name;
        }
        if let Some(description) = patch.description {
            prize.description = Some(description).filter(|value| !value.trim().is_empty());
        }
        if let Some(category) = patch.category {
            prize.category = Some(category).filter(|value| !value.trim().is_empty());
        }
        if let Some(image_url) = patch.image_url {
            prize.image_url = Some(image_url).filter(|value| !value.trim().is_empty());
        }
        if let Some(quantity) = patch.quantity {
            prize.quantity = quantity;
        }
        if let Some(allow_multiple_wins) = patch.allow_multiple_wins {
            prize.allow_multiple_wins = allow_multiple_wins;
        }
        Ok(prize.clone())
    }

    pub fn delete_prize(&mut self, scope: EventScope, id: PrizeId) -> StoreResult<Prize> {
        let event_id = self.resolve_scope(scope)?.id;
        self.scoped_prize(event_id, id)?;
        self.winners.retain(|_, winner| winner.prize_id != id);
        self.prizes
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("prize", id))
    }

    /// Live eligible pool: reads the current `checked_in` flag of every guest.
    pub fn draw_pool(&self, scope: EventScope, id: PrizeId) -> StoreResult<DrawPool> {
        let event_id = self.resolve_scope(scope)?.id;
        let prize = self.scoped_prize(event_id, id)?.clone();
        let remaining = prize.quantity.saturating_sub(self.won_count(id));
        let prizes = self.event_prizes(event_id);
        let winners = self.event_winners(&prizes);
        let candidates = eligible_pool(
            self.guests.values().filter(|guest| guest.event_id == event_id),
            &prize,
            &prizes,
            &winners,
        )
        .into_iter()
        .cloned()
        .collect();
        Ok(DrawPool {
            prize,
            remaining,
            candidates,
        })
    }

    /// Quantity guard and eligibility are both re-checked here, in the same
    /// unit as the insert.
    pub fn record_winner(
        &mut self,
        scope: EventScope,
        prize_id: PrizeId,
        guest_id: GuestId,
    ) -> StoreResult<PrizeDrawResult> {
        let event_id = self.resolve_scope(scope)?.id;
        let prize = self.scoped_prize(event_id, prize_id)?.clone();
        if self.won_count(prize_id) >= prize.quantity {
            return Err(StoreError::SoldOut);
        }
        let guest = self
            .scoped_guest(event_id, guest_id)
            .map_err(|_| StoreError::GuestIneligible)?
            .clone();
        let prizes = self.event_prizes(event_id);
        let wins: Vec<&PrizeWinner> = self
            .winners
            .values()
            .filter(|winner| winner.guest_id == guest_id)
            .collect();
        if !is_eligible(&guest, &prize, &prizes, &wins) {
            return Err(StoreError::GuestIneligible);
        }

        let winner = PrizeWinner {
            id: self.next_winner_id(),
            prize_id,
            guest_id,
            won_at: Utc::now(),
            collection: None,
        };
        self.winners.insert(winner.id, winner.clone());
        let remaining = prize.quantity.saturating_sub(self.won_count(prize_id));
        Ok(PrizeDrawResult {
            prize_id,
            winner: PrizeWinnerView {
                winner,
                prize_name: prize.name.clone(),
                guest,
            },
            prize,
            remaining,
        })
    }

    pub fn list_winners(&self, scope: EventScope, prize_id: PrizeId) -> StoreResult<Vec<PrizeWinnerView>> {
        let event_id = self.resolve_scope(scope)?.id;
        let prize = self.scoped_prize(event_id, prize_id)?;
        Ok(self
            .winners
            .values()
            .filter(|winner| winner.prize_id == prize_id)
            .filter_map(|winner| self.winner_view(winner, prize))
            .collect())
    }

    /// Collecting an already collected prize returns the existing collection.
    pub fn collect_prize(
        &mut self,
        scope: EventScope,
        winner_id: WinnerId,
        collected_by_name: &str,
    ) -> StoreResult<CollectOutcome> {
        let event_id = self.resolve_scope(scope)?.id;
        self.scoped_winner(event_id, winner_id)?;
        let winner = self
            .winners
            .get_mut(&winner_id)
            .ok_or_else(|| StoreError::not_found("prize winner", winner_id))?;
        let newly_collected = winner.collection.is_none();
        if newly_collected {
            winner.collection = Some(PrizeCollection {
                collected_at: Utc::now(),
                collected_by_name: collected_by_name.to_string(),
            });
        }
        let winner = self.scoped_winner(event_id, winner_id)?;
        Ok(CollectOutcome {
            winner,
            newly_collected,
        })
    }

    pub fn uncollect_prize(&mut self, scope: EventScope, winner_id: WinnerId) -> StoreResult<PrizeWinnerView> {
        let event_id = self.resolve_scope(scope)?.id;
        self.scoped_winner(event_id, winner_id)?;
        if let Some(winner) = self.winners.get_mut(&winner_id) {
            winner.collection = None;
        }
        self.scoped_winner(event_id, winner_id)
    }

    /// Drops the winners of this prize only.
    pub fn reset_prize(&mut self, scope: EventScope, prize_id: PrizeId) -> StoreResult<usize> {
        let event_id = self.resolve_scope(scope)?.id;
        self.scoped_prize(event_id, prize_id)?;
        let before = self.winners.len();
        self.winners.retain(|_, winner| winner.prize_id != prize_id);
        Ok(before - self.winners.len())
    }

    fn won_count(&self, prize_id: PrizeId) -> u32 {
        self.winners
            .values()
            .filter(|winner| winner.prize_id == prize_id)
            .count() as u32
    }

    fn event_prizes(&self, event_id: EventId) -> HashMap<PrizeId, Prize> {
        self.prizes
            .values()
            .filter(|prize| prize.event_id == event_id)
            .map(|prize| (prize.id, prize.clone()))
            .collect()
    }

    fn event_winners(&self, prizes: &HashMap<PrizeId, Prize>) -> Vec<PrizeWinner> {
        self.winners
            .values()
            .filter(|winner| prizes.contains_key(&winner.prize_id))
            .cloned()
            .collect()
    }

    fn prize_summary(&self, prize: &Prize) -> PrizeSummary {
        let (won, collected) = self
            .winners
            .values()
            .filter(|winner| winner.prize_id == prize.id)
            .fold((0u32, 0u32), |(won, collected), winner| {
                (won + 1, collected + u32::from(winner.collection.is_some()))
            });
        PrizeSummary {
            prize: prize.clone(),
            won,
            collected,
            remaining: prize.quantity.saturating_sub(won),
        }
    }

    fn winner_view(&self, winner: &PrizeWinner, prize: &Prize) -> Option<PrizeWinnerView> {
        let guest: &Guest = self.guests.get(&winner.guest_id)?;
        Some(PrizeWinnerView {
            winner: winner.clone(),
            prize_name: prize.name.clone(),
            guest: guest.clone(),
        })
    }

    fn scoped_winner(&self, event_id: EventId, winner_id: WinnerId) -> StoreResult<PrizeWinnerView> {
        let not_found = || StoreError::not_found("prize winner", winner_id);
        let winner = self.winners.get(&winner_id).ok_or_else(not_found)?;
        let prize = self
            .prizes
            .get(&winner.prize_id)
            .filter(|prize| prize.event_id == event_id)
            .ok_or_else(not_found)?;
        self.winner_view(winner, prize).ok_or_else(not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use backend_domain::{CheckinAttempt, EventSettings, GuestTarget};

    fn checked_in_guest(state: &mut StoreState, code: &str) -> Guest {
        let guest = add_guest(state, code);
        state
            .admit(EventScope::active(), GuestTarget::Id(guest.id), CheckinAttempt::default())
            .expect("admit")
            .guest
    }

    fn prize(state: &mut StoreState, quantity: u32, allow_multiple_wins: bool) -> Prize {
        state
            .create_prize(
                EventScope::active(),
                PrizeInput {
                    name: "Bike".to_string(),
                    quantity,
                    allow_multiple_wins,
                    ..PrizeInput::default()
                },
            )
            .expect("create prize")
    }

    #[test]
    fn pool_only_holds_checked_in_guests() {
        let (mut state, _) = state_with_event(EventSettings::default());
        let present = checked_in_guest(&mut state, "G001");
        add_guest(&mut state, "G002");
        let bike = prize(&mut state, 2, false);

        let pool = state.draw_pool(EventScope::active(), bike.id).expect("pool");
        assert_eq!(pool.remaining, 2);
        assert_eq!(pool.candidates.len(), 1);
        assert_eq!(pool.candidates[0].id, present.id);
    }

    #[test]
    fn quantity_guard_rejects_extra_winner() {
        let (mut state, _) = state_with_event(EventSettings::default());
        let a = checked_in_guest(&mut state, "G001");
        let b = checked_in_guest(&mut state, "G002");
        let bike = prize(&mut state, 1, false);

        let result = state
            .record_winner(EventScope::active(), bike.id, a.id)
            .expect("first winner");
        assert_eq!(result.remaining, 0);
        assert!(matches!(
            state.record_winner(EventScope::active(), bike.id, b.id),
            Err(StoreError::SoldOut)
        ));
        assert_eq!(state.winners.len(), 1);
    }

    #[test]
    fn winners_of_exclusive_prizes_leave_the_pool() {
        let (mut state, _) = state_with_event(EventSettings::default());
        let a = checked_in_guest(&mut state, "G001");
        let bike = prize(&mut state, 5, false);
        let mug = prize(&mut state, 5, false);
        state
            .record_winner(EventScope::active(), bike.id, a.id)
            .expect("win bike");

        assert!(matches!(
            state.record_winner(EventScope::active(), mug.id, a.id),
            Err(StoreError::GuestIneligible)
        ));
        let open = prize(&mut state, 5, true);
        assert!(state.record_winner(EventScope::active(), open.id, a.id).is_ok());
    }

    #[test]
    fn collect_is_idempotent_and_reset_is_per_prize() {
        let (mut state, _) = state_with_event(EventSettings::default());
        let a = checked_in_guest(&mut state, "G001");
        let b = checked_in_guest(&mut state, "G002");
        let bike = prize(&mut state, 1, false);
        let mug = prize(&mut state, 1, false);
        let won = state
            .record_winner(EventScope::active(), bike.id, a.id)
            .expect("win bike");
        state
            .record_winner(EventScope::active(), mug.id, b.id)
            .expect("win mug");

        let first = state
            .collect_prize(EventScope::active(), won.winner.winner.id, "Desk 1")
            .expect("collect");
        assert!(first.newly_collected);
        let second = state
            .collect_prize(EventScope::active(), won.winner.winner.id, "Desk 2")
            .expect("collect again");
        assert!(!second.newly_collected);
        assert_eq!(
            second.winner.winner.collection.map(|c| c.collected_by_name),
            Some("Desk 1".to_string())
        );

        assert_eq!(state.reset_prize(EventScope::active(), bike.id).expect("reset"), 1);
        assert_eq!(state.winners.len(), 1);
        assert_eq!(state.get_prize(EventScope::active(), mug.id).expect("mug").won, 1);
    }
}
