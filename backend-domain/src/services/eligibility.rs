// Prize draw eligibility

use std::collections::HashMap;

use crate::entities::{Guest, Prize, PrizeWinner};
use crate::value_objects::{GuestId, PrizeId};

/// Whether `guest` may be drawn for `prize` given every winner row of the event.
///
/// A guest must be checked in right now. Unless the prize allows multiple wins,
/// the guest must not hold this prize already nor any other prize that does not
/// allow re-entry.
pub fn is_eligible(
    guest: &Guest,
    prize: &Prize,
    prizes: &HashMap<PrizeId, Prize>,
    wins_of_guest: &[&PrizeWinner],
) -> bool {
    if !guest.checked_in || guest.event_id != prize.event_id {
        return false;
    }
    if prize.allow_multiple_wins {
        return true;
    }
    !wins_of_guest.iter().any(|win| {
        win.prize_id == prize.id
            || prizes
                .get(&win.prize_id)
                .map(|won| !won.allow_multiple_wins)
                .unwrap_or(false)
    })
}

pub fn eligible_pool<'a>(
    guests: impl IntoIterator<Item = &'a Guest>,
    prize: &Prize,
    prizes: &HashMap<PrizeId, Prize>,
    winners: &[PrizeWinner],
) -> Vec<&'a Guest> {
    let mut wins_by_guest: HashMap<GuestId, Vec<&PrizeWinner>> = HashMap::new();
    for winner in winners {
        wins_by_guest.entry(winner.guest_id).or_default().push(winner);
    }
    guests
        .into_iter()
        .filter(|guest| {
            let wins = wins_by_guest
                .get(&guest.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            is_eligible(guest, prize, prizes, wins)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{EventId, WinnerId};
    use chrono::{TimeZone, Utc};

    fn guest(id: i64, checked_in: bool) -> Guest {
        Guest {
            id: GuestId(id),
            event_id: EventId(1),
            guest_code: format!("G{:03}", id),
            queue_number: id as u32,
            name: format!("guest {}", id),
            category: None,
            company: None,
            email: None,
            phone: None,
            notes: None,
            checked_in,
            checked_in_at: None,
            checked_in_by_id: None,
            souvenir_taken: false,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    fn prize(id: i64, allow_multiple_wins: bool) -> Prize {
        Prize {
            id: PrizeId(id),
            event_id: EventId(1),
            name: format!("prize {}", id),
            description: None,
            category: None,
            image_url: None,
            quantity: 5,
            allow_multiple_wins,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    fn win(id: i64, prize_id: i64, guest_id: i64) -> PrizeWinner {
        PrizeWinner {
            id: WinnerId(id),
            prize_id: PrizeId(prize_id),
            guest_id: GuestId(guest_id),
            won_at: Utc.timestamp_opt(0, 0).unwrap(),
            collection: None,
        }
    }

    fn catalog(items: &[Prize]) -> HashMap<PrizeId, Prize> {
        items.iter().map(|p| (p.id, p.clone())).collect()
    }

    #[test]
    fn only_checked_in_guests_are_eligible() {
        let guests = [guest(1, true), guest(2, false)];
        let p = prize(1, false);
        let pool = eligible_pool(guests.iter(), &p, &catalog(&[p.clone()]), &[]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, GuestId(1));
    }

    #[test]
    fn winner_of_non_repeatable_prize_is_excluded_elsewhere() {
        let guests = [guest(1, true), guest(2, true)];
        let first = prize(1, false);
        let second = prize(2, false);
        let prizes = catalog(&[first, second.clone()]);
        let pool = eligible_pool(guests.iter(), &second, &prizes, &[win(1, 1, 1)]);
        let ids: Vec<_> = pool.iter().map(|g| g.id.0).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn winner_of_repeatable_prize_may_enter_other_draws() {
        let guests = [guest(1, true)];
        let open = prize(1, true);
        let second = prize(2, false);
        let prizes = catalog(&[open, second.clone()]);
        assert_eq!(eligible_pool(guests.iter(), &second, &prizes, &[win(1, 1, 1)]).len(), 1);
    }

    #[test]
    fn repeat_prize_accepts_previous_winners() {
        let guests = [guest(1, true)];
        let locked = prize(1, false);
        let open = prize(2, true);
        let prizes = catalog(&[locked, open.clone()]);
        let winners = [win(1, 1, 1), win(2, 2, 1)];
        assert_eq!(eligible_pool(guests.iter(), &open, &prizes, &winners).len(), 1);
    }

    #[test]
    fn same_prize_is_not_won_twice_without_repeat() {
        let guests = [guest(1, true)];
        let p = prize(1, false);
        let prizes = catalog(&[p.clone()]);
        assert!(eligible_pool(guests.iter(), &p, &prizes, &[win(1, 1, 1)]).is_empty());
    }
}
