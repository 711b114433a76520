use async_trait::async_trait;
use thiserror::Error;

use crate::entities::{
    AdmissionOutcome,
    CheckinAttempt,
    CheckinRecord,
    CheckinReversal,
    CollectOutcome,
    Event,
    EventActivation,
    EventInput,
    EventPatch,
    EventStats,
    GiveOutcome,
    Guest,
    GuestInput,
    GuestListQuery,
    GuestPatch,
    Operator,
    OperatorAccount,
    OperatorIdentity,
    Prize,
    PrizeDrawResult,
    PrizeInput,
    PrizePatch,
    PrizeSummary,
    PrizeWinnerView,
    ReversalOutcome,
    Souvenir,
    SouvenirInput,
    SouvenirPatch,
    SouvenirSummary,
    SouvenirTakeView,
    WalkInGiven,
};
use crate::value_objects::{EventId, GuestId, OperatorId, PrizeId, SouvenirId, TakeId, WinnerId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },
    #[error("no active event")]
    NoActiveEvent,
    #[error("event {expected} is no longer active (active event is {active})")]
    StaleEvent { expected: EventId, active: EventId },
    #[error("sold out")]
    SoldOut,
    #[error("guest is not eligible for this draw")]
    GuestIneligible,
    #[error("guest id '{0}' already exists in this event")]
    DuplicateGuestId(String),
    #[error("{0}")]
    Precondition(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which event a request believes is active. Storage resolves the active event
/// inside the same atomic unit as the write and fails closed on a mismatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventScope {
    pub expected: Option<EventId>,
}

impl EventScope {
    pub fn active() -> Self {
        Self { expected: None }
    }

    pub fn expecting(event_id: Option<EventId>) -> Self {
        Self { expected: event_id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuestTarget {
    Id(GuestId),
    Code(String),
}

#[derive(Debug, Clone)]
pub struct GuestLedger {
    pub guest: Guest,
    pub checkins: Vec<CheckinRecord>,
    pub reversals: Vec<CheckinReversal>,
}

#[derive(Debug, Clone)]
pub struct DrawPool {
    pub prize: Prize,
    pub remaining: u32,
    pub candidates: Vec<Guest>,
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn list_events(&self) -> StoreResult<Vec<Event>>;
    async fn get_event(&self, id: EventId) -> StoreResult<Event>;
    async fn active_event(&self) -> StoreResult<Option<Event>>;
    /// The active event, failing with `StaleEvent` when it is not the one the
    /// scope expects.
    async fn scoped_event(&self, scope: EventScope) -> StoreResult<Event>;
    async fn create_event(&self, input: EventInput) -> StoreResult<Event>;
    async fn update_event(&self, id: EventId, patch: EventPatch) -> StoreResult<Event>;
    /// Removes the event and every row scoped to it.
    async fn delete_event(&self, id: EventId) -> StoreResult<Event>;
    /// Activates `id` and deactivates every other event in one atomic step.
    async fn activate_event(&self, id: EventId) -> StoreResult<EventActivation>;
    async fn event_stats(&self, scope: EventScope) -> StoreResult<EventStats>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait GuestRepository: Send + Sync {
    async fn create_guest(&self, scope: EventScope, input: GuestInput) -> StoreResult<Guest>;
    async fn update_guest(&self, scope: EventScope, id: GuestId, patch: GuestPatch) -> StoreResult<Guest>;
    async fn delete_guest(&self, scope: EventScope, id: GuestId) -> StoreResult<Guest>;
    async fn purge_guests(&self, scope: EventScope) -> StoreResult<usize>;
    async fn get_guest(&self, scope: EventScope, id: GuestId) -> StoreResult<Guest>;
    async fn list_guests(&self, scope: EventScope, query: GuestListQuery) -> StoreResult<Vec<Guest>>;
    async fn search_guests(&self, scope: EventScope, query: &str, limit: usize) -> StoreResult<Vec<Guest>>;
    async fn guest_ledger(&self, scope: EventScope, id: GuestId) -> StoreResult<GuestLedger>;
}

#[async_trait]
pub trait CheckinLedger: Send + Sync {
    /// Resolve, decide and persist one admission as a single atomic unit.
    async fn admit(
        &self,
        scope: EventScope,
        target: GuestTarget,
        attempt: CheckinAttempt,
    ) -> StoreResult<AdmissionOutcome>;
    async fn reverse(
        &self,
        scope: EventScope,
        guest_id: GuestId,
        operator: &OperatorIdentity,
        reason: &str,
    ) -> StoreResult<ReversalOutcome>;
}

#[async_trait]
pub trait PrizeRepository: Send + Sync {
    async fn list_prizes(&self, scope: EventScope) -> StoreResult<Vec<PrizeSummary>>;
    async fn get_prize(&self, scope: EventScope, id: PrizeId) -> StoreResult<PrizeSummary>;
    async fn create_prize(&self, scope: EventScope, input: PrizeInput) -> StoreResult<Prize>;
    async fn update_prize(&self, scope: EventScope, id: PrizeId, patch: PrizePatch) -> StoreResult<Prize>;
    async fn delete_prize(&self, scope: EventScope, id: PrizeId) -> StoreResult<Prize>;
    async fn draw_pool(&self, scope: EventScope, id: PrizeId) -> StoreResult<DrawPool>;
    /// Inserts a winner after re-checking remaining quantity and the guest's
    /// eligibility inside the same atomic unit.
    async fn record_winner(
        &self,
        scope: EventScope,
        prize_id: PrizeId,
        guest_id: GuestId,
    ) -> StoreResult<PrizeDrawResult>;
    async fn list_winners(&self, scope: EventScope, prize_id: PrizeId) -> StoreResult<Vec<PrizeWinnerView>>;
    async fn collect_prize(
        &self,
        scope: EventScope,
        winner_id: WinnerId,
        collected_by_name: &str,
    ) -> StoreResult<CollectOutcome>;
    async fn uncollect_prize(&self, scope: EventScope, winner_id: WinnerId) -> StoreResult<PrizeWinnerView>;
    async fn reset_prize(&self, scope: EventScope, prize_id: PrizeId) -> StoreResult<usize>;
}

#[async_trait]
pub trait SouvenirRepository: Send + Sync {
    async fn list_souvenirs(&self, scope: EventScope) -> StoreResult<Vec<SouvenirSummary>>;
    async fn get_souvenir(&self, scope: EventScope, id: SouvenirId) -> StoreResult<SouvenirSummary>;
    async fn create_souvenir(&self, scope: EventScope, input: SouvenirInput) -> StoreResult<Souvenir>;
    async fn update_souvenir(
        &self,
        scope: EventScope,
        id: SouvenirId,
        patch: SouvenirPatch,
    ) -> StoreResult<Souvenir>;
    async fn delete_souvenir(&self, scope: EventScope, id: SouvenirId) -> StoreResult<Souvenir>;
    /// Checks the check-in precondition, prior takes and remaining quantity
    /// inside the same atomic unit as the insert.
    async fn give_souvenir(
        &self,
        scope: EventScope,
        souvenir_id: SouvenirId,
        guest_id: GuestId,
        taken_by_name: Option<String>,
    ) -> StoreResult<GiveOutcome>;
    /// Creates the guest, admits it when the event requires check-in for
    /// souvenirs, and records the take. Nothing is written unless all three
    /// succeed.
    async fn give_to_new_guest(
        &self,
        scope: EventScope,
        souvenir_id: SouvenirId,
        input: GuestInput,
        attempt: CheckinAttempt,
        taken_by_name: Option<String>,
    ) -> StoreResult<WalkInGiven>;
    async fn remove_take(&self, scope: EventScope, take_id: TakeId) -> StoreResult<SouvenirTakeView>;
    async fn reset_souvenir(&self, scope: EventScope, id: SouvenirId) -> StoreResult<usize>;
    async fn guest_takes(&self, scope: EventScope, guest_id: GuestId) -> StoreResult<Vec<SouvenirTakeView>>;
}

#[async_trait]
pub trait OperatorRepository: Send + Sync {
    async fn find_account(&self, username: &str) -> StoreResult<Option<OperatorAccount>>;
    async fn get_account(&self, id: OperatorId) -> StoreResult<Option<OperatorAccount>>;
    async fn create_operator(
        &self,
        username: &str,
        display_name: &str,
        counter_name: Option<String>,
        password_hash: String,
    ) -> StoreResult<Operator>;
    async fn list_operators(&self) -> StoreResult<Vec<Operator>>;
}
