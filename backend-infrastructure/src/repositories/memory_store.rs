use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::repositories::store::StoreState;
use backend_domain::{
    AdmissionOutcome,
    CheckinAttempt,
    CheckinLedger,
    CollectOutcome,
    DrawPool,
    Event,
    EventActivation,
    EventId,
    EventInput,
    EventPatch,
    EventRepository,
    EventScope,
    EventStats,
    GiveOutcome,
    Guest,
    GuestId,
    GuestInput,
    GuestLedger,
    GuestListQuery,
    GuestPatch,
    GuestRepository,
    GuestTarget,
    Operator,
    OperatorAccount,
    OperatorId,
    OperatorIdentity,
    OperatorRepository,
    Prize,
    PrizeDrawResult,
    PrizeId,
    PrizeInput,
    PrizePatch,
    PrizeRepository,
    PrizeSummary,
    PrizeWinnerView,
    ReversalOutcome,
    Souvenir,
    SouvenirId,
    SouvenirInput,
    SouvenirPatch,
    SouvenirRepository,
    SouvenirSummary,
    SouvenirTakeView,
    StoreError,
    StoreResult,
    TakeId,
    WalkInGiven,
    WinnerId,
};

/// Transactional store for every repository port. One lock serializes each
/// read-decide-write unit; with a snapshot path every committed unit is
/// written to disk before it becomes visible.
pub struct MemoryStore {
    state: Mutex<StoreState>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            snapshot_path: None,
        }
    }

    /// Loads the snapshot at `path` when present, else starts empty.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if fs::try_exists(&path).await.unwrap_or(false) {
            let content = fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read snapshot {}", path.display()))?;
            let state: StoreState = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
            info!(
                path = %path.display(),
                events = state.events.len(),
                guests = state.guests.len(),
                "snapshot loaded"
            );
            state
        } else {
            info!(path = %path.display(), "no snapshot yet, starting empty");
            StoreState::default()
        };
        Ok(Self {
            state: Mutex::new(state),
            snapshot_path: Some(path),
        })
    }

    async fn read<T>(&self, f: impl FnOnce(&StoreState) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self.state.lock().await;
        f(&guard)
    }

    /// Runs one atomic unit. With persistence the unit runs on a draft and is
    /// committed only after the snapshot write succeeded.
    async fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> StoreResult<T>) -> StoreResult<T> {
        let mut guard = self.state.lock().await;
        let Some(path) = &self.snapshot_path else {
            return f(&mut guard);
        };
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        if let Err(err) = persist(path, &draft).await {
            error!(path = %path.display(), "snapshot write failed, change discarded: {:#}", err);
            return Err(StoreError::Internal(err));
        }
        *guard = draft;
        Ok(out)
    }

    /// Seeds or refreshes a roster operator.
    pub async fn upsert_operator(
        &self,
        username: &str,
        display_name: &str,
        counter_name: Option<String>,
        password_hash: String,
    ) -> StoreResult<Operator> {
        self.write(|state| {
            Ok(state.upsert_operator(username, display_name, counter_name, password_hash))
        })
        .await
    }
}

async fn persist(path: &Path, state: &StoreState) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    let content = serde_json::to_vec(state)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        self.read(|state| Ok(state.list_events())).await
    }

    async fn get_event(&self, id: EventId) -> StoreResult<Event> {
        self.read(|state| state.get_event(id)).await
    }

    async fn active_event(&self) -> StoreResult<Option<Event>> {
        self.read(|state| Ok(state.active_event())).await
    }

    async fn scoped_event(&self, scope: EventScope) -> StoreResult<Event> {
        self.read(|state| state.resolve_scope(scope).cloned()).await
    }

    async fn create_event(&self, input: EventInput) -> StoreResult<Event> {
        self.write(|state| state.create_event(input)).await
    }

    async fn update_event(&self, id: EventId, patch: EventPatch) -> StoreResult<Event> {
        self.write(|state| state.update_event(id, patch)).await
    }

    async fn delete_event(&self, id: EventId) -> StoreResult<Event> {
        self.write(|state| state.delete_event(id)).await
    }

    async fn activate_event(&self, id: EventId) -> StoreResult<EventActivation> {
        self.write(|state| state.activate_event(id)).await
    }

    async fn event_stats(&self, scope: EventScope) -> StoreResult<EventStats> {
        self.read(|state| state.event_stats(scope)).await
    }

    async fn ping(&self) -> Result<()> {
        let _guard = self.state.lock().await;
        if let Some(path) = &self.snapshot_path {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::metadata(parent)
                    .await
                    .with_context(|| format!("snapshot directory {} unavailable", parent.display()))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GuestRepository for MemoryStore {
    async fn create_guest(&self, scope: EventScope, input: GuestInput) -> StoreResult<Guest> {
        self.write(|state| state.create_guest(scope, input)).await
    }

    async fn update_guest(&self, scope: EventScope, id: GuestId, patch: GuestPatch) -> StoreResult<Guest> {
        self.write(|state| state.update_guest(scope, id, patch)).await
    }

    async fn delete_guest(&self, scope: EventScope, id: GuestId) -> StoreResult<Guest> {
        self.write(|state| state.delete_guest(scope, id)).await
    }

    async fn purge_guests(&self, scope: EventScope) -> StoreResult<usize> {
        self.write(|state| state.purge_guests(scope)).await
    }

    async fn get_guest(&self, scope: EventScope, id: GuestId) -> StoreResult<Guest> {
        self.read(|state| state.get_guest(scope, id)).await
    }

    async fn list_guests(&self, scope: EventScope, query: GuestListQuery) -> StoreResult<Vec<Guest>> {
        self.read(|state| state.list_guests(scope, query)).await
    }

    async fn search_guests(&self, scope: EventScope, query: &str, limit: usize) -> StoreResult<Vec<Guest>> {
        self.read(|state| state.search_guests(scope, query, limit)).await
    }

    async fn guest_ledger(&self, scope: EventScope, id: GuestId) -> StoreResult<GuestLedger> {
        self.read(|state| state.guest_ledger(scope, id)).await
    }
}

#[async_trait]
impl CheckinLedger for MemoryStore {
    async fn admit(
        &self,
        scope: EventScope,
        target: GuestTarget,
        attempt: CheckinAttempt,
    ) -> StoreResult<AdmissionOutcome> {
        self.write(|state| state.admit(scope, target, attempt)).await
    }

    async fn reverse(
        &self,
        scope: EventScope,
        guest_id: GuestId,
        operator: &OperatorIdentity,
        reason: &str,
    ) -> StoreResult<ReversalOutcome> {
        self.write(|state| state.reverse(scope, guest_id, operator, reason))
            .await
    }
}

#[async_trait]
impl PrizeRepository for MemoryStore {
    async fn list_prizes(&self, scope: EventScope) -> StoreResult<Vec<PrizeSummary>> {
        self.read(|state| state.list_prizes(scope)).await
    }

    async fn get_prize(&self, scope: EventScope, id: PrizeId) -> StoreResult<PrizeSummary> {
        self.read(|state| state.get_prize(scope, id)).await
    }

    async fn create_prize(&self, scope: EventScope, input: PrizeInput) -> StoreResult<Prize> {
        self.write(|state| state.create_prize(scope, input)).await
    }

    async fn update_prize(&self, scope: EventScope, id: PrizeId, patch: PrizePatch) -> StoreResult<Prize> {
        self.write(|state| state.update_prize(scope, id, patch)).await
    }

    async fn delete_prize(&self, scope: EventScope, id: PrizeId) -> StoreResult<Prize> {
        self.write(|state| state.delete_prize(scope, id)).await
    }

    async fn draw_pool(&self, scope: EventScope, id: PrizeId) -> StoreResult<DrawPool> {
        self.read(|state| state.draw_pool(scope, id)).await
    }

    async fn record_winner(
        &self,
        scope: EventScope,
        prize_id: PrizeId,
        guest_id: GuestId,
    ) -> StoreResult<PrizeDrawResult> {
        self.write(|state| state.record_winner(scope, prize_id, guest_id))
            .await
    }

    async fn list_winners(&self, scope: EventScope, prize_id: PrizeId) -> StoreResult<Vec<PrizeWinnerView>> {
        self.read(|state| state.list_winners(scope, prize_id)).await
    }

    async fn collect_prize(
        &self,
        scope: EventScope,
        winner_id: WinnerId,
        collected_by_name: &str,
    ) -> StoreResult<CollectOutcome> {
        self.write(|state| state.collect_prize(scope, winner_id, collected_by_name))
            .await
    }

    async fn uncollect_prize(&self, scope: EventScope, winner_id: WinnerId) -> StoreResult<PrizeWinnerView> {
        self.write(|state| state.uncollect_prize(scope, winner_id)).await
    }

    async fn reset_prize(&self, scope: EventScope, prize_id: PrizeId) -> StoreResult<usize> {
        self.write(|state| state.reset_prize(scope, prize_id)).await
    }
}

#[async_trait]
impl SouvenirRepository for MemoryStore {
    async fn list_souvenirs(&self, scope: EventScope) -> StoreResult<Vec<SouvenirSummary>> {
        self.read(|state| state.list_souvenirs(scope)).await
    }

    async fn get_souvenir(&self, scope: EventScope, id: SouvenirId) -> StoreResult<SouvenirSummary> {
        self.read(|state| state.get_souvenir(scope, id)).await
    }

    async fn create_souvenir(&self, scope: EventScope, input: SouvenirInput) -> StoreResult<Souvenir> {
        self.write(|state| state.create_souvenir(scope, input)).await
    }

    async fn update_souvenir(
        &self,
        scope: EventScope,
        id: SouvenirId,
        patch: SouvenirPatch,
    ) -> StoreResult<Souvenir> {
        self.write(|state| state.update_souvenir(scope, id, patch)).await
    }

    async fn delete_souvenir(&self, scope: EventScope, id: SouvenirId) -> StoreResult<Souvenir> {
        self.write(|state| state.delete_souvenir(scope, id)).await
    }

    async fn give_souvenir(
        &self,
        scope: EventScope,
        souvenir_id: SouvenirId,
        guest_id: GuestId,
        taken_by_name: Option<String>,
    ) -> StoreResult<GiveOutcome> {
        self.write(|state| state.give_souvenir(scope, souvenir_id, guest_id, taken_by_name))
            .await
    }

    async fn give_to_new_guest(
        &self,
        scope: EventScope,
        souvenir_id: SouvenirId,
        input: GuestInput,
        attempt: CheckinAttempt,
        taken_by_name: Option<String>,
    ) -> StoreResult<WalkInGiven> {
        self.write(|state| state.give_to_new_guest(scope, souvenir_id, input, attempt, taken_by_name))
            .await
    }

    async fn remove_take(&self, scope: EventScope, take_id: TakeId) -> StoreResult<SouvenirTakeView> {
        self.write(|state| state.remove_take(scope, take_id)).await
    }

    async fn reset_souvenir(&self, scope: EventScope, id: SouvenirId) -> StoreResult<usize> {
        self.write(|state| state.reset_souvenir(scope, id)).await
    }

    async fn guest_takes(&self, scope: EventScope, guest_id: GuestId) -> StoreResult<Vec<SouvenirTakeView>> {
        self.read(|state| state.guest_takes(scope, guest_id)).await
    }
}

#[async_trait]
impl OperatorRepository for MemoryStore {
    async fn find_account(&self, username: &str) -> StoreResult<Option<OperatorAccount>> {
        self.read(|state| Ok(state.find_account(username))).await
    }

    async fn get_account(&self, id: OperatorId) -> StoreResult<Option<OperatorAccount>> {
        self.read(|state| Ok(state.get_account(id))).await
    }

    async fn create_operator(
        &self,
        username: &str,
        display_name: &str,
        counter_name: Option<String>,
        password_hash: String,
    ) -> StoreResult<Operator> {
        self.write(|state| state.create_operator(username, display_name, counter_name, password_hash))
            .await
    }

    async fn list_operators(&self) -> StoreResult<Vec<Operator>> {
        self.read(|state| Ok(state.list_operators())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::EventSettings;

    async fn seeded(store: &MemoryStore) -> EventId {
        let event = store
            .create_event(EventInput {
                name: "Gala".to_string(),
                settings: EventSettings::default(),
                ..EventInput::default()
            })
            .await
            .expect("create event");
        store.activate_event(event.id).await.expect("activate");
        event.id
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data").join("checkin.json");

        let store = MemoryStore::open(&path).await.expect("open");
        let event_id = seeded(&store).await;
        store
            .create_guest(
                EventScope::active(),
                GuestInput {
                    guest_code: Some("G001".to_string()),
                    name: "Ada".to_string(),
                    ..GuestInput::default()
                },
            )
            .await
            .expect("create guest");
        drop(store);

        let reopened = MemoryStore::open(&path).await.expect("reopen");
        let active = reopened.active_event().await.expect("active");
        assert_eq!(active.map(|event| event.id), Some(event_id));
        let guests = reopened
            .list_guests(EventScope::active(), GuestListQuery::default())
            .await
            .expect("list");
        assert_eq!(guests.len(), 1);
        assert_eq!(guests[0].guest_code, "G001");
    }

    #[tokio::test]
    async fn failed_unit_leaves_no_trace() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = MemoryStore::open(dir.path().join("checkin.json"))
            .await
            .expect("open");
        seeded(&store).await;

        let err = store
            .admit(
                EventScope::active(),
                GuestTarget::Code("missing".to_string()),
                CheckinAttempt::default(),
            )
            .await
            .expect_err("unknown guest");
        assert!(matches!(err, StoreError::NotFound { .. }));
        let stats = store.event_stats(EventScope::active()).await.expect("stats");
        assert_eq!(stats.checkin_records, 0);
    }
}
