use std::sync::Arc;

use tokio::sync::broadcast::error::TryRecvError;

use backend_application::commands::{
    auth_commands,
    checkin_commands,
    event_commands,
    guest_commands,
    prize_commands,
    souvenir_commands,
};
use backend_application::dtos::{
    CheckinContext,
    CodeCheckinRequest,
    GiveSouvenirRequest,
    GiveToNewGuestRequest,
    LookupCheckinRequest,
    LookupOutcome,
    QrCheckinRequest,
    ScopedRequest,
    UncheckinRequest,
};
use backend_application::queries::{guest_queries, prize_queries, souvenir_queries};
use backend_application::{AppError, AppState, Metrics, RealtimeHub};
use backend_domain::{
    BroadcastKind,
    CredentialService,
    EventId,
    EventInput,
    EventRepository,
    EventScope,
    EventSettings,
    Guest,
    GuestId,
    GuestInput,
    GuestListQuery,
    GuestRepository,
    LoginRequest,
    OperatorIdentity,
    OperatorRepository,
    Prize,
    PrizeInput,
    RuntimeConfig,
    Souvenir,
    SouvenirInput,
};
use backend_infrastructure::{Argon2CredentialService, MemoryStore};

const PASSWORD: &str = "lead-pass-1";

fn app_state(store: Arc<MemoryStore>) -> AppState {
    let hub = Arc::new(RealtimeHub::new(64));
    AppState {
        config: RuntimeConfig {
            session_secret: "integration-test-secret".to_string(),
            ..RuntimeConfig::default()
        },
        event_repo: store.clone(),
        guest_repo: store.clone(),
        ledger: store.clone(),
        prize_repo: store.clone(),
        souvenir_repo: store.clone(),
        operator_repo: store,
        credentials: Arc::new(Argon2CredentialService),
        broadcaster: hub.clone(),
        hub,
        metrics: Arc::new(Metrics::default()),
    }
}

async fn setup(settings: EventSettings) -> (AppState, EventId) {
    let state = app_state(Arc::new(MemoryStore::in_memory()));
    let event = event_commands::create_event(
        &state,
        EventInput {
            name: "Annual Gala".to_string(),
            settings,
            ..EventInput::default()
        },
    )
    .await
    .expect("create event");
    event_commands::activate_event(&state, event.id)
        .await
        .expect("activate event");
    (state, event.id)
}

async fn add_guest(state: &AppState, code: &str, name: &str) -> Guest {
    guest_commands::create_guest(
        state,
        EventScope::active(),
        GuestInput {
            guest_code: Some(code.to_string()),
            name: name.to_string(),
            ..GuestInput::default()
        },
    )
    .await
    .expect("create guest")
}

async fn lead_operator(state: &AppState) -> OperatorIdentity {
    let hash = Argon2CredentialService
        .hash_password(PASSWORD)
        .expect("hash password");
    let operator = state
        .operator_repo
        .create_operator("lead", "Lead Desk", Some("Main".to_string()), hash)
        .await
        .expect("create operator");
    OperatorIdentity {
        id: operator.id,
        name: operator.display_name,
        counter_name: operator.counter_name,
    }
}

fn by_code(code: &str) -> CodeCheckinRequest {
    CodeCheckinRequest {
        code: code.to_string(),
        name: None,
        context: CheckinContext::default(),
    }
}

fn at_counter(counter: &str) -> CheckinContext {
    CheckinContext {
        event_id: None,
        counter_name: Some(counter.to_string()),
    }
}

async fn prize(state: &AppState, quantity: u32) -> Prize {
    prize_commands::create_prize(
        state,
        EventScope::active(),
        PrizeInput {
            name: "Grand prize".to_string(),
            quantity,
            ..PrizeInput::default()
        },
    )
    .await
    .expect("create prize")
}

async fn souvenir(state: &AppState, quantity: u32) -> Souvenir {
    souvenir_commands::create_souvenir(
        state,
        EventScope::active(),
        SouvenirInput {
            name: "Tote bag".to_string(),
            quantity,
            ..SouvenirInput::default()
        },
    )
    .await
    .expect("create souvenir")
}

async fn pool_ids(state: &AppState, prize: &Prize) -> Vec<GuestId> {
    prize_queries::eligible_pool(state, prize.id)
        .await
        .expect("eligible pool")
        .candidates
        .into_iter()
        .map(|guest| guest.id)
        .collect()
}

#[tokio::test]
async fn second_checkin_by_code_is_a_duplicate_with_history() {
    let (state, _) = setup(EventSettings::default()).await;
    add_guest(&state, "G001", "Ada Lovelace").await;

    let first = checkin_commands::checkin_by_code(&state, None, by_code("G001"))
        .await
        .expect("first check-in");
    assert!(first.guest.checked_in);
    assert!(!first.duplicate);
    assert_eq!(first.checkin_count, 1);
    assert_eq!(first.checkins.len(), 1);

    let second = checkin_commands::checkin_by_code(&state, None, by_code("g001"))
        .await
        .expect("second check-in");
    assert!(second.duplicate);
    assert_eq!(second.checkin_count, 1);
    assert!(second.message.as_deref().unwrap_or_default().contains("already checked in"));
    assert_eq!(state.metrics.duplicates(), 1);
}

#[tokio::test]
async fn sequential_repeats_write_one_record() {
    let (state, _) = setup(EventSettings::default()).await;
    let guest = add_guest(&state, "G001", "Ada").await;

    for attempt in 0..5 {
        let view = checkin_commands::checkin_by_guest_id(&state, None, guest.id, CheckinContext::default())
            .await
            .expect("check-in");
        assert_eq!(view.duplicate, attempt > 0);
        assert_eq!(view.checkin_count, 1);
    }
    let stats = state.event_repo.event_stats(EventScope::active()).await.expect("stats");
    assert_eq!(stats.checkin_records, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkins_admit_exactly_once() {
    let (state, _) = setup(EventSettings::default()).await;
    let guest_id = add_guest(&state, "G001", "Ada").await.id;

    let mut handles = Vec::new();
    for terminal in 0..16 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            checkin_commands::checkin_by_guest_id(
                &state,
                None,
                guest_id,
                at_counter(&format!("T{}", terminal)),
            )
            .await
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        let view = handle.await.expect("join").expect("check-in");
        if !view.duplicate {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 1);
    let stats = state.event_repo.event_stats(EventScope::active()).await.expect("stats");
    assert_eq!(stats.checkin_records, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_draws_never_exceed_quantity() {
    let (state, _) = setup(EventSettings::default()).await;
    for idx in 0..40 {
        let guest = add_guest(&state, &format!("G{:03}", idx), &format!("Guest {}", idx)).await;
        checkin_commands::checkin_by_guest_id(&state, None, guest.id, CheckinContext::default())
            .await
            .expect("check-in");
    }
    let prize = prize(&state, 3).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let state = state.clone();
        let prize_id = prize.id;
        handles.push(tokio::spawn(async move {
            prize_commands::draw_prize(&state, prize_id, ScopedRequest::default()).await
        }));
    }

    let (mut won, mut sold_out) = (0, 0);
    for handle in handles {
        match handle.await.expect("join") {
            Ok(_) => won += 1,
            Err(AppError::SoldOut(_)) => sold_out += 1,
            Err(other) => panic!("unexpected draw error: {other:?}"),
        }
    }
    assert_eq!((won, sold_out), (3, 7));
    let winners = prize_queries::list_winners(&state, prize.id).await.expect("winners");
    assert_eq!(winners.len(), 3);
    let mut guests: Vec<_> = winners.iter().map(|winner| winner.guest.id).collect();
    guests.dedup();
    assert_eq!(guests.len(), 3);
}

#[tokio::test]
async fn reversal_toggles_draw_eligibility() {
    let (state, _) = setup(EventSettings::default()).await;
    let lead = lead_operator(&state).await;
    let guest = add_guest(&state, "G001", "Ada").await;
    let prize = prize(&state, 1).await;

    checkin_commands::checkin_by_guest_id(&state, Some(&lead), guest.id, CheckinContext::default())
        .await
        .expect("check-in");
    assert_eq!(pool_ids(&state, &prize).await, vec![guest.id]);

    let reversed = checkin_commands::uncheckin(
        &state,
        &lead,
        guest.id,
        UncheckinRequest {
            password: PASSWORD.to_string(),
            reason: "scanned the wrong badge".to_string(),
            event_id: None,
        },
    )
    .await
    .expect("uncheck-in");
    assert!(!reversed.guest.checked_in);
    assert!(pool_ids(&state, &prize).await.is_empty());

    let again = checkin_commands::checkin_by_guest_id(&state, Some(&lead), guest.id, CheckinContext::default())
        .await
        .expect("re-check-in");
    assert!(!again.duplicate);
    assert_eq!(again.checkin_count, 2);
    assert!(again.already_checked_by_this_admin);
    assert_eq!(pool_ids(&state, &prize).await, vec![guest.id]);

    let detail = guest_queries::get_guest_detail(&state, Some(&lead), guest.id)
        .await
        .expect("detail");
    assert_eq!(detail.reversals.len(), 1);
    assert_eq!(detail.view.checkins.len(), 2);
}

#[tokio::test]
async fn reversal_rejects_bad_password_and_short_reason_without_writing() {
    let (state, _) = setup(EventSettings::default()).await;
    let lead = lead_operator(&state).await;
    let guest = add_guest(&state, "G001", "Ada").await;
    checkin_commands::checkin_by_guest_id(&state, Some(&lead), guest.id, CheckinContext::default())
        .await
        .expect("check-in");

    let wrong_password = checkin_commands::uncheckin(
        &state,
        &lead,
        guest.id,
        UncheckinRequest {
            password: "nope".to_string(),
            reason: "long enough reason".to_string(),
            event_id: None,
        },
    )
    .await;
    assert!(matches!(wrong_password, Err(AppError::Unauthorized(_))));

    let short_reason = checkin_commands::uncheckin(
        &state,
        &lead,
        guest.id,
        UncheckinRequest {
            password: PASSWORD.to_string(),
            reason: "oops".to_string(),
            event_id: None,
        },
    )
    .await;
    assert!(matches!(short_reason, Err(AppError::BadRequest(_))));

    let current = state
        .guest_repo
        .get_guest(EventScope::active(), guest.id)
        .await
        .expect("guest");
    assert!(current.checked_in);
    let stats = state.event_repo.event_stats(EventScope::active()).await.expect("stats");
    assert_eq!(stats.reversals, 0);
}

#[tokio::test]
async fn per_counter_policy_admits_each_counter_once() {
    let (state, _) = setup(EventSettings {
        allow_multiple_checkin_per_counter: true,
        ..EventSettings::default()
    })
    .await;
    let guest = add_guest(&state, "G001", "Ada").await;

    let a = checkin_commands::checkin_by_guest_id(&state, None, guest.id, at_counter("A"))
        .await
        .expect("counter A");
    let b = checkin_commands::checkin_by_guest_id(&state, None, guest.id, at_counter("B"))
        .await
        .expect("counter B");
    assert!(!a.duplicate && !b.duplicate);
    assert_eq!(b.checkin_count, 2);
    assert_eq!(b.guest.checked_in_at, a.guest.checked_in_at);

    let again = checkin_commands::checkin_by_guest_id(&state, None, guest.id, at_counter("A"))
        .await
        .expect("counter A again");
    assert!(again.duplicate);
    assert_eq!(again.checkin_count, 2);
}

#[tokio::test]
async fn single_prize_sells_out_after_one_draw() {
    let (state, _) = setup(EventSettings::default()).await;
    let a = add_guest(&state, "A", "Alice").await;
    let b = add_guest(&state, "B", "Bob").await;
    for guest in [&a, &b] {
        checkin_commands::checkin_by_guest_id(&state, None, guest.id, CheckinContext::default())
            .await
            .expect("check-in");
    }
    let prize = prize(&state, 1).await;
    let mut draws = state.hub.subscribe();

    let result = prize_commands::draw_prize(&state, prize.id, ScopedRequest::default())
        .await
        .expect("draw");
    assert!([a.id, b.id].contains(&result.winner.guest.id));
    assert_eq!(result.remaining, 0);
    let message = draws.recv().await.expect("prize_draw broadcast");
    assert_eq!(message.event, BroadcastKind::PrizeDraw);
    assert_eq!(message.payload["prizeId"], serde_json::json!(prize.id));

    let again = prize_commands::draw_prize(&state, prize.id, ScopedRequest::default()).await;
    assert!(matches!(again, Err(AppError::SoldOut(_))));
}

#[tokio::test]
async fn draw_with_nobody_checked_in_reports_empty_pool() {
    let (state, _) = setup(EventSettings::default()).await;
    add_guest(&state, "A", "Alice").await;
    let prize = prize(&state, 1).await;
    let result = prize_commands::draw_prize(&state, prize.id, ScopedRequest::default()).await;
    assert!(matches!(result, Err(AppError::NoEligibleGuests(_))));
}

#[tokio::test]
async fn souvenir_stock_and_repeat_takes() {
    let (state, _) = setup(EventSettings::default()).await;
    let lead = lead_operator(&state).await;
    let x = add_guest(&state, "X", "Xena").await;
    let y = add_guest(&state, "Y", "Yuri").await;
    let z = add_guest(&state, "Z", "Zoe").await;
    let bag = souvenir(&state, 2).await;
    let give = |guest_id| GiveSouvenirRequest {
        guest_id,
        event_id: None,
    };

    let first = souvenir_commands::give_souvenir(&state, &lead, bag.id, give(x.id))
        .await
        .expect("give X");
    assert_eq!(first.remaining, 1);

    match souvenir_commands::give_souvenir(&state, &lead, bag.id, give(x.id)).await {
        Err(AppError::AlreadyTaken { history, .. }) => {
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].souvenir_name, "Tote bag");
        }
        other => panic!("expected already taken, got {other:?}"),
    }

    let second = souvenir_commands::give_souvenir(&state, &lead, bag.id, give(y.id))
        .await
        .expect("give Y");
    assert_eq!(second.remaining, 0);

    let third = souvenir_commands::give_souvenir(&state, &lead, bag.id, give(z.id)).await;
    assert!(matches!(third, Err(AppError::SoldOut(_))));
}

fn walk_in(name: &str, event_id: Option<EventId>) -> GiveToNewGuestRequest {
    GiveToNewGuestRequest {
        guest: GuestInput {
            name: name.to_string(),
            ..GuestInput::default()
        },
        event_id,
    }
}

async fn guest_count(state: &AppState) -> usize {
    state
        .guest_repo
        .list_guests(EventScope::active(), GuestListQuery::default())
        .await
        .expect("list guests")
        .len()
}

#[tokio::test]
async fn walk_in_at_souvenir_desk_is_admitted_and_given() {
    let (state, _) = setup(EventSettings {
        require_checkin_for_souvenir: true,
        ..EventSettings::default()
    })
    .await;
    let lead = lead_operator(&state).await;
    let bag = souvenir(&state, 2).await;
    let mut messages = state.hub.subscribe();

    let created = souvenir_commands::give_to_new_guest(&state, &lead, bag.id, walk_in("Wanda", None))
        .await
        .expect("walk-in give");
    assert!(created.guest.checked_in);
    assert!(created.guest.souvenir_taken);
    assert_eq!(created.given.remaining, 1);

    let mut kinds = Vec::new();
    while let Ok(message) = messages.try_recv() {
        kinds.push(message.event);
    }
    assert_eq!(
        kinds,
        vec![
            BroadcastKind::GuestUpdate,
            BroadcastKind::Checkin,
            BroadcastKind::SouvenirGiven,
            BroadcastKind::GuestCreatedSouvenir,
        ]
    );
}

#[tokio::test]
async fn sold_out_walk_in_registers_nobody_and_stays_silent() {
    let (state, _) = setup(EventSettings {
        require_checkin_for_souvenir: true,
        ..EventSettings::default()
    })
    .await;
    let lead = lead_operator(&state).await;
    let x = add_guest(&state, "X", "Xena").await;
    checkin_commands::checkin_by_guest_id(&state, None, x.id, CheckinContext::default())
        .await
        .expect("check-in X");
    let bag = souvenir(&state, 1).await;
    souvenir_commands::give_souvenir(
        &state,
        &lead,
        bag.id,
        GiveSouvenirRequest {
            guest_id: x.id,
            event_id: None,
        },
    )
    .await
    .expect("give X");
    let before = guest_count(&state).await;
    let mut messages = state.hub.subscribe();

    let result = souvenir_commands::give_to_new_guest(&state, &lead, bag.id, walk_in("W1", None)).await;
    assert!(matches!(result, Err(AppError::SoldOut(_))));
    assert_eq!(guest_count(&state).await, before);
    assert!(matches!(messages.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn walk_in_for_a_replaced_event_fails_closed() {
    let (state, first_event) = setup(EventSettings::default()).await;
    let lead = lead_operator(&state).await;
    let bag = souvenir(&state, 5).await;
    let second = event_commands::create_event(
        &state,
        EventInput {
            name: "Second night".to_string(),
            settings: EventSettings {
                require_checkin_for_souvenir: true,
                ..EventSettings::default()
            },
            ..EventInput::default()
        },
    )
    .await
    .expect("create second event");
    event_commands::activate_event(&state, second.id)
        .await
        .expect("switch");

    let stale = souvenir_commands::give_to_new_guest(&state, &lead, bag.id, walk_in("Late", Some(first_event))).await;
    assert!(matches!(stale, Err(AppError::StaleEvent { .. })));
    assert_eq!(guest_count(&state).await, 0);

    let scoped = state
        .event_repo
        .scoped_event(EventScope::expecting(Some(first_event)))
        .await;
    assert!(scoped.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_gives_of_the_last_souvenir_hand_out_one() {
    let (state, _) = setup(EventSettings::default()).await;
    let lead = lead_operator(&state).await;
    let bag = souvenir(&state, 1).await;
    let mut guests = Vec::new();
    for idx in 0..8 {
        guests.push(add_guest(&state, &format!("S{:02}", idx), &format!("Guest {}", idx)).await);
    }

    let mut handles = Vec::new();
    for guest in &guests {
        let state = state.clone();
        let lead = lead.clone();
        let request = GiveSouvenirRequest {
            guest_id: guest.id,
            event_id: None,
        };
        handles.push(tokio::spawn(async move {
            souvenir_commands::give_souvenir(&state, &lead, bag.id, request).await
        }));
    }

    let (mut given, mut sold_out) = (0, 0);
    for handle in handles {
        match handle.await.expect("join") {
            Ok(_) => given += 1,
            Err(AppError::SoldOut(_)) => sold_out += 1,
            Err(other) => panic!("unexpected give error: {other:?}"),
        }
    }
    assert_eq!((given, sold_out), (1, guests.len() - 1));
    let summary = souvenir_queries::get_souvenir(&state, bag.id).await.expect("souvenir");
    assert_eq!((summary.taken, summary.remaining), (1, 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_guest_at_two_desks_takes_once() {
    let (state, _) = setup(EventSettings::default()).await;
    let lead = lead_operator(&state).await;
    let guest = add_guest(&state, "D1", "Dana").await;
    let bag = souvenir(&state, 10).await;

    let mut handles = Vec::new();
    for desk in ["Desk A", "Desk B"] {
        let state = state.clone();
        let operator = OperatorIdentity {
            counter_name: Some(desk.to_string()),
            ..lead.clone()
        };
        let request = GiveSouvenirRequest {
            guest_id: guest.id,
            event_id: None,
        };
        handles.push(tokio::spawn(async move {
            souvenir_commands::give_souvenir(&state, &operator, bag.id, request).await
        }));
    }

    let (mut given, mut already) = (0, 0);
    for handle in handles {
        match handle.await.expect("join") {
            Ok(_) => given += 1,
            Err(AppError::AlreadyTaken { history, .. }) => {
                assert_eq!(history.len(), 1);
                already += 1;
            }
            Err(other) => panic!("unexpected give error: {other:?}"),
        }
    }
    assert_eq!((given, already), (1, 1));
    let takes = souvenir_queries::guest_takes(&state, guest.id).await.expect("takes");
    assert_eq!(takes.len(), 1);
}

#[tokio::test]
async fn switching_events_broadcasts_and_fences_stale_writers() {
    let (state, first_event) = setup(EventSettings::default()).await;
    add_guest(&state, "G001", "Ada").await;
    let second = event_commands::create_event(
        &state,
        EventInput {
            name: "Second night".to_string(),
            ..EventInput::default()
        },
    )
    .await
    .expect("create second event");
    let mut messages = state.hub.subscribe();

    event_commands::activate_event(&state, second.id)
        .await
        .expect("switch");
    let change = messages.recv().await.expect("event_change broadcast");
    assert_eq!(change.event, BroadcastKind::EventChange);
    assert_eq!(change.payload["eventId"], serde_json::json!(second.id));
    assert_eq!(change.payload["previousEventId"], serde_json::json!(first_event));

    let stale = checkin_commands::checkin_by_code(
        &state,
        None,
        CodeCheckinRequest {
            code: "G001".to_string(),
            name: None,
            context: CheckinContext {
                event_id: Some(first_event),
                counter_name: None,
            },
        },
    )
    .await;
    assert!(matches!(stale, Err(AppError::StaleEvent { .. })));

    let refetched = guest_queries::list_guests(&state, GuestListQuery::default())
        .await
        .expect("refetch");
    assert!(refetched.is_empty());
}

#[tokio::test]
async fn unknown_code_with_name_is_created_when_enabled() {
    let (state, _) = setup(EventSettings {
        auto_create_guest: true,
        ..EventSettings::default()
    })
    .await;

    let view = checkin_commands::checkin_by_code(
        &state,
        None,
        CodeCheckinRequest {
            code: "WALK-1".to_string(),
            name: Some("Walk In".to_string()),
            context: CheckinContext::default(),
        },
    )
    .await
    .expect("auto-create check-in");
    assert!(view.guest.checked_in);
    assert_eq!(view.guest.name, "Walk In");

    let (strict, _) = setup(EventSettings::default()).await;
    let missing = checkin_commands::checkin_by_code(
        &strict,
        None,
        CodeCheckinRequest {
            code: "WALK-1".to_string(),
            name: Some("Walk In".to_string()),
            context: CheckinContext::default(),
        },
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn qr_urls_and_lookups_resolve_guests() {
    let (state, _) = setup(EventSettings::default()).await;
    add_guest(&state, "G001", "Ada Lovelace").await;
    add_guest(&state, "G002", "Ada Byron").await;
    add_guest(&state, "G003", "Grace Hopper").await;

    let scanned = checkin_commands::checkin_by_qr(
        &state,
        None,
        QrCheckinRequest {
            payload: "https://tickets.example.com/g/G003/?ref=mail".to_string(),
            context: CheckinContext::default(),
        },
    )
    .await
    .expect("qr check-in");
    assert_eq!(scanned.guest.guest_code, "G003");

    let ambiguous = checkin_commands::checkin_by_lookup(
        &state,
        None,
        LookupCheckinRequest {
            query: "ada".to_string(),
            context: CheckinContext::default(),
        },
    )
    .await
    .expect("lookup");
    match ambiguous {
        LookupOutcome::Multiple { candidates } => assert_eq!(candidates.len(), 2),
        LookupOutcome::Admitted { .. } => panic!("must not auto-pick among several guests"),
    }

    let single = checkin_commands::checkin_by_lookup(
        &state,
        None,
        LookupCheckinRequest {
            query: "byron".to_string(),
            context: CheckinContext::default(),
        },
    )
    .await
    .expect("lookup");
    assert!(matches!(single, LookupOutcome::Admitted { guest } if guest.guest.guest_code == "G002"));
}

#[tokio::test]
async fn login_issues_a_token_that_authenticates() {
    let (state, _) = setup(EventSettings::default()).await;
    let lead = lead_operator(&state).await;

    let response = auth_commands::login(
        &state,
        LoginRequest {
            username: "LEAD".to_string(),
            password: PASSWORD.to_string(),
        },
    )
    .await
    .expect("login");
    let identity = auth_commands::authenticate(&state, &response.token)
        .await
        .expect("authenticate");
    assert_eq!(identity, lead);

    let rejected = auth_commands::login(
        &state,
        LoginRequest {
            username: "lead".to_string(),
            password: "wrong".to_string(),
        },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::Unauthorized(_))));
}
