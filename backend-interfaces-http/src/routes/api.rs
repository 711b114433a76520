use axum::routing::{delete, get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{
    auth_handlers,
    checkin_handlers,
    display_handlers,
    event_handlers,
    guest_handlers,
    ops_handlers,
    prize_handlers,
    souvenir_handlers,
    stream_handlers,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/me", get(auth_handlers::whoami))
        .route(
            "/api/operators",
            get(auth_handlers::list_operators).post(auth_handlers::create_operator),
        )
        .route(
            "/api/events",
            get(event_handlers::list_events).post(event_handlers::create_event),
        )
        .route("/api/events/active", get(event_handlers::get_active_event))
        .route(
            "/api/events/:id",
            get(event_handlers::get_event)
                .put(event_handlers::update_event)
                .delete(event_handlers::delete_event),
        )
        .route("/api/events/:id/activate", post(event_handlers::activate_event))
        .route("/api/stats", get(event_handlers::dashboard_stats))
        .route("/api/checkin/code", post(checkin_handlers::checkin_by_code))
        .route("/api/checkin/qr", post(checkin_handlers::checkin_by_qr))
        .route("/api/checkin/lookup", post(checkin_handlers::checkin_by_lookup))
        .route("/api/checkin/guest/:id", post(checkin_handlers::checkin_by_guest_id))
        .route(
            "/api/guests",
            get(guest_handlers::list_guests)
                .post(guest_handlers::create_guest)
                .delete(guest_handlers::purge_guests),
        )
        .route("/api/guests/search", get(guest_handlers::search_guests))
        .route(
            "/api/guests/:id",
            get(guest_handlers::get_guest)
                .put(guest_handlers::update_guest)
                .delete(guest_handlers::delete_guest),
        )
        .route("/api/guests/:id/uncheckin", post(checkin_handlers::uncheckin))
        .route("/api/guests/:id/souvenirs", get(guest_handlers::guest_souvenirs))
        .route(
            "/api/prizes",
            get(prize_handlers::list_prizes).post(prize_handlers::create_prize),
        )
        .route(
            "/api/prizes/:id",
            get(prize_handlers::get_prize)
                .put(prize_handlers::update_prize)
                .delete(prize_handlers::delete_prize),
        )
        .route("/api/prizes/:id/draw", post(prize_handlers::draw_prize))
        .route("/api/prizes/:id/reset", post(prize_handlers::reset_prize))
        .route("/api/prizes/:id/winners", get(prize_handlers::list_winners))
        .route("/api/prizes/:id/eligible", get(prize_handlers::eligible_pool))
        .route("/api/winners/:id/collect", post(prize_handlers::collect_prize))
        .route("/api/winners/:id/uncollect", post(prize_handlers::uncollect_prize))
        .route(
            "/api/souvenirs",
            get(souvenir_handlers::list_souvenirs).post(souvenir_handlers::create_souvenir),
        )
        .route(
            "/api/souvenirs/:id",
            get(souvenir_handlers::get_souvenir)
                .put(souvenir_handlers::update_souvenir)
                .delete(souvenir_handlers::delete_souvenir),
        )
        .route("/api/souvenirs/:id/give", post(souvenir_handlers::give_souvenir))
        .route("/api/souvenirs/:id/give-new", post(souvenir_handlers::give_to_new_guest))
        .route("/api/souvenirs/:id/reset", post(souvenir_handlers::reset_souvenir))
        .route("/api/souvenir-takes/:id", delete(souvenir_handlers::remove_take))
        .route("/api/display/preview", post(display_handlers::publish_preview))
        .route("/api/stream", get(stream_handlers::stream_events))
        .route("/api/ws", get(stream_handlers::stream_ws))
        .route("/api/health/live", get(ops_handlers::health_live))
        .route("/api/health/ready", get(ops_handlers::health_ready))
        .route("/api/metrics/prometheus", get(ops_handlers::metrics_prometheus))
        .with_state(state)
}
