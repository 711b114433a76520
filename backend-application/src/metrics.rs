use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    checkins: AtomicU64,
    duplicate_checkins: AtomicU64,
    reversals: AtomicU64,
    prize_draws: AtomicU64,
    sold_out: AtomicU64,
    souvenirs_given: AtomicU64,
    broadcasts: AtomicU64,
}

impl Metrics {
    pub fn record_checkin(&self) {
        self.checkins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicate_checkins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reversal(&self) {
        self.reversals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_draw(&self) {
        self.prize_draws.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sold_out(&self) {
        self.sold_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_souvenir(&self) {
        self.souvenirs_given.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn checkins(&self) -> u64 {
        self.checkins.load(Ordering::Relaxed)
    }

    pub fn duplicates(&self) -> u64 {
        self.duplicate_checkins.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self, stream_clients: usize) -> String {
        let checkins = self.checkins.load(Ordering::Relaxed);
        let duplicates = self.duplicate_checkins.load(Ordering::Relaxed);
        let reversals = self.reversals.load(Ordering::Relaxed);
        let draws = self.prize_draws.load(Ordering::Relaxed);
        let sold_out = self.sold_out.load(Ordering::Relaxed);
        let souvenirs = self.souvenirs_given.load(Ordering::Relaxed);
        let broadcasts = self.broadcasts.load(Ordering::Relaxed);

        format!(
            "# TYPE checkin_admissions_total counter\n\
checkin_admissions_total {}\n\
# TYPE checkin_duplicates_total counter\n\
checkin_duplicates_total {}\n\
# TYPE checkin_reversals_total counter\n\
checkin_reversals_total {}\n\
# TYPE checkin_prize_draws_total counter\n\
checkin_prize_draws_total {}\n\
# TYPE checkin_sold_out_total counter\n\
checkin_sold_out_total {}\n\
# TYPE checkin_souvenirs_given_total counter\n\
checkin_souvenirs_given_total {}\n\
# TYPE checkin_broadcasts_total counter\n\
checkin_broadcasts_total {}\n\
# TYPE checkin_stream_clients gauge\n\
checkin_stream_clients {}\n",
            checkins, duplicates, reversals, draws, sold_out, souvenirs, broadcasts, stream_clients
        )
    }
}
