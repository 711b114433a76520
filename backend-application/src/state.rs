use std::sync::Arc;

use backend_domain::ports::{
    Broadcaster,
    CheckinLedger,
    CredentialService,
    EventRepository,
    GuestRepository,
    OperatorRepository,
    PrizeRepository,
    SouvenirRepository,
};
use backend_domain::RuntimeConfig;

use crate::{Metrics, RealtimeHub};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub event_repo: Arc<dyn EventRepository>,
    pub guest_repo: Arc<dyn GuestRepository>,
    pub ledger: Arc<dyn CheckinLedger>,
    pub prize_repo: Arc<dyn PrizeRepository>,
    pub souvenir_repo: Arc<dyn SouvenirRepository>,
    pub operator_repo: Arc<dyn OperatorRepository>,
    pub credentials: Arc<dyn CredentialService>,
    /// Where commands publish. Usually the same object as `hub`.
    pub broadcaster: Arc<dyn Broadcaster>,
    /// Where push transports subscribe.
    pub hub: Arc<RealtimeHub>,
    pub metrics: Arc<Metrics>,
}
