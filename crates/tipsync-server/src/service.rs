use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tipsync_protocol::{ParseEvent, Response};
use tipsync_store::AccountResolver;
use tipsync_sync::{SyncContext, SyncPolicy, SyncResult, SyncSession};
use tipsync_types::Principal;
use tracing::{info, info_span, Span};
use uuid::Uuid;

/// Opens sync sessions against a shared set of accounts.
pub struct SyncService {
    accounts: Arc<dyn AccountResolver>,
    policy: SyncPolicy,
    sessions_opened: AtomicU64,
}

impl SyncService {
    pub fn new(accounts: Arc<dyn AccountResolver>, policy: SyncPolicy) -> Self {
        Self {
            accounts,
            policy,
            sessions_opened: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    pub fn sessions_opened(&self) -> u64 {
        self.sessions_opened.load(Ordering::Relaxed)
    }

    /// Start a session for an authenticated connection.
    pub fn open_session(&self, principal: Principal) -> HostedSession {
        let id = Uuid::now_v7();
        let span = info_span!("sync_session", %id, principal = %principal.label());
        span.in_scope(|| info!("session opened"));
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);

        let context = SyncContext::new(principal, Arc::clone(&self.accounts), self.policy.clone());
        HostedSession {
            id,
            span,
            session: SyncSession::new(context),
        }
    }
}

/// A [`SyncSession`] bound to its connection's id and tracing span.
pub struct HostedSession {
    id: Uuid,
    span: Span,
    session: SyncSession,
}

impl HostedSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn principal(&self) -> &Principal {
        self.session.context().principal()
    }

    pub fn handle_event(&mut self, event: ParseEvent) -> SyncResult<()> {
        let _entered = self.span.enter();
        self.session.handle_event(event)
    }

    pub fn handle_events(&mut self, events: impl IntoIterator<Item = ParseEvent>) -> SyncResult<()> {
        let _entered = self.span.enter();
        self.session.handle_events(events)
    }

    pub fn drain_responses(&mut self) -> Vec<Response> {
        self.session.drain_responses()
    }
}
