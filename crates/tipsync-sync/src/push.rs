use std::sync::Arc;

use tipsync_protocol::{
    attributes, elements, messages, Element, OutStanza, ProtocolError, Response, ResponseSink,
};
use tipsync_store::RepositoryPort;
use tipsync_types::{BranchRef, Tip, TipRef};
use tracing::{debug, error, info, warn};

use crate::collector::PayloadCollector;
use crate::context::SyncContext;
use crate::error::{SyncError, SyncResult};
use crate::guard::AccessGuard;

/// A push in flight, assembled from the `sync_push` header and its `pack`
/// child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushRequest {
    pub target: BranchRef,
    pub start_tip: TipRef,
    pub last_tip: TipRef,
    pub pack: Option<Vec<u8>>,
}

impl PushRequest {
    fn from_header(element: &Element) -> SyncResult<Self> {
        let branch = element.require(attributes::BRANCH)?;
        let start = element.require(attributes::START_COMMIT)?;
        let last = element.require(attributes::LAST_COMMIT)?;
        let account_user = element.require(attributes::SERVER_USER)?;
        Ok(Self {
            target: BranchRef::new(account_user, branch),
            start_tip: TipRef::parse(start),
            last_tip: TipRef::parse(last),
            pack: None,
        })
    }
}

/// Why a finalized push was refused. Each variant maps to one literal error
/// message on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushFailure {
    AccessDenied,
    NoSuchBranch,
    ImportFailed,
}

impl PushFailure {
    pub fn message(&self) -> &'static str {
        match self {
            Self::AccessDenied => messages::PUSH_ACCESS_DENIED,
            Self::NoSuchBranch => messages::PUSH_NO_SUCH_BRANCH,
            Self::ImportFailed => messages::PUSH_IMPORT_FAILED,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Applied { tip: Tip },
    Failed(PushFailure),
}

#[derive(Debug)]
enum PushState {
    AwaitingHeader,
    AwaitingPayload {
        request: PushRequest,
        collector: PayloadCollector,
        payload_error: Option<ProtocolError>,
    },
    Finalized,
    Rejected,
}

impl PushState {
    fn name(&self) -> &'static str {
        match self {
            Self::AwaitingHeader => "awaiting-header",
            Self::AwaitingPayload { .. } => "awaiting-payload",
            Self::Finalized => "finalized",
            Self::Rejected => "rejected",
        }
    }
}

/// State machine for one `sync_push` exchange.
///
/// `AwaitingHeader` → `AwaitingPayload` on [`header`](Self::header), then
/// `Finalized` on [`finish`](Self::finish), which the session calls once the
/// enclosing `sync_push` element has been fully parsed. A header with a
/// missing attribute moves to the terminal `Rejected` state and produces no
/// response.
pub struct PushCoordinator {
    context: Arc<SyncContext>,
    state: PushState,
}

impl PushCoordinator {
    pub fn new(context: Arc<SyncContext>) -> Self {
        Self {
            context,
            state: PushState::AwaitingHeader,
        }
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn request(&self) -> Option<&PushRequest> {
        match &self.state {
            PushState::AwaitingPayload { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn header(&mut self, element: &Element) -> SyncResult<()> {
        if !matches!(self.state, PushState::AwaitingHeader) {
            return Err(self.unexpected("header"));
        }
        match PushRequest::from_header(element) {
            Ok(request) => {
                debug!(branch_ref = %request.target, "push header accepted");
                self.state = PushState::AwaitingPayload {
                    request,
                    collector: PayloadCollector::new(self.context.policy().max_payload_size),
                    payload_error: None,
                };
                Ok(())
            }
            Err(e) => {
                self.state = PushState::Rejected;
                Err(e)
            }
        }
    }

    /// A `pack` child opened. Returns `false` if it will be ignored.
    pub fn payload_start(&mut self) -> bool {
        match &mut self.state {
            PushState::AwaitingPayload { collector, .. } => {
                let accepted = collector.begin();
                if !accepted {
                    debug!("ignoring additional pack element");
                }
                accepted
            }
            _ => false,
        }
    }

    pub fn payload_text(&mut self, text: &str) {
        if let PushState::AwaitingPayload { collector, .. } = &mut self.state {
            collector.push_text(text);
        }
    }

    pub fn payload_end(&mut self) {
        if let PushState::AwaitingPayload {
            request,
            collector,
            payload_error,
        } = &mut self.state
        {
            match collector.end() {
                Some(Ok(pack)) => request.pack = Some(pack),
                Some(Err(e)) => *payload_error = Some(e),
                None => {}
            }
        }
    }

    /// Run the push. Writes exactly one response to `sink` the first time it
    /// is called after a successful header; later calls fail with
    /// [`SyncError::AlreadyFinalized`] and write nothing.
    pub fn finish(&mut self, sink: &mut dyn ResponseSink) -> SyncResult<PushOutcome> {
        match std::mem::replace(&mut self.state, PushState::Finalized) {
            PushState::AwaitingPayload {
                request,
                payload_error,
                ..
            } => Ok(self.finalize(request, payload_error, sink)),
            PushState::Finalized => Err(SyncError::AlreadyFinalized),
            other => {
                self.state = other;
                Err(self.unexpected("finish"))
            }
        }
    }

    fn finalize(
        &self,
        request: PushRequest,
        payload_error: Option<ProtocolError>,
        sink: &mut dyn ResponseSink,
    ) -> PushOutcome {
        let target = &request.target;
        let principal = self.context.principal();

        if !AccessGuard::can_access(principal, target) {
            debug!(branch_ref = %target, principal = %principal.label(), "push denied");
            return reject(sink, PushFailure::AccessDenied);
        }

        let Some(repository) = self.context.accounts().repository(target.account_user()) else {
            debug!(branch_ref = %target, "push to unknown account");
            return reject(sink, PushFailure::NoSuchBranch);
        };

        if let Some(e) = payload_error {
            warn!(branch_ref = %target, error = %e, "unusable push payload");
            return reject(sink, PushFailure::ImportFailed);
        }

        if self.context.policy().verify_start_tip && !start_tip_current(repository.as_ref(), &request)
        {
            return reject(sink, PushFailure::ImportFailed);
        }

        let pack = request.pack.as_deref().unwrap_or_default();
        if let Err(e) =
            repository.import_pack(target.branch(), pack, &request.start_tip, &request.last_tip)
        {
            warn!(branch_ref = %target, start = %request.start_tip, last = %request.last_tip, error = %e, "pack import failed");
            return reject(sink, PushFailure::ImportFailed);
        }

        let tip = match repository.tip(target.branch()) {
            Ok(tip) => tip,
            Err(e) => {
                error!(branch_ref = %target, error = %e, "tip unreadable after import");
                return reject(sink, PushFailure::ImportFailed);
            }
        };
        let tip_hex = tip.to_hex();

        if !principal.is_account_owner(target.account_user()) {
            self.notify_owner(target, &tip_hex);
        }

        sink.push(Response::Result(vec![OutStanza::new(elements::SYNC_PUSH)
            .attr(attributes::BRANCH, target.branch())
            .attr(attributes::TIP, tip_hex)]));
        info!(branch_ref = %target, %tip, pack_len = pack.len(), "push applied");
        PushOutcome::Applied { tip }
    }

    /// Tell the account owner's other sessions about the new tip.
    fn notify_owner(&self, target: &BranchRef, tip_hex: &str) {
        let Some(mailbox) = self.context.accounts().mailbox(target.account_user()) else {
            debug!(branch_ref = %target, "account has no mailbox, skipping tip notification");
            return;
        };
        match mailbox.update_channel_tip(target.branch(), tip_hex) {
            Ok(true) => {
                if let Err(e) = mailbox.commit() {
                    warn!(branch_ref = %target, error = %e, "mailbox commit failed");
                }
            }
            Ok(false) => debug!(branch_ref = %target, "channel tip unchanged"),
            Err(e) => warn!(branch_ref = %target, error = %e, "channel tip update failed"),
        }
    }

    fn unexpected(&self, event: &'static str) -> SyncError {
        SyncError::UnexpectedEvent {
            event,
            state: self.state.name(),
        }
    }
}

/// Whether the branch still sits at the push's `start_commit`. Opaque start
/// references cannot be compared and pass.
fn start_tip_current(repository: &dyn RepositoryPort, request: &PushRequest) -> bool {
    let Some(expected) = request.start_tip.tip() else {
        return true;
    };
    match repository.tip(request.target.branch()) {
        Ok(current) if current == *expected => true,
        Ok(current) => {
            warn!(branch_ref = %request.target, %expected, %current, "branch moved since push started");
            false
        }
        Err(e) => {
            warn!(branch_ref = %request.target, error = %e, "cannot read tip before import");
            false
        }
    }
}

fn reject(sink: &mut dyn ResponseSink, failure: PushFailure) -> PushOutcome {
    sink.push(Response::error(failure.message()));
    PushOutcome::Failed(failure)
}
