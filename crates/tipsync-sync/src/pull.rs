use std::sync::Arc;

use tipsync_protocol::{attributes, elements, encode_pack, Element, OutStanza, Response, ResponseSink};
use tipsync_store::{Depth, RepositoryPort, RepositoryResult};
use tipsync_types::{BranchRef, Tip, TipRef};
use tracing::{debug, info, warn};

use crate::context::SyncContext;
use crate::error::{SyncError, SyncResult};
use crate::guard::AccessGuard;

/// What a served pull sent back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PullOutcome {
    /// The export succeeded.
    Served { tip: Tip, pack_len: usize },
    /// The export failed; the client got an empty tip and an empty pack and
    /// is expected to fall back to a full resync.
    Degraded { reason: String },
}

/// Handles a single `sync_pull` stanza end to end.
pub struct PullCoordinator {
    context: Arc<SyncContext>,
}

impl PullCoordinator {
    pub fn new(context: Arc<SyncContext>) -> Self {
        Self { context }
    }

    /// Serve a pull. On `Err` nothing was written to `sink`.
    pub fn handle(&self, element: &Element, sink: &mut dyn ResponseSink) -> SyncResult<PullOutcome> {
        let branch = element.require(attributes::BRANCH)?;
        let account_user = element.require(attributes::SERVER_USER)?;
        let base = element.require(attributes::BASE)?;

        let target = BranchRef::new(account_user, branch);
        let principal = self.context.principal();
        if !AccessGuard::can_access(principal, &target) {
            debug!(branch_ref = %target, principal = %principal.label(), "pull denied");
            return Err(SyncError::Unauthorized {
                target: target.to_string(),
                principal: principal.label(),
            });
        }

        let repository = self
            .context
            .accounts()
            .repository(account_user)
            .ok_or_else(|| SyncError::UnknownAccount(account_user.to_string()))?;

        let base = TipRef::parse(base);
        let depth = self.context.policy().export_depth;
        let (tip, pack, outcome) = match export(repository.as_ref(), branch, &base, depth) {
            Ok((tip, pack)) => {
                let outcome = PullOutcome::Served {
                    tip,
                    pack_len: pack.len(),
                };
                (tip, pack, outcome)
            }
            Err(e) => {
                warn!(branch_ref = %target, %base, error = %e, "export failed, answering with empty tip");
                (Tip::Empty, Vec::new(), PullOutcome::Degraded { reason: e.to_string() })
            }
        };

        sink.push(Response::Result(vec![
            OutStanza::new(elements::SYNC_PULL)
                .attr(attributes::BRANCH, branch)
                .attr(attributes::BASE, base.echo_hex())
                .attr(attributes::TIP, tip.to_hex()),
            OutStanza::new(elements::PACK).text(encode_pack(&pack)),
        ]));
        info!(branch_ref = %target, %tip, pack_len = pack.len(), "pull served");
        Ok(outcome)
    }
}

fn export(
    repository: &dyn RepositoryPort,
    branch: &str,
    base: &TipRef,
    depth: Depth,
) -> RepositoryResult<(Tip, Vec<u8>)> {
    let tip = repository.tip(branch)?;
    let pack = repository.export_pack(branch, base, &tip, depth)?;
    Ok((tip, pack))
}
