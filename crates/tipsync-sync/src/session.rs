use std::sync::Arc;

use tipsync_protocol::{elements, Element, ParseEvent, Response, ResponseQueue};
use tracing::debug;

use crate::context::SyncContext;
use crate::error::{SyncError, SyncResult};
use crate::pull::PullCoordinator;
use crate::push::PushCoordinator;

/// Routes the parse events of one connection to the sync coordinators.
///
/// Top-level elements are dispatched by name. A `sync_pull` is served as soon
/// as its start tag arrives. A `sync_push` gets its own [`PushCoordinator`];
/// the `pack` child is fed to its payload collector and the closing
/// `sync_push` tag finalizes it. Responses collect in a [`ResponseQueue`]
/// until the transport drains them.
pub struct SyncSession {
    context: Arc<SyncContext>,
    depth: usize,
    push: Option<PushCoordinator>,
    responses: ResponseQueue,
}

impl SyncSession {
    pub fn new(context: SyncContext) -> Self {
        Self {
            context: Arc::new(context),
            depth: 0,
            push: None,
            responses: ResponseQueue::new(),
        }
    }

    pub fn context(&self) -> &SyncContext {
        &self.context
    }

    /// Feed one parser event.
    ///
    /// An `Err` means the current request gets no response from the sync
    /// layer and the transport should answer with its default error.
    pub fn handle_event(&mut self, event: ParseEvent) -> SyncResult<()> {
        match event {
            ParseEvent::Start(element) => {
                self.depth += 1;
                if let Some(push) = self.push.as_mut() {
                    if self.depth == 2 && element.name() == elements::PACK {
                        push.payload_start();
                    }
                    return Ok(());
                }
                if self.depth == 1 {
                    return self.dispatch(&element);
                }
                Ok(())
            }
            ParseEvent::Text(text) => {
                if let Some(push) = self.push.as_mut() {
                    if self.depth == 2 {
                        push.payload_text(&text);
                    }
                }
                Ok(())
            }
            ParseEvent::End(name) => {
                self.depth = self.depth.saturating_sub(1);
                let Some(push) = self.push.as_mut() else {
                    return Ok(());
                };
                if self.depth == 1 && name == elements::PACK {
                    push.payload_end();
                }
                if self.depth == 0 {
                    if let Some(mut push) = self.push.take() {
                        push.finish(&mut self.responses)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Feed a whole request and report its first error.
    ///
    /// Every event is consumed even after a failure, so the element depth
    /// is back at the top level for the next request.
    pub fn handle_events(&mut self, events: impl IntoIterator<Item = ParseEvent>) -> SyncResult<()> {
        let mut first_error = None;
        for event in events {
            if let Err(e) = self.handle_event(event) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Take all responses produced so far.
    pub fn drain_responses(&mut self) -> Vec<Response> {
        self.responses.drain()
    }

    fn dispatch(&mut self, element: &Element) -> SyncResult<()> {
        match element.name() {
            elements::SYNC_PULL => {
                PullCoordinator::new(Arc::clone(&self.context)).handle(element, &mut self.responses)?;
                Ok(())
            }
            elements::SYNC_PUSH => {
                let mut push = PushCoordinator::new(Arc::clone(&self.context));
                push.header(element)?;
                self.push = Some(push);
                Ok(())
            }
            other => {
                debug!(element = other, "no sync handler");
                Err(SyncError::NoHandler(other.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SyncPolicy;
    use tipsync_protocol::{encode_pack, OutStanza};
    use tipsync_store::memory::encode_commits;
    use tipsync_store::{InMemoryAccounts, InMemoryMailbox, InMemoryRepository, MailboxEvent};
    use tipsync_types::{AccessToken, CommitId, Principal};

    fn commit(byte: u8) -> CommitId {
        CommitId::from_raw([byte; 20])
    }

    fn session(principal: Principal) -> (SyncSession, Arc<InMemoryRepository>, Arc<InMemoryMailbox>) {
        let accounts = Arc::new(InMemoryAccounts::new());
        let (repo, mailbox) = accounts.add_account("alice");
        repo.set_history("main", vec![commit(0)]).unwrap();
        let context = SyncContext::new(principal, accounts, SyncPolicy::default());
        (SyncSession::new(context), repo, mailbox)
    }

    fn push_events(user: &str, payload: &str) -> Vec<ParseEvent> {
        vec![
            ParseEvent::Start(
                Element::new("sync_push")
                    .with_attr("branch", "main")
                    .with_attr("start_commit", "00".repeat(20))
                    .with_attr("last_commit", "bb".repeat(20))
                    .with_attr("serverUser", user),
            ),
            ParseEvent::Start(Element::new("pack")),
            ParseEvent::Text(payload[..payload.len() / 2].to_string()),
            ParseEvent::Text(payload[payload.len() / 2..].to_string()),
            ParseEvent::End("pack".into()),
            ParseEvent::End("sync_push".into()),
        ]
    }

    fn payload() -> String {
        encode_pack(&encode_commits(&[commit(0xbb)]))
    }

    #[test]
    fn pull_is_answered_on_start_tag() {
        let (mut s, _, _) = session(Principal::account("alice"));
        s.handle_event(ParseEvent::Start(
            Element::new("sync_pull")
                .with_attr("branch", "main")
                .with_attr("serverUser", "alice")
                .with_attr("base", ""),
        ))
        .unwrap();
        s.handle_event(ParseEvent::End("sync_pull".into())).unwrap();

        let responses = s.drain_responses();
        assert_eq!(responses.len(), 1);
        let head = responses[0].child("sync_pull").unwrap();
        assert_eq!(head.attribute("tip"), Some("00".repeat(20).as_str()));
    }

    #[test]
    fn push_is_finalized_by_closing_tag() {
        let principal = Principal::delegated([AccessToken::new("alice", "main")]);
        let (mut s, repo, mailbox) = session(principal);
        let mut events = push_events("alice", &payload());
        let close = events.pop().unwrap();

        s.handle_events(events).unwrap();
        assert!(s.drain_responses().is_empty());
        assert!(mailbox.events().is_empty());

        s.handle_event(close).unwrap();
        let responses = s.drain_responses();
        assert_eq!(responses.len(), 1);
        let ack = responses[0].child("sync_push").unwrap();
        assert_eq!(ack.attribute("tip"), Some("bb".repeat(20).as_str()));
        assert_eq!(repo.history("main").unwrap(), vec![commit(0), commit(0xbb)]);
        assert_eq!(
            mailbox.events(),
            vec![
                MailboxEvent::ChannelTip { branch: "main".into(), tip: "bb".repeat(20) },
                MailboxEvent::Commit,
            ]
        );
    }

    #[test]
    fn push_without_pack_child() {
        let (mut s, repo, _) = session(Principal::account("alice"));
        s.handle_events([
            ParseEvent::Start(
                Element::new("sync_push")
                    .with_attr("branch", "main")
                    .with_attr("start_commit", "00".repeat(20))
                    .with_attr("last_commit", "00".repeat(20))
                    .with_attr("serverUser", "alice"),
            ),
            ParseEvent::End("sync_push".into()),
        ])
        .unwrap();

        let responses = s.drain_responses();
        assert_eq!(responses.len(), 1);
        assert!(!responses[0].is_error());
        assert_eq!(repo.history("main").unwrap(), vec![commit(0)]);
    }

    #[test]
    fn text_outside_pack_is_ignored() {
        let (mut s, repo, _) = session(Principal::account("alice"));
        let mut events = push_events("alice", &payload());
        events.insert(1, ParseEvent::Text("\n  ".into()));
        events.insert(2, ParseEvent::Start(Element::new("note")));
        events.insert(3, ParseEvent::Text("ignored".into()));
        events.insert(4, ParseEvent::End("note".into()));
        s.handle_events(events).unwrap();

        assert!(!s.drain_responses()[0].is_error());
        assert_eq!(repo.history("main").unwrap(), vec![commit(0), commit(0xbb)]);
    }

    #[test]
    fn denied_push_answers_with_error_stanza() {
        let principal = Principal::delegated([]);
        let (mut s, repo, mailbox) = session(principal);
        s.handle_events(push_events("alice", &payload())).unwrap();

        let responses = s.drain_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].error_message(), Some("Push: access to branch denied."));
        assert_eq!(repo.history("main").unwrap(), vec![commit(0)]);
        assert!(mailbox.events().is_empty());
    }

    #[test]
    fn denied_pull_is_silent() {
        let (mut s, _, _) = session(Principal::delegated([]));
        let err = s
            .handle_event(ParseEvent::Start(
                Element::new("sync_pull")
                    .with_attr("branch", "main")
                    .with_attr("serverUser", "alice")
                    .with_attr("base", ""),
            ))
            .unwrap_err();
        assert!(matches!(err, SyncError::Unauthorized { .. }));
        assert!(s.drain_responses().is_empty());
    }

    #[test]
    fn malformed_push_header_swallows_its_children() {
        let (mut s, repo, _) = session(Principal::account("alice"));
        let header = ParseEvent::Start(Element::new("sync_push").with_attr("branch", "main"));
        assert!(matches!(s.handle_event(header), Err(SyncError::MalformedRequest(_))));

        s.handle_events([
            ParseEvent::Start(Element::new("pack")),
            ParseEvent::Text(payload()),
            ParseEvent::End("pack".into()),
            ParseEvent::End("sync_push".into()),
        ])
        .unwrap();
        assert!(s.drain_responses().is_empty());
        assert_eq!(repo.history("main").unwrap(), vec![commit(0)]);
    }

    fn pull_events(branch: &str) -> Vec<ParseEvent> {
        vec![
            ParseEvent::Start(
                Element::new("sync_pull")
                    .with_attr("branch", branch)
                    .with_attr("serverUser", "alice")
                    .with_attr("base", ""),
            ),
            ParseEvent::End("sync_pull".into()),
        ]
    }

    #[test]
    fn rejected_pull_does_not_block_later_requests() {
        let principal = Principal::delegated([AccessToken::new("alice", "main")]);
        let (mut s, _, _) = session(principal);

        let err = s.handle_events(pull_events("dev")).unwrap_err();
        assert!(matches!(err, SyncError::Unauthorized { .. }));
        assert!(s.drain_responses().is_empty());

        for _ in 0..2 {
            s.handle_events(pull_events("main")).unwrap();
            let responses = s.drain_responses();
            assert_eq!(responses.len(), 1);
            let head = responses[0].child("sync_pull").unwrap();
            assert_eq!(head.attribute("tip"), Some("00".repeat(20).as_str()));
        }
    }

    #[test]
    fn unhandled_element_subtree_is_skipped() {
        let (mut s, _, _) = session(Principal::account("alice"));
        let err = s
            .handle_events([
                ParseEvent::Start(Element::new("ping")),
                ParseEvent::Start(Element::new("sync_pull")),
                ParseEvent::End("sync_pull".into()),
                ParseEvent::End("ping".into()),
            ])
            .unwrap_err();
        assert!(matches!(err, SyncError::NoHandler(_)));

        s.handle_events(pull_events("main")).unwrap();
        assert_eq!(s.drain_responses().len(), 1);
    }

    #[test]
    fn malformed_push_does_not_block_later_push() {
        let (mut s, repo, _) = session(Principal::account("alice"));
        let mut broken = push_events("alice", &payload());
        broken[0] = ParseEvent::Start(Element::new("sync_push").with_attr("branch", "main"));
        assert!(matches!(s.handle_events(broken), Err(SyncError::MalformedRequest(_))));
        assert!(s.drain_responses().is_empty());

        s.handle_events(push_events("alice", &payload())).unwrap();
        assert_eq!(s.drain_responses().len(), 1);
        assert_eq!(repo.history("main").unwrap(), vec![commit(0), commit(0xbb)]);
    }

    #[test]
    fn unknown_element_has_no_handler() {
        let (mut s, _, _) = session(Principal::account("alice"));
        let err = s.handle_event(ParseEvent::Start(Element::new("ping"))).unwrap_err();
        assert!(matches!(err, SyncError::NoHandler(ref name) if name == "ping"));
    }

    #[test]
    fn requests_are_handled_in_sequence() {
        let (mut s, _, _) = session(Principal::account("alice"));
        s.handle_events(push_events("alice", &payload())).unwrap();
        s.handle_events([
            ParseEvent::Start(
                Element::new("sync_pull")
                    .with_attr("branch", "main")
                    .with_attr("serverUser", "alice")
                    .with_attr("base", "00".repeat(20)),
            ),
            ParseEvent::End("sync_pull".into()),
        ])
        .unwrap();

        let responses = s.drain_responses();
        assert_eq!(responses.len(), 2);
        let pull = responses[1].child("sync_pull").unwrap();
        assert_eq!(pull.attribute("tip"), Some("bb".repeat(20).as_str()));
        let pack = responses[1].child("pack").and_then(OutStanza::body).unwrap();
        assert_eq!(pack, payload());
    }
}
