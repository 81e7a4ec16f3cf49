//! # Listeners
//!
//! Event listeners are registered against a `CancellationToken`. Revoking the
//! token detaches the whole batch at once, which is how controllers tear down
//! everything they attached during `init` without per-listener bookkeeping.
//!
//! A listener does not capture a closure. It stores a `Handler`: plain data
//! saying what should happen. The `Site` routes handlers to the controller
//! that owns them, the same way `core::update` routes an `Action`.

use std::collections::HashSet;

use log::debug;

use crate::core::accordion::Scope;
use crate::core::page::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    KeyDown,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Document,
    Element(ElementId),
}

/// What a listener does when its event fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handler {
    ToggleGuide { scope: Scope, guide_id: String },
    OpenMenu,
    CloseMenu,
    /// Escape handling for the mobile overlay.
    MenuKey,
    /// Breakpoint handling for the mobile overlay.
    MenuResize,
    /// Global shortcut dispatch.
    RouteKey,
    CycleTheme,
    ActivateNavLink { section_id: String },
    SelectCodeTab { lang: String },
}

/// Opaque handle for a batch of listeners. Equal only to its own clones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CancellationToken(u64);

#[derive(Debug)]
struct Listener {
    target: Target,
    kind: EventKind,
    handler: Handler,
    token: u64,
}

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: Vec<Listener>,
    /// Tokens handed out and not yet revoked.
    live: HashSet<u64>,
    next_token: u64,
}

impl ListenerRegistry {
    /// Allocates a fresh, live token.
    pub fn token(&mut self) -> CancellationToken {
        self.next_token += 1;
        self.live.insert(self.next_token);
        CancellationToken(self.next_token)
    }

    /// Attaches a listener. Listening under a revoked token is a no-op.
    pub fn listen(
        &mut self,
        target: Target,
        kind: EventKind,
        handler: Handler,
        token: &CancellationToken,
    ) {
        if !self.live.contains(&token.0) {
            debug!("listen ignored: token {} already revoked", token.0);
            return;
        }
        self.listeners.push(Listener {
            target,
            kind,
            handler,
            token: token.0,
        });
    }

    /// Detaches every listener registered under `token` and returns how many
    /// were removed. Revoking twice removes nothing the second time.
    pub fn revoke(&mut self, token: &CancellationToken) -> usize {
        if !self.live.remove(&token.0) {
            return 0;
        }
        let before = self.listeners.len();
        self.listeners.retain(|l| l.token != token.0);
        let removed = before - self.listeners.len();
        debug!("token {} revoked, {} listeners detached", token.0, removed);
        removed
    }

    /// Snapshot of handlers for an event, in registration order.
    pub fn handlers_for(&self, target: Target, kind: EventKind) -> Vec<Handler> {
        self.listeners
            .iter()
            .filter(|l| l.target == target && l.kind == kind)
            .map(|l| l.handler.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_detaches_whole_batch() {
        let mut reg = ListenerRegistry::default();
        let a = reg.token();
        let b = reg.token();
        reg.listen(Target::Document, EventKind::KeyDown, Handler::RouteKey, &a);
        reg.listen(Target::Document, EventKind::KeyDown, Handler::MenuKey, &a);
        reg.listen(Target::Document, EventKind::Resize, Handler::MenuResize, &b);

        assert_eq!(reg.revoke(&a), 2);
        assert_eq!(reg.len(), 1);
        assert_eq!(
            reg.handlers_for(Target::Document, EventKind::Resize),
            vec![Handler::MenuResize]
        );
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let mut reg = ListenerRegistry::default();
        let t = reg.token();
        reg.listen(Target::Document, EventKind::KeyDown, Handler::RouteKey, &t);
        assert_eq!(reg.revoke(&t), 1);
        assert_eq!(reg.revoke(&t), 0);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_listen_on_revoked_token_is_ignored() {
        let mut reg = ListenerRegistry::default();
        let t = reg.token();
        reg.revoke(&t);
        reg.listen(Target::Document, EventKind::KeyDown, Handler::RouteKey, &t);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_revoked_tokens_are_forgotten() {
        let mut reg = ListenerRegistry::default();
        for _ in 0..100 {
            let t = reg.token();
            reg.listen(Target::Document, EventKind::Resize, Handler::MenuResize, &t);
            reg.revoke(&t);
        }
        let kept = reg.token();
        assert_eq!(reg.live.len(), 1);
        assert!(reg.live.contains(&kept.0));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_tokens_are_distinct() {
        let mut reg = ListenerRegistry::default();
        let a = reg.token();
        let b = reg.token();
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_handlers_preserve_registration_order() {
        let mut reg = ListenerRegistry::default();
        let t = reg.token();
        reg.listen(Target::Document, EventKind::KeyDown, Handler::MenuKey, &t);
        reg.listen(Target::Document, EventKind::KeyDown, Handler::RouteKey, &t);
        assert_eq!(
            reg.handlers_for(Target::Document, EventKind::KeyDown),
            vec![Handler::MenuKey, Handler::RouteKey]
        );
    }
}
