//! Typed event listeners and render-completion bookkeeping.

use std::fmt;
use std::hash::Hash;
use tracing::debug;

/// An event with a discriminant listeners subscribe to.
pub trait DispatchEvent {
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

pub type Listener<E> = Box<dyn FnMut(&E) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listeners per event kind, called in registration order.
pub struct Dispatch<E: DispatchEvent> {
    listeners: Vec<(ListenerId, E::Kind, Listener<E>)>,
    next: u64,
}

impl<E: DispatchEvent> Default for Dispatch<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next: 0,
        }
    }
}

impl<E: DispatchEvent> fmt::Debug for Dispatch<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<_> = self.listeners.iter().map(|(_, k, _)| *k).collect();
        f.debug_struct("Dispatch").field("listeners", &kinds).finish()
    }
}

impl<E: DispatchEvent> Dispatch<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, kind: E::Kind, listener: F) -> ListenerId
    where
        F: FnMut(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next);
        self.next += 1;
        self.listeners.push((id, kind, Box::new(listener)));
        id
    }

    /// Drop one listener. Returns whether it was registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _, _)| *l != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners.iter().filter(|(_, k, _)| *k == kind).count()
    }

    /// Call every listener for the event's kind; returns how many ran.
    pub fn emit(&mut self, event: &E) -> usize {
        let kind = event.kind();
        let mut called = 0;
        for (_, k, listener) in self.listeners.iter_mut() {
            if *k == kind {
                listener(event);
                called += 1;
            }
        }
        called
    }
}

/// Coalesces render completion: one signal per top-level render pass, held
/// back while watched transitions are still running.
#[derive(Clone, Debug, Default)]
pub struct RenderWatch {
    pending: usize,
    requested: bool,
    fired: bool,
}

impl RenderWatch {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// A transition started during this pass.
    pub fn watch(&mut self) {
        self.pending += 1;
    }

    /// A watched transition finished. True when the pass is now complete.
    pub fn settle(&mut self) -> bool {
        self.pending = self.pending.saturating_sub(1);
        self.try_fire("transition settled")
    }

    /// The pass finished its synchronous work. True when it should signal now.
    pub fn render_end(&mut self, label: &str) -> bool {
        self.requested = true;
        self.try_fire(label)
    }

    fn try_fire(&mut self, label: &str) -> bool {
        if self.requested && self.pending == 0 && !self.fired {
            self.fired = true;
            debug!(label, "render end");
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug)]
    enum Ping {
        A(u32),
        B,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum PingKind {
        A,
        B,
    }

    impl DispatchEvent for Ping {
        type Kind = PingKind;

        fn kind(&self) -> PingKind {
            match self {
                Ping::A(_) => PingKind::A,
                Ping::B => PingKind::B,
            }
        }
    }

    #[test]
    fn listeners_only_hear_their_kind() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut dispatch = Dispatch::new();
        let sink = seen.clone();
        dispatch.on(PingKind::A, move |e: &Ping| {
            if let Ping::A(n) = e {
                sink.lock().push(*n);
            }
        });
        assert_eq!(dispatch.emit(&Ping::A(3)), 1);
        assert_eq!(dispatch.emit(&Ping::B), 0);
        assert_eq!(*seen.lock(), vec![3]);
    }

    #[test]
    fn off_unregisters() {
        let mut dispatch: Dispatch<Ping> = Dispatch::new();
        let id = dispatch.on(PingKind::B, |_| {});
        assert_eq!(dispatch.listener_count(PingKind::B), 1);
        assert!(dispatch.off(id));
        assert!(!dispatch.off(id));
        assert_eq!(dispatch.emit(&Ping::B), 0);
    }

    #[test]
    fn render_watch_fires_once_per_pass() {
        let mut watch = RenderWatch::default();
        assert!(watch.render_end("inner"));
        assert!(!watch.render_end("outer"));
        watch.reset();
        assert!(watch.render_end("again"));
    }

    #[test]
    fn render_watch_waits_for_transitions() {
        let mut watch = RenderWatch::default();
        watch.watch();
        watch.watch();
        assert!(!watch.render_end("immediate"));
        assert!(!watch.settle());
        assert!(watch.settle());
        assert!(!watch.settle());
    }
}
