use crate::{
    foundation::core::{FrameTick, Rect},
    host::event::{FrameHandle, FrameRequest, Host, HostEvent, ListenerId, ListenerKind},
};

/// A visual behaviour driven by host events and animation frames.
///
/// All callbacks run on the host's single event queue, so implementations own their state
/// outright and need no synchronization.
pub trait Effect {
    /// Event families to subscribe to at mount. An empty list keeps the effect fully inert.
    fn listeners(&self) -> &'static [ListenerKind];

    /// Called once when the container first becomes available.
    fn on_mount(&mut self, bounds: Rect) -> FrameRequest;

    /// Called for every subscribed event while mounted.
    fn on_event(&mut self, event: &HostEvent, bounds: Rect) -> FrameRequest;

    /// Called on each animation frame that was requested.
    fn on_frame(&mut self, tick: FrameTick) -> FrameRequest;

    /// Called once at teardown, after scheduling has been cancelled.
    fn on_unmount(&mut self) {}
}

/// Lifecycle of an [`EffectMount`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountPhase {
    /// Waiting for the container to exist.
    Inert,
    /// Listeners registered, frames flowing.
    Active,
    /// Torn down; nothing runs any more.
    Unmounted,
}

/// Owns one effect instance and its scheduling state for the lifetime of a mount.
///
/// At most one frame request is outstanding at a time. Teardown cancels that request and
/// removes every listener exactly once, on [`EffectMount::unmount`] or on drop.
pub struct EffectMount<E: Effect, H: Host> {
    effect: E,
    host: H,
    phase: MountPhase,
    pending: Option<FrameHandle>,
    listeners: Vec<(ListenerKind, ListenerId)>,
}

impl<E: Effect, H: Host> EffectMount<E, H> {
    /// Mount `effect`. If the container is missing the mount stays inert until
    /// [`EffectMount::refresh`] finds it.
    pub fn mount(effect: E, host: H) -> Self {
        let mut m = Self {
            effect,
            host,
            phase: MountPhase::Inert,
            pending: None,
            listeners: Vec::new(),
        };
        m.refresh();
        m
    }

    /// Re-run setup after a re-render. Only an inert mount does any work, so an active loop
    /// is never started twice.
    pub fn refresh(&mut self) -> MountPhase {
        if self.phase != MountPhase::Inert {
            return self.phase;
        }
        let Some(bounds) = self.host.bounds() else {
            tracing::debug!("container missing; effect stays inert");
            return self.phase;
        };

        for &kind in self.effect.listeners() {
            let id = self.host.add_listener(kind);
            self.listeners.push((kind, id));
        }
        self.phase = MountPhase::Active;
        let req = self.effect.on_mount(bounds);
        self.schedule(req);
        self.phase
    }

    /// Deliver a host event. Ignored unless mounted and subscribed to its kind.
    pub fn dispatch(&mut self, event: HostEvent) {
        if self.phase != MountPhase::Active {
            return;
        }
        let kind = event.kind();
        if !self.listeners.iter().any(|&(k, _)| k == kind) {
            return;
        }
        let Some(bounds) = self.host.bounds() else {
            return;
        };
        let req = self.effect.on_event(&event, bounds);
        self.schedule(req);
    }

    /// Run the frame callback for `handle`. Returns `false` for stale or cancelled handles.
    pub fn fire_frame(&mut self, handle: FrameHandle, tick: FrameTick) -> bool {
        if self.phase != MountPhase::Active || self.pending != Some(handle) {
            return false;
        }
        self.pending = None;
        let req = self.effect.on_frame(tick);
        self.schedule(req);
        true
    }

    /// Cancel the outstanding frame, remove all listeners, and notify the effect. Idempotent.
    pub fn unmount(&mut self) {
        if self.phase == MountPhase::Unmounted {
            return;
        }
        let was_active = self.phase == MountPhase::Active;
        self.phase = MountPhase::Unmounted;

        if let Some(handle) = self.pending.take() {
            self.host.cancel_frame(handle);
        }
        for (_, id) in self.listeners.drain(..) {
            self.host.remove_listener(id);
        }
        if was_active {
            self.effect.on_unmount();
        }
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> MountPhase {
        self.phase
    }

    /// Outstanding frame request, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// The mounted effect.
    pub fn effect(&self) -> &E {
        &self.effect
    }

    /// Mutable access to the mounted effect.
    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    /// The host capabilities.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn schedule(&mut self, req: FrameRequest) {
        if req == FrameRequest::Next && self.pending.is_none() {
            self.pending = Some(self.host.request_frame());
        }
    }
}

impl<E: Effect, H: Host> Drop for EffectMount<E, H> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/mount.rs"]
mod tests;
