use std::collections::{HashMap, VecDeque};

use crate::{
    foundation::core::{FrameTick, Rect},
    host::{
        event::{FrameHandle, Host, ListenerId, ListenerKind},
        mount::{Effect, EffectMount},
    },
};

/// Running counters of every scheduling and listener call a [`ManualHost`] received.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostStats {
    /// `request_frame` calls.
    pub frames_requested: u64,
    /// `cancel_frame` calls that removed an outstanding request.
    pub frames_cancelled: u64,
    /// Requests handed back to the driver for firing.
    pub frames_fired: u64,
    /// `add_listener` calls.
    pub listeners_added: u64,
    /// `remove_listener` calls that removed a live listener.
    pub listeners_removed: u64,
}

/// Deterministic in-process host: frames fire only when the driver advances them.
#[derive(Debug, Default)]
pub struct ManualHost {
    bounds: Option<Rect>,
    next_id: u64,
    due: VecDeque<FrameHandle>,
    active_listeners: HashMap<ListenerId, ListenerKind>,
    stats: HostStats,
}

impl ManualHost {
    /// Host whose container occupies `bounds`.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds: Some(bounds),
            ..Self::default()
        }
    }

    /// Host whose container has not been created yet.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Move, resize, attach (`Some`) or detach (`None`) the container.
    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds;
    }

    /// Counters so far.
    pub fn stats(&self) -> &HostStats {
        &self.stats
    }

    /// Number of frame requests neither fired nor cancelled.
    pub fn due_frames(&self) -> usize {
        self.due.len()
    }

    /// Number of listeners currently registered.
    pub fn active_listeners(&self) -> usize {
        self.active_listeners.len()
    }

    /// `true` if some listener for `kind` is registered.
    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.active_listeners.values().any(|&k| k == kind)
    }

    /// Pop the oldest outstanding frame request.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        let h = self.due.pop_front()?;
        self.stats.frames_fired += 1;
        Some(h)
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Host for ManualHost {
    fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn request_frame(&mut self) -> FrameHandle {
        let h = FrameHandle(self.next_id());
        self.due.push_back(h);
        self.stats.frames_requested += 1;
        h
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.due.len();
        self.due.retain(|&h| h != handle);
        if self.due.len() != before {
            self.stats.frames_cancelled += 1;
        }
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.active_listeners.insert(id, kind);
        self.stats.listeners_added += 1;
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        if self.active_listeners.remove(&id).is_some() {
            self.stats.listeners_removed += 1;
        }
    }
}

impl<E: Effect> EffectMount<E, ManualHost> {
    /// Fire the oldest due frame, if any. Returns whether the effect ran.
    pub fn advance(&mut self, tick: FrameTick) -> bool {
        match self.host_mut().take_due() {
            Some(handle) => self.fire_frame(handle, tick),
            None => false,
        }
    }

    /// Advance `frames` consecutive ticks at `hz`, starting at frame index `start`.
    ///
    /// Returns how many frames actually ran.
    pub fn run_frames(&mut self, start: u64, frames: u64, hz: f64) -> u64 {
        let mut ran = 0;
        for i in start..start + frames {
            if self.advance(FrameTick::at_rate(i, hz)) {
                ran += 1;
            }
        }
        ran
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/manual.rs"]
mod tests;
