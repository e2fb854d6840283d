use crate::foundation::core::{Point, Rect};

/// Host-side identifier of a requested animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host-side identifier of a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Event families an effect can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Mouse or pen movement over the tracked container.
    PointerMove,
    /// Touch movement over the tracked container.
    TouchMove,
    /// Pointer left the tracked container.
    PointerLeave,
    /// Container or window size changed.
    Resize,
}

/// Input delivered to a mounted effect. Positions are in client space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// Mouse or pen moved.
    PointerMove {
        /// Client-space position.
        client: Point,
    },
    /// Primary touch moved.
    TouchMove {
        /// Client-space position.
        client: Point,
    },
    /// Pointer left the container.
    PointerLeave,
    /// Container resized; new bounds come from [`crate::Host::bounds`].
    Resize,
}

impl HostEvent {
    /// Listener family this event is dispatched to.
    pub fn kind(&self) -> ListenerKind {
        match self {
            Self::PointerMove { .. } => ListenerKind::PointerMove,
            Self::TouchMove { .. } => ListenerKind::TouchMove,
            Self::PointerLeave => ListenerKind::PointerLeave,
            Self::Resize => ListenerKind::Resize,
        }
    }

    /// Client position for move events.
    pub fn client(&self) -> Option<Point> {
        match *self {
            Self::PointerMove { client } | Self::TouchMove { client } => Some(client),
            Self::PointerLeave | Self::Resize => None,
        }
    }
}

/// What an effect wants from the scheduler after handling a callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRequest {
    /// No frame needed.
    Idle,
    /// Run `on_frame` on the next animation frame.
    Next,
}

/// Capabilities the surrounding page provides to an effect.
pub trait Host {
    /// Current bounding box of the tracked container, or `None` if it does not exist yet.
    fn bounds(&self) -> Option<Rect>;

    /// Ask for one animation-frame callback.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a previously requested frame.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Subscribe to an event family.
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;

    /// Undo [`Host::add_listener`].
    fn remove_listener(&mut self, id: ListenerId);
}

#[cfg(test)]
#[path = "../../tests/unit/host/event.rs"]
mod tests;
