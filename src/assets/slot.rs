use std::sync::{
    Arc,
    mpsc::{self, Receiver, TryRecvError},
};

use crate::{
    assets::{
        decode::{PreparedImage, prepare_depth_map, prepare_image},
        loader::ImageLoader,
    },
    foundation::error::RevealResult,
    parallax::depth::DepthBuffer,
};

/// Observable state of an [`AssetSlot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotStatus {
    /// Decode still running.
    Pending,
    /// Value available.
    Ready,
    /// Decode failed; the slot stays empty for its whole lifetime.
    Failed,
}

enum SlotState<T> {
    Pending(Receiver<RevealResult<T>>),
    Ready(Arc<T>),
    Failed,
}

/// Fire-and-forget decoded asset.
///
/// Decoding runs on the rayon pool; readers call [`AssetSlot::poll`] from the frame path and
/// treat anything but `Ready` as "not ready yet". Failures are logged once and never retried.
pub struct AssetSlot<T> {
    url: String,
    state: SlotState<T>,
}

impl<T> std::fmt::Debug for AssetSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetSlot")
            .field("url", &self.url)
            .field("status", &self.status())
            .finish()
    }
}

impl<T: Send + Sync + 'static> AssetSlot<T> {
    /// Start `load` on the background pool.
    pub fn spawn<F>(url: impl Into<String>, load: F) -> Self
    where
        F: FnOnce() -> RevealResult<T> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        rayon::spawn(move || {
            // The slot may already be gone; nothing to report then.
            let _ = tx.send(load());
        });
        Self {
            url: url.into(),
            state: SlotState::Pending(rx),
        }
    }
}

impl<T> AssetSlot<T> {
    /// Slot that is ready immediately.
    pub fn ready(url: impl Into<String>, value: T) -> Self {
        Self {
            url: url.into(),
            state: SlotState::Ready(Arc::new(value)),
        }
    }

    /// Slot that failed without ever loading.
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: SlotState::Failed,
        }
    }

    /// URL the slot was created for.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current status without polling.
    pub fn status(&self) -> SlotStatus {
        match self.state {
            SlotState::Pending(_) => SlotStatus::Pending,
            SlotState::Ready(_) => SlotStatus::Ready,
            SlotState::Failed => SlotStatus::Failed,
        }
    }

    /// Value if ready, without polling.
    pub fn get(&self) -> Option<&Arc<T>> {
        match &self.state {
            SlotState::Ready(v) => Some(v),
            _ => None,
        }
    }

    /// Collect a finished decode if one arrived. Never blocks.
    pub fn poll(&mut self) -> Option<&Arc<T>> {
        let next = match &self.state {
            SlotState::Pending(rx) => match rx.try_recv() {
                Ok(res) => Some(settle(&self.url, res)),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!(url = %self.url, "asset decode dropped without a result");
                    Some(SlotState::Failed)
                }
            },
            _ => None,
        };
        if let Some(state) = next {
            self.state = state;
        }
        self.get()
    }

    /// Block until the decode settles. Intended for offline drivers, not the frame path.
    pub fn wait(&mut self) -> Option<&Arc<T>> {
        let next = match &self.state {
            SlotState::Pending(rx) => Some(match rx.recv() {
                Ok(res) => settle(&self.url, res),
                Err(_) => SlotState::Failed,
            }),
            _ => None,
        };
        if let Some(state) = next {
            self.state = state;
        }
        self.get()
    }
}

impl AssetSlot<PreparedImage> {
    /// Start loading a premultiplied RGBA image.
    pub fn load_image(loader: Arc<dyn ImageLoader>, url: impl Into<String>) -> Self {
        let url = url.into();
        let key = url.clone();
        Self::spawn(url, move || loader.load_image(&key).map(prepare_image))
    }
}

impl AssetSlot<DepthBuffer> {
    /// Start loading a grayscale depth map.
    pub fn load_depth(loader: Arc<dyn ImageLoader>, url: impl Into<String>) -> Self {
        let url = url.into();
        let key = url.clone();
        Self::spawn(url, move || {
            loader.load_image(&key).and_then(prepare_depth_map)
        })
    }
}

fn settle<T>(url: &str, res: RevealResult<T>) -> SlotState<T> {
    match res {
        Ok(v) => {
            tracing::debug!(url, "asset ready");
            SlotState::Ready(Arc::new(v))
        }
        Err(err) => {
            tracing::warn!(url, error = %err, "asset failed to load; effect stays inert");
            SlotState::Failed
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/slot.rs"]
mod tests;
