//! Page-wide SDK load state.
//!
//! The SDK script is injected at most once no matter how many engines mount,
//! and a failed load is never retried.

use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// What a mounting engine must do after asking for the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadAction {
    /// First request on the page: inject the script tag now.
    InjectScript,
    /// Another engine already injected it; wait for the load callback.
    Wait,
    AlreadyReady,
    AlreadyFailed(String),
}

#[derive(Debug)]
pub struct SdkLoader {
    state: LoadState,
    requests: u32,
}

impl SdkLoader {
    pub const fn new() -> Self {
        Self {
            state: LoadState::Idle,
            requests: 0,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    /// Number of engines that have asked for the SDK so far.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn request(&mut self) -> LoadAction {
        self.requests = self.requests.saturating_add(1);
        match &self.state {
            LoadState::Idle => {
                self.state = LoadState::Loading;
                info!("injecting map SDK script");
                LoadAction::InjectScript
            }
            LoadState::Loading => LoadAction::Wait,
            LoadState::Ready => LoadAction::AlreadyReady,
            LoadState::Failed(reason) => LoadAction::AlreadyFailed(reason.clone()),
        }
    }

    /// Load-completion callback. Returns `true` if this flipped the flag.
    pub fn mark_loaded(&mut self) -> bool {
        if self.state == LoadState::Ready {
            return false;
        }
        info!("map SDK ready");
        self.state = LoadState::Ready;
        true
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(%reason, "map SDK failed to load");
        self.state = LoadState::Failed(reason);
    }
}

impl Default for SdkLoader {
    fn default() -> Self {
        Self::new()
    }
}
