//! Panel controllers: fetch, reconcile, expose view state, submit.
//!
//! ARCHITECTURE
//! ============
//! Each controller exclusively owns its state for the lifetime of a mount.
//! State sits behind a mutex that is only held for synchronous
//! reconciliation steps, never across a collaborator call, so the view can
//! read optimistic state while requests are in flight. `unmount` clears the
//! state and flips the mount flag; responses that resolve afterwards are
//! dropped.

pub mod chat_panel;
pub mod form_panel;
pub mod notice;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub use chat_panel::{ChatPanel, ChatPanelView, SendOutcome};
pub use form_panel::{FormPanel, FormPanelView, SubmitOutcome};
pub use notice::{Notice, NoticeLevel};

/// Mount flag plus single-writer state shared by a panel's handles.
struct Mounted<S> {
    mounted: AtomicBool,
    state: Mutex<S>,
}

impl<S: Default> Mounted<S> {
    fn new() -> Self {
        Self { mounted: AtomicBool::new(true), state: Mutex::new(S::default()) }
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
        *self.lock() = S::default();
    }

    /// Lock the state only while still mounted.
    fn lock_mounted(&self) -> Option<MutexGuard<'_, S>> {
        if !self.is_mounted() {
            return None;
        }
        let guard = self.lock();
        // Re-check under the lock: unmount resets state while holding it.
        self.is_mounted().then_some(guard)
    }
}
