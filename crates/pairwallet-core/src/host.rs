//! Access to the hosting runtime (haptics, back button, user identity)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Called when the host's back button is pressed
pub type BackHandler = Box<dyn Fn() + Send + Sync>;

/// User id used when the host does not provide one
pub const GUEST_USER_ID: &str = "guest";

pub trait HostBridge: Send + Sync {
    /// Short confirmation vibration
    fn haptic_success(&self);

    /// Install the back-button handler, replacing any previous one
    fn on_back(&self, handler: BackHandler);

    /// Remove the back-button handler
    fn clear_back(&self);

    fn current_user_id(&self) -> Option<String>;
}

/// Host without a UI shell: remembers calls and lets callers press back
#[derive(Default)]
pub struct HeadlessHost {
    user_id: Option<String>,
    haptics: AtomicUsize,
    back: Mutex<Option<BackHandler>>,
}

impl HeadlessHost {
    pub fn new(user_id: Option<&str>) -> Self {
        Self {
            user_id: user_id.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn haptic_count(&self) -> usize {
        self.haptics.load(Ordering::SeqCst)
    }

    pub fn has_back_handler(&self) -> bool {
        self.back.lock().map(|b| b.is_some()).unwrap_or(false)
    }

    /// Run the installed back handler; returns false when none is installed
    pub fn press_back(&self) -> bool {
        let handler = match self.back.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}

impl HostBridge for HeadlessHost {
    fn haptic_success(&self) {
        self.haptics.fetch_add(1, Ordering::SeqCst);
    }

    fn on_back(&self, handler: BackHandler) {
        if let Ok(mut slot) = self.back.lock() {
            *slot = Some(handler);
        }
    }

    fn clear_back(&self) {
        if let Ok(mut slot) = self.back.lock() {
            slot.take();
        }
    }

    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}
