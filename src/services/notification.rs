// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification store: a single auto-hiding toast.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Success,
    Error,
}

/// Visible toast state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub is_visible: bool,
}

#[derive(Default)]
struct ToastSlot {
    toast: Toast,
    /// Bumped on every show; a timer only hides its own generation.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl ToastSlot {
    fn hide(&mut self) {
        self.toast.is_visible = false;
        self.toast.message.clear();
    }
}

/// Depth-1 toast queue. A newer toast replaces the current one and
/// restarts the hide timer.
#[derive(Clone)]
pub struct NotificationStore {
    slot: Arc<Mutex<ToastSlot>>,
    delay: Duration,
}

impl NotificationStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(ToastSlot::default())),
            delay,
        }
    }

    /// Show `message` and hide it automatically after the configured delay.
    pub async fn show_toast(&self, message: impl Into<String>, kind: ToastKind) {
        let mut slot = self.slot.lock().await;

        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.generation += 1;
        slot.toast = Toast {
            message: message.into(),
            kind,
            is_visible: true,
        };

        let generation = slot.generation;
        let shared = Arc::clone(&self.slot);
        let delay = self.delay;
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut slot = shared.lock().await;
            if slot.generation == generation {
                slot.hide();
                slot.timer = None;
            }
        }));
    }

    /// Hide the current toast immediately.
    pub async fn hide_toast(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.hide();
    }

    pub async fn current(&self) -> Toast {
        self.slot.lock().await.toast.clone()
    }
}
