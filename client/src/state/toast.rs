//! Transient notification queue.
//!
//! DESIGN
//! ======
//! The queue is pure: callers pass the clock in. The toast host schedules one
//! timer per toast that calls `dismiss`, and `expire` sweeps anything a
//! missed timer left behind. Ids are never reused, so dismissing a stale id
//! is a no-op rather than removing a newer toast.

#[cfg(test)]
#[path = "toast_test.rs"]
mod toast_test;

pub const SHORT_TOAST_MS: u64 = 3000;
pub const LONG_TOAST_MS: u64 = 4000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    /// How long a toast of this kind stays up.
    pub fn duration_ms(self) -> u64 {
        match self {
            Self::Success | Self::Info => SHORT_TOAST_MS,
            Self::Warning | Self::Error => LONG_TOAST_MS,
        }
    }

    pub fn css_modifier(self) -> &'static str {
        match self {
            Self::Success => "toast--success",
            Self::Error => "toast--error",
            Self::Warning => "toast--warning",
            Self::Info => "toast--info",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub expires_at_ms: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToastQueue {
    next_id: u64,
    toasts: Vec<Toast>,
}

impl ToastQueue {
    /// Queue a toast with its kind's default duration. Returns its id.
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>, now_ms: u64) -> u64 {
        self.push_for(kind, message, kind.duration_ms(), now_ms)
    }

    pub fn push_for(&mut self, kind: ToastKind, message: impl Into<String>, duration_ms: u64, now_ms: u64) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.toasts.push(Toast { id, kind, message: message.into(), expires_at_ms: now_ms.saturating_add(duration_ms) });
        id
    }

    /// Remove one toast. Returns whether it was still showing.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop every toast whose time is up. Returns how many were removed.
    pub fn expire(&mut self, now_ms: u64) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires_at_ms > now_ms);
        before - self.toasts.len()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
