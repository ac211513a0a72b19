use std::{cell::RefCell, rc::Rc, time::Duration};

use crate::timer::{TimerHost, TimerToken};

/// Delay between the self-rescheduled refreshes of a live rendering.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(500);

/// Callback slot and refresh timer shared by the live renderings.  At most
/// one subscriber is active at a time; re-installing the same callback is a
/// no-op so the periodic refresh is never duplicated.
pub struct Subscription<S> {
    inner: RefCell<State<S>>,
}

struct State<S> {
    callback: Option<Rc<dyn Fn(&S)>>,
    timer: TimerToken,
}

impl<S> Subscription<S> {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(State {
                callback: None,
                timer: TimerToken::INVALID,
            }),
        }
    }

    /// Install `callback` as the subscriber.  Returns true if the slot
    /// actually changed, telling the caller to run an immediate refresh.
    pub fn install(&self, callback: Rc<dyn Fn(&S)>) -> bool {
        let mut state = self.inner.borrow_mut();
        if let Some(current) = &state.callback {
            if Rc::ptr_eq(current, &callback) {
                return false;
            }
        }
        state.callback = Some(callback);
        true
    }

    pub fn is_subscribed(&self) -> bool {
        self.inner.borrow().callback.is_some()
    }

    pub fn emit(&self, snapshot: &S) {
        let callback = self.inner.borrow().callback.clone();
        if let Some(callback) = callback {
            callback(snapshot);
        }
    }

    pub fn cancel_timer(&self, timers: &dyn TimerHost) {
        let mut state = self.inner.borrow_mut();
        if state.timer != TimerToken::INVALID {
            timers.cancel(state.timer);
            state.timer = TimerToken::INVALID;
        }
    }

    /// Arm the refresh timer, replacing any pending one.
    pub fn schedule(&self, timers: &dyn TimerHost, refresh: impl FnOnce() + 'static) {
        self.cancel_timer(timers);
        let token = timers.schedule(REFRESH_INTERVAL, Box::new(refresh));
        self.inner.borrow_mut().timer = token;
    }

    /// Drop the subscriber and cancel any pending timer.  Afterwards no
    /// frame or tick can reach the old callback.
    pub fn clear(&self, timers: &dyn TimerHost) {
        self.cancel_timer(timers);
        self.inner.borrow_mut().callback = None;
    }
}
