use std::{
    cell::RefCell,
    time::{Duration, Instant},
};

pub type TimerCallback = Box<dyn FnOnce()>;

/// Identity of a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

impl TimerToken {
    /// Token that can never match a scheduled timer.
    pub const INVALID: TimerToken = TimerToken(0);
}

/// Cancelable one-shot timers, supplied by the display environment that
/// drives the render thread.
pub trait TimerHost {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerToken;

    fn cancel(&self, token: TimerToken);
}

/// Single-threaded `TimerHost` driven by an external loop: the owner sleeps
/// until `next_deadline` and then calls `run_due`.
pub struct TimerQueue {
    state: RefCell<QueueState>,
}

struct QueueState {
    next_token: u64,
    entries: Vec<TimerEntry>,
}

struct TimerEntry {
    token: TimerToken,
    deadline: Instant,
    callback: TimerCallback,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(QueueState {
                next_token: 0,
                entries: Vec::new(),
            }),
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.state.borrow().entries.iter().map(|entry| entry.deadline).min()
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Fire every timer due at `now`.  Callbacks run outside the queue lock,
    /// so they are free to schedule or cancel timers; newly scheduled ones
    /// fire on a later call.
    pub fn run_due(&self, now: Instant) {
        let due: Vec<TimerEntry> = {
            let mut state = self.state.borrow_mut();
            let (due, rest) = state
                .entries
                .drain(..)
                .partition(|entry| entry.deadline <= now);
            state.entries = rest;
            due
        };
        for entry in due {
            (entry.callback)();
        }
    }
}

impl TimerHost for TimerQueue {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerToken {
        let mut state = self.state.borrow_mut();
        state.next_token += 1;
        let token = TimerToken(state.next_token);
        state.entries.push(TimerEntry {
            token,
            deadline: Instant::now() + delay,
            callback,
        });
        token
    }

    fn cancel(&self, token: TimerToken) {
        self.state
            .borrow_mut()
            .entries
            .retain(|entry| entry.token != token);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    fn far_future() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[test]
    fn due_timers_fire_once() {
        let queue = TimerQueue::new();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        queue.schedule(Duration::from_millis(1), Box::new(move || counter.set(counter.get() + 1)));
        queue.run_due(far_future());
        queue.run_due(far_future());
        assert_eq!(fired.get(), 1);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn cancel_removes_the_entry() {
        let queue = TimerQueue::new();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let token = queue.schedule(Duration::from_millis(1), Box::new(move || flag.set(true)));
        queue.cancel(token);
        assert_eq!(queue.pending(), 0);
        queue.run_due(far_future());
        assert!(!fired.get());
    }

    #[test]
    fn undue_timers_stay_queued() {
        let queue = TimerQueue::new();
        queue.schedule(Duration::from_secs(5), Box::new(|| {}));
        queue.run_due(Instant::now());
        assert_eq!(queue.pending(), 1);
        assert!(queue.next_deadline().is_some());
    }

    #[test]
    fn callbacks_may_reschedule() {
        let queue = Rc::new(TimerQueue::new());
        let inner = Rc::clone(&queue);
        queue.schedule(
            Duration::from_millis(1),
            Box::new(move || {
                inner.schedule(Duration::from_millis(1), Box::new(|| {}));
            }),
        );
        queue.run_due(far_future());
        assert_eq!(queue.pending(), 1);
    }
}
