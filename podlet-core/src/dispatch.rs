use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use threadpool::ThreadPool;

/// Cheap to clone, shareable handle over the background worker pool.  Jobs
/// are fire-and-forget: completion is never reported back, workers hand
/// results to the render thread through `Handoff` slots.
#[derive(Clone)]
pub struct Dispatcher {
    pool: ThreadPool,
}

impl Dispatcher {
    pub fn new() -> Self {
        const MAX_WORKER_THREADS: usize = 4;

        Self {
            pool: ThreadPool::with_name("dispatch".into(), MAX_WORKER_THREADS),
        }
    }

    pub fn run_async(&self, job: impl FnOnce() + Send + 'static) {
        self.pool.execute(job);
    }

    /// Block until every queued job has finished.  Used by tests to make
    /// worker effects observable deterministically.
    pub fn join(&self) {
        self.pool.join();
    }
}

/// Single-slot conduit carrying one worker result to the render thread.
/// The consumer polls with `try_take` and never blocks.
pub struct Handoff<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> Handoff<T> {
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self { tx, rx }
    }

    /// Producer endpoint, to be moved into a worker job.
    pub fn sender(&self) -> HandoffSender<T> {
        HandoffSender {
            tx: self.tx.clone(),
        }
    }

    pub fn try_take(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

pub struct HandoffSender<T> {
    tx: Sender<T>,
}

impl<T> HandoffSender<T> {
    /// Post a value for the render thread to pick up.  If the slot is still
    /// occupied or the consumer is gone, the value is dropped.
    pub fn post(&self, value: T) {
        match self.tx.try_send(value) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log::warn!("handoff slot full, dropping result");
            }
            Err(TrySendError::Disconnected(_)) => {
                log::info!("handoff consumer gone, dropping result");
            }
        }
    }
}

impl<T> Clone for HandoffSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[test]
    fn handoff_is_empty_until_posted() {
        let handoff = Handoff::new();
        assert_eq!(handoff.try_take(), None::<i32>);
        handoff.sender().post(7);
        assert_eq!(handoff.try_take(), Some(7));
        assert_eq!(handoff.try_take(), None);
    }

    #[test]
    fn handoff_keeps_first_of_two_posts() {
        let handoff = Handoff::new();
        let sender = handoff.sender();
        sender.post(1);
        sender.post(2);
        assert_eq!(handoff.try_take(), Some(1));
        assert_eq!(handoff.try_take(), None);
    }

    #[test]
    fn dispatcher_join_waits_for_jobs() {
        let dispatcher = Dispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..16 {
            let counter = Arc::clone(&counter);
            dispatcher.run_async(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        dispatcher.join();
        assert_eq!(counter.load(Ordering::SeqCst), 16);
    }

    #[test]
    fn worker_posts_cross_thread() {
        let dispatcher = Dispatcher::new();
        let handoff = Handoff::new();
        let sender = handoff.sender();
        dispatcher.run_async(move || sender.post("done"));
        dispatcher.join();
        assert_eq!(handoff.try_take(), Some("done"));
    }
}
