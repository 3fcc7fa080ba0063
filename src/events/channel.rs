//! Event channel for orchestration runs.
//!
//! Unbounded, so neither the orchestrator nor a strategy worker ever blocks
//! on a slow listener.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sending half, cloned into each strategy thread.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event; dropped silently once nobody listens.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half, owned by the presentation layer.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event. `None` once every sender is gone.
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// All events until every sender is gone
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

pub struct EventChannel;

impl EventChannel {
    /// Create a connected sender/receiver pair
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender whose events go nowhere, for runs nobody watches.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::orchestrator::Strategy;
    use crate::events::OrchestrationState;
    use std::thread;

    #[test]
    fn worker_threads_report_through_clones() {
        let (sender, receiver) = EventChannel::new();

        let workers: Vec<_> = [Strategy::Shape, Strategy::Color]
            .into_iter()
            .map(|strategy| {
                let sender = sender.clone();
                thread::spawn(move || sender.send(Event::StrategyStarted { strategy }))
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        drop(sender);

        let mut seen: Vec<Strategy> = receiver
            .iter()
            .filter_map(|event| match event {
                Event::StrategyStarted { strategy } => Some(strategy),
                _ => None,
            })
            .collect();
        seen.sort_by_key(|s| s.to_string());
        assert_eq!(seen, vec![Strategy::Color, Strategy::Shape]);
    }

    #[test]
    fn null_sender_discards_events() {
        null_sender().send(Event::StateChanged {
            state: OrchestrationState::Running,
        });
    }

    #[test]
    fn recv_returns_none_after_senders_drop() {
        let (sender, receiver) = EventChannel::new();
        sender.send(Event::StateChanged {
            state: OrchestrationState::PreProcessed,
        });
        drop(sender);

        assert!(receiver.recv().is_some());
        assert!(receiver.recv().is_none());
    }
}
