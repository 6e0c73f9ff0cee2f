/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Fan-out of change events to any number of listeners.
//!
//! A thin wrapper over [`tokio::sync::broadcast`].  Sending never blocks and
//! never fails: with no subscribers the event is dropped, and a subscriber
//! that falls more than `capacity` events behind sees `Lagged` and skips
//! ahead.

use tokio::sync::broadcast;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct Notifier<T: Clone> {
    name: &'static str,
    sender: broadcast::Sender<T>,
}

impl<T: Clone> Notifier<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { name, sender }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn notify(&self, event: T) {
        let receivers = self.sender.send(event).unwrap_or(0);
        trace!(notifier = self.name, receivers, "notify");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_receives_each_event() {
        let notifier = Notifier::new("test", 8);
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();
        assert_eq!(notifier.listener_count(), 2);

        notifier.notify(1);
        notifier.notify(2);
        assert_eq!(a.recv().await.unwrap(), 1);
        assert_eq!(a.recv().await.unwrap(), 2);
        assert_eq!(b.recv().await.unwrap(), 1);
    }

    #[test]
    fn notify_without_listeners_is_dropped() {
        let notifier: Notifier<u32> = Notifier::new("idle", 1);
        notifier.notify(7);
        let mut late = notifier.subscribe();
        assert!(late.try_recv().is_err());
    }
}
