use roomlink_core::SignalingMessage;
use std::collections::VecDeque;

/// Session messages produced before the socket is registered.
#[derive(Debug, Default)]
pub struct OutgoingQueue {
    messages: VecDeque<SignalingMessage>,
}

impl OutgoingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, message: SignalingMessage) {
        self.messages.push_back(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Replays every message in FIFO order and leaves the queue empty.
    ///
    /// `send` may enqueue more messages through the queue reference it is
    /// given; those land behind the pending ones and are replayed in the same
    /// pass.
    pub fn drain_with<F>(&mut self, mut send: F)
    where
        F: FnMut(&mut OutgoingQueue, SignalingMessage),
    {
        while let Some(message) = self.messages.pop_front() {
            send(self, message);
        }
    }
}
