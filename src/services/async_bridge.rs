//! Async Bridge: Communication between async Tokio runtime and sync update loop
//!
//! - Tokio tasks handle network I/O (option lists, connectivity checks)
//! - A watcher thread pushes settings written by other components
//! - The update loop stays synchronous and is the only writer of panel state
//! - std::sync::mpsc channels bridge the two worlds
//!
//! Messages are drained in arrival order and each is handled to completion
//! before the next one, so async results never race a keystroke.

use std::sync::mpsc;

use crate::config::Settings;
use crate::services::providers::{OptionSource, ProviderError, RemoteOption};

/// Messages sent from async tasks to the synchronous update loop
#[derive(Debug, Clone, PartialEq)]
pub enum AsyncMessage {
    /// A remote option list fetch completed
    OptionsLoaded {
        source: OptionSource,
        /// Server generation the fetch was started for
        generation: u64,
        result: Result<Vec<RemoteOption>, ProviderError>,
    },

    /// A connectivity check completed
    ConnectivityChecked {
        generation: u64,
        /// Server version on success
        result: Result<String, ProviderError>,
    },

    /// Another component saved a new settings document
    ExternalSettings(Settings),
}

/// Bridge between async Tokio runtime and sync update loop
///
/// - Lightweight, cloneable sender that can be passed to async tasks
/// - Non-blocking receiver checked each frame in the update loop
#[derive(Clone)]
pub struct AsyncBridge {
    sender: mpsc::Sender<AsyncMessage>,
    // Receiver wrapped in Arc<Mutex<>> to allow cloning
    receiver: std::sync::Arc<std::sync::Mutex<mpsc::Receiver<AsyncMessage>>>,
}

impl AsyncBridge {
    /// Create a new async bridge with an unbounded channel
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver: std::sync::Arc::new(std::sync::Mutex::new(receiver)),
        }
    }

    /// Get a cloneable sender for async tasks and threads
    pub fn sender(&self) -> mpsc::Sender<AsyncMessage> {
        self.sender.clone()
    }

    /// Try to receive pending messages (non-blocking)
    ///
    /// Returns all pending messages, oldest first.
    pub fn try_recv_all(&self) -> Vec<AsyncMessage> {
        let mut messages = Vec::new();

        if let Ok(receiver) = self.receiver.lock() {
            while let Ok(msg) = receiver.try_recv() {
                messages.push(msg);
            }
        }

        messages
    }
}

impl Default for AsyncBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked(generation: u64) -> AsyncMessage {
        AsyncMessage::ConnectivityChecked {
            generation,
            result: Ok("0.5.1".to_string()),
        }
    }

    #[test]
    fn test_async_bridge_send_receive() {
        let bridge = AsyncBridge::new();
        let sender = bridge.sender();

        sender
            .send(AsyncMessage::OptionsLoaded {
                source: OptionSource::Models,
                generation: 1,
                result: Ok(vec![RemoteOption::named("llama3")]),
            })
            .unwrap();

        let messages = bridge.try_recv_all();
        assert_eq!(messages.len(), 1);

        match &messages[0] {
            AsyncMessage::OptionsLoaded {
                source,
                generation,
                result,
            } => {
                assert_eq!(*source, OptionSource::Models);
                assert_eq!(*generation, 1);
                assert_eq!(result.as_ref().unwrap()[0].name, "llama3");
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_async_bridge_no_messages() {
        let bridge = AsyncBridge::new();
        assert!(bridge.try_recv_all().is_empty());
    }

    #[test]
    fn test_async_bridge_clone_bridge() {
        let bridge = AsyncBridge::new();
        let bridge_clone = bridge.clone();

        bridge
            .sender()
            .send(AsyncMessage::ExternalSettings(Settings::default()))
            .unwrap();

        let messages = bridge_clone.try_recv_all();
        assert_eq!(messages, vec![AsyncMessage::ExternalSettings(Settings::default())]);

        // Drained: a second call gets nothing
        assert!(bridge.try_recv_all().is_empty());
    }

    #[test]
    fn test_async_bridge_ordering() {
        let bridge = AsyncBridge::new();
        let sender1 = bridge.sender();
        let sender2 = sender1.clone();

        sender1.send(checked(1)).unwrap();
        sender2.send(checked(2)).unwrap();
        sender1.send(checked(3)).unwrap();

        let messages = bridge.try_recv_all();
        assert_eq!(messages, vec![checked(1), checked(2), checked(3)]);
    }
}
