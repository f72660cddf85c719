//! Mock transport for testing
//!
//! Scriptable stand-in for the BLE/serial link: every write pops one
//! scripted batch of notification frames and pushes them into the
//! subscription, so request/response and multi-notification flows can
//! be driven without hardware. Clones share state, which lets a test
//! keep a handle after moving the transport into a client.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::{DiscoveredDevice, Transport, error::*};

const SUBSCRIPTION_DEPTH: usize = 32;

/// Mock transport for unit testing protocol flows
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

struct MockInner {
    enabled: AtomicBool,
    connected: AtomicBool,
    /// Link failure injection: writes fail while down
    link_up: AtomicBool,
    devices: parking_lot::Mutex<Vec<DiscoveredDevice>>,
    /// One batch of frames is released per write
    replies: parking_lot::Mutex<VecDeque<Vec<Bytes>>>,
    /// Captured writes, JSON frames and raw chunks alike
    write_log: parking_lot::Mutex<Vec<Bytes>>,
    subscription: parking_lot::Mutex<Option<mpsc::Sender<Bytes>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_devices(vec![DiscoveredDevice {
            uuid: "mock-0001".to_string(),
            name: "iMatch 8000".to_string(),
        }])
    }

    /// Create with a specific discovery result (empty to simulate no
    /// reader in range)
    pub fn with_devices(devices: Vec<DiscoveredDevice>) -> Self {
        Self {
            inner: Arc::new(MockInner {
                enabled: AtomicBool::new(true),
                connected: AtomicBool::new(false),
                link_up: AtomicBool::new(true),
                devices: parking_lot::Mutex::new(devices),
                replies: parking_lot::Mutex::new(VecDeque::new()),
                write_log: parking_lot::Mutex::new(Vec::new()),
                subscription: parking_lot::Mutex::new(None),
            }),
        }
    }

    /// Script the batch of frames released by the next unscripted
    /// write (FIFO; writes beyond the script release nothing)
    pub fn script_reply(&self, frames: impl IntoIterator<Item = Bytes>) {
        self.inner
            .replies
            .lock()
            .push_back(frames.into_iter().collect());
    }

    /// Script a single JSON notification line as the next reply
    pub fn script_notification(&self, json: &str) {
        self.script_reply([Bytes::from(json.to_string())]);
    }

    /// Push an unsolicited notification to the subscriber
    pub async fn push(&self, frame: Bytes) {
        let sender = self.inner.subscription.lock().clone();
        if let Some(tx) = sender {
            let _ = tx.send(frame).await;
        }
    }

    /// Get all captured writes
    pub fn writes(&self) -> Vec<Bytes> {
        self.inner.write_log.lock().clone()
    }

    /// Clear captured writes
    pub fn clear_writes(&self) {
        self.inner.write_log.lock().clear();
    }

    /// Toggle radio availability
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Simulate a dead link: subsequent writes fail
    pub fn drop_link(&self) {
        self.inner.link_up.store(false, Ordering::SeqCst);
    }

    /// Restore the link after [`MockTransport::drop_link`]
    pub fn restore_link(&self) {
        self.inner.link_up.store(true, Ordering::SeqCst);
    }

    async fn release_batch(&self) {
        let batch = self.inner.replies.lock().pop_front();
        let Some(frames) = batch else {
            return;
        };

        let sender = self.inner.subscription.lock().clone();
        if let Some(tx) = sender {
            for frame in frames {
                let _ = tx.send(frame).await;
            }
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn is_enabled(&self) -> Result<bool> {
        Ok(self.inner.enabled.load(Ordering::SeqCst))
    }

    async fn list(&mut self) -> Result<Vec<DiscoveredDevice>> {
        Ok(self.inner.devices.lock().clone())
    }

    async fn connect(&mut self, uuid: &str) -> Result<()> {
        if self.inner.connected.load(Ordering::SeqCst) {
            return Err(Error::AlreadyConnected);
        }
        if !self.inner.devices.lock().iter().any(|d| d.uuid == uuid) {
            return Err(Error::DeviceNotFound);
        }

        self.inner.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.inner.connected.store(false, Ordering::SeqCst);
        self.inner.subscription.lock().take();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        if !self.inner.connected.load(Ordering::SeqCst) {
            return Err(Error::NotConnected);
        }
        if !self.inner.link_up.load(Ordering::SeqCst) {
            return Err(Error::ConnectionClosed);
        }

        self.inner
            .write_log
            .lock()
            .push(Bytes::copy_from_slice(data));
        self.release_batch().await;
        Ok(())
    }

    fn subscribe(&mut self) -> Result<mpsc::Receiver<Bytes>> {
        if !self.inner.connected.load(Ordering::SeqCst) {
            return Err(Error::NotConnected);
        }

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_DEPTH);
        *self.inner.subscription.lock() = Some(tx);
        Ok(rx)
    }

    fn remote_addr(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_write_capture() {
        let mut mock = MockTransport::new();
        mock.connect("mock-0001").await.unwrap();

        mock.write(b"hello").await.unwrap();
        mock.write(b"world").await.unwrap();

        let writes = mock.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].as_ref(), b"hello");
        assert_eq!(writes[1].as_ref(), b"world");
    }

    #[tokio::test]
    async fn test_scripted_replies_released_per_write() {
        let mut mock = MockTransport::new();
        mock.connect("mock-0001").await.unwrap();
        let mut rx = mock.subscribe().unwrap();

        mock.script_reply([Bytes::from_static(b"first"), Bytes::from_static(b"second")]);
        mock.script_notification("third");

        mock.write(b"cmd1").await.unwrap();
        assert_eq!(rx.recv().await.unwrap().as_ref(), b"first");
        assert_eq!(rx.recv().await.unwrap().as_ref(), b"second");

        mock.write(b"cmd2").await.unwrap();
        assert_eq!(rx.recv().await.unwrap().as_ref(), b"third");

        // Unscripted writes release nothing
        mock.write(b"cmd3").await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsolicited_push() {
        let mut mock = MockTransport::new();
        mock.connect("mock-0001").await.unwrap();
        let mut rx = mock.subscribe().unwrap();

        mock.push(Bytes::from_static(b"surprise")).await;
        assert_eq!(rx.recv().await.unwrap().as_ref(), b"surprise");
    }

    #[tokio::test]
    async fn test_discovery_and_connect() {
        let mut mock = MockTransport::new();
        assert!(mock.is_enabled().await.unwrap());

        let devices = mock.list().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "iMatch 8000");

        assert!(matches!(
            mock.connect("nope").await,
            Err(Error::DeviceNotFound)
        ));
        mock.connect("mock-0001").await.unwrap();
        assert!(mock.is_connected());
    }

    #[tokio::test]
    async fn test_link_failure_injection() {
        let mut mock = MockTransport::new();
        mock.connect("mock-0001").await.unwrap();

        mock.drop_link();
        assert!(matches!(
            mock.write(b"x").await,
            Err(Error::ConnectionClosed)
        ));

        mock.restore_link();
        assert!(mock.write(b"x").await.is_ok());
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let mut mock = MockTransport::new();
        let handle = mock.clone();

        mock.connect("mock-0001").await.unwrap();
        mock.write(b"from original").await.unwrap();

        assert_eq!(handle.writes().len(), 1);
        assert!(handle.inner.connected.load(Ordering::SeqCst));
    }
}
