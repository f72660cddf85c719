//! High-level device interface
//!
//! [`Device`] drives one iMatch reader over a [`Transport`]: it runs
//! discovery, owns the notification subscription and matches replies
//! to requests. The wire protocol carries no correlation ids, so every
//! in-flight request lives in a pending table keyed by a synthetic id
//! and matched by the echoed `(device, method)` pair; notifications
//! nobody is waiting for go to the [`Observer`].

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{Datelike, NaiveDateTime, Timelike};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use imatch_core::constants::smartcard;
use imatch_core::{
    DEFAULT_REQUEST_TIMEOUT, DeviceCommand, DeviceKind, DeviceNotification, Method,
    NotificationPayload, Session,
};
use imatch_transport::{DiscoveredDevice, TcpTransport, Transport};
use imatch_types::{BatteryStatus, DeviceInfo};

use crate::error::{Error, Result};
use crate::events::{DeviceEvent, Observer, TracingObserver};

/// Buffered notifications per multi-notification flow
const STREAM_DEPTH: usize = 32;

/// Client for an iMatch biometric reader
///
/// # Example
///
/// ```no_run
/// use imatch::Device;
///
/// # async fn run() -> imatch::Result<()> {
/// let mut device = Device::new("192.168.4.1", 3333);
/// device.connect().await?;
///
/// let info = device.info().await?;
/// println!("firmware {}", info.version);
///
/// device.disconnect().await?;
/// # Ok(())
/// # }
/// ```
pub struct Device {
    transport: Box<dyn Transport>,
    session: Session,
    observer: Arc<dyn Observer>,
    pending: PendingTable,
    dispatcher: Option<JoinHandle<()>>,
    timeout: Duration,
    peer: Option<DiscoveredDevice>,
}

impl Device {
    /// Create a device reachable through a TCP serial bridge
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self::with_transport(Box::new(TcpTransport::new(addr, port)))
    }

    /// Create a device over any transport
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            session: Session::new(),
            observer: Arc::new(TracingObserver),
            pending: Arc::new(parking_lot::Mutex::new(Vec::new())),
            dispatcher: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            peer: None,
        }
    }

    /// Set the reply timeout for request/response commands
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Install an event sink replacing the default [`TracingObserver`]
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Whether the link is up
    pub fn is_connected(&self) -> bool {
        self.session.is_connected() && self.transport.is_connected()
    }

    /// The reader this device is connected to, if any
    pub fn peer(&self) -> Option<&DiscoveredDevice> {
        self.peer.as_ref()
    }

    /// Discover a reader and open the link.
    ///
    /// Checks the transport, connects to the first reader found,
    /// starts the notification dispatcher and probes the firmware
    /// report; the probe's answer arrives as a notification and lands
    /// with the observer.
    pub async fn connect(&mut self) -> Result<()> {
        self.session.begin_connect()?;

        match self.establish().await {
            Ok(()) => Ok(()),
            Err(error) => {
                // Roll back to a clean disconnected state so a later
                // attempt can start over
                self.abort_dispatcher();
                let _ = self.transport.disconnect().await;
                self.session.close();
                self.peer = None;
                Err(error)
            }
        }
    }

    async fn establish(&mut self) -> Result<()> {
        if !self.transport.is_enabled().await? {
            warn!("Transport is not enabled");
            return Err(imatch_transport::Error::NotEnabled.into());
        }

        debug!("Scanning for readers...");
        let mut devices = self.transport.list().await?;
        if devices.is_empty() {
            return Err(imatch_transport::Error::DeviceNotFound.into());
        }
        let peer = devices.remove(0);

        info!("Connecting to {} ({})...", peer.name, peer.uuid);
        self.transport.connect(&peer.uuid).await?;

        let subscription = self.transport.subscribe()?;
        self.dispatcher = Some(spawn_dispatcher(
            subscription,
            Arc::clone(&self.pending),
            Arc::clone(&self.observer),
        ));

        self.session.open()?;
        self.observer.on_event(&DeviceEvent::Connected {
            uuid: peer.uuid.clone(),
            name: peer.name.clone(),
        });
        self.peer = Some(peer);

        // Probe the firmware report right away; the reply comes back
        // as a notification for the observer
        let probe = DeviceCommand::new(DeviceKind::Sys, Method::Info, "");
        self.write_command(&probe).await?;

        Ok(())
    }

    /// Close the link. A no-op when already disconnected.
    pub async fn disconnect(&mut self) -> Result<()> {
        if !self.is_connected() {
            return Ok(());
        }

        info!("Disconnecting...");
        self.abort_dispatcher();
        self.transport.disconnect().await?;
        self.session.close();
        self.peer = None;
        self.observer.on_event(&DeviceEvent::Disconnected);

        Ok(())
    }

    /// Send a command without waiting for any reply
    pub async fn send_command(&mut self, command: &DeviceCommand) -> Result<()> {
        self.ensure_connected()?;
        self.write_command(command).await
    }

    /// Send a command and wait for the notification echoing its
    /// `(device, method)` pair
    pub async fn request(&mut self, command: DeviceCommand) -> Result<DeviceNotification> {
        self.ensure_connected()?;

        // Register before writing so the echo cannot race past us
        let waiter = self.register_reply(command.device, command.method.clone());
        self.write_command(&command).await?;
        self.await_reply(waiter).await
    }

    /// Send a command and wait for the next notification, whatever its
    /// method.
    ///
    /// For exchanges where the reply method is not the echoed command
    /// method, such as the fast-flash readiness announce.
    pub async fn request_any(&mut self, command: DeviceCommand) -> Result<DeviceNotification> {
        self.ensure_connected()?;

        let waiter = self.register_any();
        self.write_command(&command).await?;
        self.await_reply(waiter).await
    }

    /// Request the firmware report
    pub async fn info(&mut self) -> Result<DeviceInfo> {
        let reply = self
            .request(DeviceCommand::new(DeviceKind::Sys, Method::Info, ""))
            .await?;

        match reply.payload {
            NotificationPayload::Info(info) => {
                debug!("Device info: {}", info);
                Ok(info)
            }
            other => Err(Error::UnexpectedResponse(format!(
                "info answered with {other:?}"
            ))),
        }
    }

    /// Request the battery report
    pub async fn battery_status(&mut self) -> Result<BatteryStatus> {
        let reply = self
            .request(DeviceCommand::new(DeviceKind::Sys, Method::Status, ""))
            .await?;

        match reply.payload {
            NotificationPayload::Status(status) => Ok(status),
            other => Err(Error::UnexpectedResponse(format!(
                "status answered with {other:?}"
            ))),
        }
    }

    /// Set the reader's clock and return the echoed timestamp.
    ///
    /// The wire format follows the reader's clock API: zero-padded
    /// month, everything else unpadded, ISO weekday (Monday = 1) and a
    /// literal trailing zero.
    pub async fn sync_datetime(&mut self, when: NaiveDateTime) -> Result<String> {
        let params = format!(
            "({}, {:02}, {}, {}, {}, {}, {}, 0)",
            when.year(),
            when.month(),
            when.day(),
            when.weekday().number_from_monday(),
            when.hour(),
            when.minute(),
            when.second()
        );

        let reply = self
            .request(DeviceCommand::new(DeviceKind::Sys, Method::Datetime, params))
            .await?;

        match reply.payload {
            NotificationPayload::Text(echo) => {
                debug!("Device clock set to {}", echo);
                Ok(echo)
            }
            other => Err(Error::UnexpectedResponse(format!(
                "datetime answered with {other:?}"
            ))),
        }
    }

    /// Restart the reader and tear down this side of the link.
    ///
    /// The reader drops the connection while it reboots; call
    /// [`Device::connect`] once it is back up.
    pub async fn restart(&mut self) -> Result<()> {
        self.ensure_connected()?;

        warn!("Restarting device");
        let command = DeviceCommand::new(DeviceKind::Sys, Method::Restart, "");
        self.write_command(&command).await?;

        self.disconnect().await
    }

    /// Power the smartcard slot and start ATR-based card detection.
    ///
    /// Card data arrives as notifications through the observer.
    pub async fn read_smartcard(&mut self) -> Result<()> {
        debug!("Powering smartcard slot");
        let command =
            DeviceCommand::new(DeviceKind::Scr, Method::PowerOn, smartcard::READ_KNOWN_ATRS);
        self.send_command(&command).await
    }

    pub(crate) fn ensure_connected(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(())
    }

    pub(crate) fn emit(&self, event: DeviceEvent) {
        self.observer.on_event(&event);
    }

    /// Write raw bytes, bypassing the command envelope (fast-flash
    /// chunks)
    pub(crate) async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        trace!("Writing {} raw bytes", data.len());
        self.transport.write(data).await?;
        Ok(())
    }

    /// Open a stream over every notification a peripheral emits.
    ///
    /// Registered entries with an exact `(device, method)` match still
    /// win over the stream, so plain requests keep working while a
    /// stream is live. The stream deregisters itself when dropped.
    pub(crate) fn device_stream(&self, device: DeviceKind) -> NotificationStream {
        let (tx, rx) = mpsc::channel(STREAM_DEPTH);
        let _guard = self.enroll(PendingKind::Stream { device, tx });
        NotificationStream { rx, _guard }
    }

    /// Next notification from a stream, bounded by the request timeout
    pub(crate) async fn next_from(
        &self,
        stream: &mut NotificationStream,
    ) -> Result<DeviceNotification> {
        match timeout(self.timeout, stream.rx.recv()).await {
            Ok(Some(notification)) => Ok(notification),
            Ok(None) => Err(imatch_transport::Error::ConnectionClosed.into()),
            Err(_) => Err(Error::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    async fn write_command(&mut self, command: &DeviceCommand) -> Result<()> {
        debug!("Sending {}", command);
        let frame = command.encode()?;
        self.transport.write(&frame).await?;
        Ok(())
    }

    fn register_reply(&self, device: DeviceKind, method: Method) -> ReplyWaiter {
        let (tx, rx) = oneshot::channel();
        let _guard = self.enroll(PendingKind::Reply { device, method, tx });
        ReplyWaiter { rx, _guard }
    }

    fn register_any(&self) -> ReplyWaiter {
        let (tx, rx) = oneshot::channel();
        let _guard = self.enroll(PendingKind::NextAny { tx });
        ReplyWaiter { rx, _guard }
    }

    fn enroll(&self, kind: PendingKind) -> PendingGuard {
        let id = self.session.next_correlation_id();
        self.pending.lock().push(PendingEntry { id, kind });
        PendingGuard {
            table: Arc::clone(&self.pending),
            id,
        }
    }

    async fn await_reply(&self, waiter: ReplyWaiter) -> Result<DeviceNotification> {
        let ReplyWaiter { rx, _guard } = waiter;

        match timeout(self.timeout, rx).await {
            Ok(Ok(notification)) => Ok(notification),
            // Dispatcher dropped the sender; the link is gone
            Ok(Err(_)) => Err(imatch_transport::Error::ConnectionClosed.into()),
            Err(_) => Err(Error::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    fn abort_dispatcher(&mut self) {
        if let Some(handle) = self.dispatcher.take() {
            handle.abort();
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.abort_dispatcher();
    }
}

type PendingTable = Arc<parking_lot::Mutex<Vec<PendingEntry>>>;

/// One registered waiter, keyed by a synthetic correlation id that
/// never touches the wire
struct PendingEntry {
    id: u64,
    kind: PendingKind,
}

enum PendingKind {
    /// One-shot waiter for the echo of a specific `(device, method)`
    Reply {
        device: DeviceKind,
        method: Method,
        tx: oneshot::Sender<DeviceNotification>,
    },
    /// Long-lived stream over one peripheral's notifications
    Stream {
        device: DeviceKind,
        tx: mpsc::Sender<DeviceNotification>,
    },
    /// One-shot waiter for whatever arrives next
    NextAny {
        tx: oneshot::Sender<DeviceNotification>,
    },
}

/// Removes its pending entry when dropped, so a cancelled or timed-out
/// request can never leak a waiter
struct PendingGuard {
    table: PendingTable,
    id: u64,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.table.lock().retain(|entry| entry.id != self.id);
    }
}

struct ReplyWaiter {
    rx: oneshot::Receiver<DeviceNotification>,
    _guard: PendingGuard,
}

/// Handle to a live per-device notification stream
pub(crate) struct NotificationStream {
    rx: mpsc::Receiver<DeviceNotification>,
    _guard: PendingGuard,
}

fn spawn_dispatcher(
    mut subscription: mpsc::Receiver<Bytes>,
    pending: PendingTable,
    observer: Arc<dyn Observer>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = subscription.recv().await {
            match DeviceNotification::decode(&frame) {
                Ok(notification) => route(&pending, &observer, notification).await,
                Err(error) => {
                    warn!("Dropping malformed frame: {}", error);
                    observer.on_event(&DeviceEvent::Malformed {
                        reason: error.to_string(),
                    });
                }
            }
        }
        trace!("Notification stream closed");
    })
}

/// Resolution order: exact `(device, method)` match first, then a live
/// device stream, then the oldest any-waiter, else the observer.
async fn route(pending: &PendingTable, observer: &Arc<dyn Observer>, n: DeviceNotification) {
    let reply = {
        let mut table = pending.lock();
        table
            .iter()
            .position(|entry| {
                matches!(
                    &entry.kind,
                    PendingKind::Reply { device, method, .. }
                        if *device == n.device && *method == n.method
                )
            })
            .map(|index| table.remove(index))
    };
    if let Some(entry) = reply {
        if let PendingKind::Reply { tx, .. } = entry.kind {
            if tx.send(n).is_err() {
                trace!("Requester went away before its reply arrived");
            }
        }
        return;
    }

    let stream = {
        let table = pending.lock();
        table.iter().find_map(|entry| match &entry.kind {
            PendingKind::Stream { device, tx } if *device == n.device => Some(tx.clone()),
            _ => None,
        })
    };
    let n = if let Some(tx) = stream {
        match tx.send(n).await {
            Ok(()) => return,
            // Stream consumer gone but not yet deregistered
            Err(error) => error.0,
        }
    } else {
        n
    };

    let any = {
        let mut table = pending.lock();
        table
            .iter()
            .position(|entry| matches!(entry.kind, PendingKind::NextAny { .. }))
            .map(|index| table.remove(index))
    };
    if let Some(entry) = any {
        if let PendingKind::NextAny { tx } = entry.kind {
            if tx.send(n).is_err() {
                trace!("Requester went away before its reply arrived");
            }
        }
        return;
    }

    observer.on_event(&DeviceEvent::Notification(n));
}
