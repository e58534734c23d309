//! BLE Control Channel
//!
//! Owns the single roulette session: connection state and the write link
//! live behind one lock so a link-loss event clears both together.
//!
//! Every `connect` takes an attempt number and only commits if that number
//! is still current; `disconnect` and newer attempts move it on. Each opened
//! link gets an id of its own, and its loss listener only acts on the session
//! while that id is the committed (or pending) link.

use crate::domain::booth::Booth;
use crate::domain::error::ChannelError;
use crate::domain::models::{AppEvent, ConnectionStatus};
use crate::domain::settings::Settings;
use crate::infrastructure::bluetooth::protocol::{self, DeviceFilter, Uuid128};
use crate::infrastructure::bluetooth::transport::{BleLink, BleTransport, DisconnectCallback};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Where to find the roulette device and its write characteristic
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub filter: DeviceFilter,
    pub service_uuid: Uuid128,
    pub rx_char_uuid: Uuid128,
}

impl ChannelConfig {
    /// Build from settings, keeping stock UUIDs for any override that fails to parse
    pub fn from_settings(settings: &Settings) -> Self {
        let service_uuid = parse_or_default(&settings.ble_service_uuid, protocol::UART_SERVICE);
        let rx_char_uuid = parse_or_default(&settings.ble_rx_char_uuid, protocol::UART_RX_CHAR);

        Self {
            filter: DeviceFilter {
                name_prefix: settings.device_name_prefix.clone(),
                service_uuid,
            },
            service_uuid,
            rx_char_uuid,
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

fn parse_or_default(value: &str, fallback: Uuid128) -> Uuid128 {
    protocol::parse_uuid(value).unwrap_or_else(|e| {
        warn!("Ignoring invalid UUID override {:?}: {}", value, e);
        fallback
    })
}

struct Session<L> {
    status: ConnectionStatus,
    link: Option<L>,
    device_name: Option<String>,
    /// Bumped by every connect and every disconnect
    attempt: u64,
    /// Source of link ids, never reused
    next_link_id: u64,
    /// Link behind `Connected`
    active_link: Option<u64>,
    /// Link opened by the running attempt, not committed yet
    pending_link: Option<u64>,
    pending_lost: bool,
}

impl<L> Session<L> {
    fn clear(&mut self) {
        self.status = ConnectionStatus::Disconnected;
        self.link = None;
        self.device_name = None;
        self.active_link = None;
        self.pending_link = None;
        self.pending_lost = false;
    }
}

pub struct ControlChannel<T: BleTransport> {
    transport: T,
    config: ChannelConfig,
    session: Arc<Mutex<Session<T::Link>>>,
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

fn lock_session<L>(session: &Mutex<Session<L>>) -> MutexGuard<'_, Session<L>> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn cancelled() -> ChannelError {
    ChannelError::ConnectionError("connection attempt was cancelled".to_string())
}

impl<T: BleTransport> ControlChannel<T> {
    pub fn new(
        transport: T,
        config: ChannelConfig,
        event_sender: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            transport,
            config,
            session: Arc::new(Mutex::new(Session {
                status: ConnectionStatus::Disconnected,
                link: None,
                device_name: None,
                attempt: 0,
                next_link_id: 0,
                active_link: None,
                pending_link: None,
                pending_lost: false,
            })),
            event_sender,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        lock_session(&self.session).status
    }

    pub fn device_name(&self) -> Option<String> {
        lock_session(&self.session).device_name.clone()
    }

    /// Pick a device, open its UART write characteristic and go `Connected`.
    ///
    /// A second call while one is in flight is rejected; a call while
    /// already connected does nothing.
    pub async fn connect(&self) -> Result<(), ChannelError> {
        let attempt = {
            let mut session = lock_session(&self.session);
            match session.status {
                ConnectionStatus::Connecting => return Err(ChannelError::ConnectInProgress),
                ConnectionStatus::Connected => return Ok(()),
                ConnectionStatus::Disconnected => {}
            }
            session.status = ConnectionStatus::Connecting;
            session.attempt += 1;
            session.pending_link = None;
            session.pending_lost = false;
            self.publish(ConnectionStatus::Connecting);
            session.attempt
        };

        match self.establish(attempt).await {
            Ok(name) => {
                info!("Connected to roulette device {}", name);
                Ok(())
            }
            Err(e) => {
                warn!("Roulette connection failed: {}", e);
                let mut session = lock_session(&self.session);
                // Otherwise a disconnect or a newer attempt owns the session
                if session.attempt == attempt && session.status == ConnectionStatus::Connecting {
                    session.clear();
                    self.publish(ConnectionStatus::Disconnected);
                }
                Err(e)
            }
        }
    }

    async fn establish(&self, attempt: u64) -> Result<String, ChannelError> {
        if !self.transport.is_available().await {
            return Err(ChannelError::UnsupportedEnvironment);
        }

        let peripheral = self
            .transport
            .request_device(&self.config.filter)
            .await
            .map_err(|e| ChannelError::ConnectionError(e.to_string()))?
            .ok_or(ChannelError::UserCancelled)?;
        debug!("Selected peripheral {:#X}", peripheral.address);

        let link = self
            .transport
            .open(&peripheral, self.config.service_uuid, self.config.rx_char_uuid)
            .await
            .map_err(|e| ChannelError::ConnectionError(e.to_string()))?;

        let link_id = {
            let mut session = lock_session(&self.session);
            if session.attempt != attempt {
                drop(session);
                let _ = link.disconnect();
                return Err(cancelled());
            }
            let id = session.next_link_id;
            session.next_link_id += 1;
            session.pending_link = Some(id);
            id
        };

        if let Err(e) = link.on_disconnect(self.link_loss_listener(link_id)) {
            let _ = link.disconnect();
            return Err(ChannelError::ConnectionError(e.to_string()));
        }

        let mut session = lock_session(&self.session);
        if session.attempt != attempt || session.status != ConnectionStatus::Connecting {
            drop(session);
            let _ = link.disconnect();
            return Err(cancelled());
        }
        if session.pending_lost {
            drop(session);
            let _ = link.disconnect();
            return Err(ChannelError::ConnectionError(
                "device dropped the link during setup".to_string(),
            ));
        }

        let name = if peripheral.name.is_empty() {
            link.name()
        } else {
            peripheral.name
        };
        session.status = ConnectionStatus::Connected;
        session.link = Some(link);
        session.device_name = Some(name.clone());
        session.active_link = Some(link_id);
        session.pending_link = None;
        let _ = self.event_sender.send(AppEvent::DeviceConnected(name.clone()));
        self.publish(ConnectionStatus::Connected);
        Ok(name)
    }

    fn link_loss_listener(&self, link_id: u64) -> DisconnectCallback {
        let session = Arc::downgrade(&self.session);
        let sender = self.event_sender.clone();

        Box::new(move || {
            let Some(session) = session.upgrade() else {
                return;
            };
            let mut session = lock_session(&session);
            if session.active_link == Some(link_id) {
                session.clear();
                warn!("Roulette device link lost");
                let _ = sender.send(AppEvent::ConnectionStatus(ConnectionStatus::Disconnected));
            } else if session.pending_link == Some(link_id) {
                session.pending_lost = true;
            }
        })
    }

    /// Drop the link and cancel any attempt in flight. Safe to call in any
    /// state; errors from a dead link are ignored.
    pub fn disconnect(&self) {
        let link = {
            let mut session = lock_session(&self.session);
            let previous = session.status;
            let link = session.link.take();
            session.attempt += 1;
            session.clear();
            if previous != ConnectionStatus::Disconnected {
                self.publish(ConnectionStatus::Disconnected);
            }
            link
        };

        // Outside the lock: closing may fire the link's own loss listener
        if let Some(link) = link {
            if let Err(e) = link.disconnect() {
                debug!("Ignoring error while closing link: {}", e);
            }
            info!("Disconnected from roulette device");
        }
    }

    /// Write `START:<token>\n` for the given booth. No acknowledgement is awaited
    /// from the device and no retry is attempted.
    pub async fn send_start(&self, booth: Booth) -> Result<(), ChannelError> {
        let link = {
            let session = lock_session(&self.session);
            if session.status != ConnectionStatus::Connected {
                return Err(ChannelError::NotConnected);
            }
            session.link.clone().ok_or(ChannelError::NotConnected)?
        };

        let token = booth.token();
        link.write(&protocol::start_frame(token))
            .await
            .map_err(|e| ChannelError::TransmissionError(e.to_string()))?;

        info!("Sent start command for booth {} ({})", booth.number(), token);
        let _ = self.event_sender.send(AppEvent::StartSent(token.to_string()));
        Ok(())
    }

    fn publish(&self, status: ConnectionStatus) {
        let _ = self.event_sender.send(AppEvent::ConnectionStatus(status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::bluetooth::transport::fake::FakeTransport;
    use std::sync::atomic::Ordering;

    fn channel(
        transport: FakeTransport,
    ) -> (
        ControlChannel<FakeTransport>,
        mpsc::UnboundedReceiver<AppEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ControlChannel::new(transport, ChannelConfig::default(), tx), rx)
    }

    fn statuses(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<ConnectionStatus> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::ConnectionStatus(status) = event {
                out.push(status);
            }
        }
        out
    }

    #[tokio::test]
    async fn test_send_start_while_disconnected_writes_nothing() {
        let transport = FakeTransport::new();
        let link = transport.link.clone();
        let (channel, _rx) = channel(transport);

        let result = channel.send_start(Booth::default()).await;
        assert_eq!(result, Err(ChannelError::NotConnected));
        assert!(link.written().is_empty());
    }

    #[tokio::test]
    async fn test_connect_then_send_start_writes_frame() {
        let transport = FakeTransport::new();
        let link = transport.link.clone();
        let (channel, mut rx) = channel(transport);

        channel.connect().await.unwrap();
        assert_eq!(channel.status(), ConnectionStatus::Connected);
        assert_eq!(channel.device_name().as_deref(), Some("ROULETTE-TEST"));
        assert_eq!(
            statuses(&mut rx),
            vec![ConnectionStatus::Connecting, ConnectionStatus::Connected]
        );

        channel.send_start(Booth::new(3).unwrap()).await.unwrap();
        assert_eq!(link.written(), vec![b"START:C3\n".to_vec()]);
    }

    #[tokio::test]
    async fn test_connect_failures_leave_channel_disconnected() {
        let mut unsupported = FakeTransport::new();
        unsupported.available = false;
        let mut cancelled = FakeTransport::new();
        cancelled.pick = None;
        let mut broken = FakeTransport::new();
        broken.fail_open = true;

        let (channel_a, _) = channel(unsupported);
        assert_eq!(
            channel_a.connect().await,
            Err(ChannelError::UnsupportedEnvironment)
        );
        assert_eq!(channel_a.status(), ConnectionStatus::Disconnected);

        let (channel_b, _) = channel(cancelled);
        assert_eq!(channel_b.connect().await, Err(ChannelError::UserCancelled));
        assert_eq!(channel_b.status(), ConnectionStatus::Disconnected);

        let (channel_c, mut rx) = channel(broken);
        assert!(matches!(
            channel_c.connect().await,
            Err(ChannelError::ConnectionError(_))
        ));
        assert_eq!(channel_c.status(), ConnectionStatus::Disconnected);
        assert_eq!(statuses(&mut rx).last(), Some(&ConnectionStatus::Disconnected));
    }

    #[tokio::test]
    async fn test_overlapping_connect_is_rejected() {
        let (channel, _rx) = channel(FakeTransport::new());

        let (first, second) = tokio::join!(channel.connect(), channel.connect());
        assert_eq!(first, Ok(()));
        assert_eq!(second, Err(ChannelError::ConnectInProgress));
        assert_eq!(channel.status(), ConnectionStatus::Connected);

        // Already connected: no-op
        assert_eq!(channel.connect().await, Ok(()));
    }

    #[tokio::test]
    async fn test_link_loss_clears_session() {
        let transport = FakeTransport::new();
        let link = transport.link.clone();
        let (channel, mut rx) = channel(transport);
        channel.connect().await.unwrap();
        let _ = statuses(&mut rx);

        link.drop_link();
        assert_eq!(channel.status(), ConnectionStatus::Disconnected);
        assert_eq!(channel.device_name(), None);
        assert_eq!(statuses(&mut rx), vec![ConnectionStatus::Disconnected]);
        assert_eq!(
            channel.send_start(Booth::default()).await,
            Err(ChannelError::NotConnected)
        );
        assert!(link.written().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent_and_swallows_errors() {
        let transport = FakeTransport::new();
        let link = transport.link.clone();
        let (channel, mut rx) = channel(transport);

        channel.disconnect();
        assert!(statuses(&mut rx).is_empty());

        channel.connect().await.unwrap();
        channel.disconnect();
        channel.disconnect();
        assert_eq!(channel.status(), ConnectionStatus::Disconnected);
        assert_eq!(link.disconnect_calls.load(Ordering::SeqCst), 1);

        // A late event from the first link must not disturb a new session
        channel.connect().await.unwrap();
        link.fire_listener(0);
        assert_eq!(channel.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_disconnect_during_connect_cancels_attempt() {
        let transport = FakeTransport::new();
        let link = transport.link.clone();
        let (channel, mut rx) = channel(transport);

        let (result, ()) = tokio::join!(channel.connect(), async { channel.disconnect() });

        assert!(matches!(result, Err(ChannelError::ConnectionError(_))));
        assert_eq!(channel.status(), ConnectionStatus::Disconnected);
        // The link opened for the cancelled attempt is closed again
        assert_eq!(link.disconnect_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            statuses(&mut rx),
            vec![ConnectionStatus::Connecting, ConnectionStatus::Disconnected]
        );
        assert_eq!(
            channel.send_start(Booth::default()).await,
            Err(ChannelError::NotConnected)
        );
    }

    #[tokio::test]
    async fn test_reconnect_after_cancel_follows_live_link() {
        let transport = FakeTransport::new();
        let link = transport.link.clone();
        let (channel, mut rx) = channel(transport);

        let (first, second) = tokio::join!(channel.connect(), async {
            channel.disconnect();
            channel.connect().await
        });

        assert!(matches!(first, Err(ChannelError::ConnectionError(_))));
        assert_eq!(second, Ok(()));
        assert_eq!(channel.status(), ConnectionStatus::Connected);
        assert_eq!(
            statuses(&mut rx),
            vec![
                ConnectionStatus::Connecting,
                ConnectionStatus::Disconnected,
                ConnectionStatus::Connecting,
                ConnectionStatus::Connected,
            ]
        );

        // Losing the live link still tears the session down
        link.drop_link();
        assert_eq!(channel.status(), ConnectionStatus::Disconnected);
        assert_eq!(statuses(&mut rx), vec![ConnectionStatus::Disconnected]);
        assert_eq!(
            channel.send_start(Booth::default()).await,
            Err(ChannelError::NotConnected)
        );
        assert!(link.written().is_empty());
    }

    #[tokio::test]
    async fn test_link_loss_during_setup_fails_attempt() {
        let transport = FakeTransport::new();
        let link = transport.link.clone();
        let (channel, mut rx) = channel(transport);

        link.drop_during_setup.store(true, Ordering::SeqCst);
        assert!(matches!(
            channel.connect().await,
            Err(ChannelError::ConnectionError(_))
        ));
        assert_eq!(channel.status(), ConnectionStatus::Disconnected);
        assert_eq!(link.disconnect_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            statuses(&mut rx),
            vec![ConnectionStatus::Connecting, ConnectionStatus::Disconnected]
        );

        // The next attempt starts clean
        link.drop_during_setup.store(false, Ordering::SeqCst);
        channel.connect().await.unwrap();
        assert_eq!(channel.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_write_fault_is_transmission_error() {
        let transport = FakeTransport::new();
        let link = transport.link.clone();
        let (channel, _rx) = channel(transport);
        channel.connect().await.unwrap();

        link.fail_writes.store(true, Ordering::SeqCst);
        assert!(matches!(
            channel.send_start(Booth::default()).await,
            Err(ChannelError::TransmissionError(_))
        ));
        assert_eq!(channel.status(), ConnectionStatus::Connected);

        link.fail_writes.store(false, Ordering::SeqCst);
        channel.send_start(Booth::default()).await.unwrap();
        assert_eq!(link.written(), vec![b"START:A1\n".to_vec()]);
    }
}
