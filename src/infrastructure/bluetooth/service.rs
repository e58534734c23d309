//! Bluetooth Service Module
//!
//! Runs on the Bluetooth worker thread: takes commands from the UI, drives
//! the control channel and turns failures into notices for the user.

use crate::domain::booth::BoothRegistry;
use crate::domain::error::ChannelError;
use crate::domain::models::{AppEvent, BluetoothCommand, MessageSeverity, StatusMessage};
use crate::infrastructure::bluetooth::channel::{ChannelConfig, ControlChannel};
use crate::infrastructure::bluetooth::transport::BleTransport;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub struct BluetoothService<T: BleTransport> {
    channel: ControlChannel<T>,
    booths: BoothRegistry,
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

impl<T: BleTransport> BluetoothService<T> {
    pub fn new(
        transport: T,
        config: ChannelConfig,
        booths: BoothRegistry,
        event_sender: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            channel: ControlChannel::new(transport, config, event_sender.clone()),
            booths,
            event_sender,
        }
    }

    pub fn channel(&self) -> &ControlChannel<T> {
        &self.channel
    }

    /// Process commands until the UI side hangs up
    pub async fn run(&self, mut commands: mpsc::UnboundedReceiver<BluetoothCommand>) {
        info!("Bluetooth worker started");
        while let Some(cmd) = commands.recv().await {
            self.handle(cmd).await;
        }
        self.channel.disconnect();
        info!("Bluetooth worker stopped");
    }

    pub async fn handle(&self, cmd: BluetoothCommand) {
        match cmd {
            BluetoothCommand::Connect => {
                if let Err(e) = self.channel.connect().await {
                    self.report(&e);
                }
            }
            BluetoothCommand::Disconnect => self.channel.disconnect(),
            BluetoothCommand::SendStart => {
                let booth = self.booths.get_booth();
                match self.channel.send_start(booth).await {
                    Ok(()) => self.notify(
                        format!("룰렛 시작 신호를 보냈어요 (START:{})", booth.token()),
                        MessageSeverity::Success,
                    ),
                    Err(e) => self.report(&e),
                }
            }
        }
    }

    fn report(&self, e: &ChannelError) {
        let (message, severity) = match e {
            ChannelError::UserCancelled | ChannelError::ConnectInProgress => {
                warn!("{}", e);
                (e.to_string(), MessageSeverity::Warning)
            }
            ChannelError::TransmissionError(_) => {
                error!("{}", e);
                (format!("{} - tap again to retry", e), MessageSeverity::Error)
            }
            _ => {
                error!("{}", e);
                (e.to_string(), MessageSeverity::Error)
            }
        };
        self.notify(message, severity);
    }

    fn notify(&self, message: String, severity: MessageSeverity) {
        let _ = self
            .event_sender
            .send(AppEvent::LogMessage(StatusMessage { message, severity }));
    }
}
