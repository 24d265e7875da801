//! One platform connection: read lines, dispatch, write what the core emits.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;

use pinhub_app::commands::CommandTable;
use pinhub_app::event_bus::BusMessage;
use pinhub_app::ports::{ConfigStore, EventSink, PlatformRequestSink};
use pinhub_app::registry::DeviceRegistry;

use crate::error::StdioError;
use crate::wire::{Inbound, Outbound};

/// Drives a [`DeviceRegistry`] from a line stream.
///
/// `outbound` must be the receiving end of the bus the registry's sinks
/// publish to. It is drained after startup, after every dispatched line and
/// after shutdown, so every event caused by a line is written before that
/// line's response.
pub struct Session<S, E, P> {
    registry: DeviceRegistry<S, E, P>,
    commands: CommandTable<S, E, P>,
    outbound: UnboundedReceiver<BusMessage>,
}

impl<S, E, P> Session<S, E, P>
where
    S: ConfigStore,
    E: EventSink,
    P: PlatformRequestSink,
{
    pub fn new(
        registry: DeviceRegistry<S, E, P>,
        commands: CommandTable<S, E, P>,
        outbound: UnboundedReceiver<BusMessage>,
    ) -> Self {
        Self {
            registry,
            commands,
            outbound,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry<S, E, P> {
        &self.registry
    }

    /// Start the registry, then handle lines from `reader` until it closes.
    ///
    /// Malformed lines are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StdioError`] if the stream fails or the registry cannot
    /// read its persisted device list.
    pub async fn run<R, W>(&mut self, reader: R, writer: &mut W) -> Result<(), StdioError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.registry.start()?;
        self.drain(writer).await?;

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let reply = self.handle_line(line);
            self.drain(writer).await?;
            if let Some(reply) = reply {
                write_line(writer, &reply).await?;
                writer.flush().await?;
            }
        }
        tracing::info!("input closed");
        Ok(())
    }

    /// Stop every device and write the resulting offline events and
    /// unsubscribe requests.
    ///
    /// # Errors
    ///
    /// Returns [`StdioError::Io`] if writing fails.
    pub async fn shutdown<W>(&mut self, writer: &mut W) -> Result<(), StdioError>
    where
        W: AsyncWrite + Unpin,
    {
        self.registry.stop();
        self.drain(writer).await
    }

    fn handle_line(&mut self, line: &str) -> Option<Outbound> {
        let inbound = match serde_json::from_str::<Inbound>(line) {
            Ok(inbound) => inbound,
            Err(err) => {
                tracing::warn!(error = %err, line, "skipping malformed line");
                return None;
            }
        };
        match inbound {
            Inbound::GpioEvent { pin, value } => {
                self.registry.on_pin_value_changed(pin, value);
                None
            }
            Inbound::Instruction {
                device_id,
                instruction,
            } => {
                self.registry.on_instruction(&device_id, &instruction);
                None
            }
            Inbound::Action {
                request_id,
                action,
                payload,
            } => {
                let result = self
                    .commands
                    .dispatch(&mut self.registry, &action, &payload);
                if let Err(err) = &result {
                    tracing::warn!(%action, error = %err, "action failed");
                }
                Some(Outbound::ActionResponse {
                    request_id,
                    response: result.into(),
                })
            }
        }
    }

    async fn drain<W>(&mut self, writer: &mut W) -> Result<(), StdioError>
    where
        W: AsyncWrite + Unpin,
    {
        loop {
            match self.outbound.try_recv() {
                Ok(message) => write_line(writer, &Outbound::from(message)).await?,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        writer.flush().await?;
        Ok(())
    }
}

async fn write_line<W>(writer: &mut W, message: &Outbound) -> Result<(), StdioError>
where
    W: AsyncWrite + Unpin,
{
    let mut bytes = serde_json::to_vec(message)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    Ok(())
}
