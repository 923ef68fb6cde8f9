use std::io;

use futures_util::{SinkExt, StreamExt};
use pi30_frame::{frame_bytes, Command, FrameError, Hex, Pi30Codec, ValidatedReply};
use pi30_transport::ByteStream;
use tokio::io::AsyncReadExt;
use tokio::time::{sleep, timeout, Instant};
use tokio_util::codec::Framed;
use tracing::{debug, info, trace, warn};

use crate::command::{self, QMOD, QPIGS, QPIRI};
use crate::config::ExchangeConfig;
use crate::decode::{Ack, Mode, Settings, Telemetry};
use crate::error::{ClientError, Result};

type FrameResult = std::result::Result<ValidatedReply, FrameError>;

/// A PI30 client owning its byte stream.
///
/// Every exchange takes `&mut self`, so at most one command is in flight on a
/// stream at any time.
pub struct Client<S> {
    framed: Framed<S, Pi30Codec>,
    config: ExchangeConfig,
    /// The last read yielded an I/O error.
    read_failed: bool,
}

impl<S: ByteStream> Client<S> {
    /// Client with default exchange settings.
    pub fn new(stream: S) -> Self {
        Self::with_config(stream, ExchangeConfig::default())
    }

    pub fn with_config(stream: S, config: ExchangeConfig) -> Self {
        let codec = Pi30Codec::with_max_frame_len(config.max_frame_len);
        Self {
            framed: Framed::new(stream, codec),
            config,
            read_failed: false,
        }
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &S {
        self.framed.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut S {
        self.framed.get_mut()
    }

    /// Release the stream. Unread buffered input is dropped.
    pub fn into_inner(self) -> S {
        self.framed.into_inner()
    }

    /// One write/read exchange with no retry.
    ///
    /// On a timeout or a rejected frame the stream is resynchronized before
    /// returning (unless disabled in the config).
    pub async fn query_once(&mut self, command: &Command) -> Result<ValidatedReply> {
        let result = self.exchange(command).await;
        if let Err(err) = &result {
            if self.config.resync_on_error && err.leaves_stale_input() {
                self.resync().await;
            }
        }
        result
    }

    /// Run `command` until it yields a valid reply or the attempt budget is
    /// spent.
    ///
    /// A closed stream is returned immediately as [`ClientError::Disconnected`];
    /// other failures are retried after `base_delay` and, once exhausted,
    /// reported as [`ClientError::NoValidResponse`] carrying the last one.
    pub async fn query(&mut self, command: &Command) -> Result<ValidatedReply> {
        let attempts = self.config.attempts();
        let mut attempt = 1;
        loop {
            match self.query_once(command).await {
                Ok(reply) => {
                    if attempt > 1 {
                        debug!(%command, attempt, "exchange recovered");
                    }
                    return Ok(reply);
                }
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) => {
                    warn!(%command, attempt, error = %err, "exchange failed");
                    if attempt >= attempts {
                        return Err(ClientError::NoValidResponse {
                            command: command.to_string(),
                            attempts,
                            last: Box::new(err),
                        });
                    }
                }
            }
            attempt += 1;
            sleep(self.config.base_delay).await;
        }
    }

    pub async fn query_mode(&mut self) -> Result<Mode> {
        let reply = self.query(&QMOD).await?;
        Ok(reply.to_text().parse()?)
    }

    pub async fn query_settings(&mut self) -> Result<Settings> {
        let reply = self.query(&QPIRI).await?;
        Ok(reply.to_text().parse()?)
    }

    pub async fn query_status(&mut self) -> Result<Telemetry> {
        let reply = self.query(&QPIGS).await?;
        let telemetry: Telemetry = reply.to_text().parse()?;
        info!(
            battery_voltage = telemetry.battery_voltage,
            battery_capacity = telemetry.battery_capacity,
            load_percent = telemetry.output_load_percent,
            pv_power = telemetry.pv_input_power,
            pv_power_calculated = telemetry.pv_power_calculated(),
            status = %telemetry.device_status,
            "telemetry"
        );
        Ok(telemetry)
    }

    /// Set output source priority (`POPnn`).
    pub async fn set_output_source(&mut self, value: u8) -> Result<()> {
        let command = command::set_output_source(value)?;
        self.apply(&command).await
    }

    /// Set charger source priority (`PCPnn`).
    pub async fn set_charge_source(&mut self, value: u8) -> Result<()> {
        let command = command::set_charge_source(value)?;
        self.apply(&command).await
    }

    /// Send a setter command and require `ACK`.
    ///
    /// `NAK` becomes [`ClientError::Rejected`].
    pub async fn apply(&mut self, command: &Command) -> Result<()> {
        let reply = self.query(command).await?;
        match reply.to_text().parse::<Ack>()? {
            Ack::Accepted => {
                info!(%command, "setting accepted");
                Ok(())
            }
            Ack::Rejected => Err(ClientError::Rejected {
                command: command.to_string(),
            }),
        }
    }

    async fn exchange(&mut self, command: &Command) -> Result<ValidatedReply> {
        trace!(%command, frame = %Hex(&frame_bytes(command)), "sending");
        if let Err(err) = self.framed.send(command).await {
            warn!(%command, error = %err, "write failed");
            // Framed keeps unflushed bytes; a retry must not send them twice.
            self.framed.write_buffer_mut().clear();
            return Err(FrameError::Io(err).into());
        }

        sleep(self.config.base_delay).await;

        match timeout(self.config.timeout, self.next_frame()).await {
            Err(_) => Err(ClientError::Timeout(self.config.timeout)),
            Ok(None) => Err(ClientError::Disconnected),
            Ok(Some(Err(err))) => Err(FrameError::Io(err).into()),
            Ok(Some(Ok(Err(err)))) => {
                debug!(%command, error = %err, "invalid frame");
                Err(err.into())
            }
            Ok(Some(Ok(Ok(reply)))) => {
                trace!(%command, payload = %Hex(reply.as_bytes()), "reply");
                Ok(reply)
            }
        }
    }

    /// Next item from the codec.
    ///
    /// After yielding a read error `Framed` ends its stream once; that `None`
    /// is skipped so the port is read again rather than reported as closed.
    async fn next_frame(&mut self) -> Option<io::Result<FrameResult>> {
        let mut item = self.framed.next().await;
        if item.is_none() && std::mem::take(&mut self.read_failed) {
            item = self.framed.next().await;
        }
        self.read_failed = matches!(item, Some(Err(_)));
        item
    }

    /// Drop buffered input, then swallow whatever keeps arriving until the
    /// line has been quiet for `base_delay`, bounded by `timeout`.
    async fn resync(&mut self) {
        let buffered = self.framed.read_buffer().len();
        self.framed.read_buffer_mut().clear();
        self.framed.codec_mut().reset();

        let quiet = self.config.base_delay;
        let deadline = Instant::now() + self.config.timeout;
        let mut scratch = [0u8; 256];
        let mut drained = 0usize;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(drained, "line still busy, giving up resync");
                break;
            }
            let read = self.framed.get_mut().read(&mut scratch);
            match timeout(quiet.min(remaining), read).await {
                Err(_) | Ok(Ok(0)) => break,
                Ok(Ok(n)) => {
                    trace!(bytes = %Hex(&scratch[..n]), "discarding");
                    drained += n;
                }
                Ok(Err(err)) => {
                    debug!(error = %err, "read failed during resync");
                    break;
                }
            }
        }
        debug!(buffered, drained, "resynchronized");
    }
}
