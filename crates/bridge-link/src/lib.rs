#![cfg_attr(not(test), no_std)]

//! Ties the wire codec (`bridge-proto`), the crypto primitives
//! (`bridge-security`), and the bus/clock abstractions
//! (`bridge-common`) into the reliable link state machine: handshake,
//! retransmission, receive dedup/dispatch, and the timer bank that
//! drives all of it from a single cooperative `process()` call.

pub mod dedup;
pub mod handshake;
pub mod queue;
pub mod scheduler;
pub mod state;
pub mod transport;

use bridge_common::bus::{BusRead, BusWrite};
use bridge_common::gpio::Gpio;
use bridge_common::system::SystemInfo;
use bridge_common::time::{Clock, Instant};
use bridge_common::{dev_error, dev_info, dev_warn};
use bridge_proto::capabilities::{Capabilities, FeatureBits};
use bridge_proto::command::{self, is_critical, split_compression_flag, with_compression_flag};
use bridge_proto::timing::TimingConfig;
use bridge_proto::{frame, rle, Frame, LinkError, MAX_PAYLOAD};

use dedup::Dedup;
use handshake::NONCE_LENGTH;
use queue::{InFlight, OutgoingQueue, PendingFrame};
use scheduler::{TimerBank, TimerId};
use state::LinkState;

/// What the application should do after a `process()` call surfaced a
/// frame this crate does not know how to answer on its own.
pub enum Dispatched {
    /// The frame was fully handled internally (ACK, status, handshake,
    /// flow control) — nothing further for the caller to do.
    Handled,
    /// A capability-range command arrived; `command_id`/`payload` are
    /// handed to the caller's own routing (bridge-services or
    /// equivalent) to answer.
    Capability { command_id: u16, payload: PayloadBuf },
    /// A local reliability fault the application should know about even
    /// though no capability handler ran — most notably ACK retries
    /// exhausted. Never sent over the wire; the peer already has no way
    /// to hear it.
    Status(LinkError),
    /// Nothing was ready this tick.
    Idle,
}

pub type PayloadBuf = heapless::Vec<u8, MAX_PAYLOAD>;

/// The capability-service surface a `Link` exposes to client services:
/// queue an application frame for transmission. Kept as a trait (rather
/// than naming `Link<RX_CAP, DEDUP_DEPTH, TX_QUEUE_LEN>` directly) so
/// services don't have to carry the link's const generics in their own
/// signatures.
pub trait Sender {
    fn send(&mut self, command_id: u16, payload: &[u8]) -> Result<(), LinkError>;
}

impl<const RX_CAP: usize, const DEDUP_DEPTH: usize, const TX_QUEUE_LEN: usize> Sender
    for Link<RX_CAP, DEDUP_DEPTH, TX_QUEUE_LEN>
{
    fn send(&mut self, command_id: u16, payload: &[u8]) -> Result<(), LinkError> {
        Link::send(self, command_id, payload)
    }
}

const MAX_CONSECUTIVE_CRC_ERRORS: u8 = 5;
const BAUDRATE_SETTLE_MS: u32 = 50;

/// Reliable link over a byte-oriented bus. `RX_CAP` is the transport's
/// receive accumulation capacity; `DEDUP_DEPTH` bounds how many recent
/// frame CRCs are remembered; `TX_QUEUE_LEN` bounds the outgoing FIFO.
pub struct Link<const RX_CAP: usize, const DEDUP_DEPTH: usize, const TX_QUEUE_LEN: usize> {
    state: LinkState,
    transport: transport::Transport<RX_CAP>,
    dedup: Dedup<DEDUP_DEPTH>,
    outgoing: OutgoingQueue<TX_QUEUE_LEN>,
    in_flight: Option<InFlight>,
    retransmit_requested: bool,
    timers: TimerBank,
    timing: TimingConfig,
    secret: heapless::Vec<u8, 32>,
    pending_nonce: Option<[u8; NONCE_LENGTH]>,
    consecutive_crc_errors: u8,
    stabilizing: bool,
    last_tick: Option<Instant>,
    pending_baud: Option<u32>,
    ready_baud_change: Option<u32>,
}

impl<const RX_CAP: usize, const DEDUP_DEPTH: usize, const TX_QUEUE_LEN: usize>
    Link<RX_CAP, DEDUP_DEPTH, TX_QUEUE_LEN>
{
    /// Runs the cryptographic power-on self-test before constructing
    /// anything else; a failure lands the link directly in the terminal
    /// `Fault` state rather than refusing to build at all, mirroring the
    /// reference firmware's `enterSafeState()` + crypto-fault path.
    pub fn new(secret: &[u8], startup_stabilization_ms: u32) -> Self {
        let mut timers = TimerBank::new();
        timers.arm(TimerId::StartupStabilization, startup_stabilization_ms);

        let mut secret_buf = heapless::Vec::new();
        let _ = secret_buf.extend_from_slice(&secret[..secret.len().min(32)]);

        let state = match bridge_security::run_self_test() {
            Ok(()) => LinkState::Unsynchronized,
            Err(_) => {
                dev_error!("cryptographic self-test failed, link faulted");
                LinkState::Unsynchronized.crypto_fault()
            }
        };

        Link {
            state,
            transport: transport::Transport::new(48, 16),
            dedup: Dedup::new(),
            outgoing: OutgoingQueue::new(),
            in_flight: None,
            retransmit_requested: false,
            timers,
            timing: TimingConfig::default(),
            secret: secret_buf,
            pending_nonce: None,
            consecutive_crc_errors: 0,
            stabilizing: true,
            last_tick: None,
            pending_baud: None,
            ready_baud_change: None,
        }
    }

    /// Drains a physical baud-rate change that became due after its
    /// settle timer fired. The link never touches the bus configuration
    /// itself — the caller applies the new rate to its own UART.
    pub fn take_pending_baud_change(&mut self) -> Option<u32> {
        self.ready_baud_change.take()
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Initiates the handshake: queues a `LINK_SYNC` carrying `nonce`.
    /// The caller supplies the nonce since a no_std target has no
    /// canonical RNG.
    pub fn begin_handshake(&mut self, nonce: [u8; NONCE_LENGTH]) -> Result<(), LinkError> {
        self.pending_nonce = Some(nonce);
        self.enqueue(command::CMD_LINK_SYNC, &handshake::sync_payload(&nonce))
    }

    /// Queues an application frame for transmission. Critical commands
    /// are rejected outright while the link is `Unsynchronized`, except
    /// for the handshake/system-query commands that bootstrap it.
    pub fn send(&mut self, command_id: u16, payload: &[u8]) -> Result<(), LinkError> {
        let (base_id, _) = split_compression_flag(command_id);
        if self.state.is_fault() && base_id != command::CMD_LINK_RESET {
            return Err(LinkError::CryptoFault);
        }
        if !self.state.is_synchronized()
            && is_critical(base_id)
            && base_id != command::CMD_LINK_SYNC
            && base_id != command::CMD_LINK_RESET
        {
            return Err(LinkError::NotSynchronized);
        }
        self.enqueue(command_id, payload)
    }

    fn enqueue(&mut self, command_id: u16, payload: &[u8]) -> Result<(), LinkError> {
        let mut rle_buf = [0u8; MAX_PAYLOAD];
        let (compressed_payload, final_id): (&[u8], u16) = if rle::should_compress(payload) {
            match rle::encode(payload, &mut rle_buf) {
                Some(len) if len < payload.len() => {
                    (&rle_buf[..len], with_compression_flag(command_id))
                }
                _ => (payload, command_id),
            }
        } else {
            (payload, command_id)
        };

        let mut raw = [0u8; bridge_proto::MAX_RAW_FRAME];
        let len = frame::build(&mut raw, final_id, compressed_payload)?;

        let (base_id, _) = split_compression_flag(final_id);
        let critical = is_critical(base_id);
        self.outgoing.push(PendingFrame::new(final_id, critical, &raw[..len]))
    }

    /// Advances the link by one cooperative step: drains the bus,
    /// services timers, and services the outgoing queue. Returns what,
    /// if anything, the caller needs to act on.
    pub fn process<R, W, C, G, S>(
        &mut self,
        bus_read: &R,
        bus_write: &mut W,
        clock: &C,
        gpio: &mut G,
        info: &S,
    ) -> Dispatched
    where
        R: BusRead,
        W: BusWrite,
        C: Clock,
        G: Gpio,
        S: SystemInfo,
    {
        let now = clock.current_instant();
        let delta_ms = self.elapsed_ms_since_last_tick(now, clock);

        if self.stabilizing {
            let mut sink = [0u8; 64];
            let _ = self.transport.poll_bus(bus_read);
            let _ = self.transport.next_frame(&mut sink);
            if TimerBank::has_fired(self.timers.tick(delta_ms), TimerId::StartupStabilization) {
                self.stabilizing = false;
            }
            return Dispatched::Idle;
        }

        if let Ok(flow) = self.transport.poll_bus(bus_read) {
            match flow {
                transport::FlowControl::SendXoff => {
                    let _ = self.enqueue(command::CMD_XOFF, &[]);
                }
                transport::FlowControl::SendXon => {
                    let _ = self.enqueue(command::CMD_XON, &[]);
                }
                transport::FlowControl::None => {}
            }
        }

        let mut raw = [0u8; bridge_proto::MAX_RAW_FRAME];
        let mut dispatched = match self.transport.next_frame(&mut raw) {
            Ok(Some(n)) => self.handle_incoming(&raw[..n], now, gpio, info),
            Ok(None) => Dispatched::Idle,
            Err(LinkError::Malformed) => {
                self.on_rx_malformed();
                Dispatched::Handled
            }
            Err(_) => Dispatched::Idle,
        };

        let fired = self.timers.tick(delta_ms);
        if TimerBank::has_fired(fired, TimerId::AckTimeout) && self.on_ack_timeout(bus_write) {
            dispatched = Dispatched::Status(LinkError::Timeout);
        }
        if TimerBank::has_fired(fired, TimerId::BaudrateChange) {
            if let Some(rate) = self.pending_baud.take() {
                self.ready_baud_change = Some(rate);
            }
        }

        self.service_outgoing(bus_write);

        dispatched
    }

    fn elapsed_ms_since_last_tick<C: Clock>(&mut self, now: Instant, clock: &C) -> u32 {
        let delta_ms = match self.last_tick {
            Some(last) => (last.elapsed_nanos(&DummyClockRef(now)).min(u64::from(u32::MAX) * 1_000_000) / 1_000_000) as u32,
            None => 0,
        };
        self.last_tick = Some(now);
        let _ = clock;
        delta_ms
    }

    fn handle_incoming<G: Gpio, S: SystemInfo>(
        &mut self,
        raw: &[u8],
        now: Instant,
        gpio: &mut G,
        info: &S,
    ) -> Dispatched {
        let frame = match frame::parse(raw) {
            Ok(frame) => frame,
            Err(LinkError::CrcMismatch) => {
                dev_warn!("crc mismatch on inbound frame");
                self.on_rx_malformed();
                return Dispatched::Handled;
            }
            Err(_) => {
                self.on_rx_malformed();
                return Dispatched::Handled;
            }
        };
        self.consecutive_crc_errors = 0;

        let crc = bridge_security::crc32(raw);
        let window_ms = self.timing.retry_window_ms();
        if self.dedup.is_duplicate(crc, now, window_ms) {
            self.reack_if_critical(&frame);
            return Dispatched::Handled;
        }
        self.dedup.record(crc, now);

        let (base_id, compressed) = split_compression_flag(frame.command_id);
        let mut decoded_buf = [0u8; MAX_PAYLOAD];
        let payload: &[u8] = if compressed {
            match rle::decode(&frame.payload, &mut decoded_buf) {
                Some(n) => &decoded_buf[..n],
                None => {
                    let _ = self.enqueue(command::STATUS_MALFORMED, &[]);
                    return Dispatched::Handled;
                }
            }
        } else {
            &frame.payload
        };

        self.dispatch(base_id, payload, gpio, info)
    }

    /// Routes a decoded, deduplicated frame. Ids 0x00-0x05 legitimately
    /// mean either a status code or a system command depending on
    /// payload shape (see [`command::is_system_command`]), so that check
    /// must run before the generic status-range check below it — a
    /// command like `CMD_LINK_SYNC` (0x02, 16-byte payload) would
    /// otherwise be swallowed as `STATUS_CMD_UNKNOWN` (same id, normally
    /// no payload) and never reach its handler.
    fn dispatch<G: Gpio, S: SystemInfo>(
        &mut self,
        base_id: u16,
        payload: &[u8],
        gpio: &mut G,
        info: &S,
    ) -> Dispatched {
        if command::is_system_command(base_id, payload.len()) {
            match base_id {
                command::CMD_GET_VERSION => self.handle_get_version(info),
                command::CMD_GET_FREE_MEMORY => self.handle_get_free_memory(info),
                command::CMD_LINK_SYNC => self.handle_link_sync(payload),
                command::CMD_LINK_RESET => self.handle_link_reset(payload),
                command::CMD_GET_CAPABILITIES => self.handle_get_capabilities(gpio, info),
                command::CMD_SET_BAUDRATE => self.handle_set_baudrate(payload),
                _ => unreachable!("is_system_command only admits the ids matched above"),
            }
            return Dispatched::Handled;
        }

        if command::is_status_range(base_id) {
            self.handle_status(base_id, payload);
            return Dispatched::Handled;
        }

        match base_id {
            command::CMD_XOFF | command::CMD_XON => Dispatched::Handled,
            command::CMD_LINK_SYNC_RESP => {
                self.handle_link_sync_resp(payload);
                Dispatched::Handled
            }
            command::CMD_GPIO_SET_PIN_MODE
            | command::CMD_GPIO_DIGITAL_WRITE
            | command::CMD_GPIO_ANALOG_WRITE => {
                self.handle_gpio_write(gpio, base_id, payload);
                Dispatched::Handled
            }
            command::CMD_GPIO_DIGITAL_READ | command::CMD_GPIO_ANALOG_READ => {
                self.handle_gpio_read(gpio, base_id, payload);
                Dispatched::Handled
            }
            _ => {
                if is_critical(base_id) {
                    let mut ack_payload = [0u8; 2];
                    ack_payload.copy_from_slice(&base_id.to_be_bytes());
                    let _ = self.enqueue(command::STATUS_ACK, &ack_payload);
                }
                let mut buf = heapless::Vec::new();
                let _ = buf.extend_from_slice(payload);
                Dispatched::Capability { command_id: base_id, payload: buf }
            }
        }
    }

    fn handle_status(&mut self, base_id: u16, payload: &[u8]) {
        match base_id {
            command::STATUS_ACK => self.on_ack_received(payload),
            command::STATUS_MALFORMED => {
                self.retransmit_requested = true;
            }
            _ => {}
        }
    }

    /// Retires `in_flight` only when `payload` actually acknowledges it:
    /// empty (wildcard) or the in-flight command's base id, big-endian.
    /// A stray ACK for some other command must not retire the frame this
    /// link is still waiting on.
    fn on_ack_received(&mut self, payload: &[u8]) {
        let Some(in_flight) = &self.in_flight else {
            return;
        };
        let (in_flight_base_id, _) = split_compression_flag(in_flight.frame().command_id);
        let acks_in_flight = match payload {
            [] => true,
            &[hi, lo] => u16::from_be_bytes([hi, lo]) == in_flight_base_id,
            _ => false,
        };
        if !acks_in_flight {
            return;
        }
        self.in_flight = None;
        self.timers.cancel(TimerId::AckTimeout);
        self.state = self.state.ack_received();
        dev_info!("ack received, link idle");
    }

    fn on_rx_malformed(&mut self) {
        self.consecutive_crc_errors = self.consecutive_crc_errors.saturating_add(1);
        if self.consecutive_crc_errors >= MAX_CONSECUTIVE_CRC_ERRORS {
            dev_error!("too many consecutive frame errors, resetting link");
            self.consecutive_crc_errors = 0;
            self.in_flight = None;
            self.timers.cancel(TimerId::AckTimeout);
            self.state = self.state.reset();
        }
        let _ = self.enqueue(command::STATUS_MALFORMED, &[]);
    }

    fn reack_if_critical(&mut self, frame: &Frame) {
        let (base_id, _) = split_compression_flag(frame.command_id);
        if is_critical(base_id) {
            let mut ack_payload = [0u8; 2];
            ack_payload.copy_from_slice(&base_id.to_be_bytes());
            let _ = self.enqueue(command::STATUS_ACK, &ack_payload);
        }
    }

    fn handle_link_sync(&mut self, payload: &[u8]) {
        if payload.len() != NONCE_LENGTH {
            let _ = self.enqueue(command::STATUS_MALFORMED, &[]);
            return;
        }
        let mut nonce = [0u8; NONCE_LENGTH];
        nonce.copy_from_slice(payload);

        let secret = if self.secret.is_empty() { None } else { Some(self.secret.as_slice()) };
        let mut resp = [0u8; handshake::SYNC_RESP_LEN];
        let len = handshake::sync_resp_payload(secret, &nonce, &mut resp);
        let _ = self.enqueue(command::CMD_LINK_SYNC_RESP, &resp[..len]);
        self.state = self.state.handshake_complete();
    }

    fn handle_link_sync_resp(&mut self, payload: &[u8]) {
        let Some(nonce) = self.pending_nonce.take() else {
            return;
        };
        let secret = if self.secret.is_empty() { None } else { Some(self.secret.as_slice()) };
        if handshake::verify_sync_resp(secret, &nonce, payload) {
            self.state = self.state.handshake_complete();
            dev_info!("handshake verified, link idle");
        } else {
            dev_warn!("handshake verification failed");
        }
    }

    fn handle_link_reset(&mut self, payload: &[u8]) {
        if payload.len() == bridge_proto::timing::TIMING_CONFIG_PAYLOAD_LEN {
            let mut arr = [0u8; bridge_proto::timing::TIMING_CONFIG_PAYLOAD_LEN];
            arr.copy_from_slice(payload);
            self.timing = TimingConfig::from_payload(&arr);
        }
        self.state = self.state.reset();
        self.in_flight = None;
        self.outgoing = OutgoingQueue::new();
        self.timers.cancel(TimerId::AckTimeout);
        self.pending_baud = None;
        let _ = self.enqueue(command::CMD_LINK_RESET_RESP, &[]);
    }

    fn handle_get_version<S: SystemInfo>(&mut self, info: &S) {
        let payload = [info.firmware_version_major(), info.firmware_version_minor()];
        let _ = self.enqueue(command::CMD_GET_VERSION_RESP, &payload);
    }

    fn handle_get_free_memory<S: SystemInfo>(&mut self, info: &S) {
        let payload = info.free_memory_bytes().to_be_bytes();
        let _ = self.enqueue(command::CMD_GET_FREE_MEMORY_RESP, &payload);
    }

    fn handle_get_capabilities<G: Gpio, S: SystemInfo>(&mut self, gpio: &G, info: &S) {
        let caps = Capabilities {
            protocol_version: bridge_proto::PROTOCOL_VERSION,
            arch_id: info.arch_id(),
            num_digital: gpio.num_digital_pins(),
            num_analog: gpio.num_analog_pins(),
            feature_bits: FeatureBits::from_bits_truncate(info.feature_bits()),
        };
        let _ = self.enqueue(command::CMD_GET_CAPABILITIES_RESP, &caps.to_payload());
    }

    /// ACK is emitted at the current baud immediately; the physical rate
    /// change is deferred until `BaudrateChange` fires, so a caller that
    /// switched its UART eagerly would never see this ACK arrive.
    fn handle_set_baudrate(&mut self, payload: &[u8]) {
        let _ = self.enqueue(command::CMD_SET_BAUDRATE_RESP, &[]);
        if payload.len() == 4 {
            let mut rate = [0u8; 4];
            rate.copy_from_slice(payload);
            self.pending_baud = Some(u32::from_be_bytes(rate));
            self.timers.arm(TimerId::BaudrateChange, BAUDRATE_SETTLE_MS);
        }
    }

    fn handle_gpio_write<G: Gpio>(&mut self, gpio: &mut G, base_id: u16, payload: &[u8]) {
        let &[pin, value] = payload else {
            let _ = self.enqueue(command::STATUS_MALFORMED, &[]);
            return;
        };
        let result = match base_id {
            command::CMD_GPIO_SET_PIN_MODE => gpio.set_pin_mode(pin, value),
            command::CMD_GPIO_DIGITAL_WRITE => gpio.digital_write(pin, value != 0),
            command::CMD_GPIO_ANALOG_WRITE => gpio.analog_write(pin, value),
            _ => unreachable!("only GPIO write ids reach this handler"),
        };
        if result.is_err() {
            let _ = self.enqueue(command::STATUS_MALFORMED, &[]);
            return;
        }
        let mut ack_payload = [0u8; 2];
        ack_payload.copy_from_slice(&base_id.to_be_bytes());
        let _ = self.enqueue(command::STATUS_ACK, &ack_payload);
    }

    fn handle_gpio_read<G: Gpio>(&mut self, gpio: &G, base_id: u16, payload: &[u8]) {
        let &[pin] = payload else {
            let _ = self.enqueue(command::STATUS_MALFORMED, &[]);
            return;
        };
        match base_id {
            command::CMD_GPIO_DIGITAL_READ => match gpio.digital_read(pin) {
                Ok(value) => {
                    let _ = self.enqueue(command::CMD_GPIO_DIGITAL_READ_RESP, &[value as u8]);
                }
                Err(_) => {
                    let _ = self.enqueue(command::STATUS_MALFORMED, &[]);
                }
            },
            command::CMD_GPIO_ANALOG_READ => match gpio.analog_read(pin) {
                Ok(value) => {
                    let _ = self.enqueue(command::CMD_GPIO_ANALOG_READ_RESP, &value.to_be_bytes());
                }
                Err(_) => {
                    let _ = self.enqueue(command::STATUS_MALFORMED, &[]);
                }
            },
            _ => unreachable!("only GPIO read ids reach this handler"),
        }
    }

    /// Returns `true` once retries are exhausted: the caller should
    /// surface `STATUS_TIMEOUT` to the application, since nothing on the
    /// wire notifies it otherwise.
    fn on_ack_timeout<W: BusWrite>(&mut self, bus_write: &mut W) -> bool {
        let Some(in_flight) = &mut self.in_flight else {
            return false;
        };
        if in_flight.retry_on_timeout() {
            let _ = self.transport.write_frame(bus_write, in_flight.frame().bytes());
            self.timers.arm(TimerId::AckTimeout, self.timing.ack_timeout_ms as u32);
            false
        } else {
            dev_error!("ack retries exhausted, link unsynchronized");
            self.in_flight = None;
            self.outgoing = OutgoingQueue::new();
            self.state = self.state.timeout();
            true
        }
    }

    fn service_outgoing<W: BusWrite>(&mut self, bus_write: &mut W) {
        if self.retransmit_requested {
            self.retransmit_requested = false;
            if let Some(in_flight) = &self.in_flight {
                let _ = self.transport.write_frame(bus_write, in_flight.retransmit_raw());
                self.timers.arm(TimerId::AckTimeout, self.timing.ack_timeout_ms as u32);
                return;
            }
        }

        if self.in_flight.is_some() {
            return;
        }
        let Some(pending) = self.outgoing.pop() else {
            return;
        };
        if self.transport.write_frame(bus_write, pending.bytes()).is_err() {
            return;
        }
        if pending.critical {
            self.state = self.state.send_critical();
            self.timers.arm(TimerId::AckTimeout, self.timing.ack_timeout_ms as u32);
            self.in_flight = Some(InFlight::new(pending, self.timing.retry_limit));
        }
    }
}

/// The secret's true end-of-life is the link itself going away, not a
/// `LINK_RESET` — a reset must keep the secret intact so the next
/// handshake can still authenticate. Wipe it here instead.
impl<const RX_CAP: usize, const DEDUP_DEPTH: usize, const TX_QUEUE_LEN: usize> Drop
    for Link<RX_CAP, DEDUP_DEPTH, TX_QUEUE_LEN>
{
    fn drop(&mut self) {
        bridge_security::secure_wipe(&mut self.secret);
    }
}

/// Adapter so `Instant::elapsed_nanos` (which takes a `Clock`) can be
/// reused to diff two `Instant`s directly without threading the real
/// clock's cycle-counter semantics through it.
struct DummyClockRef(Instant);
impl Clock for DummyClockRef {
    fn current_cycle(&self) -> u32 {
        0
    }
    fn current_nanos(&self) -> u64 {
        self.0.nanos()
    }
}
