use crate::error::DhtError;
use crate::frame::{FRAME_BITS, PulseWidths, RawPulseFrame};
use crate::line::Line;
use crate::reading::SensorReading;
use crate::tick::{TickSource, Ticks};

#[cfg(feature = "critical-section")]
use critical_section::with as without_interrupts;

#[cfg(not(feature = "critical-section"))]
fn without_interrupts<R>(f: impl FnOnce(()) -> R) -> R {
    f(())
}

/// Upper bound for every wait on the line.
///
/// A stuck or disconnected line ends the wait here, so a read never blocks
/// indefinitely.
pub const TIMEOUT_TICKS: Ticks = 100;

/// Shortest accepted half of the ~80 µs ACK strobe, inclusive.
pub const ACK_MIN_TICKS: Ticks = 65;

/// Longest accepted half of the ~80 µs ACK strobe, inclusive.
pub const ACK_MAX_TICKS: Ticks = 95;

/// Longest accepted low start pulse of a data bit (nominally 50 µs).
pub const BIT_START_MAX_TICKS: Ticks = 75;

/// Default length of the host start pulse.
pub const START_HOLD_TICKS: Ticks = 10;

/// Minimum time between two reads recommended by the datasheet.
///
/// Not enforced by the driver, pacing reads is up to the caller.
pub const MIN_SAMPLE_INTERVAL_MS: u32 = 2000;

/// Result of one call to [`Dht22::read`].
pub type ReadOutcome<E> = Result<SensorReading, DhtError<E>>;

/// Tunable timing of the host side of the protocol.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// How long the host holds the line low to wake the sensor.
    pub start_hold: Ticks,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_hold: START_HOLD_TICKS,
        }
    }
}

/// Pulse widths observed during one bus transaction, logged once it is over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Timing {
    ack_low: Ticks,
    ack_high: Ticks,
    overrun: Option<usize>,
}

/// Driver for the DHT22 temperature and humidity sensor.
pub struct Dht22<L, T> {
    line: L,
    ticks: T,
    config: Config,
}

impl<L, T> Dht22<L, T>
where
    L: Line,
    T: TickSource,
{
    /// Creates a new instance of the DHT22 driver.
    ///
    /// # Arguments
    ///
    /// * `line` - The data line the sensor is wired to.
    /// * `ticks` - A free-running counter ticking roughly once per microsecond.
    pub fn new(line: L, ticks: T) -> Self {
        Self::with_config(line, ticks, Config::default())
    }

    /// Creates a driver with non-default host timing.
    pub fn with_config(line: L, ticks: T, config: Config) -> Self {
        Dht22 {
            line,
            ticks,
            config,
        }
    }

    /// Releases the line and the tick source.
    pub fn free(self) -> (L, T) {
        (self.line, self.ticks)
    }

    /// Reads a temperature and humidity measurement from the DHT22 sensor.
    ///
    /// This runs the full bus transaction: start pulse, ACK handshake and
    /// capture of 40 bit slots, followed by decoding and checksum validation.
    /// The call busy-waits for a few milliseconds and must not be preempted;
    /// enable the `critical-section` feature to have the driver mask
    /// interrupts itself.
    ///
    /// No retry is performed. Callers should space reads at least
    /// [`MIN_SAMPLE_INTERVAL_MS`] apart.
    ///
    /// # Returns
    ///
    /// * `Ok(SensorReading)` if every step succeeded and the checksum is valid.
    /// * `Err(DhtError)` naming the first step that failed.
    pub fn read(&mut self) -> ReadOutcome<L::Error> {
        debug!("DHT22: sampling");

        let mut timing = Timing::default();
        let outcome = without_interrupts(|_| self.capture(&mut timing))
            .and_then(|frame| {
                trace!("DHT22: ack {} / {} ticks", timing.ack_low, timing.ack_high);
                if let Some(slot) = timing.overrun {
                    trace!("DHT22: slot {} start pulse overran", slot);
                }
                frame.complete().map_err(|slot| {
                    warn!("DHT22: bit capture timeout at slot {}", slot);
                    DhtError::Timeout
                })
            })
            .and_then(|widths| decode_reading(&widths));

        match &outcome {
            Ok(reading) => info!(
                "DHT22: sampling complete, humidity {} temperature {} (0.1 units)",
                reading.humidity,
                reading.temperature
            ),
            Err(DhtError::NoResponse) => warn!("DHT22: no response"),
            Err(DhtError::BadAck1) => warn!("DHT22: bad ack low, {} ticks", timing.ack_low),
            Err(DhtError::BadAck2) => warn!("DHT22: bad ack high, {} ticks", timing.ack_high),
            Err(DhtError::Pin(_)) => {
                // Leave the bus idle; the original error is the one reported.
                let _ = self.line.set_input_pullup_mode();
                warn!("DHT22: line error");
            }
            Err(DhtError::Timeout | DhtError::BadData) => warn!("DHT22: sampling failure"),
        }

        outcome
    }

    /// Runs the bus transaction and returns the captured frame.
    ///
    /// Nothing in here may log: the sensor does not wait for the host.
    fn capture(&mut self, timing: &mut Timing) -> Result<RawPulseFrame, DhtError<L::Error>> {
        self.start()?;
        self.wait_for_response()?;
        self.wait_for_ack(timing)?;
        self.capture_slots(&mut timing.overrun)
    }

    /// Sends the start pulse and hands the line over to the sensor.
    fn start(&mut self) -> Result<(), DhtError<L::Error>> {
        self.line.set_output_mode()?;
        self.line.drive_low()?;
        self.hold(self.config.start_hold);
        self.line.drive_high()?;
        self.line.set_input_pullup_mode()?;
        Ok(())
    }

    /// Waits for the sensor to pull the line low after the start pulse.
    fn wait_for_response(&mut self) -> Result<(), DhtError<L::Error>> {
        if self.measure(true)? >= TIMEOUT_TICKS {
            return Err(DhtError::NoResponse);
        }
        Ok(())
    }

    /// Measures both halves of the ACK strobe.
    fn wait_for_ack(&mut self, timing: &mut Timing) -> Result<(), DhtError<L::Error>> {
        timing.ack_low = self.measure(false)?;
        Self::check_ack(timing.ack_low, DhtError::BadAck1)?;

        timing.ack_high = self.measure(true)?;
        Self::check_ack(timing.ack_high, DhtError::BadAck2)
    }

    /// Accepts an ACK half inside the window, inclusive at both ends.
    ///
    /// A half that never ended counts as no response.
    fn check_ack(
        width: Ticks,
        out_of_window: DhtError<L::Error>,
    ) -> Result<(), DhtError<L::Error>> {
        if width >= TIMEOUT_TICKS {
            Err(DhtError::NoResponse)
        } else if !(ACK_MIN_TICKS..=ACK_MAX_TICKS).contains(&width) {
            Err(out_of_window)
        } else {
            Ok(())
        }
    }

    /// Captures the high-phase width of every bit slot.
    ///
    /// A slot whose start pulse overran, or whose high phase never ended, is
    /// left empty. All 40 slots are always walked so the sensor's burst is
    /// consumed. The first overrun slot is recorded in `overrun`.
    fn capture_slots(
        &mut self,
        overrun: &mut Option<usize>,
    ) -> Result<RawPulseFrame, DhtError<L::Error>> {
        let mut slots = [None; FRAME_BITS];

        for (i, slot) in slots.iter_mut().enumerate() {
            if self.measure(false)? > BIT_START_MAX_TICKS {
                overrun.get_or_insert(i);
                // Skip the high phase on the same counter window.
                self.poll_while(true)?;
                continue;
            }

            let high = self.measure(true)?;
            if high < TIMEOUT_TICKS {
                *slot = Some(high);
            }
        }

        Ok(RawPulseFrame::new(slots))
    }

    /// Rearms the counter and measures how long the line stays at `high`.
    fn measure(&mut self, high: bool) -> Result<Ticks, DhtError<L::Error>> {
        self.ticks.reset();
        self.poll_while(high)
    }

    /// Polls until the line leaves `high` or the counter reaches the timeout.
    ///
    /// Returns the counter value at exit, `TIMEOUT_TICKS` or more on timeout.
    fn poll_while(&mut self, high: bool) -> Result<Ticks, DhtError<L::Error>> {
        loop {
            let count = self.ticks.now();
            if count >= TIMEOUT_TICKS || !self.line_is(high)? {
                return Ok(count);
            }
        }
    }

    fn line_is(&mut self, high: bool) -> Result<bool, DhtError<L::Error>> {
        let level = if high {
            self.line.is_high()?
        } else {
            self.line.is_low()?
        };
        Ok(level)
    }

    /// Busy-waits for `ticks` ticks.
    fn hold(&mut self, ticks: Ticks) {
        self.ticks.reset();
        while self.ticks.now() < ticks {
            core::hint::spin_loop();
        }
    }
}

/// Decodes captured widths into a validated reading.
///
/// This is everything [`Dht22::read`] does after the bus transaction, and is
/// useful on its own when widths come from another capture path such as a
/// timer input-capture channel.
pub fn decode_reading<E>(widths: &PulseWidths) -> ReadOutcome<E> {
    let bytes = widths.decode();
    debug!(
        "DHT22: bytes {} {} {} {} {}",
        bytes.humidity_high,
        bytes.humidity_low,
        bytes.temperature_high,
        bytes.temperature_low,
        bytes.checksum
    );

    if !bytes.check() {
        warn!(
            "DHT22: bad data, checksum received {} computed {}",
            bytes.checksum,
            bytes.computed_checksum()
        );
        return Err(DhtError::BadData);
    }

    Ok(SensorReading {
        humidity: bytes.humidity(),
        temperature: bytes.temperature(),
    })
}
