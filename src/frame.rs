//! Pulse frame capture results, bit decoding and checksum validation.

use crate::tick::Ticks;

/// Number of data bits in one transmission.
pub const FRAME_BITS: usize = 40;

/// High-phase widths strictly above this many ticks decode as a `1` bit.
///
/// Midpoint between the ~25 µs `0` pulse and the ~70 µs `1` pulse.
pub const BIT_THRESHOLD: Ticks = 48;

/// The 40 high-phase widths of one transmission, as captured.
///
/// A `None` slot marks a capture failure. Once any slot has failed the frame
/// as a whole is invalid and only [`complete`](RawPulseFrame::complete) can
/// look at it.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawPulseFrame {
    slots: [Option<Ticks>; FRAME_BITS],
}

impl RawPulseFrame {
    /// Wraps captured slots.
    pub fn new(slots: [Option<Ticks>; FRAME_BITS]) -> Self {
        Self { slots }
    }

    /// Returns the widths if every slot captured, otherwise the index of the
    /// first failed slot.
    pub fn complete(&self) -> Result<PulseWidths, usize> {
        let mut widths = [0; FRAME_BITS];
        for (i, (dst, slot)) in widths.iter_mut().zip(self.slots.iter()).enumerate() {
            *dst = slot.ok_or(i)?;
        }
        Ok(PulseWidths(widths))
    }
}

/// A fully captured frame: 40 valid high-phase widths.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PulseWidths(pub [Ticks; FRAME_BITS]);

impl PulseWidths {
    /// Converts widths into bytes, MSB first, 8 slots per byte.
    pub fn decode(&self) -> DecodedBytes {
        let mut bytes = [0u8; 5];

        for (byte, chunk) in bytes.iter_mut().zip(self.0.chunks_exact(8)) {
            *byte = chunk
                .iter()
                .fold(0, |acc, &width| (acc << 1) | u8::from(width > BIT_THRESHOLD));
        }

        let [humidity_high, humidity_low, temperature_high, temperature_low, checksum] = bytes;
        DecodedBytes {
            humidity_high,
            humidity_low,
            temperature_high,
            temperature_low,
            checksum,
        }
    }
}

/// The five bytes of one transmission, in wire order.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedBytes {
    /// High byte of the humidity word.
    pub humidity_high: u8,
    /// Low byte of the humidity word.
    pub humidity_low: u8,
    /// High byte of the temperature word, sign flag in bit 7.
    pub temperature_high: u8,
    /// Low byte of the temperature word.
    pub temperature_low: u8,
    /// Checksum as sent by the sensor.
    pub checksum: u8,
}

impl DecodedBytes {
    /// Sum of the four data bytes, modulo 256.
    pub fn computed_checksum(&self) -> u8 {
        self.humidity_high
            .wrapping_add(self.humidity_low)
            .wrapping_add(self.temperature_high)
            .wrapping_add(self.temperature_low)
    }

    /// Returns `true` if the received checksum matches the data bytes.
    ///
    /// No physical range validation is done here.
    pub fn check(&self) -> bool {
        self.computed_checksum() == self.checksum
    }

    /// Raw humidity, tenths of a percent.
    pub fn humidity(&self) -> u16 {
        u16::from_be_bytes([self.humidity_high, self.humidity_low])
    }

    /// Raw temperature word, tenths of a degree with the sign flag in bit 15.
    pub fn temperature(&self) -> u16 {
        u16::from_be_bytes([self.temperature_high, self.temperature_low])
    }
}

impl From<[u8; 5]> for DecodedBytes {
    fn from(bytes: [u8; 5]) -> Self {
        let [humidity_high, humidity_low, temperature_high, temperature_low, checksum] = bytes;
        Self {
            humidity_high,
            humidity_low,
            temperature_high,
            temperature_low,
            checksum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Typical widths for 0 and 1 high pulses.
    fn widths_for(bytes: [u8; 5]) -> PulseWidths {
        let mut widths = [0; FRAME_BITS];
        for (i, w) in widths.iter_mut().enumerate() {
            let bit = (bytes[i / 8] >> (7 - i % 8)) & 1;
            *w = if bit == 1 { 70 } else { 26 };
        }
        PulseWidths(widths)
    }

    #[test]
    fn test_decode_reference_frame() {
        let decoded = widths_for([0x02, 0x8C, 0x01, 0x5E, 0xED]).decode();

        assert_eq!(decoded, DecodedBytes::from([0x02, 0x8C, 0x01, 0x5E, 0xED]));
        assert!(decoded.check());
        assert_eq!(decoded.humidity(), 652);
        assert_eq!(decoded.temperature(), 350);
    }

    #[test]
    fn test_decode_threshold_is_strict() {
        let mut widths = [0; FRAME_BITS];
        widths[0] = BIT_THRESHOLD;
        widths[1] = BIT_THRESHOLD + 1;

        let decoded = PulseWidths(widths).decode();
        assert_eq!(decoded.humidity_high, 0b0100_0000);
    }

    #[test]
    fn test_decode_ignores_jitter() {
        let mut widths = widths_for([0xA5, 0x5A, 0xFF, 0x00, 0xFE]).0;
        for (i, w) in widths.iter_mut().enumerate() {
            // Nudge every width without crossing the threshold.
            *w = if *w > BIT_THRESHOLD {
                49 + (i as Ticks % 40)
            } else {
                i as Ticks % 49
            };
        }

        assert_eq!(
            PulseWidths(widths).decode(),
            DecodedBytes::from([0xA5, 0x5A, 0xFF, 0x00, 0xFE])
        );
    }

    #[test]
    fn test_checksum_wraps() {
        let bytes = DecodedBytes::from([0xFF, 0xFF, 0x01, 0x02, 0x01]);
        assert_eq!(bytes.computed_checksum(), 0x01);
        assert!(bytes.check());
    }

    #[test]
    fn test_any_data_bit_flip_fails_checksum() {
        let reference = [0x02, 0x8C, 0x01, 0x5E, 0xED];
        for byte in 0..4 {
            for bit in 0..8 {
                let mut mutated = reference;
                mutated[byte] ^= 1 << bit;
                assert!(
                    !DecodedBytes::from(mutated).check(),
                    "byte {byte} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn test_complete_reports_first_failed_slot() {
        let mut slots = [Some(26); FRAME_BITS];
        slots[17] = None;
        slots[30] = None;
        let frame = RawPulseFrame::new(slots);

        assert_eq!(frame.complete(), Err(17));

        let ok = RawPulseFrame::new([Some(70); FRAME_BITS]);
        assert_eq!(ok.complete(), Ok(PulseWidths([70; FRAME_BITS])));
    }
}
