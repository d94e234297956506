/// Reading returned by the DHT22 sensor.
///
/// Both values are raw 16-bit words in tenths of their unit, exactly as
/// transmitted. For example `humidity == 652` means 65.2 % RH.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorReading {
    /// Relative humidity in tenths of a percent.
    pub humidity: u16,
    /// Temperature word in tenths of a degree Celsius. Bit 15 is the sign flag.
    pub temperature: u16,
}

impl SensorReading {
    /// Relative humidity in percent.
    pub fn humidity_percent(&self) -> f32 {
        f32::from(self.humidity) / 10.0
    }

    /// Signed temperature in tenths of a degree Celsius.
    ///
    /// The DHT22 sends sign and magnitude, not two's complement.
    pub fn temperature_tenths(&self) -> i16 {
        let magnitude = (self.temperature & 0x7FFF) as i16;
        if self.temperature & 0x8000 != 0 {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Temperature in degrees Celsius.
    pub fn temperature_celsius(&self) -> f32 {
        f32::from(self.temperature_tenths()) / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_temperature() {
        let reading = SensorReading {
            humidity: 652,
            temperature: 350,
        };

        assert_eq!(reading.temperature_tenths(), 350);
        assert!((reading.humidity_percent() - 65.2).abs() < 1e-4);
        assert!((reading.temperature_celsius() - 35.0).abs() < 1e-4);
    }

    #[test]
    fn test_negative_temperature() {
        // Bit 7 of the high byte set, magnitude 0x000A = 10 => -1.0C
        let reading = SensorReading {
            humidity: 400,
            temperature: 0x800A,
        };

        assert_eq!(reading.temperature_tenths(), -10);
        assert!((reading.temperature_celsius() + 1.0).abs() < 1e-4);
    }
}
