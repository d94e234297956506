//! The single data line shared with the sensor.

use embedded_hal::digital::{InputPin, OutputPin};

/// A digital line that can be switched between driving and sensing.
///
/// `embedded-hal` has no trait for reconfiguring a pin at runtime, so
/// platforms implement this directly or wrap an open-drain pin in
/// [`OpenDrain`].
pub trait Line {
    /// Error type of the underlying pin.
    type Error;

    /// Switches the line to push-pull output.
    fn set_output_mode(&mut self) -> Result<(), Self::Error>;

    /// Drives the line low. Only meaningful in output mode.
    fn drive_low(&mut self) -> Result<(), Self::Error>;

    /// Drives the line high. Only meaningful in output mode.
    fn drive_high(&mut self) -> Result<(), Self::Error>;

    /// Switches the line to input with the pull-up enabled.
    fn set_input_pullup_mode(&mut self) -> Result<(), Self::Error>;

    /// Samples the line. No debouncing.
    fn is_high(&mut self) -> Result<bool, Self::Error>;

    /// Samples the line. No debouncing.
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

impl<L: Line + ?Sized> Line for &mut L {
    type Error = L::Error;

    fn set_output_mode(&mut self) -> Result<(), Self::Error> {
        L::set_output_mode(self)
    }

    fn drive_low(&mut self) -> Result<(), Self::Error> {
        L::drive_low(self)
    }

    fn drive_high(&mut self) -> Result<(), Self::Error> {
        L::drive_high(self)
    }

    fn set_input_pullup_mode(&mut self) -> Result<(), Self::Error> {
        L::set_input_pullup_mode(self)
    }

    fn is_high(&mut self) -> Result<bool, Self::Error> {
        L::is_high(self)
    }
}

/// Adapts an open-drain `embedded-hal` pin with an external pull-up.
///
/// An open-drain output is also a valid input: driving it high releases the
/// line, after which the pull-up holds it high unless the sensor pulls it
/// down. Mode switches therefore reduce to releasing the line.
pub struct OpenDrain<P> {
    pin: P,
}

impl<P, E> OpenDrain<P>
where
    P: InputPin<Error = E> + OutputPin<Error = E>,
{
    /// Wraps the pin connected to the DHT22 data line.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Returns the wrapped pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P, E> Line for OpenDrain<P>
where
    P: InputPin<Error = E> + OutputPin<Error = E>,
{
    type Error = E;

    fn set_output_mode(&mut self) -> Result<(), E> {
        Ok(())
    }

    fn drive_low(&mut self) -> Result<(), E> {
        self.pin.set_low()
    }

    fn drive_high(&mut self) -> Result<(), E> {
        self.pin.set_high()
    }

    fn set_input_pullup_mode(&mut self) -> Result<(), E> {
        self.pin.set_high()
    }

    fn is_high(&mut self) -> Result<bool, E> {
        self.pin.is_high()
    }

    fn is_low(&mut self) -> Result<bool, E> {
        self.pin.is_low()
    }
}
