use core::fmt;

/// Possible errors from the DHT22 driver.
///
/// Protocol failures are reported at the earliest point they are detected.
/// No partial frame is decoded once any capture step fails.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtError<E> {
    /// The sensor never pulled the line low within the response window,
    /// or held it low past the timeout.
    NoResponse,
    /// The low half of the ACK strobe was outside the accepted window.
    BadAck1,
    /// The high half of the ACK strobe was outside the accepted window.
    BadAck2,
    /// At least one of the 40 bit slots failed to capture.
    Timeout,
    /// All bits were captured but the checksum did not match.
    BadData,
    /// Error from the line driver.
    Pin(E),
}

impl<E> DhtError<E> {
    /// Returns `true` if another read, after the sensor's sampling interval,
    /// could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Pin(_))
    }
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::Pin(value)
    }
}

impl<E: fmt::Display> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => f.write_str("sensor did not respond"),
            Self::BadAck1 => f.write_str("ACK low phase out of range"),
            Self::BadAck2 => f.write_str("ACK high phase out of range"),
            Self::Timeout => f.write_str("timed out capturing data bits"),
            Self::BadData => f.write_str("checksum mismatch"),
            Self::Pin(e) => write!(f, "line error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[test]
    fn test_retryable() {
        assert!(DhtError::<Infallible>::NoResponse.is_retryable());
        assert!(DhtError::<Infallible>::BadData.is_retryable());
        assert!(!DhtError::Pin(()).is_retryable());
    }

    #[test]
    fn test_display() {
        let err: DhtError<&str> = DhtError::Pin("bus fault");
        assert_eq!(err.to_string(), "line error: bus fault");
        assert_eq!(
            DhtError::<&str>::BadAck2.to_string(),
            "ACK high phase out of range"
        );
    }
}
