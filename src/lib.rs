//! DHT22 Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic driver for the DHT22 (AM2302) temperature
//! and humidity sensor. Instead of sampling the line after a fixed delay, it times
//! every pulse against a free-running tick counter and classifies bits by width.
//!
//! # Features
//! - Blocking synchronous API, one bus transaction per [`Dht22::read`]
//! - Designed for `no_std` environments
//! - Every wait is bounded, a stuck or disconnected line ends in an error
//! - Raw tenths values are returned untouched, conversions are opt-in
//!
//! # Platform collaborators
//! The driver only needs two small capabilities:
//! - a [`Line`] that can drive the data pin and sample it with the pull-up enabled.
//!   [`OpenDrain`] adapts any open-drain [`InputPin`] + [`OutputPin`].
//! - a [`TickSource`] counting roughly one tick per microsecond.
//!   [`FreeRunning`] adapts a raw hardware counter such as a cycle counter.
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and emits diagnostics through `defmt`
//! - `log`: Emits diagnostics through the `log` facade
//! - `critical-section`: Runs the bus transaction inside `critical_section::with`
//!
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod dht22;
pub mod error;
pub mod frame;
pub mod line;
pub mod reading;
pub mod tick;

pub use dht22::{Config, Dht22, MIN_SAMPLE_INTERVAL_MS, ReadOutcome, decode_reading};
pub use error::DhtError;
pub use frame::{DecodedBytes, PulseWidths, RawPulseFrame};
pub use line::{Line, OpenDrain};
pub use reading::SensorReading;
pub use tick::{FreeRunning, TickSource, Ticks};
