//! Async driver for the Bosch BMP180 barometric pressure and temperature
//! sensor.
//!
//! The BMP180 answers register-addressed transactions at bus address
//! `0x77`. Eleven factory calibration coefficients are read once at
//! startup; raw ADC readings are then compensated into physical units with
//! the datasheet's fixed-point algorithm, bit for bit. Pressure resolution
//! and conversion time are set by the [`OversamplingMode`].
//!
//! The driver splits into two halves. [`Bmp180`] owns the bus and runs the
//! acquisition cycle; [`SensorState`] is the shared half other tasks use to
//! read published measurements, switch the oversampling mode, consume
//! [`Fault`] notifications, and request a stop.
//!
//! ```no_run
//! use bmp180_async::{Bmp180, OversamplingMode, SensorState};
//! use embassy_futures::join::join;
//! use embedded_hal_mock::eh1::i2c::Mock;
//!
//! static STATE: SensorState = SensorState::new();
//!
//! let i2c = Mock::new(&[]); // use your board's I2C bus here
//! let mut sensor = Bmp180::new(i2c, &STATE);
//! embassy_futures::block_on(async {
//!     sensor.start().await.unwrap();
//!     STATE.set_mode(OversamplingMode::Standard);
//!     let reader = async {
//!         // any number of tasks can read the shared half concurrently
//!         let measurement = STATE.measurement();
//!         STATE.stop();
//!         measurement
//!     };
//!     let (outcome, _measurement) = join(sensor.run(), reader).await;
//!     outcome.unwrap();
//! });
//! ```
//!
//! Datasheet: <https://cdn-shop.adafruit.com/datasheets/BST-BMP180-DS000-09.pdf>

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

// This must go first so the other modules see its macros.
mod fmt;

mod bmp180;
mod calibration;
mod error;
mod mode;
mod state;

pub use bmp180::{Bmp180, ADDRESS};
pub use calibration::Calibration;
pub use error::{Error, Fault, Reading};
pub use mode::OversamplingMode;
pub use state::{Measurement, SensorState, LABEL_CAPACITY};
