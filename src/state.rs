//! State shared between the polling task and concurrent readers.

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::String;

use crate::error::Fault;
use crate::mode::OversamplingMode;

/// Capacity of the device label storage.
pub const LABEL_CAPACITY: usize = 16;

const DEFAULT_LABEL: &str = "BMP180";

// Faults queue up until a consumer drains them; the producer never waits.
const FAULT_QUEUE: usize = 4;

/// One published measurement pair. Zeroed until the first complete cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Compensated temperature in °C, 0.1 °C resolution.
    pub temperature: f32,
    /// Compensated pressure in Pa.
    pub pressure: f32,
}

/// The shared half of the driver.
///
/// The polling task owns the bus and writes measurements; every other task
/// reads them through this struct. Create one (typically in a `static`) and
/// hand it to [`Bmp180::new`].
///
/// [`Bmp180::new`]: crate::Bmp180::new
pub struct SensorState {
    measurement: Mutex<CriticalSectionRawMutex, Cell<Measurement>>,
    mode: Mutex<CriticalSectionRawMutex, Cell<OversamplingMode>>,
    label: Mutex<CriticalSectionRawMutex, RefCell<String<LABEL_CAPACITY>>>,
    faults: Channel<CriticalSectionRawMutex, Fault, FAULT_QUEUE>,
    stop: Signal<CriticalSectionRawMutex, ()>,
}

impl SensorState {
    pub const fn new() -> Self {
        Self {
            measurement: Mutex::new(Cell::new(Measurement {
                temperature: 0.0,
                pressure: 0.0,
            })),
            mode: Mutex::new(Cell::new(OversamplingMode::UltraLowPower)),
            label: Mutex::new(RefCell::new(String::new())),
            faults: Channel::new(),
            stop: Signal::new(),
        }
    }

    /// Snapshot of the last published measurement pair.
    pub fn measurement(&self) -> Measurement {
        self.measurement.lock(Cell::get)
    }

    /// Last published temperature in °C.
    pub fn temperature(&self) -> f32 {
        self.measurement().temperature
    }

    /// Last published pressure in Pa.
    pub fn pressure(&self) -> f32 {
        self.measurement().pressure
    }

    /// Currently selected pressure oversampling mode.
    pub fn mode(&self) -> OversamplingMode {
        self.mode.lock(Cell::get)
    }

    /// Select the pressure oversampling mode.
    ///
    /// Takes effect at the start of the next polling cycle; the cycle in
    /// flight keeps the mode it was started with.
    pub fn set_mode(&self, mode: OversamplingMode) {
        self.mode.lock(|m| m.set(mode));
    }

    /// Human-readable device label, `"BMP180"` unless overridden.
    pub fn label(&self) -> String<LABEL_CAPACITY> {
        self.label.lock(|cell| {
            let stored = cell.borrow();
            if stored.is_empty() {
                let mut label = String::new();
                label.push_str(DEFAULT_LABEL).ok();
                label
            } else {
                stored.clone()
            }
        })
    }

    /// Replace the device label, truncating to [`LABEL_CAPACITY`].
    pub fn set_label(&self, label: &str) {
        self.label.lock(|cell| {
            let mut stored = cell.borrow_mut();
            stored.clear();
            for c in label.chars() {
                if stored.push(c).is_err() {
                    break;
                }
            }
        });
    }

    /// Receive the next acquisition fault, waiting until one is published.
    pub async fn next_fault(&self) -> Fault {
        self.faults.receive().await
    }

    /// Non-blocking fault poll.
    pub fn try_next_fault(&self) -> Option<Fault> {
        self.faults.try_receive().ok()
    }

    /// Ask the polling cycle to halt.
    ///
    /// The request is observed at every wait point, so the cycle returns
    /// within at most one settle interval.
    pub fn stop(&self) {
        self.stop.signal(());
    }

    pub(crate) fn publish(&self, measurement: Measurement) {
        self.measurement.lock(|m| m.set(measurement));
    }

    pub(crate) fn push_fault(&self, fault: Fault) {
        if self.faults.try_send(fault).is_err() {
            warn!("fault queue full, notification dropped");
        }
    }

    pub(crate) async fn stop_requested(&self) {
        self.stop.wait().await
    }

    pub(crate) fn take_stop(&self) -> bool {
        let stopped = self.stop.signaled();
        if stopped {
            self.stop.reset();
        }
        stopped
    }
}

impl Default for SensorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Reading;
    use embedded_hal_async::i2c::ErrorKind;

    #[test]
    fn measurement_defaults_to_zero() {
        let state = SensorState::new();
        assert_eq!(state.measurement(), Measurement::default());
        assert_eq!(state.temperature(), 0.0);
        assert_eq!(state.pressure(), 0.0);
    }

    #[test]
    fn reads_between_cycles_are_stable() {
        let state = SensorState::new();
        state.publish(Measurement {
            temperature: 15.0,
            pressure: 69964.0,
        });
        assert_eq!(state.measurement(), state.measurement());
        assert_eq!(state.temperature(), 15.0);
        assert_eq!(state.pressure(), 69964.0);
    }

    #[test]
    fn label_defaults_and_truncates() {
        let state = SensorState::new();
        assert_eq!(state.label().as_str(), "BMP180");
        state.set_label("rooftop");
        assert_eq!(state.label().as_str(), "rooftop");
        state.set_label("weather station rooftop unit");
        assert_eq!(state.label().as_str(), "weather station ");
    }

    #[test]
    fn mode_round_trips() {
        let state = SensorState::new();
        assert_eq!(state.mode(), OversamplingMode::UltraLowPower);
        state.set_mode(OversamplingMode::UltraHighResolution);
        assert_eq!(state.mode(), OversamplingMode::UltraHighResolution);
    }

    #[test]
    fn fault_queue_never_blocks_the_producer() {
        let state = SensorState::new();
        let fault = Fault {
            reading: Reading::Temperature,
            cause: ErrorKind::Other,
        };
        for _ in 0..8 {
            state.push_fault(fault);
        }
        let mut drained = 0;
        while state.try_next_fault().is_some() {
            drained += 1;
        }
        assert_eq!(drained, 4);
    }
}
