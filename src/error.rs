use embedded_hal_async::i2c::ErrorKind;

/// Driver error, generic over the bus error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The underlying bus transaction failed.
    I2c(E),
    /// A measurement was requested before the calibration block was loaded.
    NotCalibrated,
}

/// The acquisition step a fault occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    Temperature,
    Pressure,
}

/// A bus failure recorded during one polling cycle.
///
/// Faults are published to [`SensorState::next_fault`] instead of stopping
/// the cycle; the affected reading keeps its previous value.
///
/// [`SensorState::next_fault`]: crate::SensorState::next_fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fault {
    /// Which sample the failed transaction belonged to.
    pub reading: Reading,
    /// Bus-level classification of the failure.
    pub cause: ErrorKind,
}
