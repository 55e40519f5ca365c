//! Acquisition sequencing and the polling cycle.

use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};
use embedded_hal_async::i2c::{Error as _, I2c};

use crate::calibration::{Calibration, BLOCK_LEN};
use crate::error::{Error, Fault, Reading};
use crate::mode::OversamplingMode;
use crate::state::{Measurement, SensorState};

/// Fixed bus address of the BMP180.
pub const ADDRESS: u8 = 0x77;

// Register map, BMP180 datasheet section 4.
const REG_CALIBRATION: u8 = 0xAA;
const REG_CTRL: u8 = 0xF4;
const REG_OUT_MSB: u8 = 0xF6;
const CMD_START_TEMPERATURE: u8 = 0x2E;
const CMD_START_PRESSURE: u8 = 0x34;

/// Temperature conversion time, independent of the oversampling mode.
const TEMPERATURE_SETTLE: Duration = Duration::from_millis(5);

/// Default pause between polling cycles.
const DEFAULT_INTERVAL: Duration = Duration::from_millis(10);

/// BMP180 driver: owns the bus and drives the acquisition cycle.
///
/// [`start`](Self::start) loads the factory calibration once, then
/// [`run`](Self::run) keeps the shared [`SensorState`] updated until a stop
/// is requested.
pub struct Bmp180<'a, I2C> {
    i2c: I2C,
    state: &'a SensorState,
    calibration: Option<Calibration>,
    interval: Duration,
}

impl<'a, I2C: I2c> Bmp180<'a, I2C> {
    pub fn new(i2c: I2C, state: &'a SensorState) -> Self {
        Self {
            i2c,
            state,
            calibration: None,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Replace the pause between polling cycles (default 10 ms).
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Consume the driver and hand back the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Load the factory calibration block.
    ///
    /// One 22-byte read; on failure nothing is stored and the error is
    /// returned to the caller. Must complete once before [`run`](Self::run).
    pub async fn start(&mut self) -> Result<(), Error<I2C::Error>> {
        let mut block = [0u8; BLOCK_LEN];
        self.i2c
            .write_read(ADDRESS, &[REG_CALIBRATION], &mut block)
            .await
            .map_err(Error::I2c)?;
        self.calibration = Some(Calibration::from_bytes(&block));
        debug!("calibration block loaded");
        Ok(())
    }

    /// Drive the perpetual acquisition cycle.
    ///
    /// Each cycle snapshots the oversampling mode, acquires one temperature
    /// and one pressure sample, publishes the compensated readings into the
    /// shared state, and pauses for the polling interval. A failed bus
    /// transaction is reported once as a [`Fault`] and leaves the affected
    /// reading at its previous value; the cycle continues at the next
    /// interval.
    ///
    /// Returns `Ok(())` once [`SensorState::stop`] is observed, or
    /// `Err(Error::NotCalibrated)` when [`start`](Self::start) has not
    /// succeeded.
    pub async fn run(&mut self) -> Result<(), Error<I2C::Error>> {
        let calibration = self.calibration.ok_or(Error::NotCalibrated)?;
        info!("acquisition cycle running");
        loop {
            if self.state.take_stop() {
                break;
            }
            // One mode snapshot per cycle: the pressure start command and
            // the raw shift must agree even if the mode changes mid-cycle.
            let mode = self.state.mode();

            match self.acquire_raw_temperature().await {
                Ok(Some(raw_temp)) => {
                    let temperature = calibration.temperature(raw_temp);
                    self.state.publish(Measurement {
                        temperature,
                        ..self.state.measurement()
                    });

                    match self.acquire_raw_pressure(mode).await {
                        Ok(Some(raw_pressure)) => {
                            let pressure = calibration.pressure(raw_temp, raw_pressure, mode);
                            self.state.publish(Measurement {
                                temperature,
                                pressure,
                            });
                        }
                        Ok(None) => break,
                        Err(e) => self.report(Reading::Pressure, e),
                    }
                }
                Ok(None) => break,
                Err(e) => self.report(Reading::Temperature, e),
            }

            if self.pause(self.interval).await {
                break;
            }
        }
        info!("acquisition cycle stopped");
        Ok(())
    }

    /// Start one temperature conversion and read the result.
    ///
    /// `Ok(None)` means a stop request arrived during the settle wait.
    async fn acquire_raw_temperature(&mut self) -> Result<Option<i16>, I2C::Error> {
        self.i2c
            .write(ADDRESS, &[REG_CTRL, CMD_START_TEMPERATURE])
            .await?;
        if self.pause(TEMPERATURE_SETTLE).await {
            return Ok(None);
        }
        let mut out = [0u8; 2];
        self.i2c
            .write_read(ADDRESS, &[REG_OUT_MSB], &mut out)
            .await?;
        Ok(Some(i16::from_be_bytes(out)))
    }

    /// Start one pressure conversion at `mode` and read the result.
    ///
    /// The raw 24-bit word is shifted down by `8 - oss` as the datasheet
    /// prescribes. `Ok(None)` means a stop request arrived during the
    /// settle wait.
    async fn acquire_raw_pressure(
        &mut self,
        mode: OversamplingMode,
    ) -> Result<Option<i32>, I2C::Error> {
        let command = CMD_START_PRESSURE | mode.shift() << 6;
        self.i2c.write(ADDRESS, &[REG_CTRL, command]).await?;
        if self.pause(mode.settle_time()).await {
            return Ok(None);
        }
        let mut out = [0u8; 3];
        self.i2c
            .write_read(ADDRESS, &[REG_OUT_MSB], &mut out)
            .await?;
        let word = (out[0] as u32) << 16 | (out[1] as u32) << 8 | out[2] as u32;
        Ok(Some((word >> (8 - mode.shift())) as i32))
    }

    fn report(&self, reading: Reading, cause: I2C::Error) {
        match reading {
            Reading::Temperature => warn!("temperature acquisition failed, skipping cycle"),
            Reading::Pressure => warn!("pressure acquisition failed, keeping previous value"),
        }
        self.state.push_fault(Fault {
            reading,
            cause: cause.kind(),
        });
    }

    /// Wait for `duration`, or less if a stop request arrives first.
    /// Returns `true` when the cycle should halt.
    async fn pause(&self, duration: Duration) -> bool {
        match select(Timer::after(duration), self.state.stop_requested()).await {
            Either::First(()) => false,
            Either::Second(()) => true,
        }
    }
}
