use embassy_time::Duration;

/// Pressure oversampling mode.
///
/// Trades conversion time for resolution. The mode fixes three things at
/// once: the settle time between the pressure start command and a valid
/// result, the value of bits 6-7 of the start command byte, and the
/// right-shift applied to the raw 24-bit pressure word. All three must come
/// from the same mode value for a given sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OversamplingMode {
    /// One internal sample, 5 ms conversion.
    #[default]
    UltraLowPower,
    /// Two internal samples, 8 ms conversion.
    Standard,
    /// Four internal samples, 14 ms conversion.
    HighResolution,
    /// Eight internal samples, 26 ms conversion.
    UltraHighResolution,
}

impl OversamplingMode {
    /// Required wait between the pressure start command and the result read.
    pub fn settle_time(self) -> Duration {
        match self {
            Self::UltraLowPower => Duration::from_millis(5),
            Self::Standard => Duration::from_millis(8),
            Self::HighResolution => Duration::from_millis(14),
            Self::UltraHighResolution => Duration::from_millis(26),
        }
    }

    /// The oversampling setting `oss`: shift amount of the raw pressure
    /// word, also encoded into bits 6-7 of the start command.
    pub fn shift(self) -> u8 {
        match self {
            Self::UltraLowPower => 0,
            Self::Standard => 1,
            Self::HighResolution => 2,
            Self::UltraHighResolution => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_times_match_datasheet() {
        let table = [
            (OversamplingMode::UltraLowPower, 5),
            (OversamplingMode::Standard, 8),
            (OversamplingMode::HighResolution, 14),
            (OversamplingMode::UltraHighResolution, 26),
        ];
        for (mode, millis) in table {
            assert_eq!(mode.settle_time(), Duration::from_millis(millis));
        }
    }

    #[test]
    fn shift_amounts_match_datasheet() {
        let table = [
            (OversamplingMode::UltraLowPower, 0),
            (OversamplingMode::Standard, 1),
            (OversamplingMode::HighResolution, 2),
            (OversamplingMode::UltraHighResolution, 3),
        ];
        for (mode, shift) in table {
            assert_eq!(mode.shift(), shift);
        }
    }
}
