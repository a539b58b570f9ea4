//! Selectable bias window and output conversion

/// Voltage in whole millivolts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millivolts(pub i32);

impl Millivolts {
    /// Round `volts` to the nearest millivolt (halves away from zero)
    pub fn from_volts(volts: f64) -> Self {
        let scaled = volts * 1000.0;
        let rounded = if scaled >= 0.0 {
            scaled + 0.5
        } else {
            scaled - 0.5
        };
        Self(rounded as i32)
    }

    /// Value in volts
    pub fn as_volts(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl core::fmt::Display for Millivolts {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.3} V", self.as_volts())
    }
}

/// Centre of the kit's inverting bias stage
pub const KIT_CENTER: Millivolts = Millivolts(2500);

/// Full scale of the bias output channel
pub const OUTPUT_MAX: Millivolts = Millivolts(5000);

/// Largest calibration offset
pub const OFFSET_MAX: Millivolts = Millivolts(1000);

/// Requests at or beyond this share of a bound raise a warning (percent)
const ACCURACY_LIMIT_PERCENT: i32 = 75;

/// Bias voltage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BiasError {
    /// Requested voltage outside the selectable window
    OutOfWindow {
        requested: Millivolts,
        min: Millivolts,
        max: Millivolts,
    },
    /// Calibration offset outside `0..=OFFSET_MAX`
    OffsetOutOfRange(Millivolts),
}

impl core::fmt::Display for BiasError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BiasError::OutOfWindow {
                requested,
                min,
                max,
            } => write!(f, "{} is outside the window {} to {}", requested, min, max),
            BiasError::OffsetOutOfRange(offset) => {
                write!(f, "offset {} is outside 0 to {}", offset, OFFSET_MAX)
            }
        }
    }
}

/// Selectable bias window for a calibration offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BiasWindow {
    offset: Millivolts,
}

impl BiasWindow {
    /// Window for `offset`
    pub fn new(offset: Millivolts) -> Result<Self, BiasError> {
        if offset < Millivolts(0) || offset > OFFSET_MAX {
            return Err(BiasError::OffsetOutOfRange(offset));
        }
        Ok(Self { offset })
    }

    /// Window for an offset given in volts
    pub fn from_offset_volts(offset: f64) -> Result<Self, BiasError> {
        Self::new(Millivolts::from_volts(offset))
    }

    /// Calibration offset
    pub fn offset(&self) -> Millivolts {
        self.offset
    }

    /// Lowest selectable voltage
    pub fn min(&self) -> Millivolts {
        Millivolts(-(OUTPUT_MAX.0 - KIT_CENTER.0 - self.offset.0))
    }

    /// Highest selectable voltage
    pub fn max(&self) -> Millivolts {
        Millivolts(KIT_CENTER.0 + self.offset.0)
    }

    /// Check if `requested` lies inside the window
    pub fn contains(&self, requested: Millivolts) -> bool {
        requested >= self.min() && requested <= self.max()
    }

    /// Physical output level for `requested`
    ///
    /// The stage inverts polarity, so the output falls as the requested
    /// bias rises.
    pub fn output_for(&self, requested: Millivolts) -> Result<Millivolts, BiasError> {
        if !self.contains(requested) {
            return Err(BiasError::OutOfWindow {
                requested,
                min: self.min(),
                max: self.max(),
            });
        }
        Ok(Millivolts(self.offset.0 + KIT_CENTER.0 - requested.0))
    }

    /// Check if `requested` is close enough to a bound that the kit may not
    /// reproduce it accurately
    pub fn near_limit(&self, requested: Millivolts) -> bool {
        let scaled = requested.0 * 100;
        scaled >= ACCURACY_LIMIT_PERCENT * self.max().0
            || scaled <= ACCURACY_LIMIT_PERCENT * self.min().0
    }

    /// Output level that applies the calibration offset alone
    pub fn calibration_output(&self) -> Millivolts {
        Millivolts(self.offset.0 + KIT_CENTER.0)
    }
}
