//! Physical channel identifiers
//!
//! Channels are named the way the DAQ driver expects them relative to a
//! device (`ai1`, `ao0`, `port0/line0`). The device prefix (`Dev1/`) is
//! supplied by the binding at runtime.

use core::fmt;

/// Analog input channel (`ai<n>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogInputChannel(pub u8);

/// Analog output channel (`ao<n>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogOutputChannel(pub u8);

/// Digital output line (`port<p>/line<l>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DigitalLine {
    /// Port number
    pub port: u8,
    /// Line number within the port
    pub line: u8,
}

impl DigitalLine {
    /// Create a new digital line identifier
    pub const fn new(port: u8, line: u8) -> Self {
        Self { port, line }
    }
}

impl fmt::Display for AnalogInputChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ai{}", self.0)
    }
}

impl fmt::Display for AnalogOutputChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ao{}", self.0)
    }
}

impl fmt::Display for DigitalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port{}/line{}", self.port, self.line)
    }
}

/// Parse error for channel names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidChannelName;

impl core::str::FromStr for AnalogInputChannel {
    type Err = InvalidChannelName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_indexed(s, "ai").map(AnalogInputChannel)
    }
}

impl core::str::FromStr for AnalogOutputChannel {
    type Err = InvalidChannelName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_indexed(s, "ao").map(AnalogOutputChannel)
    }
}

impl core::str::FromStr for DigitalLine {
    type Err = InvalidChannelName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (port, line) = s.split_once('/').ok_or(InvalidChannelName)?;
        Ok(DigitalLine {
            port: parse_indexed(port, "port")?,
            line: parse_indexed(line, "line")?,
        })
    }
}

fn parse_indexed(s: &str, prefix: &str) -> Result<u8, InvalidChannelName> {
    s.strip_prefix(prefix)
        .and_then(|n| n.parse().ok())
        .ok_or(InvalidChannelName)
}

/// Voltage range of a channel, in volts
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VoltageRange {
    /// Minimum expected value
    pub min: f64,
    /// Maximum expected value
    pub max: f64,
}

impl VoltageRange {
    /// Bipolar ±10 V input range used for photodiode reads
    pub const BIPOLAR_10V: Self = Self::new(-10.0, 10.0);

    /// Unipolar 0–5 V output range of the bias supply
    pub const UNIPOLAR_5V: Self = Self::new(0.0, 5.0);

    /// Create a new range
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check if a value lies inside the range (inclusive)
    pub fn contains(&self, volts: f64) -> bool {
        volts >= self.min && volts <= self.max
    }
}
