//! LED driver control line
//!
//! The LED driver board is enabled by pulling its control line low. A low
//! then high pulse restarts the board's flash sequence from the first LED.

use beskar_core::traits::LedControl;
use beskar_hal::{DaqError, DigitalLine, DigitalOutput};

/// Digital line the LED driver board listens on
pub const LED_LINE: DigitalLine = DigitalLine::new(0, 0);

/// LED driver control over a DAQ digital output
pub struct DaqLed<O> {
    output: O,
    line: DigitalLine,
}

impl<O: DigitalOutput> DaqLed<O> {
    /// Create a new LED control
    pub fn new(output: O, line: DigitalLine) -> Self {
        Self { output, line }
    }

    /// LED control on the kit's default line
    pub fn kit(output: O) -> Self {
        Self::new(output, LED_LINE)
    }
}

impl<O: DigitalOutput> LedControl for DaqLed<O> {
    fn on(&mut self) -> Result<(), DaqError> {
        self.output.write_line(self.line, false)
    }

    fn off(&mut self) -> Result<(), DaqError> {
        self.output.write_line(self.line, true)
    }

    fn flash(&mut self) -> Result<(), DaqError> {
        // Both edges within one channel session
        self.output.write_line_sequence(self.line, &[false, true])
    }
}
