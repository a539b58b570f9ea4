//! Scan state definition

use super::events::Event;

/// Scan states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanState {
    /// No scan running
    Idle,
    /// Taking the dark-current baseline, pulsing the LED, settling
    Priming,
    /// Acquiring the reading at index `step`
    Reading { step: u8 },
    /// Last scan of a batch finished; its grid may be exported
    Complete,
    /// A device operation failed; the batch was aborted
    Faulted,
}

impl ScanState {
    /// Check if a scan can be started from this state
    pub fn can_start(&self) -> bool {
        matches!(self, ScanState::Idle | ScanState::Complete)
    }

    /// Check if a scan is in progress
    pub fn is_scanning(&self) -> bool {
        matches!(self, ScanState::Priming | ScanState::Reading { .. })
    }

    /// Index of the reading in progress, if any
    pub fn step(&self) -> Option<u8> {
        match self {
            ScanState::Reading { step } => Some(*step),
            _ => None,
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use ScanState::*;

        match (self, event) {
            (Idle | Complete, Start) => Priming,

            (Priming, Primed) => Reading { step: 0 },
            (Priming, Exit) => Idle,

            (Reading { step }, StepComplete) => Reading {
                step: step.saturating_add(1),
            },
            (Reading { .. }, ScanFinished { last_in_batch }) => {
                if last_in_batch {
                    Complete
                } else {
                    Idle
                }
            }
            (Reading { .. }, Exit) => Idle,

            (Priming | Reading { .. }, DeviceFault) => Faulted,
            (Faulted, AcknowledgeFault) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
