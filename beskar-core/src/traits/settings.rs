//! Persistent user settings

use crate::config::Settings;

/// Storage for [`Settings`]
///
/// Implementations heal a missing or unreadable store by returning the
/// defaults rather than failing the load.
pub trait SettingsStore {
    /// Storage error type
    type Error;

    /// Load the stored settings
    fn load(&mut self) -> Result<Settings, Self::Error>;

    /// Persist `settings`
    fn store(&mut self, settings: &Settings) -> Result<(), Self::Error>;

    /// Load, modify and persist in one step
    fn update<F>(&mut self, f: F) -> Result<Settings, Self::Error>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.load()?;
        f(&mut settings);
        self.store(&settings)?;
        Ok(settings)
    }
}
