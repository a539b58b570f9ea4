//! Exit requests from the terminal
//!
//! Pressing Enter while a batch runs raises [`EXITING`]. The sequencer polls
//! it before every reading and abandons the scan in progress.

use std::io::BufRead;
use std::sync::atomic::Ordering;

use log::*;

use crate::channels::EXITING;

/// Watch stdin on a background thread
pub fn watch_stdin() {
    let spawned = std::thread::Builder::new()
        .name("exit-watch".into())
        .spawn(|| {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(_) => {
                        info!("Exit requested, stopping after the current reading");
                        EXITING.store(true, Ordering::Release);
                        return;
                    }
                    Err(e) => {
                        debug!("stdin closed: {}", e);
                        return;
                    }
                }
            }
        });

    if let Err(e) = spawned {
        warn!("Exit watcher unavailable, scans run to completion: {}", e);
    }
}
