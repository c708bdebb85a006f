pub mod common;
pub mod config;
pub mod device;
pub mod error;
pub mod tags;
pub mod tracklist;
pub mod transfer;

pub use config::Config;
pub use device::{device_id, prime_index, select_device, Device, PrimeReport};
pub use error::{Result, ZencpError, ZencpExpectedError};
pub use tags::{TagOptions, TrackTag};
pub use tracklist::{Inserted, Lookup, TrackHandle, TrackIndex, TrackMeta, TrackRecord};
pub use transfer::{AlwaysYes, Answer, Confirm, FileReport, Outcome, Session};

#[cfg(test)]
mod testing;

#[cfg(test)]
mod config_test;
#[cfg(test)]
mod tags_test;
