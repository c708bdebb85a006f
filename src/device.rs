/// The device module is the seam to the player. Discovery, locking and the USB protocol live in
/// whatever implements `Device`; this crate only enumerates, sends and deletes through it.
use crate::error::{Result, ZencpError, ZencpExpectedError};
use crate::tags::TrackTag;
use crate::tracklist::TrackIndex;
use tracing::{info, warn};

pub trait Device {
    /// Human readable model/owner description, used in log lines.
    fn name(&self) -> String;

    /// Identifier used to pick this player when several are connected. See `device_id`.
    fn id(&self) -> u32;

    /// Every track resident on the player, in the player's order.
    fn tracks(&mut self) -> Result<Vec<TrackTag>>;

    /// Sends a file with its metadata and returns the track id the player assigned.
    fn send(&mut self, tag: &TrackTag) -> Result<u32>;

    fn delete(&mut self, track_id: u32) -> Result<()>;
}

/// Derives a player id from its owner string and disk figures. Not guaranteed to be unique, but
/// stable for a given player as long as its free space does not change.
pub fn device_id(owner: &str, disk_size: u32, disk_free: u32) -> u32 {
    let owner_sum = owner.bytes().fold(0u32, |acc, b| acc.wrapping_add(u32::from(b)));
    ((disk_size ^ owner_sum).wrapping_add(disk_free)) ^ disk_free
}

/// Picks the player to use: the one with id `wanted`, or the first one when no id is given.
pub fn select_device<D: Device>(devices: Vec<D>, wanted: Option<u32>) -> Result<D> {
    let mut devices = devices.into_iter();
    let device = match wanted {
        None => devices.next().ok_or(ZencpExpectedError::NoDevice)?,
        Some(device_id) => devices.find(|d| d.id() == device_id).ok_or(ZencpExpectedError::DeviceNotFound { device_id })?,
    };
    info!("Using player {} ({})", device.name(), device.id());
    Ok(device)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrimeReport {
    /// Tracks enumerated from the player.
    pub enumerated: usize,
    /// Tracks that created a new index entry.
    pub indexed: usize,
    /// Tracks with the same artist and title as an earlier one.
    pub duplicates: usize,
    /// Tracks whose artist or title is empty and therefore cannot be indexed.
    pub skipped: usize,
}

/// Inserts every track on the player into `index`, once each and in enumeration order. Must run
/// to completion before the index is used for duplicate checks.
pub fn prime_index<D: Device + ?Sized>(device: &mut D, index: &mut TrackIndex) -> Result<PrimeReport> {
    let tracks = device.tracks()?;
    let mut report = PrimeReport {
        enumerated: tracks.len(),
        ..PrimeReport::default()
    };
    for track in &tracks {
        match index.insert(track) {
            Ok(inserted) if inserted.is_created() => report.indexed += 1,
            Ok(_) => report.duplicates += 1,
            Err(ZencpError::Expected(ZencpExpectedError::InvalidInput { field })) => {
                warn!("Skipping player track {:?} with empty {}", track.track_id, field);
                report.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    info!("Retrieved player tracklist from {}: {} songs on the player", device.name(), report.enumerated);
    Ok(report)
}
