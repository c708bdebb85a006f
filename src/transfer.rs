/// The transfer module runs the per-file workflow: read the tags, check the player's track index
/// for a duplicate, ask for confirmation, send, and fold the player's new track id back into the
/// index so that the same file cannot be sent twice in one session.
use crate::config::Config;
use crate::device::{prime_index, select_device, Device, PrimeReport};
use crate::error::{Result, ZencpError, ZencpExpectedError};
use crate::tags::{TagOptions, TrackTag};
use crate::tracklist::{TrackIndex, TrackRecord};
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Quit,
}

/// Asks whether a track should be sent. `overwrite` is set when the track is already on the
/// player and will be replaced.
pub trait Confirm {
    fn confirm(&mut self, tag: &TrackTag, overwrite: bool) -> Answer;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysYes;

impl Confirm for AlwaysYes {
    fn confirm(&mut self, _tag: &TrackTag, _overwrite: bool) -> Answer {
        Answer::Yes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Sent; the player assigned this track id.
    Sent(u32),
    /// Already on the player.
    Skipped,
    Declined,
    /// Processing stopped at this file on request.
    Aborted,
    Unreadable(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
}

pub struct Session<D: Device, C: Confirm> {
    config: Config,
    tag_options: TagOptions,
    device: D,
    confirm: C,
    index: TrackIndex,
    primed: PrimeReport,
}

impl<D: Device, C: Confirm> Session<D, C> {
    /// Opens a session on `device`. The player's tracks are indexed before this returns.
    pub fn new(config: Config, mut device: D, confirm: C) -> Result<Self> {
        let mut index = TrackIndex::new();
        let primed = prime_index(&mut device, &mut index)?;
        Ok(Session {
            tag_options: config.tag_options(),
            config,
            device,
            confirm,
            index,
            primed,
        })
    }

    /// Opens a session on the player chosen by `config.device` among `devices`.
    pub fn open(config: Config, devices: Vec<D>, confirm: C) -> Result<Self> {
        let device = select_device(devices, config.device)?;
        Self::new(config, device, confirm)
    }

    pub fn index(&self) -> &TrackIndex {
        &self.index
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn confirmer(&self) -> &C {
        &self.confirm
    }

    pub fn primed(&self) -> PrimeReport {
        self.primed
    }

    /// Writes the list of tracks on the player.
    pub fn dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.index.dump(w)
    }

    /// Deletes a track from the player and drops it from the index.
    pub fn delete_track(&mut self, track_id: u32) -> Result<TrackRecord> {
        if self.index.find_track_id(track_id).is_none() {
            return Err(ZencpExpectedError::TrackDoesNotExist { track_id }.into());
        }
        self.device.delete(track_id)?;
        let record = self.index.remove_by_track_id(track_id).ok_or(ZencpExpectedError::TrackDoesNotExist { track_id })?;
        info!("Deleted {} from the player", record);
        Ok(record)
    }

    /// Transfers files in order. A path given more than once is processed once. Stops after a
    /// file answered with `Answer::Quit`.
    pub fn transfer_all(&mut self, paths: &[PathBuf]) -> Result<Vec<FileReport>> {
        let mut seen = HashSet::new();
        let mut reports = Vec::new();
        for path in paths {
            if !seen.insert(path) {
                debug!("Ignoring repeated file {}", path.display());
                continue;
            }
            let outcome = self.transfer_file(path)?;
            let aborted = outcome == Outcome::Aborted;
            reports.push(FileReport {
                path: path.clone(),
                outcome,
            });
            if aborted {
                break;
            }
        }
        Ok(reports)
    }

    pub fn transfer_file(&mut self, path: &Path) -> Result<Outcome> {
        match TrackTag::from_file(path, &self.tag_options) {
            Ok(tag) => self.transfer_tag(tag),
            Err(e) => {
                warn!("ID3 tags could not be retrieved, skipping {}: {}", path.display(), e);
                Ok(Outcome::Unreadable(e.to_string()))
            }
        }
    }

    /// Decides what to do with one already-read tag and carries it out. Only errors from the
    /// index itself are returned; player failures become `Outcome::Failed`.
    pub fn transfer_tag(&mut self, mut tag: TrackTag) -> Result<Outcome> {
        let existing = self.index.find_tag(&tag);

        if existing.is_some() && (self.config.assume_yes || !self.config.force) {
            info!("{} - {} already exists, skipping", tag.artist, tag.title);
            return Ok(Outcome::Skipped);
        }

        if !self.config.assume_yes {
            match self.confirm.confirm(&tag, existing.is_some()) {
                Answer::Yes => {}
                Answer::No => return Ok(Outcome::Declined),
                Answer::Quit => {
                    warn!("Aborted by user");
                    return Ok(Outcome::Aborted);
                }
            }
        }

        if let Some(handle) = existing {
            if let Some(old_id) = self.index.get(handle).and_then(|r| r.track_id) {
                if let Err(e) = self.device.delete(old_id) {
                    warn!("Failed to delete {} - {} ({}) before overwriting: {}", tag.artist, tag.title, old_id, e);
                    return Ok(Outcome::Failed(e.to_string()));
                }
            }
            self.index.remove(handle);
            info!("{} - {} will be overwritten", tag.artist, tag.title);
        }

        info!("Sending {} - {}", tag.artist, tag.title);
        let track_id = match self.device.send(&tag) {
            Ok(id) => id,
            Err(e) => {
                warn!("Failed to send {} - {}: {}", tag.artist, tag.title, e);
                return Ok(Outcome::Failed(e.to_string()));
            }
        };
        tag.track_id = Some(track_id);

        match self.index.insert(&tag) {
            Ok(inserted) if !inserted.is_created() => {
                debug!("{} - {} was already indexed under another album; keeping the earlier entry", tag.artist, tag.title);
            }
            Ok(_) => {}
            Err(ZencpError::Expected(ZencpExpectedError::InvalidInput { field })) => {
                warn!("Track {} was sent with an empty {} and is not indexed", track_id, field);
            }
            Err(e) => return Err(e),
        }
        info!("Successfully sent {} - {}", tag.artist, tag.title);
        Ok(Outcome::Sent(track_id))
    }
}
