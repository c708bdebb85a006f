/// The tags module reads the metadata of a local audio file into a `TrackTag`, the transient
/// record that the tracklist indexes and the player receives alongside the file.
use crate::error::{Result, ZencpExpectedError};
use crate::tracklist::{TrackMeta, TrackRecord};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag, TagType};
use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOptions {
    pub id3v1: bool,
    pub allow_empty: bool,
    pub fill: String,
}

impl Default for TagOptions {
    fn default() -> Self {
        TagOptions {
            id3v1: false,
            allow_empty: false,
            fill: crate::config::DEFAULT_FILL_STRING.to_string(),
        }
    }
}

impl TagOptions {
    fn text(&self, value: Option<Cow<'_, str>>) -> String {
        let value = value.as_deref().map(|s| s.trim_end_matches('\0')).unwrap_or_default();
        if value.is_empty() && !self.allow_empty {
            self.fill.clone()
        } else {
            value.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackTag {
    pub path: PathBuf,
    pub size: u64,
    pub artist: String,
    pub title: String,
    pub album: String,
    pub genre: String,
    pub year: u32,
    pub trackno: u32,
    pub duration_sec: u32,
    /// Sample rate in Hz.
    pub frequency: u32,
    /// Bitrate in kbps.
    pub bitrate: u32,
    pub track_id: Option<u32>,
}

impl TrackTag {
    pub fn from_file(p: &Path, opts: &TagOptions) -> Result<TrackTag> {
        let size = match fs::metadata(p) {
            Ok(m) => m.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ZencpExpectedError::FileNotFound { path: p.to_path_buf() }.into());
            }
            Err(e) => return Err(e.into()),
        };
        if size == 0 {
            return Err(ZencpExpectedError::EmptyFile { path: p.to_path_buf() }.into());
        }

        let probe = Probe::open(p)?.guess_file_type()?;
        if probe.file_type().is_none() {
            return Err(ZencpExpectedError::UnsupportedFiletype { path: p.to_path_buf() }.into());
        }
        let tagged_file = probe.read()?;

        let tag = if opts.id3v1 {
            tagged_file.tag(TagType::Id3v1)
        } else {
            tagged_file.primary_tag().or_else(|| tagged_file.first_tag())
        };
        if tag.is_none() {
            debug!("No tags found in {}", p.display());
        }

        let properties = tagged_file.properties();
        let mut tt = Self::from_tag(tag, opts);
        tt.path = p.to_path_buf();
        tt.size = size;
        tt.duration_sec = whole_seconds(properties.duration());
        tt.frequency = properties.sample_rate().unwrap_or(0);
        tt.bitrate = properties.audio_bitrate().unwrap_or(0);
        Ok(tt)
    }

    /// Builds the textual part of a `TrackTag`. A missing tag reads as all fields empty.
    pub fn from_tag(tag: Option<&Tag>, opts: &TagOptions) -> TrackTag {
        let get = |key: &ItemKey| tag.and_then(|t| t.get_string(key)).filter(|s| !s.trim_end_matches('\0').is_empty()).map(Cow::Borrowed);

        let artist = tag
            .and_then(|t| t.artist())
            .filter(|s| !s.trim_end_matches('\0').is_empty())
            .or_else(|| get(&ItemKey::AlbumArtist))
            .or_else(|| get(&ItemKey::Conductor))
            .or_else(|| get(&ItemKey::Composer));

        let year = tag
            .and_then(|t| t.year())
            .or_else(|| get(&ItemKey::RecordingDate).and_then(|s| parse_leading_int(&s)))
            .unwrap_or(0);

        TrackTag {
            path: PathBuf::new(),
            size: 0,
            artist: opts.text(artist),
            title: opts.text(tag.and_then(|t| t.title())),
            album: opts.text(tag.and_then(|t| t.album())),
            genre: resolve_genre(tag.and_then(|t| t.genre()).as_deref(), opts),
            year,
            trackno: tag.and_then(|t| t.track()).unwrap_or(0),
            duration_sec: 0,
            frequency: 0,
            bitrate: 0,
            track_id: None,
        }
    }

    /// A track as enumerated from the player: only the index fields and the player's id are known.
    pub fn on_device(artist: impl Into<String>, title: impl Into<String>, album: impl Into<String>, track_id: u32) -> TrackTag {
        TrackTag {
            path: PathBuf::new(),
            size: 0,
            artist: artist.into(),
            title: title.into(),
            album: album.into(),
            genre: String::new(),
            year: 0,
            trackno: 0,
            duration_sec: 0,
            frequency: 0,
            bitrate: 0,
            track_id: Some(track_id),
        }
    }

    pub fn record(&self) -> TrackRecord {
        TrackRecord {
            artist: self.artist.clone(),
            title: self.title.clone(),
            album: self.album.clone(),
            track_id: self.track_id,
        }
    }
}

impl TrackMeta for TrackTag {
    fn artist(&self) -> &str {
        &self.artist
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn album(&self) -> &str {
        &self.album
    }
    fn track_id(&self) -> Option<u32> {
        self.track_id
    }
}

impl fmt::Display for TrackTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " File:     {}", self.path.display())?;
        writeln!(f, " Size:     {} kB", self.size / 1024)?;
        writeln!(f)?;
        writeln!(f, "  Trackno: {}", self.trackno)?;
        writeln!(f, "  Artist:  {}", self.artist)?;
        writeln!(f, "  Title:   {}", self.title)?;
        writeln!(f, "  Album:   {}", self.album)?;
        writeln!(f, "  Genre:   {}", self.genre)?;
        writeln!(f, "  Year:    {}", self.year)?;
        writeln!(f)?;
        writeln!(f, "  Time:    {}:{:02}", self.duration_sec / 60, self.duration_sec % 60)?;
        writeln!(f, "  Freq.:   {} Hz", self.frequency)?;
        writeln!(f, "  Bitrate: {} kbps", self.bitrate)
    }
}

/// Resolves `(N)` genre references through the ID3v1 genre table. Plain genre names pass through.
pub fn resolve_genre(raw: Option<&str>, opts: &TagOptions) -> String {
    let raw = raw.map(|s| s.trim_end_matches('\0')).unwrap_or_default();
    let Some(rest) = raw.strip_prefix('(') else {
        return opts.text(Some(Cow::Borrowed(raw)));
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits
        .parse::<usize>()
        .ok()
        .and_then(|n| lofty::id3::v1::GENRES.get(n))
        .map(|g| g.to_string())
        .unwrap_or_else(|| opts.fill.clone())
}

/// Whole seconds of a duration, saturating at `u32::MAX`.
pub fn whole_seconds(d: Duration) -> u32 {
    u32::try_from(d.as_secs()).unwrap_or(u32::MAX)
}

/// Parses the leading ASCII digits of a string, e.g. "1999-04-01" -> 1999.
pub fn parse_leading_int(s: &str) -> Option<u32> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}
