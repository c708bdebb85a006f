use crate::config::Config;
use crate::tags::TrackTag;
use std::path::PathBuf;
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

pub fn init() -> TempDir {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")))
            .with_test_writer()
            .try_init();
    });
    TempDir::new().expect("failed to create temp dir")
}

// Non-interactive config that skips duplicates.
pub fn config() -> Config {
    Config {
        assume_yes: true,
        ..Config::default()
    }
}

// A tag as it would come out of a file read, without touching the filesystem.
pub fn tag(artist: &str, title: &str, album: &str) -> TrackTag {
    TrackTag {
        path: PathBuf::from(format!("/music/{artist}/{title}.mp3")),
        size: 4 * 1024 * 1024,
        artist: artist.to_string(),
        title: title.to_string(),
        album: album.to_string(),
        genre: "Pop".to_string(),
        year: 1976,
        trackno: 1,
        duration_sec: 231,
        frequency: 44100,
        bitrate: 192,
        track_id: None,
    }
}
