use crate::error::{ZencpError, ZencpExpectedError};
use crate::tags::*;
use crate::testing;
use crate::tracklist::{TrackIndex, TrackMeta};
use lofty::prelude::*;
use lofty::tag::{ItemKey, Tag, TagType};

fn opts() -> TagOptions {
    TagOptions::default()
}

#[test]
fn test_from_file_missing() {
    let temp_dir = testing::init();
    let path = temp_dir.path().join("nope.mp3");
    let err = TrackTag::from_file(&path, &opts()).unwrap_err();
    assert!(matches!(err, ZencpError::Expected(ZencpExpectedError::FileNotFound { .. })));
}

#[test]
fn test_from_file_empty() {
    let temp_dir = testing::init();
    let path = temp_dir.path().join("empty.mp3");
    std::fs::write(&path, b"").unwrap();
    let err = TrackTag::from_file(&path, &opts()).unwrap_err();
    assert!(matches!(err, ZencpError::Expected(ZencpExpectedError::EmptyFile { .. })));
}

#[test]
fn test_from_file_unsupported() {
    let temp_dir = testing::init();
    let path = temp_dir.path().join("notes.txt");
    std::fs::write(&path, "these are not the droids you are looking for").unwrap();
    let err = TrackTag::from_file(&path, &opts()).unwrap_err();
    assert!(matches!(err, ZencpError::Expected(ZencpExpectedError::UnsupportedFiletype { .. })));
}

#[test]
fn test_from_tag_reads_fields() {
    let mut tag = Tag::new(TagType::Id3v2);
    tag.set_artist("ABBA".to_string());
    tag.set_title("Waterloo".to_string());
    tag.set_album("Waterloo".to_string());
    tag.set_genre("Pop".to_string());
    tag.set_track(3);

    let tt = TrackTag::from_tag(Some(&tag), &opts());
    assert_eq!(tt.artist, "ABBA");
    assert_eq!(tt.title, "Waterloo");
    assert_eq!(tt.album, "Waterloo");
    assert_eq!(tt.genre, "Pop");
    assert_eq!(tt.trackno, 3);
    assert_eq!(tt.track_id, None);
}

#[test]
fn test_from_tag_artist_fallback() {
    let mut tag = Tag::new(TagType::Id3v2);
    tag.set_title("Symphony No. 5".to_string());
    tag.insert_text(ItemKey::Composer, "Beethoven".to_string());
    let tt = TrackTag::from_tag(Some(&tag), &opts());
    assert_eq!(tt.artist, "Beethoven");

    tag.insert_text(ItemKey::AlbumArtist, "Berliner Philharmoniker".to_string());
    let tt = TrackTag::from_tag(Some(&tag), &opts());
    assert_eq!(tt.artist, "Berliner Philharmoniker");
}

#[test]
fn test_from_tag_fills_empty_fields() {
    let tt = TrackTag::from_tag(None, &opts());
    assert_eq!(tt.artist, "<Unknown>");
    assert_eq!(tt.title, "<Unknown>");
    assert_eq!(tt.album, "<Unknown>");
    assert_eq!(tt.genre, "<Unknown>");
    assert_eq!(tt.year, 0);
    assert_eq!(tt.trackno, 0);

    let custom = TagOptions {
        fill: "<Unbekannt>".to_string(),
        ..TagOptions::default()
    };
    let tt = TrackTag::from_tag(None, &custom);
    assert_eq!(tt.artist, "<Unbekannt>");
}

#[test]
fn test_from_tag_allow_empty() {
    let allow = TagOptions {
        allow_empty: true,
        ..TagOptions::default()
    };
    let tt = TrackTag::from_tag(None, &allow);
    assert_eq!(tt.artist, "");
    assert_eq!(tt.title, "");

    // Such a tag cannot be indexed.
    let mut index = TrackIndex::new();
    let err = index.insert(&tt).unwrap_err();
    assert!(matches!(err, ZencpError::Expected(ZencpExpectedError::InvalidInput { field: "artist" })));
}

#[test]
fn test_filled_tags_share_the_other_bucket() {
    let tt = TrackTag::from_tag(None, &opts());
    assert_eq!(crate::tracklist::bucket(tt.artist()).unwrap(), crate::tracklist::OTHER_BUCKET);
}

#[test]
fn test_resolve_genre() {
    assert_eq!(resolve_genre(Some("(17)"), &opts()), "Rock");
    assert_eq!(resolve_genre(Some("(0)"), &opts()), "Blues");
    assert_eq!(resolve_genre(Some("(17)Rock"), &opts()), "Rock");
    assert_eq!(resolve_genre(Some("(9999)"), &opts()), "<Unknown>");
    assert_eq!(resolve_genre(Some("()"), &opts()), "<Unknown>");
    assert_eq!(resolve_genre(Some("Synthpop"), &opts()), "Synthpop");
    assert_eq!(resolve_genre(Some("Synthpop\0"), &opts()), "Synthpop");
    assert_eq!(resolve_genre(None, &opts()), "<Unknown>");
    assert_eq!(resolve_genre(Some(""), &opts()), "<Unknown>");
}

#[test]
fn test_parse_leading_int() {
    assert_eq!(parse_leading_int("1999"), Some(1999));
    assert_eq!(parse_leading_int("1999-04-01"), Some(1999));
    assert_eq!(parse_leading_int("3/12"), Some(3));
    assert_eq!(parse_leading_int(""), None);
    assert_eq!(parse_leading_int("unknown"), None);
}

#[test]
fn test_whole_seconds_saturates() {
    use std::time::Duration;
    assert_eq!(whole_seconds(Duration::from_millis(231_900)), 231);
    assert_eq!(whole_seconds(Duration::from_secs(u64::from(u32::MAX))), u32::MAX);
    assert_eq!(whole_seconds(Duration::from_secs(u64::from(u32::MAX) + 5)), u32::MAX);
}

#[test]
fn test_on_device_and_record() {
    let tt = TrackTag::on_device("ABBA", "SOS", "ABBA", 42);
    assert_eq!(tt.track_id(), Some(42));
    let record = tt.record();
    assert_eq!(record.artist, "ABBA");
    assert_eq!(record.title, "SOS");
    assert_eq!(record.track_id, Some(42));
}

#[test]
fn test_display() {
    let mut tt = testing::tag("ABBA", "Waterloo", "Waterloo");
    tt.duration_sec = 167;
    let text = tt.to_string();
    assert!(text.starts_with(" File:     /music/ABBA/Waterloo.mp3\n Size:     4096 kB\n"));
    assert!(text.contains("  Artist:  ABBA\n"));
    assert!(text.contains("  Year:    1976\n"));
    assert!(text.contains("  Time:    2:47\n"));
    assert!(text.contains("  Freq.:   44100 Hz\n"));
    assert!(text.ends_with("  Bitrate: 192 kbps\n"));
}
