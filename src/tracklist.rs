/// The tracklist module holds the index of tracks resident on a player. It exists to answer one
/// question quickly: is the file we are about to send already on the device?
///
/// Tracks are grouped into 28 buckets by the first byte of the artist name (one per ASCII letter,
/// one for digits, one for everything else). Each bucket heads a chain of distinct artists, and
/// each artist node heads a chain of that artist's titles:
///
/// ```text
///  buckets            artist chain
///  +-----+     +---------------+      +---------------+
///  |  A  |---->| ABBA          |----->| AC/DC         |
///  +-----+     | Dancing Queen |      | Damned        |
///  |  B  |     +---------------+      +---------------+
///  +-----+             | title chain
///  | ... |     +---------------+
///              | ABBA          |
///              | Waterloo      |
///              +---------------+
/// ```
///
/// Nodes live in an arena and are addressed by generational handles, so a handle never aliases a
/// node that later reuses its slot.
use crate::error::{Result, ZencpExpectedError};
use std::fmt;
use std::io::{self, Write};
use std::iter;
use tracing::{debug, trace};

pub const BUCKET_COUNT: usize = 28;
pub const DIGIT_BUCKET: usize = 26;
pub const OTHER_BUCKET: usize = 27;

/// Returns the bucket of an artist name. Only the first byte is classified, and only as ASCII.
pub fn bucket(artist: &str) -> Result<usize> {
    let first = *artist.as_bytes().first().ok_or(ZencpExpectedError::InvalidInput { field: "artist" })?;
    Ok(match first {
        b'A'..=b'Z' => (first - b'A') as usize,
        b'a'..=b'z' => (first - b'a') as usize,
        b'0'..=b'9' => DIGIT_BUCKET,
        _ => OTHER_BUCKET,
    })
}

/// Read access to the fields the index cares about. Anything record-shaped (a stored record, a
/// freshly read file tag, a track enumerated from the device) can be inserted or looked up.
pub trait TrackMeta {
    fn artist(&self) -> &str;
    fn title(&self) -> &str;
    fn album(&self) -> &str;
    fn track_id(&self) -> Option<u32>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackRecord {
    pub artist: String,
    pub title: String,
    pub album: String,
    /// Assigned by the player once the track has been transferred.
    pub track_id: Option<u32>,
}

impl TrackRecord {
    pub fn new(artist: impl Into<String>, title: impl Into<String>, album: impl Into<String>) -> Self {
        TrackRecord {
            artist: artist.into(),
            title: title.into(),
            album: album.into(),
            track_id: None,
        }
    }

    pub fn with_track_id(mut self, track_id: u32) -> Self {
        self.track_id = Some(track_id);
        self
    }
}

impl TrackMeta for TrackRecord {
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

impl fmt::Display for TrackRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.track_id {
            Some(id) => write!(f, "{} - {} ({})", self.artist, self.title, id),
            None => write!(f, "{} - {} (-)", self.artist, self.title),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackHandle {
    slot: u32,
    generation: u32,
}

/// Outcome of a chain scan. On a miss, `tail` is the last node visited so that an append does
/// not need to walk the chain again. It is `None` only when the chain start was not a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found(TrackHandle),
    Missing { tail: Option<TrackHandle> },
}

impl Lookup {
    pub fn found(self) -> Option<TrackHandle> {
        match self {
            Lookup::Found(h) => Some(h),
            Lookup::Missing { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    Created(TrackHandle),
    /// A track with the same artist and title was already indexed. The album is not compared.
    Existing(TrackHandle),
}

impl Inserted {
    pub fn handle(self) -> TrackHandle {
        match self {
            Inserted::Created(h) | Inserted::Existing(h) => h,
        }
    }

    pub fn is_created(self) -> bool {
        matches!(self, Inserted::Created(_))
    }
}

#[derive(Debug)]
struct Node {
    record: TrackRecord,
    next_artist: Option<TrackHandle>,
    next_title: Option<TrackHandle>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

fn copy_text(s: &str) -> Result<String> {
    let mut out = String::new();
    out.try_reserve_exact(s.len()).map_err(|_| ZencpExpectedError::AllocationFailure { what: "track text" })?;
    out.push_str(s);
    Ok(out)
}

fn copy_record<T: TrackMeta + ?Sized>(tag: &T) -> Result<TrackRecord> {
    Ok(TrackRecord {
        artist: copy_text(tag.artist())?,
        title: copy_text(tag.title())?,
        album: copy_text(tag.album())?,
        track_id: tag.track_id(),
    })
}

#[derive(Debug, Default)]
pub struct TrackIndex {
    buckets: [Option<TrackHandle>; BUCKET_COUNT],
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl TrackIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, handle: TrackHandle) -> Option<&TrackRecord> {
        self.node(handle).map(|n| &n.record)
    }

    /// Head of the artist chain of a bucket, if any artist has been indexed there.
    pub fn artist_head(&self, bucket: usize) -> Option<TrackHandle> {
        self.buckets.get(bucket).copied().flatten()
    }

    /// The distinct-artist nodes of a bucket, in insertion order.
    pub fn artist_chain(&self, bucket: usize) -> impl Iterator<Item = TrackHandle> + '_ {
        self.chain(self.artist_head(bucket), |n| n.next_artist)
    }

    /// The tracks of one artist, starting with the artist node itself.
    pub fn title_chain(&self, artist_node: TrackHandle) -> impl Iterator<Item = TrackHandle> + '_ {
        self.chain(Some(artist_node), |n| n.next_title)
    }

    /// Stores a copy of `tag` unless a track with the same artist and title is already indexed,
    /// in which case the existing handle is returned and nothing is stored.
    pub fn insert<T: TrackMeta + ?Sized>(&mut self, tag: &T) -> Result<Inserted> {
        let bucket = bucket(tag.artist())?;
        if tag.title().is_empty() {
            return Err(ZencpExpectedError::InvalidInput { field: "title" }.into());
        }

        let Some(head) = self.buckets[bucket] else {
            let handle = self.alloc(copy_record(tag)?)?;
            self.buckets[bucket] = Some(handle);
            debug!("Indexed {} - {} as head of bucket {}", tag.artist(), tag.title(), bucket);
            return Ok(Inserted::Created(handle));
        };

        let handle = match self.find_artist(head, tag.artist()) {
            Lookup::Found(artist_node) => match self.find_title(artist_node, tag.title()) {
                Lookup::Found(existing) => {
                    trace!("{} - {} is already indexed", tag.artist(), tag.title());
                    return Ok(Inserted::Existing(existing));
                }
                Lookup::Missing { tail } => {
                    let handle = self.alloc(copy_record(tag)?)?;
                    if let Some(node) = self.node_mut(tail.unwrap_or(artist_node)) {
                        node.next_title = Some(handle);
                    }
                    handle
                }
            },
            Lookup::Missing { tail } => {
                let handle = self.alloc(copy_record(tag)?)?;
                if let Some(node) = self.node_mut(tail.unwrap_or(head)) {
                    node.next_artist = Some(handle);
                }
                handle
            }
        };
        debug!("Indexed {} - {} in bucket {}", tag.artist(), tag.title(), bucket);
        Ok(Inserted::Created(handle))
    }

    /// Scans the artist chain starting at `head` for an exact artist match.
    pub fn find_artist(&self, head: TrackHandle, artist: &str) -> Lookup {
        self.scan(head, |n| n.next_artist, |r| r.artist == artist)
    }

    /// Scans the title chain anchored at `artist_node` for an exact title match.
    pub fn find_title(&self, artist_node: TrackHandle, title: &str) -> Lookup {
        self.scan(artist_node, |n| n.next_title, |r| r.title == title)
    }

    /// Finds a track matching artist, title and album exactly. Unlike `insert`, the album is
    /// part of the key here.
    pub fn find_tag<T: TrackMeta + ?Sized>(&self, tag: &T) -> Option<TrackHandle> {
        let head = self.artist_head(bucket(tag.artist()).ok()?)?;
        let artist_node = self.find_artist(head, tag.artist()).found()?;
        let title_node = self.find_title(artist_node, tag.title()).found()?;
        (self.get(title_node)?.album == tag.album()).then_some(title_node)
    }

    pub fn find_track_id(&self, track_id: u32) -> Option<TrackHandle> {
        self.iter().find(|(_, r)| r.track_id == Some(track_id)).map(|(h, _)| h)
    }

    /// Unlinks a track from both chains and reclaims its slot. If the track heads its artist's
    /// title chain, the next title takes over its place in the artist chain.
    pub fn remove(&mut self, handle: TrackHandle) -> Option<TrackRecord> {
        let (bucket, artist_prev, artist_node, next_artist, next_title) = {
            let node = self.node(handle)?;
            let bucket = bucket(&node.record.artist).ok()?;
            let (prev, artist_node) = self.artist_position(bucket, &node.record.artist)?;
            (bucket, prev, artist_node, node.next_artist, node.next_title)
        };

        if artist_node == handle {
            let replacement = match next_title {
                Some(successor) => {
                    self.node_mut(successor)?.next_artist = next_artist;
                    Some(successor)
                }
                None => next_artist,
            };
            match artist_prev {
                Some(prev) => self.node_mut(prev)?.next_artist = replacement,
                None => self.buckets[bucket] = replacement,
            }
        } else {
            let prev = self.title_chain(artist_node).find(|h| self.node(*h).and_then(|n| n.next_title) == Some(handle))?;
            self.node_mut(prev)?.next_title = next_title;
        }

        let record = self.release(handle)?;
        debug!("Removed {} from bucket {}", record, bucket);
        Some(record)
    }

    pub fn remove_by_track_id(&mut self, track_id: u32) -> Option<TrackRecord> {
        let handle = self.find_track_id(track_id)?;
        self.remove(handle)
    }

    /// Every indexed track: bucket by bucket, artist by artist, title by title, each in insertion
    /// order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            index: self,
            bucket: 0,
            artist: None,
            title: None,
        }
    }

    /// Writes the bucket tree in the player's track-list format.
    pub fn dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for b in 0..BUCKET_COUNT {
            writeln!(w, "\n{:2} \\", b)?;
            if self.buckets[b].is_none() {
                writeln!(w, "    +- NULL")?;
                continue;
            }
            for artist_node in self.artist_chain(b) {
                let mut titles = self.title_chain(artist_node).filter_map(|h| self.get(h));
                if let Some(head) = titles.next() {
                    writeln!(w, "    +- {}", head)?;
                }
                for record in titles {
                    writeln!(w, "    |  +- {}", record)?;
                }
            }
        }
        writeln!(w)
    }

    fn node(&self, handle: TrackHandle) -> Option<&Node> {
        self.slots
            .get(handle.slot as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.node.as_ref())
    }

    fn node_mut(&mut self, handle: TrackHandle) -> Option<&mut Node> {
        self.slots
            .get_mut(handle.slot as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.node.as_mut())
    }

    fn chain(&self, from: Option<TrackHandle>, link: fn(&Node) -> Option<TrackHandle>) -> impl Iterator<Item = TrackHandle> + '_ {
        let start = from.filter(|h| self.node(*h).is_some());
        iter::successors(start, move |h| self.node(*h).and_then(link))
    }

    fn scan(&self, from: TrackHandle, link: fn(&Node) -> Option<TrackHandle>, matches: impl Fn(&TrackRecord) -> bool) -> Lookup {
        let mut tail = None;
        for h in self.chain(Some(from), link) {
            if self.get(h).is_some_and(&matches) {
                return Lookup::Found(h);
            }
            tail = Some(h);
        }
        Lookup::Missing { tail }
    }

    fn artist_position(&self, bucket: usize, artist: &str) -> Option<(Option<TrackHandle>, TrackHandle)> {
        let mut prev = None;
        for h in self.artist_chain(bucket) {
            if self.get(h)?.artist == artist {
                return Some((prev, h));
            }
            prev = Some(h);
        }
        None
    }

    fn alloc(&mut self, record: TrackRecord) -> Result<TrackHandle> {
        let node = Node {
            record,
            next_artist: None,
            next_title: None,
        };
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.node = Some(node);
            self.len += 1;
            return Ok(TrackHandle {
                slot,
                generation: entry.generation,
            });
        }

        let oom = || ZencpExpectedError::AllocationFailure { what: "track node" };
        let slot = u32::try_from(self.slots.len()).map_err(|_| oom())?;
        self.slots.try_reserve(1).map_err(|_| oom())?;
        // Keep room for every slot on the free list so release never allocates.
        self.free.try_reserve(self.slots.len() + 1 - self.free.len()).map_err(|_| oom())?;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        self.len += 1;
        Ok(TrackHandle { slot, generation: 0 })
    }

    fn release(&mut self, handle: TrackHandle) -> Option<TrackRecord> {
        let entry = self.slots.get_mut(handle.slot as usize).filter(|s| s.generation == handle.generation)?;
        let node = entry.node.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(handle.slot);
        self.len -= 1;
        Some(node.record)
    }
}

pub struct Iter<'a> {
    index: &'a TrackIndex,
    bucket: usize,
    artist: Option<TrackHandle>,
    title: Option<TrackHandle>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (TrackHandle, &'a TrackRecord);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(h) = self.title {
                let node = self.index.node(h)?;
                self.title = node.next_title;
                return Some((h, &node.record));
            }
            if let Some(h) = self.artist {
                let node = self.index.node(h)?;
                self.artist = node.next_artist;
                self.title = node.next_title;
                return Some((h, &node.record));
            }
            if self.bucket >= BUCKET_COUNT {
                return None;
            }
            self.artist = self.index.buckets[self.bucket];
            self.bucket += 1;
        }
    }
}

impl<'a> IntoIterator for &'a TrackIndex {
    type Item = (TrackHandle, &'a TrackRecord);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
