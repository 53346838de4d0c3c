//! CHD track metadata and per-track readers.
//!
//! Metadata entries form a linked list starting at the header's
//! metadata offset. Each entry has a 16-byte header (4-byte tag, packed
//! 24-bit length + 8-bit flags, 64-bit next offset) followed by the
//! payload. The CD/GD track tags carry one space-separated
//! `KEY:VALUE` record each.

use std::collections::HashMap;
use std::io;

use serde::Serialize;

use romprobe_core::{IdentError, RandomAccess};

use crate::Chd;

/// Raw CD sector size within a track (subcode excluded).
const RAW_SECTOR_SIZE: u64 = 2352;

/// CD-ROM track metadata tag.
pub const TAG_CDROM: &[u8; 4] = b"CHTR";
/// CD-ROM track metadata tag, v2.
pub const TAG_CDROM2: &[u8; 4] = b"CHT2";
/// GD-ROM track metadata tag.
pub const TAG_GDROM: &[u8; 4] = b"CHGD";

/// One track of a CD/GD image stored in a CHD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    /// 1-based track number.
    pub number: u32,
    /// Raw type string: "AUDIO", "MODE1_RAW", "MODE2_RAW", …
    #[serde(rename = "type")]
    pub track_type: String,
    /// Frame count, pregap excluded.
    pub frames: u32,
    /// Pregap frames preceding the track data.
    pub pregap: u32,
    /// First frame of this track in the image, assigned as a running
    /// sum over preceding tracks' pregap + frames.
    #[serde(skip)]
    pub start_frame: u64,
}

impl Track {
    /// Track data size in bytes (frames × 2352).
    pub fn size(&self) -> u64 {
        self.frames as u64 * RAW_SECTOR_SIZE
    }
}

/// Walk the metadata chain and collect track records in file order.
pub fn parse_track_metadata(
    reader: &mut dyn RandomAccess,
    meta_offset: u64,
) -> Result<Vec<Track>, IdentError> {
    let mut tracks = Vec::new();
    let mut offset = meta_offset;

    while offset != 0 {
        let mut entry_header = [0u8; 16];
        reader.read_exact_at(&mut entry_header, offset).map_err(|e| {
            IdentError::corrupted_header(format!(
                "read metadata header at offset {}: {}",
                offset, e
            ))
        })?;

        let tag: [u8; 4] = entry_header[0..4].try_into().unwrap();
        let length_flags = u32::from_be_bytes(entry_header[4..8].try_into().unwrap());
        let length = length_flags & 0x00FF_FFFF;
        let next_offset = u64::from_be_bytes(entry_header[8..16].try_into().unwrap());

        if &tag == TAG_CDROM || &tag == TAG_CDROM2 || &tag == TAG_GDROM {
            let mut payload = vec![0u8; length as usize];
            if length > 0 {
                reader
                    .read_exact_at(&mut payload, offset + 16)
                    .map_err(|e| {
                        IdentError::corrupted_header(format!(
                            "read metadata payload at offset {}: {}",
                            offset + 16,
                            e
                        ))
                    })?;
            }
            if let Some(track) = parse_track_entry(&payload) {
                tracks.push(track);
            }
        }

        offset = next_offset;
    }

    // Start frames are a running sum of each track's pregap + frames.
    let mut current_frame = 0u64;
    for track in &mut tracks {
        track.start_frame = current_frame;
        current_frame += (track.pregap + track.frames) as u64;
    }

    Ok(tracks)
}

/// Parse one `TRACK:n TYPE:t FRAMES:f [PREGAP:p]` record. CHTR, CHT2,
/// and CHGD all share this shape; extra keys are ignored.
fn parse_track_entry(payload: &[u8]) -> Option<Track> {
    let text = String::from_utf8_lossy(payload);
    let text = text.trim_end_matches('\0');

    let mut fields: HashMap<&str, &str> = HashMap::new();
    for part in text.split_whitespace() {
        if let Some((key, value)) = part.split_once(':') {
            fields.insert(key, value);
        }
    }

    let number: u32 = fields.get("TRACK")?.parse().ok()?;
    if number == 0 {
        return None;
    }

    Some(Track {
        number,
        track_type: fields.get("TYPE").unwrap_or(&"").to_string(),
        frames: fields
            .get("FRAMES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        pregap: fields
            .get("PREGAP")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        start_frame: 0,
    })
}

/// Positioned reads over one track's raw sector data. Offsets address
/// the track's own 2352-byte sectors; the pregap is skipped.
pub struct TrackReader<'a, R> {
    chd: &'a mut Chd<R>,
    first_frame: u64,
    frames: u64,
}

impl<'a, R: RandomAccess> TrackReader<'a, R> {
    pub(crate) fn new(chd: &'a mut Chd<R>, track: &Track) -> Self {
        Self {
            chd,
            first_frame: track.start_frame + track.pregap as u64,
            frames: track.frames as u64,
        }
    }

    /// Track size in bytes.
    pub fn len(&self) -> u64 {
        self.frames * RAW_SECTOR_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }
}

impl<R: RandomAccess> RandomAccess for TrackReader<'_, R> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut done = 0usize;
        while done < buf.len() {
            let pos = offset + done as u64;
            let sector = pos / RAW_SECTOR_SIZE;
            let in_sector = pos % RAW_SECTOR_SIZE;
            if sector >= self.frames {
                break;
            }

            // Address the frame in logical space, clipped to its raw
            // 2352-byte sector data (subcode excluded).
            let frame = self.first_frame + sector;
            let physical = frame * self.chd.header().unit_bytes as u64 + in_sector;
            let want = (buf.len() - done).min((RAW_SECTOR_SIZE - in_sector) as usize);

            let n = self.chd.read_at(&mut buf[done..done + want], physical)?;
            done += n;
            if n < want {
                break;
            }
        }
        Ok(done)
    }
}

#[cfg(test)]
#[path = "tests/track_tests.rs"]
mod tests;
