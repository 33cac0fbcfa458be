//! Reader for binary image registrations (`images.bin`).
//!
//! Layout, little-endian: a `u64` record count, then per record an `i32`
//! image id, four `f64` quaternion components `(w, x, y, z)`, three `f64`
//! translation components, an `i32` camera id, a NUL-terminated ASCII image
//! name, a `u64` point count and that many 24-byte point entries, which are
//! skipped.
//!
//! Records are variable length, so the declared count is only a hint. A
//! record whose contents are bad but whose extent is readable is skipped; a
//! record that runs past the end of the stream ends the batch.

use std::path::Path;

use glam::{DQuat, DVec3};
use splatview_core::{Result, SplatviewError};

/// Size of one skipped 2D point entry: two `f64` coordinates and an `i64` id.
pub const POINT2D_ENTRY_SIZE: usize = 24;

const HEADER_SIZE: usize = 8;

/// Records declaring more than this many are not preallocated for.
const MAX_PREALLOCATED_RECORDS: usize = 4096;

/// One registered image.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationRecord {
    pub image_id: i32,
    /// World-to-camera rotation, normalized.
    pub rotation: DQuat,
    /// World-to-camera translation.
    pub translation: DVec3,
    pub camera_id: i32,
    pub image_name: String,
    pub point2d_count: u64,
}

/// The outcome of reading a registration stream.
#[derive(Debug, Default)]
pub struct RegistrationBatch {
    /// Record count claimed by the header.
    pub declared_count: u64,
    /// Records read successfully, in stream order.
    pub records: Vec<RegistrationRecord>,
    /// One [`SplatviewError::Parse`] per record that could not be used.
    pub skipped: Vec<SplatviewError>,
}

impl RegistrationBatch {
    /// Returns true if every declared record was read.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.records.len() as u64 == self.declared_count
    }
}

/// Little-endian cursor over a byte slice.
struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

/// Why a record could not be read.
enum RecordFault {
    /// The record is unusable but the reader is positioned after it.
    Invalid(String),
    /// The stream ended inside the record.
    Truncated(String),
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take<const N: usize>(&mut self, field: &str) -> std::result::Result<[u8; N], RecordFault> {
        let end = self.offset + N;
        let chunk = self.bytes.get(self.offset..end).ok_or_else(|| {
            RecordFault::Truncated(format!(
                "stream ends at byte {} while reading {field}",
                self.bytes.len()
            ))
        })?;
        self.offset = end;
        let mut out = [0; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    fn read_u64(&mut self, field: &str) -> std::result::Result<u64, RecordFault> {
        self.take(field).map(u64::from_le_bytes)
    }

    fn read_i32(&mut self, field: &str) -> std::result::Result<i32, RecordFault> {
        self.take(field).map(i32::from_le_bytes)
    }

    fn read_f64(&mut self, field: &str) -> std::result::Result<f64, RecordFault> {
        self.take(field).map(f64::from_le_bytes)
    }

    /// Reads up to and including the next NUL byte.
    fn read_cstr(&mut self, field: &str) -> std::result::Result<&'a [u8], RecordFault> {
        let bytes = self.bytes;
        let rest = &bytes[self.offset..];
        let len = rest.iter().position(|&b| b == 0).ok_or_else(|| {
            RecordFault::Truncated(format!("unterminated {field}"))
        })?;
        self.offset += len + 1;
        Ok(&rest[..len])
    }

    fn skip(&mut self, len: usize, field: &str) -> std::result::Result<(), RecordFault> {
        if len > self.remaining() {
            return Err(RecordFault::Truncated(format!(
                "{field} needs {len} bytes, {} left",
                self.remaining()
            )));
        }
        self.offset += len;
        Ok(())
    }
}

fn read_record(reader: &mut ByteReader<'_>) -> std::result::Result<RegistrationRecord, RecordFault> {
    let image_id = reader.read_i32("image id")?;
    let w = reader.read_f64("quaternion")?;
    let x = reader.read_f64("quaternion")?;
    let y = reader.read_f64("quaternion")?;
    let z = reader.read_f64("quaternion")?;
    let translation = DVec3::new(
        reader.read_f64("translation")?,
        reader.read_f64("translation")?,
        reader.read_f64("translation")?,
    );
    let camera_id = reader.read_i32("camera id")?;
    let name = reader.read_cstr("image name")?;
    let point2d_count = reader.read_u64("point count")?;
    let payload = usize::try_from(point2d_count)
        .ok()
        .and_then(|n| n.checked_mul(POINT2D_ENTRY_SIZE))
        .ok_or_else(|| RecordFault::Truncated(format!("point count {point2d_count} overflows")))?;
    reader.skip(payload, "2D points")?;

    // The extent is known from here on; content problems skip just this record
    if !name.is_ascii() {
        return Err(RecordFault::Invalid(format!(
            "image {image_id} has a non-ASCII name"
        )));
    }
    let image_name = String::from_utf8_lossy(name).into_owned();

    let rotation = DQuat::from_xyzw(x, y, z, w);
    if !rotation.is_finite() || rotation.length_squared() < 1e-24 {
        return Err(RecordFault::Invalid(format!(
            "image {image_id} ({image_name}) has an unusable quaternion"
        )));
    }
    if !translation.is_finite() {
        return Err(RecordFault::Invalid(format!(
            "image {image_id} ({image_name}) has a non-finite translation"
        )));
    }

    Ok(RegistrationRecord {
        image_id,
        rotation: rotation.normalize(),
        translation,
        camera_id,
        image_name,
        point2d_count,
    })
}

/// Parses a registration stream.
///
/// Fails only if the header itself is unreadable; per-record problems are
/// collected in [`RegistrationBatch::skipped`].
pub fn parse_registrations(bytes: &[u8]) -> Result<RegistrationBatch> {
    let mut reader = ByteReader::new(bytes);
    let declared_count = match reader.read_u64("record count") {
        Ok(count) => count,
        Err(_) => {
            return Err(SplatviewError::parse(
                0,
                format!("stream of {} bytes is shorter than the {HEADER_SIZE}-byte header", bytes.len()),
            ))
        }
    };

    let capacity = usize::try_from(declared_count)
        .unwrap_or(usize::MAX)
        .min(MAX_PREALLOCATED_RECORDS);
    let mut batch = RegistrationBatch {
        declared_count,
        records: Vec::with_capacity(capacity),
        skipped: Vec::new(),
    };

    for index in 0..declared_count {
        let record = index as usize;
        match read_record(&mut reader) {
            Ok(parsed) => batch.records.push(parsed),
            Err(RecordFault::Invalid(reason)) => {
                log::warn!("skipping registration record {record}: {reason}");
                batch.skipped.push(SplatviewError::parse(record, reason));
            }
            Err(RecordFault::Truncated(reason)) => {
                log::warn!(
                    "registration stream truncated in record {record} of {declared_count}: {reason}"
                );
                batch.skipped.push(SplatviewError::parse(record, reason));
                break;
            }
        }
    }

    if reader.remaining() > 0 {
        log::warn!(
            "{} trailing bytes after {declared_count} registration records",
            reader.remaining()
        );
    }
    log::info!(
        "parsed {} of {declared_count} registration records ({} skipped)",
        batch.records.len(),
        batch.skipped.len()
    );
    Ok(batch)
}

/// Reads and parses a registration file.
pub fn load_registrations(path: impl AsRef<Path>) -> Result<RegistrationBatch> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_registrations(&bytes)
}
