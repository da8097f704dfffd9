//! On-disk trajectory container.
//!
//! Layout: an 8-byte magic, a length-prefixed bincode header (chemical
//! system, dtype, compression), length-prefixed per-frame records, and a
//! trailing footer holding the frame offset table. Frame `i` therefore maps
//! to a fixed byte offset and readers seek directly to it; every reader
//! owns its own file handle so concurrent reads never share state.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use serde::{Deserialize, Serialize};

use nscat_core::{ChemicalSystem, NscatError, NscatResult, UnitCell};

use crate::frame::FrameView;

pub(crate) const MAGIC: &[u8; 8] = b"NSCATRJ1";
pub(crate) const TAIL_MAGIC: &[u8; 8] = b"NSCATEND";
pub(crate) const FORMAT_VERSION: u32 = 1;
pub(crate) const ZSTD_LEVEL: i32 = 3;

/// Floating point width of the stored coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dtype {
    F32,
    F64,
}

impl Dtype {
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            32 => Some(Dtype::F32),
            64 => Some(Dtype::F64),
            _ => None,
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            Dtype::F32 => 32,
            Dtype::F64 => 64,
        }
    }
}

/// Per-frame payload compression. Both choices are lossless for the
/// declared dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compression {
    None,
    Zstd,
}

impl Compression {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Compression::None),
            "zstd" => Some(Compression::Zstd),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Zstd => "zstd",
        }
    }

    pub fn names() -> &'static [&'static str] {
        &["none", "zstd"]
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct FileHeader {
    pub version: u32,
    pub system: ChemicalSystem,
    pub declared_steps: u64,
    pub dtype: Dtype,
    pub compression: Compression,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Footer {
    pub offsets: Vec<u64>,
    pub md_time_step: f64,
    pub has_velocities: bool,
}

#[derive(Serialize, Deserialize)]
pub(crate) enum CoordData {
    F32(Vec<[f32; 3]>),
    F64(Vec<[f64; 3]>),
}

impl CoordData {
    pub fn from_f64(data: &[[f64; 3]], dtype: Dtype) -> Self {
        match dtype {
            Dtype::F32 => CoordData::F32(
                data.iter()
                    .map(|r| [r[0] as f32, r[1] as f32, r[2] as f32])
                    .collect(),
            ),
            Dtype::F64 => CoordData::F64(data.to_vec()),
        }
    }

    pub fn into_f64(self) -> Vec<[f64; 3]> {
        match self {
            CoordData::F32(v) => v
                .into_iter()
                .map(|r| [r[0] as f64, r[1] as f64, r[2] as f64])
                .collect(),
            CoordData::F64(v) => v,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub(crate) struct FrameRecord {
    pub time: f64,
    pub cell: [[f64; 3]; 3],
    pub coords: CoordData,
    pub velocities: Option<CoordData>,
}

pub(crate) fn encode_frame(record: &FrameRecord, compression: Compression) -> NscatResult<Vec<u8>> {
    let raw =
        bincode::serialize(record).map_err(|e| NscatError::Parse(format!("frame encode: {e}")))?;
    match compression {
        Compression::None => Ok(raw),
        Compression::Zstd => zstd::encode_all(&raw[..], ZSTD_LEVEL)
            .map_err(|e| NscatError::Parse(format!("frame compress: {e}"))),
    }
}

pub(crate) fn decode_frame(payload: &[u8], compression: Compression) -> NscatResult<FrameRecord> {
    let raw = match compression {
        Compression::None => payload.to_vec(),
        Compression::Zstd => zstd::decode_all(payload)
            .map_err(|e| NscatError::Parse(format!("frame decompress: {e}")))?,
    };
    bincode::deserialize(&raw).map_err(|e| NscatError::Parse(format!("frame decode: {e}")))
}

pub(crate) struct OpenedFile {
    pub header: FileHeader,
    pub footer: Footer,
}

/// Parse magic, header and footer of a trajectory file. Unrecognized
/// layouts surface as input-data errors, as do truncated files.
pub(crate) fn open_container(path: &Path) -> NscatResult<OpenedFile> {
    let file = File::open(path).map_err(|e| {
        NscatError::InputData(format!("cannot open trajectory {}: {e}", path.display()))
    })?;
    let mut file = BufReader::new(file);

    let mut magic = [0u8; 8];
    file.read_exact(&mut magic)
        .map_err(|_| bad_layout(path, "file too short"))?;
    if &magic != MAGIC {
        return Err(bad_layout(path, "bad magic"));
    }
    let header_len = read_u64(&mut file).map_err(|_| bad_layout(path, "missing header"))?;
    let mut header_buf = vec![0u8; header_len as usize];
    file.read_exact(&mut header_buf)
        .map_err(|_| bad_layout(path, "truncated header"))?;
    let header: FileHeader =
        bincode::deserialize(&header_buf).map_err(|_| bad_layout(path, "corrupt header"))?;
    if header.version != FORMAT_VERSION {
        return Err(bad_layout(path, "unsupported version"));
    }

    let end = file
        .seek(SeekFrom::End(0))
        .map_err(|_| bad_layout(path, "seek failed"))?;
    if end < 16 {
        return Err(bad_layout(path, "missing footer"));
    }
    file.seek(SeekFrom::End(-16))?;
    let footer_len = read_u64(&mut file)?;
    let mut tail = [0u8; 8];
    file.read_exact(&mut tail)?;
    if &tail != TAIL_MAGIC {
        return Err(bad_layout(path, "missing footer magic (file not closed?)"));
    }
    if end < 16 + footer_len {
        return Err(bad_layout(path, "corrupt footer length"));
    }
    file.seek(SeekFrom::End(-16 - footer_len as i64))?;
    let mut footer_buf = vec![0u8; footer_len as usize];
    file.read_exact(&mut footer_buf)?;
    let footer: Footer =
        bincode::deserialize(&footer_buf).map_err(|_| bad_layout(path, "corrupt footer"))?;
    Ok(OpenedFile { header, footer })
}

/// Read the frame stored at `offset` and lift it to f64.
pub(crate) fn read_frame_at(
    file: &mut BufReader<File>,
    offset: u64,
    compression: Compression,
) -> NscatResult<FrameView> {
    file.seek(SeekFrom::Start(offset))?;
    let payload_len = read_u64(file)?;
    let mut payload = vec![0u8; payload_len as usize];
    file.read_exact(&mut payload)?;
    let record = decode_frame(&payload, compression)?;
    Ok(FrameView {
        time: record.time,
        unit_cell: UnitCell::from_basis(record.cell),
        coords: record.coords.into_f64(),
        velocities: record.velocities.map(CoordData::into_f64),
    })
}

fn read_u64(file: &mut BufReader<File>) -> NscatResult<u64> {
    let mut buf = [0u8; 8];
    file.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn bad_layout(path: &Path, why: &str) -> NscatError {
    NscatError::InputData(format!(
        "unrecognized trajectory layout in {}: {why}",
        path.display()
    ))
}
