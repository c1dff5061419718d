//! Double Array File format module for reading SPICE DAF files
//!
//! This module provides functionality for reading NAIF's Double Array File (DAF)
//! format, which is the container underneath SPK ephemeris kernels.
//!
//! Addresses handed to [`DAF::read_array`] are 1-based double-word addresses,
//! matching the ones stored in segment summaries.

use std::fs::File;
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use memmap2::Mmap;

use crate::jplephem::errors::{io_err, JplephemError, Result};

/// Size of a DAF record (bytes)
pub const RECORD_SIZE: usize = 1024;
/// Size of a double-precision value (bytes)
const DOUBLE_SIZE: usize = 8;
/// FTP corruption detection string
const FTPSTR: &[u8] = b"FTPSTR:\r:\n:\r\n:\r\x00:\x81:\x10\xce:ENDFTP";
/// Upper bound on summary records walked before assuming a corrupt chain
const MAX_SUMMARY_RECORDS: usize = 10_000;

/// DAF file endianness
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    pub(crate) fn read_i32(self, buf: &[u8]) -> i32 {
        match self {
            Endian::Big => BigEndian::read_i32(buf),
            Endian::Little => LittleEndian::read_i32(buf),
        }
    }

    pub(crate) fn read_f64(self, buf: &[u8]) -> f64 {
        match self {
            Endian::Big => BigEndian::read_f64(buf),
            Endian::Little => LittleEndian::read_f64(buf),
        }
    }
}

/// One array descriptor from a summary record, paired with its name
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub name: String,
    pub doubles: Vec<f64>,
    pub ints: Vec<i32>,
}

/// Double Array File (DAF) file reader
pub struct DAF {
    /// Path to the DAF file
    pub path: PathBuf,
    /// File identification word, e.g. `DAF/SPK`
    pub locidw: String,
    /// Number of double-precision components per summary
    pub nd: usize,
    /// Number of integer components per summary
    pub ni: usize,
    /// Record number of the first summary record
    pub fward: usize,
    /// Record number of the last summary record
    pub bward: usize,
    /// First free address
    pub free: usize,
    /// Internal file name
    pub ifname: String,
    /// Byte order (endianness)
    pub endian: Endian,
    map: Mmap,
}

impl DAF {
    /// Open a DAF file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| io_err(&path, e))?;
        // Safety: the map is read-only and the file is never written through it.
        let map = unsafe { Mmap::map(&file) }.map_err(|e| io_err(&path, e))?;

        if map.len() < RECORD_SIZE {
            return Err(JplephemError::InvalidFormat(format!(
                "{} is too short to hold a DAF file record",
                path.display()
            )));
        }

        let header = &map[..RECORD_SIZE];
        let locidw = String::from_utf8_lossy(&header[0..8]).trim_end().to_string();
        if !locidw.starts_with("DAF/") && locidw != "NAIF/DAF" {
            return Err(JplephemError::InvalidFormat(format!(
                "unrecognized DAF identification word {:?}",
                locidw
            )));
        }

        // A text-mode transfer mangles the line endings inside FTPSTR.
        if locidw != "NAIF/DAF" && !header.windows(FTPSTR.len()).any(|w| w == FTPSTR) {
            log::warn!("{}: FTP validation string missing or damaged", path.display());
        }

        let endian = Self::detect_endian(header)?;
        let nd = endian.read_i32(&header[8..12]);
        let ni = endian.read_i32(&header[12..16]);
        let ifname = String::from_utf8_lossy(&header[16..76]).trim_end().to_string();
        let fward = endian.read_i32(&header[76..80]);
        let bward = endian.read_i32(&header[80..84]);
        let free = endian.read_i32(&header[84..88]);

        if nd <= 0 || ni <= 0 || fward <= 0 || bward <= 0 || free <= 0 {
            return Err(JplephemError::InvalidFormat(format!(
                "Invalid DAF header: nd={}, ni={}, fward={}, bward={}, free={}",
                nd, ni, fward, bward, free
            )));
        }

        log::debug!(
            "opened DAF {}: locidw={} nd={} ni={} fward={} bward={} free={} endian={:?}",
            path.display(),
            locidw,
            nd,
            ni,
            fward,
            bward,
            free,
            endian
        );

        Ok(DAF {
            path,
            locidw,
            nd: nd as usize,
            ni: ni as usize,
            fward: fward as usize,
            bward: bward as usize,
            free: free as usize,
            ifname,
            endian,
            map,
        })
    }

    fn detect_endian(header: &[u8]) -> Result<Endian> {
        match &header[88..96] {
            b"LTL-IEEE" => return Ok(Endian::Little),
            b"BIG-IEEE" => return Ok(Endian::Big),
            _ => {}
        }

        // Pre-1995 files carry no format word; ND is always small.
        let plausible = |e: Endian| (1..=124).contains(&e.read_i32(&header[8..12]));
        if plausible(Endian::Little) {
            Ok(Endian::Little)
        } else if plausible(Endian::Big) {
            Ok(Endian::Big)
        } else {
            Err(JplephemError::InvalidFormat(
                "could not determine DAF byte order".to_string(),
            ))
        }
    }

    /// Number of double words occupied by one summary
    pub fn summary_length(&self) -> usize {
        self.nd + (self.ni + 1) / 2
    }

    /// Borrow a 1-indexed record
    pub fn record(&self, record_number: usize) -> Result<&[u8]> {
        let start = record_number
            .checked_sub(1)
            .map(|r| r * RECORD_SIZE)
            .ok_or_else(|| JplephemError::InvalidFormat("record numbers start at 1".to_string()))?;
        let end = start + RECORD_SIZE;
        if end > self.map.len() {
            return Err(JplephemError::InvalidFormat(format!(
                "record {} lies past the end of {}",
                record_number,
                self.path.display()
            )));
        }
        Ok(&self.map[start..end])
    }

    /// Read the comment area as text
    ///
    /// Comment records sit between the file record and the first summary
    /// record. NUL separates lines and EOT ends the text.
    pub fn comments(&self) -> Result<String> {
        let mut text = Vec::new();
        for record_number in 2..self.fward {
            let record = &self.record(record_number)?[..1000];
            match record.iter().position(|&b| b == 0x04) {
                Some(eot) => {
                    text.extend_from_slice(&record[..eot]);
                    break;
                }
                None => text.extend_from_slice(record),
            }
        }
        let text: Vec<u8> = text.into_iter().map(|b| if b == 0 { b'\n' } else { b }).collect();
        Ok(String::from_utf8_lossy(&text).trim_end().to_string())
    }

    /// Walk the summary record chain and return every array descriptor
    pub fn summaries(&self) -> Result<Vec<Summary>> {
        let step = self.summary_length() * DOUBLE_SIZE;
        let per_record = (RECORD_SIZE - 3 * DOUBLE_SIZE) / step;
        let mut out = Vec::new();
        let mut record_number = self.fward;
        let mut visited = 0;

        while record_number > 0 {
            visited += 1;
            if visited > MAX_SUMMARY_RECORDS {
                return Err(JplephemError::InvalidFormat(
                    "summary record chain does not terminate".to_string(),
                ));
            }

            let summary = self.record(record_number)?;
            let names = self.record(record_number + 1)?;
            let next = self.endian.read_f64(&summary[0..8]) as usize;
            let nsum = self.endian.read_f64(&summary[16..24]) as usize;
            if nsum > per_record {
                return Err(JplephemError::InvalidFormat(format!(
                    "summary record {} claims {} summaries, room for {}",
                    record_number, nsum, per_record
                )));
            }

            for i in 0..nsum {
                let base = 3 * DOUBLE_SIZE + i * step;
                let doubles = (0..self.nd)
                    .map(|j| {
                        let at = base + j * DOUBLE_SIZE;
                        self.endian.read_f64(&summary[at..at + DOUBLE_SIZE])
                    })
                    .collect();
                let int_base = base + self.nd * DOUBLE_SIZE;
                let ints = (0..self.ni)
                    .map(|j| {
                        let at = int_base + j * 4;
                        self.endian.read_i32(&summary[at..at + 4])
                    })
                    .collect();
                let name = String::from_utf8_lossy(&names[i * step..(i + 1) * step])
                    .trim_end()
                    .to_string();
                out.push(Summary { name, doubles, ints });
            }

            record_number = next;
        }

        Ok(out)
    }

    /// Read doubles from 1-based `start` to `end` inclusive
    pub fn read_array(&self, start: usize, end: usize) -> Result<Vec<f64>> {
        if start == 0 || end < start {
            return Err(JplephemError::InvalidFormat(format!(
                "invalid array address range {}..={}",
                start, end
            )));
        }
        let first = (start - 1) * DOUBLE_SIZE;
        let last = end * DOUBLE_SIZE;
        if last > self.map.len() {
            return Err(JplephemError::InvalidFormat(format!(
                "array address {} lies past the end of {}",
                end,
                self.path.display()
            )));
        }
        Ok(self.map[first..last]
            .chunks_exact(DOUBLE_SIZE)
            .map(|chunk| self.endian.read_f64(chunk))
            .collect())
    }
}

impl std::fmt::Debug for DAF {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DAF")
            .field("path", &self.path)
            .field("locidw", &self.locidw)
            .field("nd", &self.nd)
            .field("ni", &self.ni)
            .field("endian", &self.endian)
            .finish()
    }
}
