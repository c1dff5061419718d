//! Writers for small synthetic ephemeris files used by the unit tests
//!
//! Every body moves in a straight line so expected positions have a closed
//! form at any instant.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use nalgebra::Vector3;

/// Coefficients per component in the synthetic DE file
const DE_NCF: usize = 12;
/// Bodies stored in the synthetic DE file (Mercury..Sun)
const DE_BODIES: usize = 11;
/// Double words per record: two dates plus 11 bodies × 3 components × 12
pub(crate) const DE_NCOEFF: usize = 2 + DE_BODIES * 3 * DE_NCF;
pub(crate) const DE_EMRAT: f64 = 81.300_568;
pub(crate) const DE_AU_KM: f64 = 149_597_870.7;
pub(crate) const DE_NUMBER: i32 = 999;

/// Linear position of stored slot `slot` in the synthetic DE file (km)
pub(crate) fn de_slot_position(slot: usize, jd: f64) -> Vector3<f64> {
    let k = (slot + 1) as f64;
    let days = jd - 2_451_545.0;
    Vector3::new(1000.0 * k + 10.0 * k * days, -500.0 * k, k - 0.25 * k * days)
}

/// Velocity of stored slot `slot` (km/day)
pub(crate) fn de_slot_velocity(slot: usize) -> Vector3<f64> {
    let k = (slot + 1) as f64;
    Vector3::new(10.0 * k, 0.0, -0.25 * k)
}

fn pad_to(buf: &mut Vec<u8>, len: usize) {
    buf.resize(len, 0);
}

fn put_text(buf: &mut Vec<u8>, text: &str, width: usize) {
    let mut field = text.as_bytes().to_vec();
    field.resize(width, b' ');
    buf.extend_from_slice(&field);
}

/// Write a little-endian DE file covering `start_jd..end_jd` in records of
/// `span` days
pub(crate) fn write_linear_de(path: &Path, start_jd: f64, end_jd: f64, span: f64) -> io::Result<()> {
    let record_bytes = DE_NCOEFF * 8;
    let n_records = ((end_jd - start_jd) / span).round() as usize;

    let mut header = Vec::with_capacity(record_bytes);
    put_text(&mut header, "JPL Planetary Ephemeris DE999/LE999", 84);
    put_text(&mut header, "Start Epoch: synthetic", 84);
    put_text(&mut header, "Final Epoch: synthetic", 84);
    let names = ["AU", "EMRAT", "DENUM"];
    for name in names {
        put_text(&mut header, name, 6);
    }
    pad_to(&mut header, 2652);
    header.write_f64::<LittleEndian>(start_jd)?;
    header.write_f64::<LittleEndian>(end_jd)?;
    header.write_f64::<LittleEndian>(span)?;
    header.write_i32::<LittleEndian>(names.len() as i32)?;
    header.write_f64::<LittleEndian>(DE_AU_KM)?;
    header.write_f64::<LittleEndian>(DE_EMRAT)?;
    for slot in 0..12 {
        if slot < DE_BODIES {
            header.write_i32::<LittleEndian>((3 + slot * 3 * DE_NCF) as i32)?;
            header.write_i32::<LittleEndian>(DE_NCF as i32)?;
            header.write_i32::<LittleEndian>(1)?;
        } else {
            for _ in 0..3 {
                header.write_i32::<LittleEndian>(0)?;
            }
        }
    }
    header.write_i32::<LittleEndian>(DE_NUMBER)?;
    for _ in 0..3 {
        header.write_i32::<LittleEndian>(0)?;
    }
    pad_to(&mut header, record_bytes);

    let mut constants = Vec::with_capacity(record_bytes);
    constants.write_f64::<LittleEndian>(DE_AU_KM)?;
    constants.write_f64::<LittleEndian>(DE_EMRAT)?;
    constants.write_f64::<LittleEndian>(DE_NUMBER as f64)?;
    pad_to(&mut constants, record_bytes);

    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(&header)?;
    out.write_all(&constants)?;

    for r in 0..n_records {
        let rec_start = start_jd + r as f64 * span;
        let mid = rec_start + span / 2.0;
        out.write_f64::<LittleEndian>(rec_start)?;
        out.write_f64::<LittleEndian>(rec_start + span)?;
        for slot in 0..DE_BODIES {
            let centre = de_slot_position(slot, mid);
            let slope = de_slot_velocity(slot) * (span / 2.0);
            for axis in 0..3 {
                let mut coeffs = [0.0; DE_NCF];
                coeffs[0] = centre[axis];
                coeffs[1] = slope[axis];
                for c in coeffs {
                    out.write_f64::<LittleEndian>(c)?;
                }
            }
        }
    }
    out.flush()
}

/// A straight-line SPK segment: `origin + velocity × et` relative to `center`
#[derive(Debug, Clone)]
pub(crate) struct LinearSegment {
    pub target: i32,
    pub center: i32,
    pub start_et: f64,
    pub end_et: f64,
    pub records: usize,
    pub data_type: i32,
    pub origin: Vector3<f64>,
    /// km/s
    pub velocity: Vector3<f64>,
}

impl LinearSegment {
    pub fn new(target: i32, center: i32, start_et: f64, end_et: f64) -> Self {
        let k = target as f64;
        Self {
            target,
            center,
            start_et,
            end_et,
            records: 4,
            data_type: 2,
            origin: Vector3::new(1.0e6 + k, -2.0e5 * k, 3.0e3),
            velocity: Vector3::new(0.5, 0.01 * k, -0.2),
        }
    }

    pub fn with_origin(mut self, origin: Vector3<f64>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_type(mut self, data_type: i32) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn position(&self, et: f64) -> Vector3<f64> {
        self.origin + self.velocity * et
    }

    /// Type 3 carries velocity coefficients; every other type is written
    /// with the type 2 layout
    fn rsize(&self) -> usize {
        if self.data_type == 3 {
            2 + 6 * 2
        } else {
            2 + 3 * 2
        }
    }

    fn data_words(&self) -> usize {
        self.records * self.rsize() + 4
    }
}

/// Write a little-endian SPK file holding the given segments
pub(crate) fn write_spk(path: &Path, segments: &[LinearSegment]) -> io::Result<()> {
    const FTPSTR: &[u8] = b"FTPSTR:\r:\n:\r\n:\r\x00:\x81:\x10\xce:ENDFTP";
    // Records 1 (file), 2 (summaries), 3 (names); data starts at record 4.
    let first_address = 3 * 128 + 1;

    let mut addresses = Vec::with_capacity(segments.len());
    let mut next = first_address;
    for seg in segments {
        addresses.push((next, next + seg.data_words() - 1));
        next += seg.data_words();
    }

    let mut file_record = Vec::with_capacity(1024);
    put_text(&mut file_record, "DAF/SPK", 8);
    file_record.write_i32::<LittleEndian>(2)?;
    file_record.write_i32::<LittleEndian>(6)?;
    put_text(&mut file_record, "synthetic linear kernel", 60);
    file_record.write_i32::<LittleEndian>(2)?;
    file_record.write_i32::<LittleEndian>(2)?;
    file_record.write_i32::<LittleEndian>(next as i32)?;
    put_text(&mut file_record, "LTL-IEEE", 8);
    pad_to(&mut file_record, 699);
    file_record.extend_from_slice(FTPSTR);
    pad_to(&mut file_record, 1024);

    let mut summary_record = Vec::with_capacity(1024);
    summary_record.write_f64::<LittleEndian>(0.0)?;
    summary_record.write_f64::<LittleEndian>(0.0)?;
    summary_record.write_f64::<LittleEndian>(segments.len() as f64)?;
    let mut name_record = Vec::with_capacity(1024);
    for (seg, &(start_i, end_i)) in segments.iter().zip(&addresses) {
        summary_record.write_f64::<LittleEndian>(seg.start_et)?;
        summary_record.write_f64::<LittleEndian>(seg.end_et)?;
        for int in [seg.target, seg.center, 1, seg.data_type, start_i as i32, end_i as i32] {
            summary_record.write_i32::<LittleEndian>(int)?;
        }
        put_text(&mut name_record, &format!("SEG {} WRT {}", seg.target, seg.center), 40);
    }
    pad_to(&mut summary_record, 1024);
    pad_to(&mut name_record, 1024);

    let mut data = Vec::new();
    for seg in segments {
        let intlen = (seg.end_et - seg.start_et) / seg.records as f64;
        let radius = intlen / 2.0;
        for r in 0..seg.records {
            let mid = seg.start_et + intlen * (r as f64 + 0.5);
            let centre = seg.position(mid);
            data.write_f64::<LittleEndian>(mid)?;
            data.write_f64::<LittleEndian>(radius)?;
            for axis in 0..3 {
                data.write_f64::<LittleEndian>(centre[axis])?;
                data.write_f64::<LittleEndian>(seg.velocity[axis] * radius)?;
            }
            if seg.data_type == 3 {
                for axis in 0..3 {
                    data.write_f64::<LittleEndian>(seg.velocity[axis])?;
                    data.write_f64::<LittleEndian>(0.0)?;
                }
            }
        }
        data.write_f64::<LittleEndian>(seg.start_et)?;
        data.write_f64::<LittleEndian>(intlen)?;
        data.write_f64::<LittleEndian>(seg.rsize() as f64)?;
        data.write_f64::<LittleEndian>(seg.records as f64)?;
    }
    let padded = data.len().div_ceil(1024) * 1024;
    pad_to(&mut data, padded);

    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(&file_record)?;
    out.write_all(&summary_record)?;
    out.write_all(&name_record)?;
    out.write_all(&data)?;
    out.flush()
}
