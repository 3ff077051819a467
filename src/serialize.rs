//! Binary persistence for a built [`Index`] (§4.6, §6): a fixed-offset
//! little-endian container written and read with `std::io::{Read, Write}`,
//! not a generic serialization framework — the wire layout is fixed at the
//! bit level, not derived from the in-memory type layout.

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::index::Index;
use crate::occurrence::FirstOccurrenceTable;
use crate::oracle::{OracleVariant, RankOracle};
use crate::suffix_array::sample::SampledSuffixArray;
use crate::{alphabet::DenseAlphabet, bwt};

const MAGIC: [u8; 4] = *b"FMI1";
const FORMAT_VERSION: u8 = 1;
const C_TABLE_WIDTH: usize = 256;

/// Write `idx` to `sink` in the format described by §6.
pub fn save<W: Write>(idx: &Index, sink: &mut W) -> Result<()> {
    let l = idx.l();
    let m = l.len() as u64;

    sink.write_all(&MAGIC)?;
    write_u8(sink, FORMAT_VERSION)?;
    write_u8(sink, idx.oracle_variant().wire_tag())?;
    write_u8(sink, idx.terminator())?;
    write_u8(sink, 0)?; // reserved
    write_u64(sink, m)?;
    write_u32(sink, checkpoint_step(idx.oracle_variant()))?;

    write_c_table(sink, idx.c_table(), m)?;
    sink.write_all(l)?;

    match idx.oracle().variant() {
        OracleVariant::Naive => {}
        OracleVariant::Full => write_full_payload(sink, idx.oracle(), m)?,
        OracleVariant::Checkpointed { .. } => write_checkpointed_payload(sink, idx.oracle())?,
    }

    Ok(())
}

/// Read an index previously written by [`save`].
pub fn load<R: Read>(source: &mut R) -> Result<Index> {
    let mut magic = [0u8; 4];
    source.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(Error::MalformedIndex(format!(
            "bad magic: expected {:?}, found {:?}",
            MAGIC, magic
        )));
    }

    let version = read_u8(source)?;
    if version != FORMAT_VERSION {
        return Err(Error::MalformedIndex(format!(
            "unsupported format version {}",
            version
        )));
    }

    let variant_tag = read_u8(source)?;
    let terminator = read_u8(source)?;
    let _reserved = read_u8(source)?;
    let m = read_u64(source)?;
    let step = read_u32(source)?;

    let variant = OracleVariant::from_wire_tag(variant_tag, step)
        .ok_or_else(|| Error::MalformedIndex(format!("unknown oracle variant tag {}", variant_tag)))?;

    let raw_c = read_c_table(source)?;

    let mut l = vec![0u8; m as usize];
    source.read_exact(&mut l)?;

    let c_table = FirstOccurrenceTable::build(&l);
    verify_c_table(&raw_c, &c_table, m)?;

    let oracle = match variant {
        OracleVariant::Naive => RankOracle::build(OracleVariant::Naive, &l, &c_table),
        OracleVariant::Full => read_full_payload(source, &l, &c_table)?,
        OracleVariant::Checkpointed { step } => {
            read_checkpointed_payload(source, &c_table, m, step)?
        }
    };

    let sa = bwt::reconstruct_suffix_array(&l, terminator)?;
    let sample_rate = crate::suffix_array::sample::DEFAULT_SAMPLE_RATE;
    let sampled_sa = SampledSuffixArray::build(&sa, sample_rate);

    Ok(Index::from_parts(l, c_table, oracle, sampled_sa, terminator))
}

fn checkpoint_step(variant: OracleVariant) -> u32 {
    match variant {
        OracleVariant::Checkpointed { step } => step,
        _ => 0,
    }
}

fn write_c_table<W: Write>(sink: &mut W, c_table: &FirstOccurrenceTable, m: u64) -> Result<()> {
    for b in 0..=255u16 {
        let byte = b as u8;
        let value = if c_table.alphabet().index_of(byte).is_some() {
            c_table.get(byte)
        } else {
            m
        };
        write_u32(sink, value as u32)?;
    }
    Ok(())
}

fn read_c_table<R: Read>(source: &mut R) -> Result<[u32; C_TABLE_WIDTH]> {
    let mut raw = [0u32; C_TABLE_WIDTH];
    for slot in raw.iter_mut() {
        *slot = read_u32(source)?;
    }
    Ok(raw)
}

/// Defensive cross-check: the C table we just computed from L must agree
/// with the one stored on disk for every byte the alphabet actually
/// contains. A mismatch means the file was corrupted or hand-edited.
fn verify_c_table(raw: &[u32; C_TABLE_WIDTH], computed: &FirstOccurrenceTable, m: u64) -> Result<()> {
    for b in 0..=255u16 {
        let byte = b as u8;
        let expected = match computed.alphabet().index_of(byte) {
            Some(_) => computed.get(byte),
            None => m,
        };
        if raw[b as usize] as u64 != expected {
            return Err(Error::MalformedIndex(format!(
                "C table entry for byte 0x{:02x} does not match L: stored {}, expected {}",
                byte, raw[b as usize], expected
            )));
        }
    }
    Ok(())
}

fn write_full_payload<W: Write>(sink: &mut W, oracle: &RankOracle, m: u64) -> Result<()> {
    let fmc = oracle
        .full_fmc()
        .expect("full oracle variant always carries an fmc table");
    let width = fmc_entry_width(m);
    for &value in fmc {
        write_uint_le(sink, value, width)?;
    }
    Ok(())
}

fn read_full_payload<R: Read>(
    source: &mut R,
    l: &[u8],
    c_table: &FirstOccurrenceTable,
) -> Result<RankOracle> {
    let m = l.len() as u64;
    let sigma = c_table.alphabet().len();
    let width = fmc_entry_width(m);
    let entries = (m as usize + 1) * sigma;
    let mut fmc = Vec::with_capacity(entries);
    for _ in 0..entries {
        fmc.push(read_uint_le(source, width)?);
    }
    Ok(RankOracle::from_full_parts(l, c_table, fmc, sigma))
}

fn write_checkpointed_payload<W: Write>(sink: &mut W, oracle: &RankOracle) -> Result<()> {
    let checkpoints = oracle
        .checkpoints()
        .expect("checkpointed oracle variant always carries checkpoint rows");
    for checkpoint in checkpoints {
        write_checkpoint_row(sink, checkpoint)?;
    }
    Ok(())
}

fn write_checkpoint_row<W: Write>(sink: &mut W, row: &[u64]) -> Result<()> {
    // `row` is dense (one entry per byte actually present in L); the wire
    // format always spells out all 256 byte slots for framing simplicity.
    // Absent bytes occur zero times at every checkpoint, so 0 is exact here
    // (unlike the C table's "padded to m" placeholder for absent bytes).
    for slot in row {
        write_u32(sink, *slot as u32)?;
    }
    for _ in row.len()..C_TABLE_WIDTH {
        write_u32(sink, 0)?;
    }
    Ok(())
}

fn read_checkpointed_payload<R: Read>(
    source: &mut R,
    c_table: &FirstOccurrenceTable,
    m: u64,
    step: u32,
) -> Result<RankOracle> {
    // The record count isn't on the wire (§6 lists only the records
    // themselves); it's recoverable from `m` and `step` alone, via the same
    // formula the builder uses to decide how many checkpoints to lay down
    // (see `oracle::build_checkpointed_oracle`): one checkpoint every `step`
    // rows, plus one covering the tail so a checkpoint always lands at row
    // `m`.
    let num_checkpoints = (m / step as u64) as usize + 1;
    let alphabet = c_table.alphabet();
    let mut checkpoints = Vec::with_capacity(num_checkpoints);
    for _ in 0..num_checkpoints {
        checkpoints.push(read_checkpoint_row(source, alphabet)?);
    }
    Ok(RankOracle::from_checkpointed_parts(step, checkpoints))
}

fn read_checkpoint_row<R: Read>(source: &mut R, alphabet: &DenseAlphabet) -> Result<Vec<u64>> {
    let mut wide = [0u32; C_TABLE_WIDTH];
    for slot in wide.iter_mut() {
        *slot = read_u32(source)?;
    }
    let mut dense = vec![0u64; alphabet.len()];
    for (idx, slot) in dense.iter_mut().enumerate() {
        *slot = wide[alphabet.byte_at(idx) as usize] as u64;
    }
    Ok(dense)
}

/// Byte width needed to store any value in `0..=m` (the largest value an
/// FMc entry can take).
fn fmc_entry_width(m: u64) -> usize {
    if m == 0 {
        return 1;
    }
    let bits = 64 - m.leading_zeros();
    (((bits as usize) + 7) / 8).max(1)
}

fn write_uint_le<W: Write>(sink: &mut W, value: u64, width: usize) -> Result<()> {
    let bytes = value.to_le_bytes();
    sink.write_all(&bytes[..width])?;
    Ok(())
}

fn read_uint_le<R: Read>(source: &mut R, width: usize) -> Result<u64> {
    let mut buf = [0u8; 8];
    source.read_exact(&mut buf[..width])?;
    Ok(u64::from_le_bytes(buf))
}

fn write_u8<W: Write>(sink: &mut W, value: u8) -> Result<()> {
    sink.write_all(&[value])?;
    Ok(())
}

fn read_u8<R: Read>(source: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    source.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn write_u32<W: Write>(sink: &mut W, value: u32) -> Result<()> {
    sink.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u32<R: Read>(source: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    source.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn write_u64<W: Write>(sink: &mut W, value: u64) -> Result<()> {
    sink.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u64<R: Read>(source: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    source.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleVariant;

    fn roundtrip_via_bytes(idx: &Index) -> Index {
        let mut buf = Vec::new();
        save(idx, &mut buf).unwrap();
        load(&mut buf.as_slice()).unwrap()
    }

    fn assert_same_answers(a: &Index, b: &Index, patterns: &[&[u8]]) {
        for &p in patterns {
            assert_eq!(a.count(p), b.count(p), "count mismatch for {:?}", p);
            assert_eq!(a.locate(p), b.locate(p), "locate mismatch for {:?}", p);
        }
    }

    #[test]
    fn roundtrip_naive_variant() {
        let idx = Index::builder()
            .variant(OracleVariant::Naive)
            .build(b"abracadabra")
            .unwrap();
        let reloaded = roundtrip_via_bytes(&idx);
        assert_same_answers(&idx, &reloaded, &[b"abra", b"a", b"xyz", b""]);
    }

    #[test]
    fn roundtrip_full_variant() {
        let idx = Index::builder()
            .variant(OracleVariant::Full)
            .build(b"mississippi")
            .unwrap();
        let reloaded = roundtrip_via_bytes(&idx);
        assert_same_answers(&idx, &reloaded, &[b"ssi", b"i", b"p", b"iss"]);
    }

    #[test]
    fn roundtrip_checkpointed_variant() {
        for step in [1u32, 2, 7, 50] {
            let idx = Index::builder()
                .variant(OracleVariant::Checkpointed { step })
                .build(b"ACGACTGCGAGCTCGA")
                .unwrap();
            let reloaded = roundtrip_via_bytes(&idx);
            assert_same_answers(&idx, &reloaded, &[b"CGA", b"A", b"GCG"]);
        }
    }

    #[test]
    fn roundtrip_empty_text() {
        let idx = Index::build(b"").unwrap();
        let reloaded = roundtrip_via_bytes(&idx);
        assert_eq!(reloaded.count(b"a"), 0);
    }

    #[test]
    fn load_rejects_bad_magic() {
        let mut buf = vec![0u8; 64];
        buf[0..4].copy_from_slice(b"XXXX");
        let err = load(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, Error::MalformedIndex(_)));
    }

    #[test]
    fn load_rejects_bad_version() {
        let idx = Index::build(b"abracadabra").unwrap();
        let mut buf = Vec::new();
        save(&idx, &mut buf).unwrap();
        buf[4] = 99;
        let err = load(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, Error::MalformedIndex(_)));
    }

    #[test]
    fn load_rejects_truncated_input() {
        let idx = Index::build(b"abracadabra").unwrap();
        let mut buf = Vec::new();
        save(&idx, &mut buf).unwrap();
        buf.truncate(buf.len() - 10);
        let err = load(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
