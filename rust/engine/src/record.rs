//! Compact binary projection of one evaluated hand.
//!
//! Layout (big-endian), 9 bytes with the default 4-byte round index:
//!
//! ```text
//! round index (index_bytes) | seat id (1) | category (1, low nibble) | tie-break (3)
//! ```
//!
//! The tie-break is five 4-bit rank values, most significant first, packed
//! into 20 bits and padded with four zero bits. Ranks run 2..=14 and the
//! unused slots of a short key are 0, so every nibble fits without loss.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::errors::SimError;
use crate::hand::{Category, HandStrength};

/// Round-index width of the in-memory record.
pub const DEFAULT_INDEX_BYTES: u8 = 4;
/// Size of a [`RawHandRecord`].
pub const RECORD_LEN: usize = DEFAULT_INDEX_BYTES as usize + 5;

const MAX_SEAT_ID: u64 = u8::MAX as u64;
const MAX_NIBBLE: u8 = 0x0F;

/// One decoded record.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DecodedHand {
    pub round: u64,
    pub seat: u8,
    pub strength: HandStrength,
}

/// Fixed-width record as retained in memory for every seat of every round.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawHandRecord([u8; RECORD_LEN]);

impl RawHandRecord {
    pub fn encode(round: u64, seat: usize, strength: &HandStrength) -> Result<Self, SimError> {
        if round > u32::MAX as u64 {
            return Err(SimError::EncodingOverflow {
                field: "round_index",
                value: round,
                max: u32::MAX as u64,
            });
        }
        let seat = seat_id(seat)?;
        let key = pack_key(&strength.kickers)?;
        let mut bytes = [0u8; RECORD_LEN];
        bytes[..4].copy_from_slice(&(round as u32).to_be_bytes());
        bytes[4] = seat;
        bytes[5] = strength.category.ordinal();
        bytes[6..].copy_from_slice(&key);
        Ok(Self(bytes))
    }

    pub fn decode(&self) -> Result<DecodedHand, SimError> {
        let b = &self.0;
        let round = u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as u64;
        let strength = unpack_strength(b[5], [b[6], b[7], b[8]])?;
        Ok(DecodedHand {
            round,
            seat: b[4],
            strength,
        })
    }

    pub fn from_bytes(bytes: [u8; RECORD_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; RECORD_LEN] {
        &self.0
    }

    pub fn round_index(&self) -> u64 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]) as u64
    }

    pub fn seat_id(&self) -> u8 {
        self.0[4]
    }

    /// `None` for any byte `decode` would reject as corrupt.
    pub fn category(&self) -> Option<Category> {
        Category::from_ordinal(self.0[5])
    }
}

/// Stream codec with a configurable round-index width, used wherever records
/// cross a process boundary.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RecordCodec {
    index_bytes: u8,
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self {
            index_bytes: DEFAULT_INDEX_BYTES,
        }
    }
}

impl RecordCodec {
    /// `index_bytes` must be within 1..=8.
    pub fn new(index_bytes: u8) -> Result<Self, SimError> {
        if !(1..=8).contains(&index_bytes) {
            return Err(SimError::EncodingOverflow {
                field: "index_bytes",
                value: index_bytes as u64,
                max: 8,
            });
        }
        Ok(Self { index_bytes })
    }

    pub fn index_bytes(&self) -> u8 {
        self.index_bytes
    }

    pub fn record_len(&self) -> usize {
        self.index_bytes as usize + 5
    }

    pub fn max_round_index(&self) -> u64 {
        if self.index_bytes == 8 {
            u64::MAX
        } else {
            (1u64 << (8 * self.index_bytes as u32)) - 1
        }
    }

    pub fn encode_into<W: Write>(&self, w: &mut W, hand: &DecodedHand) -> Result<(), SimError> {
        let max = self.max_round_index();
        if hand.round > max {
            return Err(SimError::EncodingOverflow {
                field: "round_index",
                value: hand.round,
                max,
            });
        }
        let key = pack_key(&hand.strength.kickers)?;
        w.write_uint::<BigEndian>(hand.round, self.index_bytes as usize)?;
        w.write_u8(hand.seat)?;
        w.write_u8(hand.strength.category.ordinal())?;
        w.write_all(&key)?;
        Ok(())
    }

    /// Builds the in-memory record, refusing round indices this codec's
    /// width cannot hold. Widths above four bytes are still bounded by the
    /// 32-bit in-memory index.
    pub fn encode_raw(
        &self,
        round: u64,
        seat: usize,
        strength: &HandStrength,
    ) -> Result<RawHandRecord, SimError> {
        let max = self.max_round_index();
        if round > max {
            return Err(SimError::EncodingOverflow {
                field: "round_index",
                value: round,
                max,
            });
        }
        RawHandRecord::encode(round, seat, strength)
    }

    pub fn encode(&self, hand: &DecodedHand) -> Result<Vec<u8>, SimError> {
        let mut buf = Vec::with_capacity(self.record_len());
        self.encode_into(&mut buf, hand)?;
        Ok(buf)
    }

    /// Re-encodes an in-memory record with this codec's width.
    pub fn write_record<W: Write>(&self, w: &mut W, record: &RawHandRecord) -> Result<(), SimError> {
        self.encode_into(w, &record.decode()?)
    }

    pub fn decode_from<R: Read>(&self, r: &mut R) -> Result<DecodedHand, SimError> {
        let round = r.read_uint::<BigEndian>(self.index_bytes as usize)?;
        let seat = r.read_u8()?;
        let category = r.read_u8()?;
        let mut key = [0u8; 3];
        r.read_exact(&mut key)?;
        let strength = unpack_strength(category, key)?;
        Ok(DecodedHand {
            round,
            seat,
            strength,
        })
    }

    pub fn decode(&self, mut bytes: &[u8]) -> Result<DecodedHand, SimError> {
        if bytes.len() != self.record_len() {
            return Err(SimError::CorruptRecord(format!(
                "expected {} bytes, got {}",
                self.record_len(),
                bytes.len()
            )));
        }
        self.decode_from(&mut bytes)
    }
}

fn seat_id(seat: usize) -> Result<u8, SimError> {
    u8::try_from(seat).map_err(|_| SimError::EncodingOverflow {
        field: "seat_id",
        value: seat as u64,
        max: MAX_SEAT_ID,
    })
}

fn pack_key(kickers: &[u8; 5]) -> Result<[u8; 3], SimError> {
    if let Some(&bad) = kickers.iter().find(|&&k| k > MAX_NIBBLE) {
        return Err(SimError::EncodingOverflow {
            field: "tie_break",
            value: bad as u64,
            max: MAX_NIBBLE as u64,
        });
    }
    Ok([
        (kickers[0] << 4) | kickers[1],
        (kickers[2] << 4) | kickers[3],
        kickers[4] << 4,
    ])
}

fn unpack_strength(category: u8, key: [u8; 3]) -> Result<HandStrength, SimError> {
    let category = Category::from_ordinal(category).ok_or_else(|| {
        SimError::CorruptRecord(format!("category ordinal {} out of range", category))
    })?;
    if key[2] & MAX_NIBBLE != 0 {
        return Err(SimError::CorruptRecord("non-zero tie-break padding".into()));
    }
    let kickers = [
        key[0] >> 4,
        key[0] & MAX_NIBBLE,
        key[1] >> 4,
        key[1] & MAX_NIBBLE,
        key[2] >> 4,
    ];
    if let Some(&bad) = kickers.iter().find(|&&k| k == 1 || k > 14) {
        return Err(SimError::CorruptRecord(format!("rank nibble {} invalid", bad)));
    }
    Ok(HandStrength { category, kickers })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pair() -> HandStrength {
        HandStrength {
            category: Category::TwoPair,
            kickers: [9, 2, 5, 0, 0],
        }
    }

    #[test]
    fn default_record_is_nine_bytes() {
        assert_eq!(RECORD_LEN, 9);
        assert_eq!(RecordCodec::default().record_len(), 9);
    }

    #[test]
    fn layout_matches_documented_bytes() {
        let rec = RawHandRecord::encode(0x0102_0304, 3, &two_pair()).unwrap();
        assert_eq!(
            rec.as_bytes(),
            &[0x01, 0x02, 0x03, 0x04, 3, 2, 0x92, 0x50, 0x00]
        );
    }

    #[test]
    fn in_memory_and_stream_layouts_agree() {
        let rec = RawHandRecord::encode(77, 1, &two_pair()).unwrap();
        let mut buf = Vec::new();
        RecordCodec::default().write_record(&mut buf, &rec).unwrap();
        assert_eq!(buf.as_slice(), rec.as_bytes());
    }

    #[test]
    fn rejects_oversized_seat() {
        let err = RawHandRecord::encode(0, 256, &two_pair()).unwrap_err();
        assert!(matches!(err, SimError::EncodingOverflow { field: "seat_id", .. }));
    }

    #[test]
    fn rejects_invalid_width() {
        assert!(RecordCodec::new(0).is_err());
        assert!(RecordCodec::new(9).is_err());
        assert_eq!(RecordCodec::new(8).unwrap().max_round_index(), u64::MAX);
        assert_eq!(RecordCodec::new(2).unwrap().max_round_index(), 65_535);
    }
}
