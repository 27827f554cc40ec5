//! Round log: a fixed header followed by one packed record per seat per round.
//!
//! ```text
//! magic "PKSM" (4) | version (1) | index width (1) | seats (1) | variant (1)
//! seed (8) | rounds (8) | created-at unix seconds (8, signed)
//! records...
//! ```
//!
//! All integers are big-endian. Records use [`RecordCodec`] with the header's
//! index width and appear in round order, seat order within a round.

use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dealer::Variant;
use crate::errors::SimError;
use crate::record::{DecodedHand, RecordCodec, DEFAULT_INDEX_BYTES};
use crate::round::UniqueRound;
use crate::runner::RunReport;
use crate::stats::Statistics;

pub const MAGIC: [u8; 4] = *b"PKSM";
pub const FORMAT_VERSION: u8 = 1;
pub const HEADER_LEN: usize = 32;

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct RoundLogHeader {
    pub version: u8,
    pub index_bytes: u8,
    pub seats: u8,
    pub variant: Variant,
    pub seed: u64,
    pub rounds: u64,
    pub created_at: i64,
}

impl RoundLogHeader {
    pub fn new(seed: u64, variant: Variant, seats: usize, rounds: u64) -> Result<Self, SimError> {
        let seats = u8::try_from(seats).map_err(|_| SimError::EncodingOverflow {
            field: "seats",
            value: seats as u64,
            max: u8::MAX as u64,
        })?;
        Ok(Self {
            version: FORMAT_VERSION,
            index_bytes: DEFAULT_INDEX_BYTES,
            seats,
            variant,
            seed,
            rounds,
            created_at: Utc::now().timestamp(),
        })
    }

    /// Header for the rounds a report actually completed.
    pub fn for_report(report: &RunReport) -> Result<Self, SimError> {
        Self::new(
            report.seed,
            report.variant,
            report.seats,
            report.completed_rounds,
        )
        .map(|h| h.with_index_bytes(report.index_bytes))
    }

    pub fn with_index_bytes(mut self, index_bytes: u8) -> Self {
        self.index_bytes = index_bytes;
        self
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }

    fn write_to<W: Write>(&self, w: &mut W) -> Result<(), SimError> {
        w.write_all(&MAGIC)?;
        w.write_u8(self.version)?;
        w.write_u8(self.index_bytes)?;
        w.write_u8(self.seats)?;
        w.write_u8(self.variant.code())?;
        w.write_u64::<BigEndian>(self.seed)?;
        w.write_u64::<BigEndian>(self.rounds)?;
        w.write_i64::<BigEndian>(self.created_at)?;
        Ok(())
    }

    fn read_from<R: Read>(r: &mut R) -> Result<Self, SimError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic).map_err(truncated("header"))?;
        if magic != MAGIC {
            return Err(SimError::CorruptRecord("not a round log (bad magic)".into()));
        }
        let version = r.read_u8().map_err(truncated("header"))?;
        if version != FORMAT_VERSION {
            return Err(SimError::CorruptRecord(format!(
                "unsupported round log version {}",
                version
            )));
        }
        let index_bytes = r.read_u8().map_err(truncated("header"))?;
        let seats = r.read_u8().map_err(truncated("header"))?;
        let code = r.read_u8().map_err(truncated("header"))?;
        let variant = Variant::from_code(code)
            .ok_or_else(|| SimError::CorruptRecord(format!("unknown variant code {}", code)))?;
        let seed = r.read_u64::<BigEndian>().map_err(truncated("header"))?;
        let rounds = r.read_u64::<BigEndian>().map_err(truncated("header"))?;
        let created_at = r.read_i64::<BigEndian>().map_err(truncated("header"))?;
        Ok(Self {
            version,
            index_bytes,
            seats,
            variant,
            seed,
            rounds,
            created_at,
        })
    }
}

fn truncated(what: &'static str) -> impl Fn(std::io::Error) -> SimError {
    move |e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            SimError::CorruptRecord(format!("truncated {}", what))
        } else {
            SimError::Io(e)
        }
    }
}

pub struct RoundLogWriter<W: Write> {
    inner: W,
    codec: RecordCodec,
    header: RoundLogHeader,
    rounds_written: u64,
}

impl RoundLogWriter<BufWriter<File>> {
    /// Creates `path`, making missing parent directories.
    pub fn create<P: AsRef<Path>>(path: P, header: RoundLogHeader) -> Result<Self, SimError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Self::new(BufWriter::new(f), header)
    }
}

impl<W: Write> RoundLogWriter<W> {
    pub fn new(mut inner: W, header: RoundLogHeader) -> Result<Self, SimError> {
        let codec = RecordCodec::new(header.index_bytes)?;
        header.write_to(&mut inner)?;
        Ok(Self {
            inner,
            codec,
            header,
            rounds_written: 0,
        })
    }

    pub fn header(&self) -> &RoundLogHeader {
        &self.header
    }

    pub fn write_round(&mut self, round: &UniqueRound) -> Result<(), SimError> {
        if round.seat_count() != self.header.seats as usize {
            return Err(SimError::CorruptRecord(format!(
                "round {} has {} seats, log expects {}",
                round.index(),
                round.seat_count(),
                self.header.seats
            )));
        }
        for record in round.records() {
            self.codec.write_record(&mut self.inner, record)?;
        }
        self.rounds_written += 1;
        Ok(())
    }

    pub fn write_report(&mut self, report: &RunReport) -> Result<(), SimError> {
        for round in &report.rounds {
            self.write_round(round)?;
        }
        Ok(())
    }

    pub fn rounds_written(&self) -> u64 {
        self.rounds_written
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W, SimError> {
        self.inner.flush()?;
        tracing::debug!(rounds = self.rounds_written, "round log finished");
        Ok(self.inner)
    }
}

pub struct RoundLogReader<R: Read> {
    inner: R,
    codec: RecordCodec,
    header: RoundLogHeader,
    buf: Vec<u8>,
}

impl RoundLogReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read> RoundLogReader<R> {
    pub fn new(mut inner: R) -> Result<Self, SimError> {
        let header = RoundLogHeader::read_from(&mut inner)?;
        let codec = RecordCodec::new(header.index_bytes)
            .map_err(|_| SimError::CorruptRecord(format!("index width {}", header.index_bytes)))?;
        Ok(Self {
            inner,
            buf: vec![0; codec.record_len()],
            codec,
            header,
        })
    }

    pub fn header(&self) -> &RoundLogHeader {
        &self.header
    }

    /// Next record, or `None` at a clean end of stream.
    pub fn next_hand(&mut self) -> Result<Option<DecodedHand>, SimError> {
        let mut filled = 0;
        while filled < self.buf.len() {
            match self.inner.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        match filled {
            0 => Ok(None),
            n if n < self.buf.len() => Err(SimError::CorruptRecord(format!(
                "truncated record ({} of {} bytes)",
                n,
                self.buf.len()
            ))),
            _ => self.codec.decode(&self.buf).map(Some),
        }
    }

    /// Drains the log into per-seat statistics.
    pub fn read_statistics(mut self) -> Result<Statistics, SimError> {
        let mut stats = Statistics::new(self.header.seats as usize);
        while let Some(hand) = self.next_hand()? {
            stats.record(hand.seat as usize, hand.strength.category)?;
        }
        Ok(stats)
    }
}

impl<R: Read> Iterator for RoundLogReader<R> {
    type Item = Result<DecodedHand, SimError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_hand().transpose()
    }
}
