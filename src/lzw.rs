//! LZW Compression for the classical `compress(1)` `.Z` format
//!
//! This reproduces the historical `.Z` file format byte-for-byte, including
//! two quirks that are bugs-turned-contracts of the original 1984
//! implementation: the 9-bit-to-10-bit misread when `maxbits == 9`, and the
//! group padding applied every time the code width changes. Efficiency is
//! not the point; interoperability with files produced (and consumed) by
//! every other implementation of `compress` is.

use bit_vec::BitVec;
use std::io::{Cursor,Read,Write,ErrorKind};
use crate::Error;

/// First magic byte of every `.Z` file.
pub const MAGIC0: u8 = 0x1F;
/// Second magic byte of every `.Z` file.
pub const MAGIC1: u8 = 0x9D;
/// Set in header byte 2 when the CLEAR-code mechanism is in use. Every
/// encoder in this module sets it; the decoder honors whatever it finds.
pub const BLOCK_COMPRESS: u8 = 0x80;
/// Bits 5-6 of header byte 2 are reserved and must be zero.
const RESERVED_MASK: u8 = 0x60;
const MAXBITS_MASK: u8 = 0x1F;

/// Smallest code width, and the width every encode/decode starts (and
/// restarts after a CLEAR) at.
pub const MIN_BITS: u32 = 9;
/// Largest code width this codec will ever negotiate.
pub const MAX_BITS: u32 = 16;
/// The reserved CLEAR code, valid only when `BLOCK_COMPRESS` is set.
const CLEAR_CODE: u32 = 256;
/// Number of input bytes between ratio-heuristic checkpoints.
const CHECK_INTERVAL: u64 = 5000;

/// Marks a width transition so the padding skip at EOF knows whether a
/// truncation is a format error (inside a CLEAR) or an ordinary end of
/// stream (a width growth that never gets its next code).
enum PadContext {
    WidthGrowth,
    Clear,
}

/// LSB-first bit-to-byte packer with the `.Z` group-padding rule: every time
/// the code width changes, the byte count emitted since the last change is
/// padded with zero bytes up to a multiple of the old width.
struct BitWriter {
    pending: BitVec,
    bytes_since_transition: usize,
}

impl BitWriter {
    fn new() -> Self {
        Self { pending: BitVec::new(), bytes_since_transition: 0 }
    }

    /// Pack `width` bits of `code`, LSB first, draining whole bytes to `out`
    /// as they become available.
    fn put_code<W: Write>(&mut self, mut code: u32, width: u32, out: &mut W) -> std::io::Result<()> {
        for _ in 0..width {
            self.pending.push(code & 1 == 1);
            code >>= 1;
        }
        let whole = self.pending.len() / 8;
        if whole > 0 {
            let mut bytes = Vec::with_capacity(whole);
            for i in 0..whole {
                let mut val = 0u8;
                for b in 0..8 {
                    val |= (self.pending.get(i*8 + b).unwrap() as u8) << b;
                }
                bytes.push(val);
            }
            out.write_all(&bytes)?;
            self.bytes_since_transition += bytes.len();
            let remainder: BitVec = self.pending.iter().skip(whole*8).collect();
            self.pending = remainder;
        }
        Ok(())
    }

    fn flush_partial_byte<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        if !self.pending.is_empty() {
            let mut byte = 0u8;
            for (i,bit) in self.pending.iter().enumerate() {
                byte |= (bit as u8) << i;
            }
            out.write_all(&[byte])?;
            self.bytes_since_transition += 1;
            self.pending = BitVec::new();
        }
        Ok(())
    }

    /// Apply the group-padding rule for the width that was just in effect.
    fn pad_to_group_boundary<W: Write>(&mut self, old_width: u32, out: &mut W) -> std::io::Result<()> {
        self.flush_partial_byte(out)?;
        let rem = self.bytes_since_transition % old_width as usize;
        if rem != 0 {
            let pad = old_width as usize - rem;
            out.write_all(&vec![0u8;pad])?;
        }
        self.bytes_since_transition = 0;
        Ok(())
    }

    fn finish<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        self.flush_partial_byte(out)
    }
}

/// Mirror image of [`BitWriter`]: unpacks LSB-first codes and discards
/// group padding at width transitions.
struct BitReader {
    bits: BitVec,
    ptr: usize,
    bytes_since_transition: usize,
}

impl BitReader {
    fn new() -> Self {
        Self { bits: BitVec::new(), ptr: 0, bytes_since_transition: 0 }
    }

    /// keep the bit vector small, we don't need the bits behind us
    fn drop_leading_bits(&mut self) {
        let remaining: BitVec = self.bits.iter().skip(self.ptr).collect();
        self.bits = remaining;
        self.ptr = 0;
    }

    fn get_bit<R: Read>(&mut self, input: &mut R) -> std::io::Result<bool> {
        if self.ptr >= self.bits.len() {
            let mut byte = [0u8;1];
            input.read_exact(&mut byte)?;
            self.bytes_since_transition += 1;
            if self.bits.len() > 512 {
                self.drop_leading_bits();
            }
            for b in 0..8 {
                self.bits.push((byte[0] & (1 << b)) != 0);
            }
        }
        let bit = self.bits.get(self.ptr).unwrap();
        self.ptr += 1;
        Ok(bit)
    }

    fn get_code<R: Read>(&mut self, width: u32, input: &mut R) -> std::io::Result<u32> {
        let mut code = 0u32;
        for i in 0..width {
            if self.get_bit(input)? {
                code |= 1 << i;
            }
        }
        Ok(code)
    }

    /// Discard whatever is needed to reach the next group boundary for
    /// `old_width`. Returns `Ok(true)` if the stream ended mid-pad during an
    /// ordinary width growth (treated by the caller as a normal EOF); a
    /// truncated pad sequence after a CLEAR code is always a format error.
    fn discard_group_padding<R: Read>(&mut self, old_width: u32, input: &mut R, ctx: PadContext) -> Result<bool,Error> {
        self.bits = BitVec::new();
        self.ptr = 0;
        let rem = self.bytes_since_transition % old_width as usize;
        self.bytes_since_transition = 0;
        if rem == 0 {
            return Ok(false);
        }
        let pad = old_width as usize - rem;
        let mut buf = vec![0u8;pad];
        match input.read_exact(&mut buf) {
            Ok(()) => Ok(false),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => match ctx {
                PadContext::Clear => {
                    log::error!("truncated group padding after CLEAR code");
                    Err(Error::Format("truncated group padding after CLEAR code".into()))
                },
                PadContext::WidthGrowth => Ok(true),
            },
            Err(e) => Err(Error::Read(e)),
        }
    }
}

/// Encoder-side dictionary: `(prefix,suffix) -> code`, a fixed-size
/// open-addressed hash table with double hashing. Slot `code == 0` marks an
/// empty slot; code 0 is always a literal and is never assigned as a
/// dictionary code, so the sentinel is unambiguous.
struct EncodeDict {
    table: Vec<(u32,u8,u32)>,
    size: u64,
}

impl EncodeDict {
    fn new(maxbits: u32) -> Self {
        let max_codes = 1u64 << maxbits;
        let size = next_prime(max_codes + max_codes/2);
        Self { table: vec![(0,0,0);size as usize], size }
    }

    fn clear(&mut self) {
        for slot in self.table.iter_mut() {
            *slot = (0,0,0);
        }
    }

    fn hash1(&self, prefix: u32, suffix: u8) -> u64 {
        let key = ((prefix as u64) << 8) | suffix as u64;
        key.wrapping_mul(2_654_435_761) % self.size
    }

    /// Must always be nonzero, and a formula distinct from `hash1`, so that
    /// double hashing enumerates the whole (prime-sized) table.
    fn hash2(&self, prefix: u32, suffix: u8) -> u64 {
        let key = (prefix as u64).wrapping_add((suffix as u64).wrapping_mul(31)).wrapping_add(1);
        1 + (key % (self.size - 1))
    }

    fn lookup(&self, prefix: u32, suffix: u8) -> Option<u32> {
        let step = self.hash2(prefix,suffix);
        let mut idx = self.hash1(prefix,suffix);
        loop {
            let (p,s,code) = self.table[idx as usize];
            if code == 0 {
                return None;
            }
            if p == prefix && s == suffix {
                return Some(code);
            }
            idx = (idx + step) % self.size;
        }
    }

    fn insert(&mut self, prefix: u32, suffix: u8, code: u32) {
        let step = self.hash2(prefix,suffix);
        let mut idx = self.hash1(prefix,suffix);
        loop {
            if self.table[idx as usize].2 == 0 {
                self.table[idx as usize] = (prefix,suffix,code);
                return;
            }
            idx = (idx + step) % self.size;
        }
    }
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut i = 3;
    while i*i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// Smallest prime `>= n`.
fn next_prime(n: u64) -> u64 {
    let mut candidate = if n % 2 == 0 { n + 1 } else { n };
    while !is_prime(candidate) {
        candidate += 2;
    }
    candidate
}

/// Decoder-side dictionary: codes are assigned sequentially starting at
/// `dict_offset`, so a flat array indexed by `code - dict_offset` suffices.
struct DecodeDict {
    entries: Vec<(u32,u8)>,
    dict_offset: u32,
}

impl DecodeDict {
    fn new(maxbits: u32, dict_offset: u32) -> Self {
        Self { entries: Vec::with_capacity((1usize << maxbits) - dict_offset as usize), dict_offset }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn next_free(&self) -> u32 {
        self.dict_offset + self.entries.len() as u32
    }

    fn insert(&mut self, prefix: u32, suffix: u8) {
        self.entries.push((prefix,suffix));
    }

    /// Walk the chain of (prefix,suffix) links back to a literal byte,
    /// building the expansion in reverse and then flipping it around.
    fn expand(&self, mut code: u32) -> Vec<u8> {
        let mut rev = Vec::new();
        loop {
            if code < 256 {
                rev.push(code as u8);
                break;
            }
            let (prefix,suffix) = self.entries[(code - self.dict_offset) as usize];
            rev.push(suffix);
            code = prefix;
        }
        rev.reverse();
        rev
    }
}

struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

/// Serves bytes from `prefix` first, then falls through to `inner`. Lets a
/// caller that already peeked the first few bytes for format sniffing hand
/// them back instead of losing them.
struct PrefixedReader<'a,R> {
    prefix: &'a [u8],
    pos: usize,
    inner: R,
}

impl<'a,R: Read> PrefixedReader<'a,R> {
    fn new(prefix: &'a [u8], inner: R) -> Self {
        Self { prefix, pos: 0, inner }
    }
}

impl<'a,R: Read> Read for PrefixedReader<'a,R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pos < self.prefix.len() {
            let n = std::cmp::min(buf.len(),self.prefix.len() - self.pos);
            buf[..n].copy_from_slice(&self.prefix[self.pos..self.pos+n]);
            self.pos += n;
            if n > 0 {
                return Ok(n);
            }
        }
        self.inner.read(buf)
    }
}

fn validate_maxbits(maxbits: u32) -> Result<(),Error> {
    if !(MIN_BITS..=MAX_BITS).contains(&maxbits) {
        log::error!("maxbits {} out of range {}..={}",maxbits,MIN_BITS,MAX_BITS);
        return Err(Error::Format(format!("maxbits {} out of range {}..={}",maxbits,MIN_BITS,MAX_BITS)));
    }
    Ok(())
}

/// Compress `input` into the `.Z` format defined by `maxbits` (9..=16),
/// writing to `output`. Returns the compression ratio `1 - out/in`, or
/// `-1.0` for an empty input (only the 3-byte header is written).
pub fn encode<R: Read, W: Write>(input: &mut R, output: &mut W, maxbits: u32) -> Result<f64,Error> {
    validate_maxbits(maxbits)?;
    let mut writer = CountingWriter { inner: std::io::BufWriter::with_capacity(32*1024,output), count: 0 };

    writer.write_all(&[MAGIC0,MAGIC1,BLOCK_COMPRESS | maxbits as u8]).map_err(Error::Write)?;

    let mut first = [0u8;1];
    match input.read_exact(&mut first) {
        Ok(()) => {},
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            writer.flush().map_err(Error::Write)?;
            return Ok(-1.0);
        },
        Err(e) => return Err(Error::Read(e)),
    }

    let dict_offset: u32 = 257;
    let mut dict = EncodeDict::new(maxbits);
    let mut bitw = BitWriter::new();
    let mut w = MIN_BITS;
    let mut next_free = dict_offset;
    let mut cur = first[0] as u32;

    let mut bytes_in: u64 = 1;
    let mut best_ratio: f64 = 0.0;
    let mut next_check: u64 = CHECK_INTERVAL;
    let mut clear_pending = false;

    let mut next_byte = [0u8;1];
    loop {
        match input.read_exact(&mut next_byte) {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(Error::Read(e)),
        }
        bytes_in += 1;
        let c = next_byte[0];

        if let Some(k) = dict.lookup(cur,c) {
            cur = k;
        } else {
            log::trace!("emit code {} at width {}",cur,w);
            bitw.put_code(cur,w,&mut writer).map_err(Error::Write)?;

            if next_free < (1u32 << maxbits) {
                dict.insert(cur,c,next_free);
                next_free += 1;
                if (next_free & (next_free - 1)) == 0 && (w < maxbits || w == MIN_BITS) {
                    log::debug!("growing code width {} -> {}",w,w + 1);
                    bitw.pad_to_group_boundary(w,&mut writer).map_err(Error::Write)?;
                    w += 1;
                }
            } else if clear_pending {
                log::debug!("dictionary full and ratio regressed, emitting CLEAR");
                bitw.put_code(CLEAR_CODE,w,&mut writer).map_err(Error::Write)?;
                bitw.pad_to_group_boundary(w,&mut writer).map_err(Error::Write)?;
                w = MIN_BITS;
                next_free = dict_offset;
                dict.clear();
                clear_pending = false;
            }
            cur = c as u32;
        }

        if bytes_in >= next_check {
            let out_so_far = writer.count.max(1) as f64;
            let r = bytes_in as f64 / out_so_far;
            if r >= best_ratio {
                best_ratio = r;
            } else {
                best_ratio = 0.0;
                clear_pending = true;
            }
            next_check += CHECK_INTERVAL;
        }
    }

    bitw.put_code(cur,w,&mut writer).map_err(Error::Write)?;
    bitw.finish(&mut writer).map_err(Error::Write)?;
    writer.flush().map_err(Error::Write)?;

    Ok(1.0 - writer.count as f64 / bytes_in as f64)
}

/// Expand a `.Z` stream from `input` into `output`. `prefix_buffer` supplies
/// bytes the caller already consumed (typically while sniffing the magic
/// number) ahead of whatever remains in `input`. Returns the ratio
/// `1 - in/out` (`0.0` for an empty expansion).
pub fn decode<R: Read, W: Write>(input: &mut R, output: &mut W, prefix_buffer: &[u8]) -> Result<f64,Error> {
    let mut reader = CountingReader { inner: PrefixedReader::new(prefix_buffer,std::io::BufReader::with_capacity(32*1024,input)), count: 0 };
    let mut writer = CountingWriter { inner: std::io::BufWriter::with_capacity(32*1024,output), count: 0 };

    let mut header = [0u8;3];
    match reader.read_exact(&mut header) {
        Ok(()) => {},
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            log::error!("truncated header");
            return Err(Error::Format("truncated header, fewer than 3 bytes".into()));
        },
        Err(e) => return Err(Error::Read(e)),
    }
    if header[0] != MAGIC0 || header[1] != MAGIC1 {
        log::error!("bad magic bytes {:#04x} {:#04x}",header[0],header[1]);
        return Err(Error::Format(format!("bad magic bytes {:#04x} {:#04x}, expected {:#04x} {:#04x}",header[0],header[1],MAGIC0,MAGIC1)));
    }
    if header[2] & RESERVED_MASK != 0 {
        log::error!("reserved bits set in header byte 2: {:#04x}",header[2]);
        return Err(Error::Format(format!("reserved bits set in header byte 2: {:#04x}",header[2])));
    }
    let block_compress = header[2] & BLOCK_COMPRESS != 0;
    let maxbits = (header[2] & MAXBITS_MASK) as u32;
    validate_maxbits(maxbits)?;

    let dict_offset: u32 = if block_compress { 257 } else { 256 };
    let clear_code: Option<u32> = if block_compress { Some(CLEAR_CODE) } else { None };

    let mut dict = DecodeDict::new(maxbits,dict_offset);
    let mut bitr = BitReader::new();
    let mut w = MIN_BITS;

    let first_code = match bitr.get_code(w,&mut reader) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
            writer.flush().map_err(Error::Write)?;
            return Ok(decode_ratio(&reader,&writer));
        },
        Err(e) => return Err(Error::Read(e)),
    };
    if first_code >= 256 {
        log::error!("first code {} is not a literal byte",first_code);
        return Err(Error::Format(format!("first code {} is not a literal byte",first_code)));
    }
    let mut prev_code = first_code;
    let mut prev_expansion = vec![first_code as u8];
    writer.write_all(&prev_expansion).map_err(Error::Write)?;

    loop {
        let code = match bitr.get_code(w,&mut reader) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(Error::Read(e)),
        };

        if Some(code) == clear_code {
            match bitr.discard_group_padding(w,&mut reader,PadContext::Clear)? {
                true => break, // never actually returned for Clear, kept for symmetry
                false => {},
            }
            w = MIN_BITS;
            dict.clear();
            let next = match bitr.get_code(w,&mut reader) {
                Ok(c) => c,
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(Error::Read(e)),
            };
            if next >= 256 {
                log::error!("code {} after CLEAR is not a literal byte",next);
                return Err(Error::Format(format!("code {} after CLEAR is not a literal byte",next)));
            }
            prev_code = next;
            prev_expansion = vec![next as u8];
            writer.write_all(&prev_expansion).map_err(Error::Write)?;
            continue;
        }

        let next_free = dict.next_free();
        if code > next_free {
            log::error!("invalid code {}, dictionary only has {} entries",code,next_free);
            return Err(Error::Format(format!("invalid code {} exceeds dictionary size {}",code,next_free)));
        }

        let expansion = if code == next_free {
            // KwKwK case: the code was not in the dictionary yet because it
            // is the one about to be created from the previous match.
            let mut v = prev_expansion.clone();
            v.push(prev_expansion[0]);
            v
        } else {
            dict.expand(code)
        };
        writer.write_all(&expansion).map_err(Error::Write)?;

        if next_free < (1u32 << maxbits) {
            dict.insert(prev_code,expansion[0]);
            let new_next_free = dict.next_free();
            if (new_next_free & (new_next_free - 1)) == 0 && (w < maxbits || w == MIN_BITS) {
                log::debug!("growing code width {} -> {}",w,w + 1);
                if bitr.discard_group_padding(w,&mut reader,PadContext::WidthGrowth)? {
                    break;
                }
                w += 1;
            }
        }
        prev_code = code;
        prev_expansion = expansion;
    }

    writer.flush().map_err(Error::Write)?;
    Ok(decode_ratio(&reader,&writer))
}

fn decode_ratio<R,W>(reader: &CountingReader<R>, writer: &CountingWriter<W>) -> f64 {
    if writer.count == 0 {
        return 0.0;
    }
    1.0 - reader.count as f64 / writer.count as f64
}

/// Convenience wrapper, calls [`encode`] on a slice and returns a `Vec`.
pub fn encode_slice(slice: &[u8], maxbits: u32) -> Result<Vec<u8>,Error> {
    let mut src = Cursor::new(slice);
    let mut ans: Vec<u8> = Vec::new();
    encode(&mut src,&mut ans,maxbits)?;
    Ok(ans)
}

/// Convenience wrapper, calls [`decode`] on a slice and returns a `Vec`.
pub fn decode_slice(slice: &[u8]) -> Result<Vec<u8>,Error> {
    let mut src = Cursor::new(slice);
    let mut ans: Vec<u8> = Vec::new();
    decode(&mut src,&mut ans,&[])?;
    Ok(ans)
}

// *************** TESTS *****************

/// Small deterministic xorshift PRNG so tests don't need a `rand`
/// dependency for fixture data.
#[cfg(test)]
fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.push((state & 0xFF) as u8);
    }
    out
}

#[test]
fn header_bytes_are_exact() {
    for maxbits in MIN_BITS..=MAX_BITS {
        let compressed = encode_slice(b"hello",maxbits).expect("encode failed");
        assert_eq!(&compressed[0..3],&[MAGIC0,MAGIC1,0x80 | maxbits as u8]);
    }
}

#[test]
fn empty_input_is_header_only() {
    let compressed = encode_slice(b"",12).expect("encode failed");
    assert_eq!(compressed,vec![MAGIC0,MAGIC1,0x8C]);
    let expanded = decode_slice(&compressed).expect("decode failed");
    assert_eq!(expanded,Vec::<u8>::new());
}

#[test]
fn header_only_file_decodes_to_empty() {
    let expanded = decode_slice(&[MAGIC0,MAGIC1,0x90]).expect("decode failed");
    assert_eq!(expanded,Vec::<u8>::new());
}

#[test]
fn bad_magic_is_rejected() {
    let err = decode_slice(&[0x00,0x9D,0x90]).unwrap_err();
    assert!(matches!(err,Error::Format(_)));
}

#[test]
fn reserved_bits_are_rejected() {
    let err = decode_slice(&[MAGIC0,MAGIC1,0xA0]).unwrap_err();
    assert!(matches!(err,Error::Format(_)));
}

#[test]
fn maxbits_out_of_range_is_rejected() {
    // 8 and 17 both fall outside 9..=16
    let err = decode_slice(&[MAGIC0,MAGIC1,0x88]).unwrap_err();
    assert!(matches!(err,Error::Format(_)));
    let err = encode_slice(b"x",8).unwrap_err();
    assert!(matches!(err,Error::Format(_)));
    let err = encode_slice(b"x",17).unwrap_err();
    assert!(matches!(err,Error::Format(_)));
}

#[test]
fn invalid_code_is_rejected() {
    // header claims maxbits=9 block-compress, followed by a code that is
    // far larger than any code the dictionary could have assigned yet
    let mut data = vec![MAGIC0,MAGIC1,0x89];
    data.extend_from_slice(&[0xFF,0xFF,0xFF,0xFF,0xFF,0xFF]);
    let err = decode_slice(&data).unwrap_err();
    assert!(matches!(err,Error::Format(_)));
}

#[test]
fn round_trip_repeated_byte() {
    let data = vec![b'A';512];
    for maxbits in [9,10,11,12,16] {
        let compressed = encode_slice(&data,maxbits).expect("encode failed");
        let expanded = decode_slice(&compressed).expect("decode failed");
        assert_eq!(expanded,data,"round trip failed at maxbits={}",maxbits);
    }
}

#[test]
fn round_trip_classic_example() {
    let data = b"TOBEORNOTTOBEORTOBEORNOT".to_vec();
    for maxbits in MIN_BITS..=MAX_BITS {
        let compressed = encode_slice(&data,maxbits).expect("encode failed");
        let expanded = decode_slice(&compressed).expect("decode failed");
        assert_eq!(expanded,data,"round trip failed at maxbits={}",maxbits);
    }
}

#[test]
fn classic_example_matches_exact_code_sequence() {
    // The well-known TOBEORNOTTOBEORTOBEORNOT walkthrough, byte-exact at
    // maxbits=16: literal codes 'T','O','B','E','O','R','N','O','T' (9 bits
    // each, LSB first), then the dictionary codes 257("TO"), 259("BE"),
    // 261("OR"), 266("TOB"), 260("EO"), 262("RN"), and the final 264("OT").
    let test_data = b"TOBEORNOTTOBEORTOBEORNOT";
    let z_hex = "1F9D90549E0829F2448A932754020E2CA890A04184";
    let compressed = encode_slice(test_data,MAX_BITS).expect("encode failed");
    assert_eq!(compressed,hex::decode(z_hex).unwrap());
    let expanded = decode_slice(&compressed).expect("decode failed");
    assert_eq!(expanded,test_data);
}

#[test]
fn round_trip_every_maxbits_on_compressible_text() {
    let paragraph = "the quick brown fox jumps over the lazy dog, again and again, \
        the quick brown fox jumps over the lazy dog, again and again.\n";
    let data = paragraph.repeat(400).into_bytes(); // a little over 25 KiB, highly repetitive
    for maxbits in MIN_BITS..=MAX_BITS {
        let compressed = encode_slice(&data,maxbits).expect("encode failed");
        let expanded = decode_slice(&compressed).expect("decode failed");
        assert_eq!(expanded,data,"round trip failed at maxbits={}",maxbits);
    }
}

#[test]
fn nine_bit_quirk_keeps_high_bit_clear() {
    // enough distinct short runs to exhaust the 512-entry table at
    // maxbits=9 and trigger the 9-to-10-bit transition
    let mut data = Vec::new();
    for i in 0..2000u32 {
        data.push((i % 250) as u8);
        data.push((i / 250) as u8);
    }
    let compressed = encode_slice(&data,9).expect("encode failed");
    let expanded = decode_slice(&compressed).expect("decode failed");
    assert_eq!(expanded,data);
}

#[test]
fn ratio_heuristic_clears_on_incompressible_data() {
    let data = pseudo_random_bytes(2*1024*1024,0xC0FFEE);
    let compressed = encode_slice(&data,16).expect("encode failed");
    let expanded = decode_slice(&compressed).expect("decode failed");
    assert_eq!(expanded,data);
}

#[test]
fn empty_input_ratio_is_negative_one() {
    let mut src = Cursor::new(&b""[..]);
    let mut out = Vec::new();
    let ratio = encode(&mut src,&mut out,12).expect("encode failed");
    assert_eq!(ratio,-1.0);
}

#[test]
fn prefix_buffer_is_honored() {
    let compressed = encode_slice(b"I am Sam. Sam I am.",14).expect("encode failed");
    let (head,tail) = compressed.split_at(3);
    let mut src = Cursor::new(tail);
    let mut out = Vec::new();
    decode(&mut src,&mut out,head).expect("decode failed");
    assert_eq!(out,b"I am Sam. Sam I am.".to_vec());
}

#[test]
fn encode_is_deterministic() {
    let data = b"determinism matters, determinism matters".to_vec();
    let a = encode_slice(&data,13).expect("encode failed");
    let b = encode_slice(&data,13).expect("encode failed");
    assert_eq!(a,b);
}
