//! Byte-range access to a target address space.
//!
//! Every read is a single-attempt, fallible operation: the target may
//! have exited, the page may be unmapped, or the range may cross the end
//! of a mapped region. Re-reading the same address carries no additional
//! chance of success, so implementations never retry.

use std::fs::File;
use std::io;
use std::os::unix::fs::FileExt;

use log::trace;
use thiserror::Error;

use super::error::{DecodeError, Result};

/// Failure of a single read attempt against the target.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The target rejected the read (exited process, protection fault).
    #[error("I/O error reading target memory: {0}")]
    Io(#[from] io::Error),

    /// The address lies outside every known region of the target.
    #[error("address {address:#x} is not mapped")]
    Unmapped { address: u64 },
}

/// Fallible, bounded byte-range read from a target address space.
///
/// A successful read may return fewer bytes than requested when the
/// range runs past the end of a mapped region; callers that need an
/// exact count use [`read_exact`].
pub trait MemoryReader {
    fn read_bytes(&mut self, address: u64, len: u32) -> std::result::Result<Vec<u8>, ReadError>;
}

/// Read exactly `len` bytes or fail.
///
/// A rejected read becomes [`DecodeError::AddressUnreadable`], a short
/// one [`DecodeError::TruncatedRead`].
pub(crate) fn read_exact<R: MemoryReader>(reader: &mut R, address: u64, len: u32) -> Result<Vec<u8>> {
    let bytes = reader
        .read_bytes(address, len)
        .map_err(|err| {
            trace!("read of {len} bytes at {address:#x} failed: {err}");
            DecodeError::AddressUnreadable { address, requested: len }
        })?;
    if bytes.len() < len as usize {
        return Err(DecodeError::TruncatedRead {
            expected: len as usize,
            got: bytes.len(),
        });
    }
    Ok(bytes)
}

/// An in-memory snapshot of target regions, for tests and offline use.
///
/// Regions are disjoint `(base, bytes)` pairs; a read stops at the end
/// of its region, which is how short reads arise.
#[derive(Debug, Default)]
pub struct SnapshotReader {
    regions: Vec<(u64, Vec<u8>)>,
}

impl SnapshotReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapped region starting at `base`.
    pub fn map(&mut self, base: u64, bytes: Vec<u8>) {
        self.regions.push((base, bytes));
    }
}

impl MemoryReader for SnapshotReader {
    fn read_bytes(&mut self, address: u64, len: u32) -> std::result::Result<Vec<u8>, ReadError> {
        for (base, bytes) in &self.regions {
            let end = base + bytes.len() as u64;
            if address >= *base && address < end {
                let start = (address - base) as usize;
                let stop = bytes.len().min(start + len as usize);
                return Ok(bytes[start..stop].to_vec());
            }
        }
        Err(ReadError::Unmapped { address })
    }
}

/// Reads a live process's address space through `/proc/<pid>/mem`.
///
/// The target must be stopped (under a debugger or `SIGSTOP`); this
/// reader only ever reads, it never mutates the inspected memory.
#[derive(Debug)]
pub struct ProcessReader {
    mem: File,
    pid: u32,
}

impl ProcessReader {
    /// Open the memory image of `pid`.
    ///
    /// # Errors
    /// Fails if the process does not exist or the caller lacks ptrace
    /// permission over it.
    pub fn attach(pid: u32) -> io::Result<Self> {
        let mem = File::open(format!("/proc/{pid}/mem"))?;
        Ok(Self { mem, pid })
    }
}

impl MemoryReader for ProcessReader {
    fn read_bytes(&mut self, address: u64, len: u32) -> std::result::Result<Vec<u8>, ReadError> {
        let mut buf = vec![0u8; len as usize];
        let got = self.mem.read_at(&mut buf, address)?;
        trace!("pid {}: read {got} of {len} bytes at {address:#x}", self.pid);
        buf.truncate(got);
        Ok(buf)
    }
}

/// Resolution failure for a symbolic address expression.
#[derive(Debug, Error)]
#[error("cannot evaluate {expr:?}: {reason}")]
pub struct EvalError {
    pub expr: String,
    pub reason: String,
}

/// Resolves a symbolic address expression against the target.
///
/// Real resolution (globals, frame locals) lives in the host debugger;
/// this crate only consumes the resulting address.
pub trait AddressResolver {
    fn resolve(&mut self, expr: &str) -> std::result::Result<u64, EvalError>;
}

/// Resolver for standalone use, where no symbol information exists.
pub struct NoSymbols;

impl AddressResolver for NoSymbols {
    fn resolve(&mut self, expr: &str) -> std::result::Result<u64, EvalError> {
        Err(EvalError {
            expr: expr.to_string(),
            reason: "no symbol information in standalone mode".to_string(),
        })
    }
}
