//! Adapter for the native Oodle decompressor.
//!
//! The game ships the codec as a platform-specific shared library next to
//! its binaries, with a version-mangled filename. Resolution scans a
//! directory for a matching filename, loads the library, and binds the
//! single `OodleLZ_Decompress` export. Resolution is lazy and happens at
//! most once per codec instance: a failed probe is sticky and every later
//! call reports [`Error::CodecUnavailable`].

use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::codec::Codec;
use crate::{Error, Result};

/// `OodleLZ_Decompress` as exported by the shared library.
///
/// Only the first four arguments matter for this engine; the rest select
/// fuzz-safe decoding with no CRC checking, no verbosity, no callbacks,
/// caller-less decoder memory, and unthreaded decoding.
type OodleDecompress = unsafe extern "C" fn(
    src: *const u8,
    src_len: isize,
    dst: *mut u8,
    dst_len: isize,
    fuzz_safe: i32,
    check_crc: i32,
    verbosity: i32,
    dec_buf_base: *mut u8,
    dec_buf_size: isize,
    callback: *const c_void,
    callback_data: *mut c_void,
    decoder_memory: *mut c_void,
    decoder_memory_size: isize,
    thread_phase: i32,
) -> isize;

const DECOMPRESS_EXPORT: &[u8] = b"OodleLZ_Decompress";

/// Unthreaded decode (thread phase "all").
const THREAD_PHASE_UNTHREADED: i32 = 3;

#[cfg(target_os = "windows")]
const LIBRARY_SUFFIX: &str = ".dll";
#[cfg(target_os = "linux")]
const LIBRARY_SUFFIX: &str = ".so";
#[cfg(target_os = "macos")]
const LIBRARY_SUFFIX: &str = ".dylib";
#[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
const LIBRARY_SUFFIX: &str = "";

/// Platform tags embedded in the library filename, in probe order.
///
/// Examples of the filenames being matched: `oo2core_9_win64.dll`,
/// `liboo2corelinux64.so.9`, `liboo2coremac64.2.9.10.dylib`.
fn platform_tags() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        match std::env::consts::ARCH {
            "aarch64" => &["winuwparm64", "win64"],
            "x86" => &["win32", "win64"],
            _ => &["win64"],
        }
    }
    #[cfg(target_os = "linux")]
    {
        match std::env::consts::ARCH {
            "aarch64" => &["linuxarm64", "linux64"],
            "arm" => &["linuxarm32", "linux64"],
            _ => &["linux64"],
        }
    }
    #[cfg(target_os = "macos")]
    {
        match std::env::consts::ARCH {
            "aarch64" => &["macarm64", "mac64"],
            _ => &["mac64"],
        }
    }
    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        &[]
    }
}

/// Scan `dir` for a filename matching one of the platform patterns.
fn find_library(dir: &Path) -> Option<PathBuf> {
    let entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .collect();

    for tag in platform_tags() {
        for path in &entries {
            let Some(name) = path.file_name() else {
                continue;
            };
            let name = name.to_string_lossy().to_ascii_lowercase();
            if name.contains("oo2core")
                && name.contains(tag)
                && name.contains(LIBRARY_SUFFIX)
            {
                return Some(path.clone());
            }
        }
    }

    None
}

/// A loaded library plus its bound decompression export.
///
/// The function pointer is only valid while the library stays loaded, so
/// both live and die together.
#[derive(Debug)]
struct OodleLibrary {
    _library: libloading::Library,
    decompress: OodleDecompress,
}

impl OodleLibrary {
    fn load(path: &Path) -> Result<Self> {
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| {
            warn!("Failed to load codec library {}: {e}", path.display());
            Error::CodecUnavailable
        })?;

        let decompress = unsafe {
            let symbol: libloading::Symbol<OodleDecompress> =
                library.get(DECOMPRESS_EXPORT).map_err(|e| {
                    warn!(
                        "Codec library {} has no decompress export: {e}",
                        path.display()
                    );
                    Error::CodecUnavailable
                })?;
            *symbol
        };

        debug!("Loaded native codec from {}", path.display());
        Ok(Self {
            _library: library,
            decompress,
        })
    }

    fn locate(dir: &Path) -> Option<Self> {
        let path = find_library(dir)?;
        Self::load(&path).ok()
    }
}

/// The native codec, resolved lazily from a search directory.
#[derive(Debug)]
pub struct OodleCodec {
    search_dir: Option<PathBuf>,
    library: OnceLock<Option<OodleLibrary>>,
}

impl OodleCodec {
    /// Codec that probes the current working directory on first use.
    pub fn new() -> Self {
        Self {
            search_dir: None,
            library: OnceLock::new(),
        }
    }

    /// Codec that probes `dir` on first use.
    pub fn with_search_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            search_dir: Some(dir.into()),
            library: OnceLock::new(),
        }
    }

    /// Codec bound eagerly to an explicit library file.
    pub fn with_library(path: &Path) -> Result<Self> {
        let library = OodleLibrary::load(path)?;
        let cell = OnceLock::new();
        let _ = cell.set(Some(library));
        Ok(Self {
            search_dir: None,
            library: cell,
        })
    }

    fn resolve(&self) -> Option<&OodleLibrary> {
        self.library
            .get_or_init(|| {
                let dir = self
                    .search_dir
                    .clone()
                    .or_else(|| std::env::current_dir().ok())
                    .unwrap_or_else(|| PathBuf::from("."));
                OodleLibrary::locate(&dir)
            })
            .as_ref()
    }

    /// Whether the library has been (or can be) resolved.
    pub fn is_available(&self) -> bool {
        self.resolve().is_some()
    }
}

impl Default for OodleCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for OodleCodec {
    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let library = self.resolve().ok_or(Error::CodecUnavailable)?;

        let written = unsafe {
            (library.decompress)(
                input.as_ptr(),
                input.len() as isize,
                output.as_mut_ptr(),
                output.len() as isize,
                1, // fuzz safe
                0, // no CRC check
                0, // no verbosity
                std::ptr::null_mut(),
                0,
                std::ptr::null(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                0,
                THREAD_PHASE_UNTHREADED,
            )
        };

        if written < 0 {
            return Err(Error::Decode {
                expected: output.len(),
                actual: 0,
            });
        }

        Ok(written as usize)
    }
}
