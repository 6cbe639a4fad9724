//! Error types for cache operations

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOC error: {0}")]
    Toc(#[from] ee_toc::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] ee_frame::Error),

    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),

    #[error("Unknown content variant tag: {0:?}")]
    UnknownVariant(char),

    #[error("Unknown locale suffix: {0:?}")]
    UnknownLocale(String),

    #[error("Read beyond blob bounds: offset={offset}, length={length}, size={size}")]
    OutOfBounds {
        offset: u64,
        length: usize,
        size: u64,
    },

    #[error("Entry index {0} is out of range")]
    EntryOutOfRange(usize),
}

pub type Result<T> = std::result::Result<T, CacheError>;
