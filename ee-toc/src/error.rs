use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Not a TOC stream: magic {0:#010x}")]
    InvalidMagic(u32),

    #[error("TOC version {0:#x} is not supported")]
    UnsupportedVersion(u32),

    #[error("Entry {entry} references directory ordinal {parent} before it exists")]
    InvalidParent { entry: usize, parent: i32 },
}

pub type Result<T> = std::result::Result<T, Error>;
