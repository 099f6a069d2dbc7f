use thiserror::Error;

/// Crate-specific error enum.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A block stream ran out in the middle of a record.
    ///
    /// The offset is the position of the field that could not be read.
    #[error("truncated record at offset {0}")]
    TruncatedRecord(u64),

    /// The geometry tag byte is not one this library knows about.
    ///
    /// This is fatal for the feature but not for the file cursor, so a caller
    /// that knows the per-tag object sizes may skip past the record.
    #[error("unknown geometry tag 0x{0:02x}")]
    UnknownGeometryTag(u8),

    /// The in-memory geometry does not match the requested feature class.
    #[error("geometry does not match the {0} feature class")]
    GeometryShapeMismatch(&'static str),

    /// A world coordinate mapped outside of the 32-bit integer range.
    #[error("coordinate overflow: {0}")]
    CoordinateOverflow(f64),

    /// A non-zero style index references no pool entry.
    #[error("style index out of range: {0}")]
    StyleIndexOutOfRange(u8),

    /// The text manifest returned no usable schema.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// The coordinate stream refused a seek to a declared offset.
    #[error("coordinate block fault at offset {0}")]
    CoordBlockFault(i64),

    /// [std::io::Error]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
