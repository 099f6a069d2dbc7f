//! Typed access to the map file's logical byte streams.
//!
//! The map file multiplexes two streams that matter to the feature codec: an
//! object stream holding fixed-size feature headers and a coordinate stream
//! holding variable-length payloads. Block allocation is handled by the
//! enclosing reader or writer; a [MapCursor] only sees a flat stream
//! positioned at its start.

use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use geo_types::Coord;
use std::io::{Read, Seek, SeekFrom, Write};

fn truncated(err: std::io::Error, offset: u64) -> Error {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::TruncatedRecord(offset)
    } else {
        Error::Io(err)
    }
}

/// A cursor over one of the map file's logical streams.
///
/// The cursor tracks its own byte position, the compressed-coordinate origin,
/// and the bounding rectangle of every integer coordinate written since the
/// last [MapCursor::start_new_feature] call.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use geo_types::Coord;
/// use tab::MapCursor;
///
/// let mut cursor = MapCursor::new(Cursor::new(Vec::new()));
/// cursor.write_coord(Coord { x: 1, y: 2 }, false).unwrap();
/// cursor.goto(0).unwrap();
/// assert_eq!(Coord { x: 1, y: 2 }, cursor.read_coord(false).unwrap());
/// ```
#[derive(Debug)]
pub struct MapCursor<S> {
    stream: S,
    position: u64,
    origin: Coord<i32>,
    feature_start: u64,
    feature_mbr: Option<(Coord<i32>, Coord<i32>)>,
}

impl<S> MapCursor<S> {
    /// Creates a new cursor over a stream.
    ///
    /// The stream must be positioned at its start, all offsets are relative
    /// to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use tab::MapCursor;
    /// let cursor = MapCursor::new(Cursor::new(Vec::<u8>::new()));
    /// ```
    pub fn new(stream: S) -> MapCursor<S> {
        MapCursor {
            stream,
            position: 0,
            origin: Coord { x: 0, y: 0 },
            feature_start: 0,
            feature_mbr: None,
        }
    }

    /// Returns the current byte position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Sets the origin that compressed coordinates are relative to.
    ///
    /// Must be called before the first relative coordinate of a feature is
    /// read or written.
    pub fn set_origin(&mut self, origin: Coord<i32>) {
        self.origin = origin;
    }

    /// Returns the compressed-coordinate origin.
    pub fn origin(&self) -> Coord<i32> {
        self.origin
    }

    /// Marks the start of a new feature's data.
    ///
    /// Resets the byte count and the accumulated bounding rectangle.
    pub fn start_new_feature(&mut self) {
        self.feature_start = self.position;
        self.feature_mbr = None;
    }

    /// Returns the number of bytes written for the current feature.
    pub fn feature_data_size(&self) -> u64 {
        self.position - self.feature_start
    }

    /// Returns the bounding rectangle of the integer coordinates written for
    /// the current feature, or `None` if no coordinate has been written.
    pub fn feature_mbr(&self) -> Option<(Coord<i32>, Coord<i32>)> {
        self.feature_mbr
    }

    /// Returns a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Consumes the cursor, returning the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read> MapCursor<S> {
    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let n = self
            .stream
            .read_u8()
            .map_err(|err| truncated(err, self.position))?;
        self.position += 1;
        Ok(n)
    }

    /// Reads a signed 16-bit integer.
    pub fn read_i16(&mut self) -> Result<i16> {
        let n = self
            .stream
            .read_i16::<LittleEndian>()
            .map_err(|err| truncated(err, self.position))?;
        self.position += 2;
        Ok(n)
    }

    /// Reads a signed 32-bit integer.
    pub fn read_i32(&mut self) -> Result<i32> {
        let n = self
            .stream
            .read_i32::<LittleEndian>()
            .map_err(|err| truncated(err, self.position))?;
        self.position += 4;
        Ok(n)
    }

    /// Reads `count` raw bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0; count];
        self.stream
            .read_exact(&mut bytes)
            .map_err(|err| truncated(err, self.position))?;
        self.position += count as u64;
        Ok(bytes)
    }

    /// Reads one integer coordinate pair.
    ///
    /// A compressed pair is stored as two 16-bit deltas from the origin set
    /// with [MapCursor::set_origin], an uncompressed pair as two full 32-bit
    /// integers.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use geo_types::Coord;
    /// use tab::MapCursor;
    ///
    /// let mut cursor = MapCursor::new(Cursor::new(vec![1, 0, 2, 0]));
    /// cursor.set_origin(Coord { x: 100, y: 200 });
    /// assert_eq!(Coord { x: 101, y: 202 }, cursor.read_coord(true).unwrap());
    /// ```
    pub fn read_coord(&mut self, compressed: bool) -> Result<Coord<i32>> {
        if compressed {
            let x = i32::from(self.read_i16()?);
            let y = i32::from(self.read_i16()?);
            Ok(Coord {
                x: self.origin.x.wrapping_add(x),
                y: self.origin.y.wrapping_add(y),
            })
        } else {
            Ok(Coord {
                x: self.read_i32()?,
                y: self.read_i32()?,
            })
        }
    }

    /// Reads `count` integer coordinate pairs.
    pub fn read_coords(&mut self, compressed: bool, count: usize) -> Result<Vec<Coord<i32>>> {
        let mut coords = Vec::with_capacity(count);
        for _ in 0..count {
            coords.push(self.read_coord(compressed)?);
        }
        Ok(coords)
    }
}

impl<S: Seek> MapCursor<S> {
    /// Moves the cursor relative to its current position.
    pub fn seek_rel(&mut self, delta: i64) -> Result<()> {
        self.position = self.stream.seek(SeekFrom::Current(delta))?;
        Ok(())
    }

    /// Moves the cursor to an absolute offset.
    ///
    /// A negative or otherwise unreachable offset is a
    /// [Error::CoordBlockFault], records routinely declare offsets into the
    /// coordinate stream and those declarations can be corrupt.
    pub fn goto(&mut self, offset: i64) -> Result<()> {
        let target = u64::try_from(offset).map_err(|_| Error::CoordBlockFault(offset))?;
        self.position = self
            .stream
            .seek(SeekFrom::Start(target))
            .map_err(|_| Error::CoordBlockFault(offset))?;
        Ok(())
    }
}

impl<S: Write> MapCursor<S> {
    /// Writes a single byte.
    pub fn write_u8(&mut self, n: u8) -> Result<()> {
        self.stream.write_u8(n)?;
        self.position += 1;
        Ok(())
    }

    /// Writes a signed 16-bit integer.
    pub fn write_i16(&mut self, n: i16) -> Result<()> {
        self.stream.write_i16::<LittleEndian>(n)?;
        self.position += 2;
        Ok(())
    }

    /// Writes a signed 32-bit integer.
    pub fn write_i32(&mut self, n: i32) -> Result<()> {
        self.stream.write_i32::<LittleEndian>(n)?;
        self.position += 4;
        Ok(())
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Writes one integer coordinate pair and grows the feature's bounding
    /// rectangle.
    ///
    /// A compressed pair must be within `i16` range of the origin, anything
    /// else is a [Error::CoordinateOverflow].
    pub fn write_coord(&mut self, coord: Coord<i32>, compressed: bool) -> Result<()> {
        self.grow_mbr(coord);
        if compressed {
            let x = i64::from(coord.x) - i64::from(self.origin.x);
            let y = i64::from(coord.y) - i64::from(self.origin.y);
            let x = i16::try_from(x).map_err(|_| Error::CoordinateOverflow(f64::from(coord.x)))?;
            let y = i16::try_from(y).map_err(|_| Error::CoordinateOverflow(f64::from(coord.y)))?;
            self.write_i16(x)?;
            self.write_i16(y)
        } else {
            self.write_i32(coord.x)?;
            self.write_i32(coord.y)
        }
    }

    fn grow_mbr(&mut self, coord: Coord<i32>) {
        match &mut self.feature_mbr {
            Some((min, max)) => {
                min.x = min.x.min(coord.x);
                min.y = min.y.min(coord.y);
                max.x = max.x.max(coord.x);
                max.y = max.y.max(coord.y);
            }
            None => self.feature_mbr = Some((coord, coord)),
        }
    }
}
