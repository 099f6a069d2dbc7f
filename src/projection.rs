//! The projection parameter record of the map-file header.

use crate::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Projection parameters, persisted verbatim.
///
/// The map-file header carries one of these records. This library does not
/// interpret it, coordinate reference system modeling belongs to the caller.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use tab::ProjectionRecord;
///
/// let mut record = ProjectionRecord::default();
/// record.projection = 3;
/// record.parameters[0] = -90.;
/// let mut cursor = Cursor::new(Vec::new());
/// record.write_to(&mut cursor).unwrap();
/// cursor.set_position(0);
/// assert_eq!(record, ProjectionRecord::read_from(cursor).unwrap());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProjectionRecord {
    /// Projection method number.
    pub projection: u8,

    /// Ellipsoid number.
    pub ellipsoid: u8,

    /// Linear units number.
    pub units: u8,

    /// Datum shift to WGS 84, in meters.
    pub datum_shift: [f64; 3],

    /// Projection parameters, meaning dependent on the projection method.
    pub parameters: [f64; 6],
}

impl ProjectionRecord {
    /// Reads a projection record.
    pub fn read_from<R: Read>(mut read: R) -> Result<ProjectionRecord> {
        let projection = read.read_u8()?;
        let ellipsoid = read.read_u8()?;
        let units = read.read_u8()?;
        let _ = read.read_u8()?;
        let mut datum_shift = [0.; 3];
        for n in &mut datum_shift {
            *n = read.read_f64::<LittleEndian>()?;
        }
        let mut parameters = [0.; 6];
        for n in &mut parameters {
            *n = read.read_f64::<LittleEndian>()?;
        }
        Ok(ProjectionRecord {
            projection,
            ellipsoid,
            units,
            datum_shift,
            parameters,
        })
    }

    /// Writes a projection record.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_u8(self.projection)?;
        write.write_u8(self.ellipsoid)?;
        write.write_u8(self.units)?;
        write.write_u8(0)?;
        for n in self.datum_shift {
            write.write_f64::<LittleEndian>(n)?;
        }
        for n in self.parameters {
            write.write_f64::<LittleEndian>(n)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn roundtrip() {
        let record = ProjectionRecord {
            projection: 8,
            ellipsoid: 28,
            units: 7,
            datum_shift: [-168., -60., 320.],
            parameters: [9., 0., 0.9996, 500000., 0., 0.],
        };
        let mut cursor = Cursor::new(Vec::new());
        record.write_to(&mut cursor).unwrap();
        assert_eq!(76, cursor.get_ref().len());
        cursor.set_position(0);
        assert_eq!(record, ProjectionRecord::read_from(cursor).unwrap());
    }

    #[test]
    fn pad_byte_is_ignored() {
        let mut bytes = vec![1, 0, 7, 0xff];
        bytes.extend_from_slice(&[0; 72]);
        let record = ProjectionRecord::read_from(Cursor::new(bytes)).unwrap();
        assert_eq!(1, record.projection);
        assert_eq!(7, record.units);
    }
}
