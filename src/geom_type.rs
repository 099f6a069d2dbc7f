use crate::{Error, Result};

/// The one-byte tag that discriminates on-disk feature records.
///
/// Every shape comes in an uncompressed and a compressed flavor. The
/// compressed flavor stores coordinates as 16-bit offsets from a per-feature
/// origin instead of full 32-bit integers.
///
/// # Examples
///
/// ```
/// use tab::GeomType;
/// let geom_type = GeomType::new(0x01).unwrap();
/// assert_eq!(GeomType::Symbol, geom_type);
/// assert_eq!(GeomType::SymbolC, geom_type.compressed());
/// assert!(GeomType::new(0x03).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum GeomType {
    /// No geometry.
    None,
    Symbol,
    SymbolC,
    Line,
    LineC,
    Pline,
    PlineC,
    Arc,
    ArcC,
    Region,
    RegionC,
    Rect,
    RectC,
    RoundRect,
    RoundRectC,
    Ellipse,
    EllipseC,
    Text,
    TextC,
    Multipline,
    MultiplineC,
    FontSymbol,
    FontSymbolC,
    CustomSymbol,
    CustomSymbolC,
}

impl GeomType {
    /// Creates a geometry type from its tag byte.
    ///
    /// Any byte outside the closed tag set is an
    /// [Error::UnknownGeometryTag].
    ///
    /// # Examples
    ///
    /// ```
    /// use tab::GeomType;
    /// assert_eq!(GeomType::Region, GeomType::new(0x0d).unwrap());
    /// assert!(GeomType::new(0xff).is_err());
    /// ```
    pub fn new(n: u8) -> Result<GeomType> {
        match n {
            0x00 => Ok(GeomType::None),
            0x01 => Ok(GeomType::Symbol),
            0x02 => Ok(GeomType::SymbolC),
            0x04 => Ok(GeomType::Line),
            0x05 => Ok(GeomType::LineC),
            0x07 => Ok(GeomType::Pline),
            0x08 => Ok(GeomType::PlineC),
            0x0a => Ok(GeomType::Arc),
            0x0b => Ok(GeomType::ArcC),
            0x0d => Ok(GeomType::Region),
            0x0e => Ok(GeomType::RegionC),
            0x13 => Ok(GeomType::Rect),
            0x14 => Ok(GeomType::RectC),
            0x16 => Ok(GeomType::RoundRect),
            0x17 => Ok(GeomType::RoundRectC),
            0x19 => Ok(GeomType::Ellipse),
            0x1a => Ok(GeomType::EllipseC),
            0x1c => Ok(GeomType::Text),
            0x1d => Ok(GeomType::TextC),
            0x25 => Ok(GeomType::Multipline),
            0x26 => Ok(GeomType::MultiplineC),
            0x28 => Ok(GeomType::FontSymbol),
            0x29 => Ok(GeomType::FontSymbolC),
            0x2b => Ok(GeomType::CustomSymbol),
            0x2c => Ok(GeomType::CustomSymbolC),
            _ => Err(Error::UnknownGeometryTag(n)),
        }
    }

    /// Converts this geometry type to its tag byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use tab::GeomType;
    /// assert_eq!(0x1c, GeomType::Text.to_u8());
    /// ```
    pub fn to_u8(&self) -> u8 {
        match self {
            GeomType::None => 0x00,
            GeomType::Symbol => 0x01,
            GeomType::SymbolC => 0x02,
            GeomType::Line => 0x04,
            GeomType::LineC => 0x05,
            GeomType::Pline => 0x07,
            GeomType::PlineC => 0x08,
            GeomType::Arc => 0x0a,
            GeomType::ArcC => 0x0b,
            GeomType::Region => 0x0d,
            GeomType::RegionC => 0x0e,
            GeomType::Rect => 0x13,
            GeomType::RectC => 0x14,
            GeomType::RoundRect => 0x16,
            GeomType::RoundRectC => 0x17,
            GeomType::Ellipse => 0x19,
            GeomType::EllipseC => 0x1a,
            GeomType::Text => 0x1c,
            GeomType::TextC => 0x1d,
            GeomType::Multipline => 0x25,
            GeomType::MultiplineC => 0x26,
            GeomType::FontSymbol => 0x28,
            GeomType::FontSymbolC => 0x29,
            GeomType::CustomSymbol => 0x2b,
            GeomType::CustomSymbolC => 0x2c,
        }
    }

    /// Returns true if this is a compressed-coordinate flavor.
    ///
    /// # Examples
    ///
    /// ```
    /// use tab::GeomType;
    /// assert!(!GeomType::Pline.is_compressed());
    /// assert!(GeomType::PlineC.is_compressed());
    /// ```
    pub fn is_compressed(&self) -> bool {
        matches!(
            self,
            GeomType::SymbolC
                | GeomType::LineC
                | GeomType::PlineC
                | GeomType::ArcC
                | GeomType::RegionC
                | GeomType::RectC
                | GeomType::RoundRectC
                | GeomType::EllipseC
                | GeomType::TextC
                | GeomType::MultiplineC
                | GeomType::FontSymbolC
                | GeomType::CustomSymbolC
        )
    }

    /// Returns the compressed flavor of this geometry type.
    ///
    /// [GeomType::None] has no compressed flavor and is returned unchanged.
    pub fn compressed(&self) -> GeomType {
        match self {
            GeomType::Symbol => GeomType::SymbolC,
            GeomType::Line => GeomType::LineC,
            GeomType::Pline => GeomType::PlineC,
            GeomType::Arc => GeomType::ArcC,
            GeomType::Region => GeomType::RegionC,
            GeomType::Rect => GeomType::RectC,
            GeomType::RoundRect => GeomType::RoundRectC,
            GeomType::Ellipse => GeomType::EllipseC,
            GeomType::Text => GeomType::TextC,
            GeomType::Multipline => GeomType::MultiplineC,
            GeomType::FontSymbol => GeomType::FontSymbolC,
            GeomType::CustomSymbol => GeomType::CustomSymbolC,
            other => *other,
        }
    }

    /// Returns the uncompressed flavor of this geometry type.
    pub fn uncompressed(&self) -> GeomType {
        match self {
            GeomType::SymbolC => GeomType::Symbol,
            GeomType::LineC => GeomType::Line,
            GeomType::PlineC => GeomType::Pline,
            GeomType::ArcC => GeomType::Arc,
            GeomType::RegionC => GeomType::Region,
            GeomType::RectC => GeomType::Rect,
            GeomType::RoundRectC => GeomType::RoundRect,
            GeomType::EllipseC => GeomType::Ellipse,
            GeomType::TextC => GeomType::Text,
            GeomType::MultiplineC => GeomType::Multipline,
            GeomType::FontSymbolC => GeomType::FontSymbol,
            GeomType::CustomSymbolC => GeomType::CustomSymbol,
            other => *other,
        }
    }

    /// Returns true if records of this type spill data into the coordinate
    /// stream.
    pub fn uses_coord_stream(&self) -> bool {
        matches!(
            self.uncompressed(),
            GeomType::Pline | GeomType::Region | GeomType::Multipline | GeomType::Text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_byte_roundtrip() {
        for n in 0..=u8::MAX {
            if let Ok(geom_type) = GeomType::new(n) {
                assert_eq!(n, geom_type.to_u8());
            }
        }
    }

    #[test]
    fn compression_pairing() {
        for n in 0..=u8::MAX {
            let Ok(geom_type) = GeomType::new(n) else {
                continue;
            };
            if geom_type.is_compressed() {
                assert_eq!(geom_type, geom_type.uncompressed().compressed());
            } else if geom_type != GeomType::None {
                assert_eq!(geom_type, geom_type.compressed().uncompressed());
            }
        }
    }

    #[test]
    fn unknown_tag() {
        assert!(matches!(
            GeomType::new(0x42),
            Err(Error::UnknownGeometryTag(0x42))
        ));
    }

    #[test]
    fn coord_stream_usage() {
        assert!(GeomType::Pline.uses_coord_stream());
        assert!(GeomType::RegionC.uses_coord_stream());
        assert!(GeomType::TextC.uses_coord_stream());
        assert!(!GeomType::Symbol.uses_coord_stream());
        assert!(!GeomType::Rect.uses_coord_stream());
    }
}
