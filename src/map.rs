//! Read and write map features.
//!
//! A [MapFile] bundles what the feature codec needs: the object stream, the
//! coordinate stream, the style pools, and the header's coordinate
//! transform. Block allocation and the attribute table are handled by the
//! enclosing dataset reader; this type only sees flat streams.
//!
//! ```
//! use geo_types::Point;
//! use tab::{Feature, MapFile, SymbolDef};
//!
//! let mut map = MapFile::memory();
//! let feature = Feature::symbol(Point::new(10., 20.), SymbolDef::default());
//! map.write_feature(&feature, false).unwrap();
//! map.rewind().unwrap();
//! assert_eq!(feature, map.read_feature().unwrap());
//! ```

use crate::{
    Bounds, Color, Error, Feature, GeomType, MapCursor, PenDef, Result, StylePool, SymbolDef,
    Transform, Vector,
    feature::{CustomStyle, Shape, Text},
};
use geo_types::{Coord, Geometry, LineString, MultiLineString, Point, Polygon};
use log::{debug, warn};
use std::io::{Cursor, Read, Seek, Write};

const SMOOTH_FLAG: u32 = 0x8000_0000;

/// Returns the angle mirrored across the x axis of the storage frame.
///
/// Storage angles live in a frame whose x axis is reversed relative to world
/// coordinates, so arc angles are mirrored on both read and write. Applying
/// the mirror twice is the identity.
fn mirror_angle(angle: f64) -> f64 {
    if angle <= 180. {
        180. - angle
    } else {
        540. - angle
    }
}

fn coord_ptr(position: u64) -> Result<i32> {
    i32::try_from(position).map_err(|_| Error::CoordBlockFault(position as i64))
}

fn midpoint(min: Coord<i32>, max: Coord<i32>) -> Coord<i32> {
    Coord {
        x: ((i64::from(min.x) + i64::from(max.x)) / 2) as i32,
        y: ((i64::from(min.y) + i64::from(max.y)) / 2) as i32,
    }
}

fn int_mbr(coords: &[Coord<i32>]) -> Option<(Coord<i32>, Coord<i32>)> {
    let mut iter = coords.iter();
    let &first = iter.next()?;
    let mut min = first;
    let mut max = first;
    for &coord in iter {
        min.x = min.x.min(coord.x);
        min.y = min.y.min(coord.y);
        max.x = max.x.max(coord.x);
        max.y = max.y.max(coord.y);
    }
    Some((min, max))
}

/// The codec state of one open map file.
///
/// Holds exclusive access to the object and coordinate cursors for the
/// duration of each feature read or write; features are handled one at a
/// time.
#[derive(Debug)]
pub struct MapFile<S> {
    object: MapCursor<S>,
    coord: MapCursor<S>,
    transforms: Vector<Transform>,
    styles: StylePool,
}

impl MapFile<Cursor<Vec<u8>>> {
    /// Creates a map file over in-memory streams with the identity
    /// transform.
    ///
    /// # Examples
    ///
    /// ```
    /// use tab::MapFile;
    /// let map = MapFile::memory();
    /// ```
    pub fn memory() -> MapFile<Cursor<Vec<u8>>> {
        MapFile::new(
            Cursor::new(Vec::new()),
            Cursor::new(Vec::new()),
            Vector::default(),
        )
    }
}

impl<S> MapFile<S> {
    /// Creates a map file from its object stream, coordinate stream, and
    /// coordinate transform.
    ///
    /// Both streams must be positioned at their start.
    pub fn new(object: S, coord: S, transforms: Vector<Transform>) -> MapFile<S> {
        MapFile {
            object: MapCursor::new(object),
            coord: MapCursor::new(coord),
            transforms,
            styles: StylePool::default(),
        }
    }

    /// Returns this map file's coordinate transforms.
    pub fn transforms(&self) -> &Vector<Transform> {
        &self.transforms
    }

    /// Returns a reference to this map file's style pools.
    pub fn styles(&self) -> &StylePool {
        &self.styles
    }

    /// Returns a mutable reference to this map file's style pools.
    ///
    /// Used by the enclosing reader to load the on-disk pools before any
    /// feature is read.
    pub fn styles_mut(&mut self) -> &mut StylePool {
        &mut self.styles
    }

    /// Returns a reference to the object-stream cursor.
    pub fn object(&self) -> &MapCursor<S> {
        &self.object
    }

    /// Returns a mutable reference to the object-stream cursor.
    ///
    /// The enclosing block manager uses this to position the cursor and to
    /// stage the compressed-coordinate origin of single-block records.
    pub fn object_mut(&mut self) -> &mut MapCursor<S> {
        &mut self.object
    }

    /// Returns a reference to the coordinate-stream cursor.
    pub fn coord(&self) -> &MapCursor<S> {
        &self.coord
    }

    /// Returns a mutable reference to the coordinate-stream cursor.
    pub fn coord_mut(&mut self) -> &mut MapCursor<S> {
        &mut self.coord
    }

    /// Converts a storage coordinate to world coordinates.
    pub fn int_to_world(&self, coord: Coord<i32>) -> Coord<f64> {
        Coord {
            x: self.transforms.x.direct(coord.x),
            y: self.transforms.y.direct(coord.y),
        }
    }

    /// Converts a world coordinate to storage coordinates.
    pub fn world_to_int(&self, coord: Coord<f64>) -> Result<Coord<i32>> {
        Ok(Coord {
            x: self.transforms.x.inverse(coord.x)?,
            y: self.transforms.y.inverse(coord.y)?,
        })
    }

    /// Converts a storage distance to a world distance.
    pub fn int_to_world_distance(&self, coord: Coord<i32>) -> Coord<f64> {
        Coord {
            x: self.transforms.x.direct_distance(coord.x),
            y: self.transforms.y.direct_distance(coord.y),
        }
    }

    /// Converts a world distance to a storage distance.
    pub fn world_to_int_distance(&self, coord: Coord<f64>) -> Result<Coord<i32>> {
        Ok(Coord {
            x: self.transforms.x.inverse_distance(coord.x)?,
            y: self.transforms.y.inverse_distance(coord.y)?,
        })
    }
}

impl<S: Seek> MapFile<S> {
    /// Positions both cursors back at the start of their streams.
    pub fn rewind(&mut self) -> Result<()> {
        self.object.goto(0)?;
        self.coord.goto(0)
    }
}

impl<S: Read + Seek> MapFile<S> {
    /// Reads the feature record at the object cursor.
    ///
    /// The cursor must be positioned at the record's tag byte. Errors abort
    /// the current feature only; the caller may skip to the next record
    /// using its table of per-tag object sizes.
    pub fn read_feature(&mut self) -> Result<Feature> {
        let tag = GeomType::new(self.object.read_u8()?)?;
        let compressed = tag.is_compressed();
        match tag.uncompressed() {
            GeomType::None => Ok(Feature::default()),
            GeomType::Symbol => self.read_symbol(compressed),
            GeomType::FontSymbol => self.read_font_symbol(compressed),
            GeomType::CustomSymbol => self.read_custom_symbol(compressed),
            GeomType::Line => self.read_line(compressed),
            GeomType::Pline => self.read_pline(compressed),
            GeomType::Multipline => self.read_multipline(compressed),
            GeomType::Region => self.read_region(compressed),
            GeomType::Arc => self.read_arc(compressed),
            GeomType::Rect => self.read_rect(compressed, false),
            GeomType::RoundRect => self.read_rect(compressed, true),
            GeomType::Ellipse => self.read_ellipse(compressed),
            GeomType::Text => self.read_text(compressed),
            other => Err(Error::UnknownGeometryTag(other.to_u8())),
        }
    }

    fn read_color(&mut self) -> Result<Color> {
        let red = self.object.read_u8()?;
        let green = self.object.read_u8()?;
        let blue = self.object.read_u8()?;
        Ok(Color { red, green, blue })
    }

    fn read_symbol(&mut self, compressed: bool) -> Result<Feature> {
        let coord = self.object.read_coord(compressed)?;
        let symbol = self.styles.symbol(self.object.read_u8()?)?;
        let point = Point::from(self.int_to_world(coord));
        Ok(Feature::symbol(point, symbol))
    }

    fn read_font_symbol(&mut self, compressed: bool) -> Result<Feature> {
        // The font symbol stores its symbol inline instead of through the
        // pool.
        let shape = u16::from(self.object.read_u8()?);
        let point_size = self.object.read_u8()?;
        let style = self.object.read_i16()? as u16;
        let color = self.read_color()?;
        let reserved = self.object.read_bytes(3)?;
        if reserved.iter().any(|&n| n != 0) {
            debug!("nonzero reserved bytes in a font symbol: {:?}", reserved);
        }
        let angle = f64::from(self.object.read_i16()?) / 10.;
        let coord = self.object.read_coord(compressed)?;
        let font = self.styles.font(self.object.read_u8()?)?;
        let symbol = SymbolDef {
            shape,
            point_size,
            color,
        };
        let point = Point::from(self.int_to_world(coord));
        Ok(Feature::font_symbol(point, symbol, font, style, angle))
    }

    fn read_custom_symbol(&mut self, compressed: bool) -> Result<Feature> {
        let _ = self.object.read_u8()?;
        let style = CustomStyle(self.object.read_u8()?);
        let coord = self.object.read_coord(compressed)?;
        let symbol = self.styles.symbol(self.object.read_u8()?)?;
        let font = self.styles.font(self.object.read_u8()?)?;
        let point = Point::from(self.int_to_world(coord));
        Ok(Feature::custom_symbol(point, symbol, font, style))
    }

    fn read_line(&mut self, compressed: bool) -> Result<Feature> {
        let first = self.object.read_coord(compressed)?;
        let first = self.int_to_world(first);
        let second = self.object.read_coord(compressed)?;
        let second = self.int_to_world(second);
        let pen = self.styles.pen(self.object.read_u8()?)?;
        Ok(Feature::polyline(
            LineString::new(vec![first, second]),
            pen,
            false,
        ))
    }

    fn read_pline(&mut self, compressed: bool) -> Result<Feature> {
        let ptr = self.object.read_i32()?;
        let mut data_size = self.object.read_i32()? as u32;
        if compressed {
            let _ = self.object.read_i16()?;
            let _ = self.object.read_i16()?;
        }
        let center = Coord {
            x: self.object.read_i32()?,
            y: self.object.read_i32()?,
        };
        self.object.set_origin(center);
        let min = self.object.read_coord(compressed)?;
        let min = self.int_to_world(min);
        let max = self.object.read_coord(compressed)?;
        let max = self.int_to_world(max);
        let pen = self.styles.pen(self.object.read_u8()?)?;

        let smooth = data_size & SMOOTH_FLAG != 0;
        data_size &= !SMOOTH_FLAG;
        let count = data_size as usize / if compressed { 4 } else { 8 };
        self.coord.goto(i64::from(ptr))?;
        self.coord.set_origin(center);
        let coords = self.coord.read_coords(compressed, count)?;
        let line = LineString::new(coords.iter().map(|&c| self.int_to_world(c)).collect());
        let mut feature = Feature::polyline(line, pen, smooth);
        feature.bounds = Bounds::new(min.x, min.y, max.x, max.y);
        Ok(feature)
    }

    fn read_multipart_header(
        &mut self,
        compressed: bool,
    ) -> Result<(i32, usize, Coord<i32>, Bounds)> {
        let ptr = self.object.read_i32()?;
        let _ = self.object.read_i32()?; // coordinate data size
        let section_count = self.object.read_i16()?;
        if compressed {
            let _ = self.object.read_i16()?;
            let _ = self.object.read_i16()?;
        }
        let center = Coord {
            x: self.object.read_i32()?,
            y: self.object.read_i32()?,
        };
        self.object.set_origin(center);
        let min = self.object.read_coord(compressed)?;
        let min = self.int_to_world(min);
        let max = self.object.read_coord(compressed)?;
        let max = self.int_to_world(max);
        let section_count = usize::try_from(section_count)
            .map_err(|_| Error::TruncatedRecord(self.object.position()))?;
        Ok((
            ptr,
            section_count,
            center,
            Bounds::new(min.x, min.y, max.x, max.y),
        ))
    }

    fn read_sections(
        &mut self,
        ptr: i32,
        origin: Coord<i32>,
        count: usize,
        compressed: bool,
    ) -> Result<Vec<Vec<Coord<i32>>>> {
        self.coord.goto(i64::from(ptr))?;
        self.coord.set_origin(origin);
        let mut counts = Vec::with_capacity(count);
        let mut total = 0;
        for _ in 0..count {
            let vertex_count = self.coord.read_i16()?;
            let _ = self.coord.read_i16()?; // hole count, accept anything
            let _ = self.coord.read_coord(compressed)?; // section bounds
            let _ = self.coord.read_coord(compressed)?;
            let _ = self.coord.read_i32()?; // data offset
            let vertex_count = usize::try_from(vertex_count)
                .map_err(|_| Error::TruncatedRecord(self.coord.position()))?;
            counts.push(vertex_count);
            total += vertex_count;
        }
        let mut coords = self.coord.read_coords(compressed, total)?.into_iter();
        let mut sections = Vec::with_capacity(count);
        for vertex_count in counts {
            sections.push(coords.by_ref().take(vertex_count).collect());
        }
        Ok(sections)
    }

    fn read_multipline(&mut self, compressed: bool) -> Result<Feature> {
        let (ptr, count, center, bounds) = self.read_multipart_header(compressed)?;
        let pen = self.styles.pen(self.object.read_u8()?)?;
        let sections = self.read_sections(ptr, center, count, compressed)?;
        let lines = sections
            .into_iter()
            .map(|coords| LineString::new(coords.iter().map(|&c| self.int_to_world(c)).collect()))
            .collect();
        let mut feature = Feature::multipolyline(MultiLineString::new(lines), pen);
        feature.bounds = bounds;
        Ok(feature)
    }

    fn read_region(&mut self, compressed: bool) -> Result<Feature> {
        let (ptr, count, center, bounds) = self.read_multipart_header(compressed)?;
        let pen = self.styles.pen(self.object.read_u8()?)?;
        let brush = self.styles.brush(self.object.read_u8()?)?;
        let sections = self.read_sections(ptr, center, count, compressed)?;
        let mut rings: Vec<LineString<f64>> = sections
            .into_iter()
            .map(|coords| LineString::new(coords.iter().map(|&c| self.int_to_world(c)).collect()))
            .collect();
        let exterior = if rings.is_empty() {
            LineString::new(Vec::new())
        } else {
            rings.remove(0)
        };
        let mut feature = Feature::region(Polygon::new(exterior, rings), pen, brush);
        feature.bounds = bounds;
        Ok(feature)
    }

    fn read_arc(&mut self, compressed: bool) -> Result<Feature> {
        // Angle order on disk is end first, then start, both mirrored.
        let end_angle = mirror_angle(f64::from(self.object.read_i16()?) / 10.);
        let start_angle = mirror_angle(f64::from(self.object.read_i16()?) / 10.);
        let ellipse_min = self.object.read_coord(compressed)?;
        let ellipse_min = self.int_to_world(ellipse_min);
        let ellipse_max = self.object.read_coord(compressed)?;
        let ellipse_max = self.int_to_world(ellipse_max);
        let arc_min = self.object.read_coord(compressed)?;
        let arc_min = self.int_to_world(arc_min);
        let arc_max = self.object.read_coord(compressed)?;
        let arc_max = self.int_to_world(arc_max);
        let pen = self.styles.pen(self.object.read_u8()?)?;
        let center = Coord {
            x: (ellipse_min.x + ellipse_max.x) / 2.,
            y: (ellipse_min.y + ellipse_max.y) / 2.,
        };
        let radii = Coord {
            x: ((ellipse_max.x - ellipse_min.x) / 2.).abs(),
            y: ((ellipse_max.y - ellipse_min.y) / 2.).abs(),
        };
        let mut feature = Feature::arc(center, radii, start_angle, end_angle, pen);
        feature.bounds = Bounds::new(arc_min.x, arc_min.y, arc_max.x, arc_max.y);
        Ok(feature)
    }

    fn read_rect(&mut self, compressed: bool, round: bool) -> Result<Feature> {
        let corner_radii = if round {
            let x = if compressed {
                i32::from(self.object.read_i16()?)
            } else {
                self.object.read_i32()?
            };
            let y = if compressed {
                i32::from(self.object.read_i16()?)
            } else {
                self.object.read_i32()?
            };
            // The file stores corner diameters, the feature keeps radii.
            let diameters = self.int_to_world_distance(Coord { x, y });
            Some(Coord {
                x: diameters.x / 2.,
                y: diameters.y / 2.,
            })
        } else {
            None
        };
        let min = self.object.read_coord(compressed)?;
        let min = self.int_to_world(min);
        let max = self.object.read_coord(compressed)?;
        let max = self.int_to_world(max);
        let pen = self.styles.pen(self.object.read_u8()?)?;
        let brush = self.styles.brush(self.object.read_u8()?)?;
        let bounds = Bounds::new(min.x, min.y, max.x, max.y);
        Ok(match corner_radii {
            Some(radii) if radii.x != 0. && radii.y != 0. => {
                Feature::rounded_rectangle(bounds, radii, pen, brush)
            }
            _ => Feature::rectangle(bounds, pen, brush),
        })
    }

    fn read_ellipse(&mut self, compressed: bool) -> Result<Feature> {
        let min = self.object.read_coord(compressed)?;
        let min = self.int_to_world(min);
        let max = self.object.read_coord(compressed)?;
        let max = self.int_to_world(max);
        let pen = self.styles.pen(self.object.read_u8()?)?;
        let brush = self.styles.brush(self.object.read_u8()?)?;
        let bounds = Bounds::new(min.x, min.y, max.x, max.y);
        let radii = Coord {
            x: (bounds.max.x - bounds.min.x) / 2.,
            y: (bounds.max.y - bounds.min.y) / 2.,
        };
        let mut feature = Feature::ellipse(bounds.center(), radii, pen, brush);
        feature.bounds = bounds;
        Ok(feature)
    }

    fn read_text(&mut self, compressed: bool) -> Result<Feature> {
        let ptr = self.object.read_i32()?;
        let length = self.object.read_i16()?;
        let alignment = self.object.read_i16()? as u16;
        let angle = f64::from(self.object.read_i16()?) / 10.;
        let style = self.object.read_i16()? as u16;
        let foreground = self.read_color()?;
        let background = self.read_color()?;
        let _ = self.object.read_coord(compressed)?; // label line endpoint
        let height = if compressed {
            i32::from(self.object.read_i16()?)
        } else {
            self.object.read_i32()?
        };
        let height = self.transforms.y.direct_distance(height);
        let font = self.styles.font(self.object.read_u8()?)?;
        let min = self.object.read_coord(compressed)?;
        let min = self.int_to_world(min);
        let max = self.object.read_coord(compressed)?;
        let max = self.int_to_world(max);
        let pen = self.styles.pen(self.object.read_u8()?)?;

        let string = if length > 0 {
            self.coord.goto(i64::from(ptr))?;
            let bytes = self.coord.read_bytes(length as usize)?;
            String::from_utf8_lossy(&bytes).into_owned()
        } else {
            String::new()
        };

        let bounds = Bounds::new(min.x, min.y, max.x, max.y);
        // The anchor is the lower-left corner of the text box before
        // rotation; the stored rectangle is the bounds after rotation.
        let (sin, cos) = angle.to_radians().sin_cos();
        let anchor = if sin >= 0. && cos >= 0. {
            Coord {
                x: bounds.min.x + height * sin,
                y: bounds.min.y,
            }
        } else if sin >= 0. && cos < 0. {
            Coord {
                x: bounds.max.x,
                y: bounds.min.y - height * cos,
            }
        } else if sin < 0. && cos < 0. {
            Coord {
                x: bounds.max.x + height * sin,
                y: bounds.max.y,
            }
        } else {
            Coord {
                x: bounds.min.x,
                y: bounds.max.y - height * cos,
            }
        };
        let text = Text {
            string,
            pen,
            font,
            height,
            angle,
            alignment,
            style,
            foreground,
            background,
        };
        Ok(Feature::text(Point::from(anchor), text, bounds))
    }
}

impl<S: Write> MapFile<S> {
    /// Writes a feature record at the object cursor, returning the record
    /// type written.
    ///
    /// With `compress` set, coordinates are stored as 16-bit offsets from
    /// the feature's coordinate origin. Multi-part records establish their
    /// own origin; single-block records use the origin staged on the object
    /// cursor.
    ///
    /// Validation happens before any byte is written, and a failed write
    /// never leaves a header behind in the object stream.
    pub fn write_feature(&mut self, feature: &Feature, compress: bool) -> Result<GeomType> {
        let base = feature.validate()?;
        let tag = if compress { base.compressed() } else { base };
        match base {
            GeomType::None => self.object.write_u8(tag.to_u8())?,
            GeomType::Symbol => self.write_symbol(feature, tag)?,
            GeomType::FontSymbol => self.write_font_symbol(feature, tag)?,
            GeomType::CustomSymbol => self.write_custom_symbol(feature, tag)?,
            GeomType::Line => self.write_line(feature, tag)?,
            GeomType::Pline => self.write_pline(feature, tag)?,
            GeomType::Multipline => self.write_multipline(feature, tag)?,
            GeomType::Region => self.write_region(feature, tag)?,
            GeomType::Arc => self.write_arc(feature, tag)?,
            GeomType::Rect | GeomType::RoundRect => self.write_rect(feature, tag)?,
            GeomType::Ellipse => self.write_ellipse(feature, tag)?,
            GeomType::Text => self.write_text(feature, tag)?,
            other => return Err(Error::UnknownGeometryTag(other.to_u8())),
        }
        Ok(tag)
    }

    fn write_color(&mut self, color: Color) -> Result<()> {
        self.object.write_u8(color.red)?;
        self.object.write_u8(color.green)?;
        self.object.write_u8(color.blue)
    }

    fn point_of(feature: &Feature) -> Result<Point<f64>> {
        match feature.geometry {
            Some(Geometry::Point(point)) => Ok(point),
            _ => Err(Error::GeometryShapeMismatch(feature.shape.class_name())),
        }
    }

    fn write_symbol(&mut self, feature: &Feature, tag: GeomType) -> Result<()> {
        let Shape::Symbol(symbol) = &feature.shape else {
            return Err(Error::GeometryShapeMismatch(feature.shape.class_name()));
        };
        let coord = self.world_to_int(Self::point_of(feature)?.0)?;
        let index = self.styles.intern_symbol(*symbol)?;
        self.object.write_u8(tag.to_u8())?;
        self.object.write_coord(coord, tag.is_compressed())?;
        self.object.write_u8(index)
    }

    fn write_font_symbol(&mut self, feature: &Feature, tag: GeomType) -> Result<()> {
        let Shape::FontSymbol {
            symbol,
            font,
            style,
            angle,
        } = &feature.shape
        else {
            return Err(Error::GeometryShapeMismatch(feature.shape.class_name()));
        };
        let coord = self.world_to_int(Self::point_of(feature)?.0)?;
        let index = self.styles.intern_font(font.clone())?;
        self.object.write_u8(tag.to_u8())?;
        self.object.write_u8(symbol.shape as u8)?;
        self.object.write_u8(symbol.point_size)?;
        self.object.write_i16(*style as i16)?;
        self.write_color(symbol.color)?;
        self.object.write_bytes(&[0, 0, 0])?;
        self.object.write_i16((angle * 10.) as i16)?;
        self.object.write_coord(coord, tag.is_compressed())?;
        self.object.write_u8(index)
    }

    fn write_custom_symbol(&mut self, feature: &Feature, tag: GeomType) -> Result<()> {
        let Shape::CustomSymbol {
            symbol,
            font,
            style,
        } = &feature.shape
        else {
            return Err(Error::GeometryShapeMismatch(feature.shape.class_name()));
        };
        let coord = self.world_to_int(Self::point_of(feature)?.0)?;
        let symbol_index = self.styles.intern_symbol(*symbol)?;
        let font_index = self.styles.intern_font(font.clone())?;
        self.object.write_u8(tag.to_u8())?;
        self.object.write_u8(0)?;
        self.object.write_u8(style.0)?;
        self.object.write_coord(coord, tag.is_compressed())?;
        self.object.write_u8(symbol_index)?;
        self.object.write_u8(font_index)
    }

    fn pen_of(feature: &Feature) -> Result<PenDef> {
        match &feature.shape {
            Shape::Polyline { pen, .. } => Ok(*pen),
            _ => Err(Error::GeometryShapeMismatch(feature.shape.class_name())),
        }
    }

    fn write_line(&mut self, feature: &Feature, tag: GeomType) -> Result<()> {
        let Some(Geometry::LineString(line)) = &feature.geometry else {
            return Err(Error::GeometryShapeMismatch(feature.shape.class_name()));
        };
        let mut coords = Vec::with_capacity(2);
        for &coord in &line.0 {
            coords.push(self.world_to_int(coord)?);
        }
        let index = self.styles.intern_pen(Self::pen_of(feature)?)?;
        self.object.write_u8(tag.to_u8())?;
        for coord in coords {
            self.object.write_coord(coord, tag.is_compressed())?;
        }
        self.object.write_u8(index)
    }

    fn write_pline(&mut self, feature: &Feature, tag: GeomType) -> Result<()> {
        let (Some(Geometry::LineString(line)), Shape::Polyline { pen, smooth }) =
            (&feature.geometry, &feature.shape)
        else {
            return Err(Error::GeometryShapeMismatch(feature.shape.class_name()));
        };
        let compressed = tag.is_compressed();
        let mut coords = Vec::with_capacity(line.0.len());
        for &coord in &line.0 {
            coords.push(self.world_to_int(coord)?);
        }
        let (min, max) =
            int_mbr(&coords).ok_or(Error::GeometryShapeMismatch(feature.shape.class_name()))?;
        let center = midpoint(min, max);
        let index = self.styles.intern_pen(*pen)?;

        self.coord.start_new_feature();
        let ptr = coord_ptr(self.coord.position())?;
        if compressed {
            self.coord.set_origin(center);
        }
        for &coord in &coords {
            self.coord.write_coord(coord, compressed)?;
        }
        let mut data_size = self.coord.feature_data_size() as u32;
        if *smooth {
            data_size |= SMOOTH_FLAG;
        }

        self.object.write_u8(tag.to_u8())?;
        self.object.write_i32(ptr)?;
        self.object.write_i32(data_size as i32)?;
        if compressed {
            self.object.write_i16(0)?;
            self.object.write_i16(0)?;
        }
        self.object.write_i32(center.x)?;
        self.object.write_i32(center.y)?;
        self.object.set_origin(center);
        self.object.write_coord(min, compressed)?;
        self.object.write_coord(max, compressed)?;
        self.object.write_u8(index)
    }

    fn write_multipline(&mut self, feature: &Feature, tag: GeomType) -> Result<()> {
        let (Some(Geometry::MultiLineString(lines)), Shape::Polyline { pen, .. }) =
            (&feature.geometry, &feature.shape)
        else {
            return Err(Error::GeometryShapeMismatch(feature.shape.class_name()));
        };
        let sections: Vec<&LineString<f64>> = lines.0.iter().collect();
        let index = self.styles.intern_pen(*pen)?;
        self.write_multipart(feature, tag, &sections, index, None)
    }

    fn write_region(&mut self, feature: &Feature, tag: GeomType) -> Result<()> {
        let (Some(Geometry::Polygon(polygon)), Shape::Region { pen, brush }) =
            (&feature.geometry, &feature.shape)
        else {
            return Err(Error::GeometryShapeMismatch(feature.shape.class_name()));
        };
        let mut sections = vec![polygon.exterior()];
        sections.extend(polygon.interiors());
        let pen_index = self.styles.intern_pen(*pen)?;
        let brush_index = self.styles.intern_brush(*brush)?;
        self.write_multipart(feature, tag, &sections, pen_index, Some(brush_index))
    }

    fn write_multipart(
        &mut self,
        feature: &Feature,
        tag: GeomType,
        sections: &[&LineString<f64>],
        pen_index: u8,
        brush_index: Option<u8>,
    ) -> Result<()> {
        let compressed = tag.is_compressed();
        let mismatch = || Error::GeometryShapeMismatch(feature.shape.class_name());
        let section_count = i16::try_from(sections.len()).map_err(|_| mismatch())?;

        let mut int_sections = Vec::with_capacity(sections.len());
        for section in sections {
            let mut coords = Vec::with_capacity(section.0.len());
            for &coord in &section.0 {
                coords.push(self.world_to_int(coord)?);
            }
            int_sections.push(coords);
        }
        let all: Vec<Coord<i32>> = int_sections.iter().flatten().copied().collect();
        let (min, max) = int_mbr(&all).ok_or_else(mismatch)?;
        let center = midpoint(min, max);

        // Section headers and vertices go to the coordinate stream first so
        // the header can carry the real data size.
        self.coord.start_new_feature();
        let ptr = coord_ptr(self.coord.position())?;
        if compressed {
            self.coord.set_origin(center);
        }
        let header_size = if compressed { 16 } else { 24 };
        let vertex_size = if compressed { 4 } else { 8 };
        let mut vertex_offset = 0usize;
        for coords in &int_sections {
            let vertex_count = i16::try_from(coords.len())
                .map_err(|_| Error::CoordinateOverflow(coords.len() as f64))?;
            self.coord.write_i16(vertex_count)?;
            self.coord.write_i16(0)?; // holes are never written
            let (section_min, section_max) = int_mbr(coords).unwrap_or((center, center));
            self.coord.write_coord(section_min, compressed)?;
            self.coord.write_coord(section_max, compressed)?;
            let data_offset = sections.len() * header_size + vertex_offset * vertex_size;
            self.coord.write_i32(data_offset as i32)?;
            vertex_offset += coords.len();
        }
        for coords in &int_sections {
            for &coord in coords {
                self.coord.write_coord(coord, compressed)?;
            }
        }
        let data_size = self.coord.feature_data_size() as u32;

        self.object.write_u8(tag.to_u8())?;
        self.object.write_i32(ptr)?;
        self.object.write_i32(data_size as i32)?;
        self.object.write_i16(section_count)?;
        if compressed {
            self.object.write_i16(0)?;
            self.object.write_i16(0)?;
        }
        self.object.write_i32(center.x)?;
        self.object.write_i32(center.y)?;
        self.object.set_origin(center);
        self.object.write_coord(min, compressed)?;
        self.object.write_coord(max, compressed)?;
        self.object.write_u8(pen_index)?;
        if let Some(brush_index) = brush_index {
            self.object.write_u8(brush_index)?;
        }
        Ok(())
    }

    fn write_arc(&mut self, feature: &Feature, tag: GeomType) -> Result<()> {
        let Shape::Arc {
            pen,
            center,
            radii,
            start_angle,
            end_angle,
        } = &feature.shape
        else {
            return Err(Error::GeometryShapeMismatch(feature.shape.class_name()));
        };
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or(Error::GeometryShapeMismatch(feature.shape.class_name()))?;
        let compressed = tag.is_compressed();
        let envelope = Bounds::of(geometry);
        let ellipse_min = self.world_to_int(Coord {
            x: center.x - radii.x,
            y: center.y - radii.y,
        })?;
        let ellipse_max = self.world_to_int(Coord {
            x: center.x + radii.x,
            y: center.y + radii.y,
        })?;
        let arc_min = self.world_to_int(envelope.min)?;
        let arc_max = self.world_to_int(envelope.max)?;
        let index = self.styles.intern_pen(*pen)?;

        self.object.write_u8(tag.to_u8())?;
        // End angle first, then start, both mirrored into the storage frame.
        self.object
            .write_i16((mirror_angle(*end_angle) * 10.) as i16)?;
        self.object
            .write_i16((mirror_angle(*start_angle) * 10.) as i16)?;
        self.object.write_coord(ellipse_min, compressed)?;
        self.object.write_coord(ellipse_max, compressed)?;
        self.object.write_coord(arc_min, compressed)?;
        self.object.write_coord(arc_max, compressed)?;
        self.object.write_u8(index)
    }

    fn write_rect(&mut self, feature: &Feature, tag: GeomType) -> Result<()> {
        let Shape::Rect {
            pen,
            brush,
            corner_radii,
        } = &feature.shape
        else {
            return Err(Error::GeometryShapeMismatch(feature.shape.class_name()));
        };
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or(Error::GeometryShapeMismatch(feature.shape.class_name()))?;
        let compressed = tag.is_compressed();
        let envelope = Bounds::of(geometry);
        let min = self.world_to_int(envelope.min)?;
        let max = self.world_to_int(envelope.max)?;
        let diameters = if tag.uncompressed() == GeomType::RoundRect {
            let radii = corner_radii.unwrap_or(Coord { x: 0., y: 0. });
            Some(self.world_to_int_distance(Coord {
                x: radii.x * 2.,
                y: radii.y * 2.,
            })?)
        } else {
            None
        };
        let pen_index = self.styles.intern_pen(*pen)?;
        let brush_index = self.styles.intern_brush(*brush)?;

        self.object.write_u8(tag.to_u8())?;
        if let Some(diameters) = diameters {
            if compressed {
                let x = i16::try_from(diameters.x)
                    .map_err(|_| Error::CoordinateOverflow(f64::from(diameters.x)))?;
                let y = i16::try_from(diameters.y)
                    .map_err(|_| Error::CoordinateOverflow(f64::from(diameters.y)))?;
                self.object.write_i16(x)?;
                self.object.write_i16(y)?;
            } else {
                self.object.write_i32(diameters.x)?;
                self.object.write_i32(diameters.y)?;
            }
        }
        self.object.write_coord(min, compressed)?;
        self.object.write_coord(max, compressed)?;
        self.object.write_u8(pen_index)?;
        self.object.write_u8(brush_index)
    }

    fn write_ellipse(&mut self, feature: &Feature, tag: GeomType) -> Result<()> {
        let Shape::Ellipse { pen, brush, .. } = &feature.shape else {
            return Err(Error::GeometryShapeMismatch(feature.shape.class_name()));
        };
        let geometry = feature
            .geometry
            .as_ref()
            .ok_or(Error::GeometryShapeMismatch(feature.shape.class_name()))?;
        let compressed = tag.is_compressed();
        let envelope = Bounds::of(geometry);
        let min = self.world_to_int(envelope.min)?;
        let max = self.world_to_int(envelope.max)?;
        let pen_index = self.styles.intern_pen(*pen)?;
        let brush_index = self.styles.intern_brush(*brush)?;

        self.object.write_u8(tag.to_u8())?;
        self.object.write_coord(min, compressed)?;
        self.object.write_coord(max, compressed)?;
        self.object.write_u8(pen_index)?;
        self.object.write_u8(brush_index)
    }

    fn write_text(&mut self, feature: &Feature, tag: GeomType) -> Result<()> {
        let Shape::Text(text) = &feature.shape else {
            return Err(Error::GeometryShapeMismatch(feature.shape.class_name()));
        };
        let compressed = tag.is_compressed();
        let min = self.world_to_int(feature.bounds.min)?;
        let max = self.world_to_int(feature.bounds.max)?;
        let height = self.transforms.y.inverse_distance(text.height)?;
        let font_index = self.styles.intern_font(text.font.clone())?;
        let pen_index = self.styles.intern_pen(text.pen)?;

        let bytes = text.string.as_bytes();
        let length = bytes.len().min(i16::MAX as usize);
        if length < bytes.len() {
            warn!("text string truncated to {} bytes", length);
        }
        self.coord.start_new_feature();
        let ptr = if length > 0 {
            let ptr = coord_ptr(self.coord.position())?;
            self.coord.write_bytes(&bytes[..length])?;
            ptr
        } else {
            0
        };

        self.object.write_u8(tag.to_u8())?;
        self.object.write_i32(ptr)?;
        self.object.write_i16(length as i16)?;
        self.object.write_i16(text.alignment as i16)?;
        self.object.write_i16((text.angle * 10.) as i16)?;
        self.object.write_i16(text.style as i16)?;
        self.write_color(text.foreground)?;
        self.write_color(text.background)?;
        // Label line endpoint, defaulted to the center of the box.
        self.object.write_coord(midpoint(min, max), compressed)?;
        if compressed {
            let height =
                i16::try_from(height).map_err(|_| Error::CoordinateOverflow(text.height))?;
            self.object.write_i16(height)?;
        } else {
            self.object.write_i32(height)?;
        }
        self.object.write_u8(font_index)?;
        self.object.write_coord(min, compressed)?;
        self.object.write_coord(max, compressed)?;
        self.object.write_u8(pen_index)
    }
}
