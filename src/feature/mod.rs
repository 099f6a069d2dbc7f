//! Map features and their shape classes.
//!
//! A [Feature] pairs a geometry with the drawing style of one map object.
//! The shape class decides which on-disk record the feature becomes: a plain
//! polygon is a region, but the same polygon flagged as a rectangle or an
//! ellipse is stored as its bounding rectangle only and materialized back
//! into vertices on read.
//!
//! ```
//! use geo_types::Point;
//! use tab::{Feature, SymbolDef};
//!
//! let feature = Feature::symbol(Point::new(1., 2.), SymbolDef::default());
//! assert_eq!(1., feature.bounds.min.x);
//! ```

mod text;

pub use self::text::{FontStyle, Text, TextJustify, TextLineType, TextSpacing};

use crate::{
    Bounds, BrushDef, Error, FontDef, GeomType, PenDef, Result, SymbolDef,
    rasterize::{close_ring, generate_arc},
};
use geo_types::{Coord, Geometry, LineString, MultiLineString, Point, Polygon};

/// Display modifiers for a custom point symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CustomStyle(
    /// The raw modifier bits.
    pub u8,
);

impl CustomStyle {
    /// Returns true if the symbol's background is drawn.
    pub fn shows_background(&self) -> bool {
        self.0 & 0x01 != 0
    }

    /// Returns true if the symbol color replaces the glyph's own colors.
    pub fn applies_color(&self) -> bool {
        self.0 & 0x02 != 0
    }
}

/// A feature's shape class and drawing style.
///
/// The variant discriminates the on-disk record; the per-variant payload
/// carries the state that does not live in the geometry itself.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// No geometry.
    None,

    /// A point drawn with a pooled symbol.
    Symbol(SymbolDef),

    /// A point drawn as a character from a font.
    FontSymbol {
        /// Shape number, size, and color.
        symbol: SymbolDef,
        /// The font the character comes from.
        font: FontDef,
        /// Raw font style bits, see [FontStyle].
        style: u16,
        /// Rotation angle in degrees, counterclockwise.
        angle: f64,
    },

    /// A point drawn with a custom bitmap symbol.
    CustomSymbol {
        /// Shape number, size, and color.
        symbol: SymbolDef,
        /// The font that holds the custom glyph.
        font: FontDef,
        /// Display modifier bits.
        style: CustomStyle,
    },

    /// One polyline or a collection of polylines.
    Polyline {
        /// The pen the line is drawn with.
        pen: PenDef,
        /// True if the line is smoothed into a curve.
        smooth: bool,
    },

    /// A polygon whose first ring is the outer boundary and whose remaining
    /// rings are holes.
    Region {
        /// Outline pen.
        pen: PenDef,
        /// Interior brush.
        brush: BrushDef,
    },

    /// An axis-aligned rectangle, optionally with rounded corners.
    Rect {
        /// Outline pen.
        pen: PenDef,
        /// Interior brush.
        brush: BrushDef,
        /// Corner rounding radii, if the corners are rounded.
        corner_radii: Option<Coord<f64>>,
    },

    /// An axis-aligned ellipse.
    Ellipse {
        /// Outline pen.
        pen: PenDef,
        /// Interior brush.
        brush: BrushDef,
        /// The ellipse center.
        center: Coord<f64>,
        /// The x and y radii.
        radii: Coord<f64>,
    },

    /// An elliptical arc.
    Arc {
        /// The pen the arc is drawn with.
        pen: PenDef,
        /// Center of the defining ellipse.
        center: Coord<f64>,
        /// Radii of the defining ellipse.
        radii: Coord<f64>,
        /// Start angle in degrees, counterclockwise from the x axis.
        start_angle: f64,
        /// End angle in degrees.
        end_angle: f64,
    },

    /// A text label anchored at a point.
    Text(Text),
}

impl Shape {
    /// Returns the name of this shape's feature class.
    ///
    /// # Examples
    ///
    /// ```
    /// use tab::Shape;
    /// assert_eq!("none", Shape::None.class_name());
    /// ```
    pub fn class_name(&self) -> &'static str {
        match self {
            Shape::None => "none",
            Shape::Symbol(_) => "point",
            Shape::FontSymbol { .. } => "font point",
            Shape::CustomSymbol { .. } => "custom point",
            Shape::Polyline { .. } => "polyline",
            Shape::Region { .. } => "region",
            Shape::Rect { .. } => "rectangle",
            Shape::Ellipse { .. } => "ellipse",
            Shape::Arc { .. } => "arc",
            Shape::Text(_) => "text",
        }
    }
}

/// One row of a dataset: a geometry, its bounding rectangle, and a shape.
///
/// The bounding rectangle is the bounds of the materialized geometry, so for
/// rasterized shapes (rectangles, ellipses, arcs) it is exact.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    /// The feature's geometry, if it has one.
    pub geometry: Option<Geometry<f64>>,

    /// The feature's minimum bounding rectangle, in world coordinates.
    pub bounds: Bounds,

    /// The feature's shape class and drawing style.
    pub shape: Shape,
}

impl Feature {
    /// Creates a point feature drawn with a pooled symbol.
    ///
    /// # Examples
    ///
    /// ```
    /// use geo_types::Point;
    /// use tab::{Feature, SymbolDef};
    /// let feature = Feature::symbol(Point::new(10., 20.), SymbolDef::default());
    /// ```
    pub fn symbol(point: Point<f64>, symbol: SymbolDef) -> Feature {
        Feature::from_geometry(Geometry::Point(point), Shape::Symbol(symbol))
    }

    /// Creates a point feature drawn as a font character.
    pub fn font_symbol(
        point: Point<f64>,
        symbol: SymbolDef,
        font: FontDef,
        style: u16,
        angle: f64,
    ) -> Feature {
        Feature::from_geometry(
            Geometry::Point(point),
            Shape::FontSymbol {
                symbol,
                font,
                style,
                angle,
            },
        )
    }

    /// Creates a point feature drawn with a custom bitmap symbol.
    pub fn custom_symbol(
        point: Point<f64>,
        symbol: SymbolDef,
        font: FontDef,
        style: CustomStyle,
    ) -> Feature {
        Feature::from_geometry(
            Geometry::Point(point),
            Shape::CustomSymbol {
                symbol,
                font,
                style,
            },
        )
    }

    /// Creates a polyline feature.
    ///
    /// Two-vertex polylines are stored as lines, anything longer as a
    /// multi-vertex polyline record.
    pub fn polyline(line: LineString<f64>, pen: PenDef, smooth: bool) -> Feature {
        Feature::from_geometry(Geometry::LineString(line), Shape::Polyline { pen, smooth })
    }

    /// Creates a feature holding several polylines.
    pub fn multipolyline(lines: MultiLineString<f64>, pen: PenDef) -> Feature {
        Feature::from_geometry(
            Geometry::MultiLineString(lines),
            Shape::Polyline { pen, smooth: false },
        )
    }

    /// Creates a region feature from a polygon.
    ///
    /// The polygon's exterior is the outer boundary, its interiors are
    /// holes.
    pub fn region(polygon: Polygon<f64>, pen: PenDef, brush: BrushDef) -> Feature {
        Feature::from_geometry(Geometry::Polygon(polygon), Shape::Region { pen, brush })
    }

    /// Creates a rectangle feature covering `bounds`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tab::{Bounds, BrushDef, Feature, PenDef};
    /// let feature = Feature::rectangle(
    ///     Bounds::new(0., 0., 2., 1.),
    ///     PenDef::default(),
    ///     BrushDef::default(),
    /// );
    /// assert_eq!(feature.bounds, Bounds::new(0., 0., 2., 1.));
    /// ```
    pub fn rectangle(bounds: Bounds, pen: PenDef, brush: BrushDef) -> Feature {
        let ring = vec![
            bounds.min,
            Coord {
                x: bounds.max.x,
                y: bounds.min.y,
            },
            bounds.max,
            Coord {
                x: bounds.min.x,
                y: bounds.max.y,
            },
            bounds.min,
        ];
        let polygon = Polygon::new(LineString::new(ring), Vec::new());
        Feature {
            geometry: Some(Geometry::Polygon(polygon)),
            bounds,
            shape: Shape::Rect {
                pen,
                brush,
                corner_radii: None,
            },
        }
    }

    /// Creates a rectangle feature with rounded corners.
    ///
    /// Each corner is a quarter ellipse with the given radii; radii larger
    /// than half the rectangle are clamped when the outline is materialized
    /// but kept as given on the feature.
    pub fn rounded_rectangle(
        bounds: Bounds,
        corner_radii: Coord<f64>,
        pen: PenDef,
        brush: BrushDef,
    ) -> Feature {
        let rx = corner_radii.x.min((bounds.max.x - bounds.min.x) / 2.);
        let ry = corner_radii.y.min((bounds.max.y - bounds.min.y) / 2.);
        let radii = Coord { x: rx, y: ry };
        let mut ring = Vec::new();
        use std::f64::consts::PI;
        // Lower-left corner first, proceeding counterclockwise.
        generate_arc(
            &mut ring,
            45,
            Coord {
                x: bounds.min.x + rx,
                y: bounds.min.y + ry,
            },
            radii,
            PI,
            3. * PI / 2.,
        );
        generate_arc(
            &mut ring,
            45,
            Coord {
                x: bounds.max.x - rx,
                y: bounds.min.y + ry,
            },
            radii,
            3. * PI / 2.,
            2. * PI,
        );
        generate_arc(
            &mut ring,
            45,
            Coord {
                x: bounds.max.x - rx,
                y: bounds.max.y - ry,
            },
            radii,
            0.,
            PI / 2.,
        );
        generate_arc(
            &mut ring,
            45,
            Coord {
                x: bounds.min.x + rx,
                y: bounds.max.y - ry,
            },
            radii,
            PI / 2.,
            PI,
        );
        close_ring(&mut ring);
        let polygon = Polygon::new(LineString::new(ring), Vec::new());
        Feature {
            geometry: Some(Geometry::Polygon(polygon)),
            bounds,
            shape: Shape::Rect {
                pen,
                brush,
                corner_radii: Some(corner_radii),
            },
        }
    }

    /// Creates an ellipse feature.
    ///
    /// The boundary is materialized with two-degree segments.
    pub fn ellipse(
        center: Coord<f64>,
        radii: Coord<f64>,
        pen: PenDef,
        brush: BrushDef,
    ) -> Feature {
        let mut ring = Vec::new();
        generate_arc(&mut ring, 180, center, radii, 0., 2. * std::f64::consts::PI);
        close_ring(&mut ring);
        let polygon = Polygon::new(LineString::new(ring), Vec::new());
        Feature {
            geometry: Some(Geometry::Polygon(polygon)),
            bounds: Bounds::new(
                center.x - radii.x,
                center.y - radii.y,
                center.x + radii.x,
                center.y + radii.y,
            ),
            shape: Shape::Ellipse {
                pen,
                brush,
                center,
                radii,
            },
        }
    }

    /// Creates an arc feature.
    ///
    /// Angles are in degrees, counterclockwise from the x axis; an end angle
    /// smaller than the start angle sweeps through a full turn. The arc is
    /// materialized with roughly two-degree segments.
    ///
    /// # Examples
    ///
    /// ```
    /// use geo_types::{Coord, Geometry};
    /// use tab::{Feature, PenDef};
    /// let feature = Feature::arc(
    ///     Coord { x: 0., y: 0. },
    ///     Coord { x: 10., y: 5. },
    ///     30.,
    ///     60.,
    ///     PenDef::default(),
    /// );
    /// match feature.geometry {
    ///     Some(Geometry::LineString(ref line)) => assert_eq!(16, line.0.len()),
    ///     _ => panic!("arcs materialize into polylines"),
    /// }
    /// ```
    pub fn arc(
        center: Coord<f64>,
        radii: Coord<f64>,
        start_angle: f64,
        end_angle: f64,
        pen: PenDef,
    ) -> Feature {
        let count = crate::rasterize::arc_vertex_count(start_angle, end_angle);
        let mut vertices = Vec::new();
        generate_arc(
            &mut vertices,
            count,
            center,
            radii,
            start_angle.to_radians(),
            end_angle.to_radians(),
        );
        Feature::from_geometry(
            Geometry::LineString(LineString::new(vertices)),
            Shape::Arc {
                pen,
                center,
                radii,
                start_angle,
                end_angle,
            },
        )
    }

    /// Creates a text feature.
    ///
    /// The point is the lower-left corner of the unrotated text box; the
    /// bounds are the bounding rectangle of the box after rotation.
    pub fn text(anchor: Point<f64>, text: Text, bounds: Bounds) -> Feature {
        Feature {
            geometry: Some(Geometry::Point(anchor)),
            bounds,
            shape: Shape::Text(text),
        }
    }

    fn from_geometry(geometry: Geometry<f64>, shape: Shape) -> Feature {
        let bounds = Bounds::of(&geometry);
        Feature {
            geometry: Some(geometry),
            bounds,
            shape,
        }
    }

    /// Checks this feature's geometry against its shape class and returns
    /// the record type it will be stored as.
    ///
    /// Always returns the uncompressed flavor; compression is chosen when
    /// the feature is written. A geometry that does not fit the shape class
    /// is a [Error::GeometryShapeMismatch].
    ///
    /// # Examples
    ///
    /// ```
    /// use geo_types::Point;
    /// use tab::{Feature, GeomType, SymbolDef};
    /// let feature = Feature::symbol(Point::new(0., 0.), SymbolDef::default());
    /// assert_eq!(GeomType::Symbol, feature.validate().unwrap());
    /// ```
    pub fn validate(&self) -> Result<GeomType> {
        let mismatch = || Error::GeometryShapeMismatch(self.shape.class_name());
        match &self.shape {
            Shape::None => Ok(GeomType::None),
            Shape::Symbol(_) => match self.geometry {
                Some(Geometry::Point(_)) => Ok(GeomType::Symbol),
                _ => Err(mismatch()),
            },
            Shape::FontSymbol { .. } => match self.geometry {
                Some(Geometry::Point(_)) => Ok(GeomType::FontSymbol),
                _ => Err(mismatch()),
            },
            Shape::CustomSymbol { .. } => match self.geometry {
                Some(Geometry::Point(_)) => Ok(GeomType::CustomSymbol),
                _ => Err(mismatch()),
            },
            Shape::Polyline { .. } => match &self.geometry {
                Some(Geometry::LineString(line)) if line.0.len() == 2 => Ok(GeomType::Line),
                Some(Geometry::LineString(line)) if line.0.len() > 2 => Ok(GeomType::Pline),
                Some(Geometry::MultiLineString(lines)) if !lines.0.is_empty() => {
                    Ok(GeomType::Multipline)
                }
                _ => Err(mismatch()),
            },
            Shape::Region { .. } => match self.geometry {
                Some(Geometry::Polygon(_)) => Ok(GeomType::Region),
                _ => Err(mismatch()),
            },
            Shape::Rect { corner_radii, .. } => match self.geometry {
                Some(Geometry::Polygon(_)) => match corner_radii {
                    Some(radii) if radii.x != 0. && radii.y != 0. => Ok(GeomType::RoundRect),
                    _ => Ok(GeomType::Rect),
                },
                _ => Err(mismatch()),
            },
            Shape::Ellipse { .. } => match self.geometry {
                Some(Geometry::Polygon(_)) => Ok(GeomType::Ellipse),
                _ => Err(mismatch()),
            },
            Shape::Arc { .. } => match self.geometry {
                Some(Geometry::LineString(_)) => Ok(GeomType::Arc),
                _ => Err(mismatch()),
            },
            Shape::Text(_) => match self.geometry {
                Some(Geometry::Point(_)) => Ok(GeomType::Text),
                _ => Err(mismatch()),
            },
        }
    }
}

impl Default for Feature {
    fn default() -> Feature {
        Feature {
            geometry: None,
            bounds: Bounds::default(),
            shape: Shape::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::line_string;

    #[test]
    fn validate_polylines_by_vertex_count() {
        let pen = PenDef::default();
        let two = Feature::polyline(line_string![(x: 0., y: 0.), (x: 1., y: 1.)], pen, false);
        assert_eq!(GeomType::Line, two.validate().unwrap());
        let three = Feature::polyline(
            line_string![(x: 0., y: 0.), (x: 1., y: 1.), (x: 2., y: 0.)],
            pen,
            false,
        );
        assert_eq!(GeomType::Pline, three.validate().unwrap());
        let one = Feature::polyline(line_string![(x: 0., y: 0.)], pen, false);
        assert!(one.validate().is_err());
    }

    #[test]
    fn validate_rejects_mismatches() {
        let mut feature = Feature::symbol(Point::new(0., 0.), SymbolDef::default());
        feature.geometry = Some(Geometry::LineString(line_string![
            (x: 0., y: 0.),
            (x: 1., y: 1.)
        ]));
        assert!(matches!(
            feature.validate(),
            Err(Error::GeometryShapeMismatch("point"))
        ));
    }

    #[test]
    fn zero_radii_round_rect_is_a_plain_rect() {
        let feature = Feature::rounded_rectangle(
            Bounds::new(0., 0., 1., 1.),
            Coord { x: 0., y: 0. },
            PenDef::default(),
            BrushDef::default(),
        );
        assert_eq!(GeomType::Rect, feature.validate().unwrap());
    }

    #[test]
    fn rectangle_ring_is_closed() {
        let feature = Feature::rectangle(
            Bounds::new(0., 0., 2., 1.),
            PenDef::default(),
            BrushDef::default(),
        );
        match feature.geometry {
            Some(Geometry::Polygon(ref polygon)) => {
                let ring = &polygon.exterior().0;
                assert_eq!(5, ring.len());
                assert_eq!(ring[0], ring[4]);
            }
            _ => panic!("rectangles materialize into polygons"),
        }
    }

    #[test]
    fn ellipse_bounds() {
        let feature = Feature::ellipse(
            Coord { x: 1., y: 2. },
            Coord { x: 3., y: 4. },
            PenDef::default(),
            BrushDef::default(),
        );
        assert_eq!(Bounds::new(-2., -2., 4., 6.), feature.bounds);
        assert_eq!(GeomType::Ellipse, feature.validate().unwrap());
    }

    #[test]
    fn rounded_corners_clamp_to_the_rectangle() {
        let feature = Feature::rounded_rectangle(
            Bounds::new(0., 0., 2., 2.),
            Coord { x: 10., y: 10. },
            PenDef::default(),
            BrushDef::default(),
        );
        assert_eq!(Bounds::of(feature.geometry.as_ref().unwrap()), feature.bounds);
        match feature.shape {
            Shape::Rect { corner_radii, .. } => {
                assert_eq!(Some(Coord { x: 10., y: 10. }), corner_radii)
            }
            _ => panic!("rounded rectangles keep their shape class"),
        }
    }
}
