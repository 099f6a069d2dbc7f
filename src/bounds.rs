use geo_types::{Coord, Geometry, LineString, Polygon};

/// Minimum and maximum bounds in two dimensions.
///
/// Every feature carries one of these as its minimum bounding rectangle. The
/// stored rectangle is always normalized, with `min` no greater than `max` on
/// both axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// The minimum values.
    pub min: Coord<f64>,

    /// The maximum values.
    pub max: Coord<f64>,
}

impl Bounds {
    /// Creates a new bounds, swapping values as needed so that mins are
    /// really smaller than maxs.
    ///
    /// # Examples
    ///
    /// ```
    /// use tab::Bounds;
    /// let bounds = Bounds::new(4., 2., 1., 3.);
    /// assert_eq!(1., bounds.min.x);
    /// assert_eq!(4., bounds.max.x);
    /// ```
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Bounds {
        Bounds {
            min: Coord {
                x: minx.min(maxx),
                y: miny.min(maxy),
            },
            max: Coord {
                x: minx.max(maxx),
                y: miny.max(maxy),
            },
        }
    }

    /// Computes the bounds of a geometry.
    ///
    /// # Examples
    ///
    /// ```
    /// use geo_types::{Geometry, Point};
    /// use tab::Bounds;
    /// let bounds = Bounds::of(&Geometry::Point(Point::new(1., 2.)));
    /// assert_eq!(Bounds::new(1., 2., 1., 2.), bounds);
    /// ```
    pub fn of(geometry: &Geometry<f64>) -> Bounds {
        let mut bounds = Bounds::default();
        bounds.add(geometry);
        bounds
    }

    /// Grows the bounds to encompass this coordinate.
    ///
    /// # Examples
    ///
    /// ```
    /// use geo_types::Coord;
    /// use tab::Bounds;
    /// let mut bounds = Bounds::default();
    /// bounds.grow(Coord { x: 1., y: 2. });
    /// assert_eq!(1., bounds.min.x);
    /// ```
    pub fn grow(&mut self, coord: Coord<f64>) {
        if coord.x < self.min.x {
            self.min.x = coord.x;
        }
        if coord.y < self.min.y {
            self.min.y = coord.y;
        }
        if coord.x > self.max.x {
            self.max.x = coord.x;
        }
        if coord.y > self.max.y {
            self.max.y = coord.y;
        }
    }

    /// Returns the center of these bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use geo_types::Coord;
    /// use tab::Bounds;
    /// let bounds = Bounds::new(0., 0., 2., 4.);
    /// assert_eq!(Coord { x: 1., y: 2. }, bounds.center());
    /// ```
    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.min.x + self.max.x) / 2.,
            y: (self.min.y + self.max.y) / 2.,
        }
    }

    fn add(&mut self, geometry: &Geometry<f64>) {
        match geometry {
            Geometry::Point(point) => self.grow(point.0),
            Geometry::Line(line) => {
                self.grow(line.start);
                self.grow(line.end);
            }
            Geometry::LineString(line_string) => self.add_line_string(line_string),
            Geometry::Polygon(polygon) => self.add_polygon(polygon),
            Geometry::MultiPoint(multi_point) => {
                for point in &multi_point.0 {
                    self.grow(point.0);
                }
            }
            Geometry::MultiLineString(multi_line_string) => {
                for line_string in &multi_line_string.0 {
                    self.add_line_string(line_string);
                }
            }
            Geometry::MultiPolygon(multi_polygon) => {
                for polygon in &multi_polygon.0 {
                    self.add_polygon(polygon);
                }
            }
            Geometry::GeometryCollection(collection) => {
                for geometry in &collection.0 {
                    self.add(geometry);
                }
            }
            Geometry::Rect(rect) => {
                self.grow(rect.min());
                self.grow(rect.max());
            }
            Geometry::Triangle(triangle) => {
                for coord in triangle.to_array() {
                    self.grow(coord);
                }
            }
        }
    }

    fn add_line_string(&mut self, line_string: &LineString<f64>) {
        for &coord in &line_string.0 {
            self.grow(coord);
        }
    }

    fn add_polygon(&mut self, polygon: &Polygon<f64>) {
        self.add_line_string(polygon.exterior());
        for interior in polygon.interiors() {
            self.add_line_string(interior);
        }
    }
}

impl Default for Bounds {
    fn default() -> Bounds {
        Bounds {
            min: Coord {
                x: f64::INFINITY,
                y: f64::INFINITY,
            },
            max: Coord {
                x: f64::NEG_INFINITY,
                y: f64::NEG_INFINITY,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Geometry, LineString, Polygon};

    #[test]
    fn grow() {
        let mut bounds = Bounds::default();
        bounds.grow(Coord { x: 1., y: 2. });
        assert_eq!(1., bounds.min.x);
        assert_eq!(1., bounds.max.x);
        assert_eq!(2., bounds.min.y);
        assert_eq!(2., bounds.max.y);
        bounds.grow(Coord { x: -1., y: 3. });
        assert_eq!(-1., bounds.min.x);
        assert_eq!(1., bounds.max.x);
        assert_eq!(2., bounds.min.y);
        assert_eq!(3., bounds.max.y);
    }

    #[test]
    fn new_normalizes() {
        let bounds = Bounds::new(2., 3., 0., 1.);
        assert_eq!(Bounds::new(0., 1., 2., 3.), bounds);
    }

    #[test]
    fn of_polygon_includes_interiors() {
        let polygon = Polygon::new(
            LineString::from(vec![(0., 0.), (4., 0.), (4., 4.), (0., 4.), (0., 0.)]),
            vec![LineString::from(vec![
                (1., 1.),
                (2., 1.),
                (2., 5.),
                (1., 1.),
            ])],
        );
        let bounds = Bounds::of(&Geometry::Polygon(polygon));
        assert_eq!(Bounds::new(0., 0., 4., 5.), bounds);
    }
}
