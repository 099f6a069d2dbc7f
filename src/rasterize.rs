//! Materializes parameter-only shapes into vertex sequences.
//!
//! Ellipses, arcs, and rounded rectangle corners are stored on disk as a
//! bounding rectangle plus angles. The in-memory geometry carries explicit
//! vertices, so reading one of those shapes samples its boundary here.

use geo_types::Coord;
use std::f64::consts::PI;

/// Appends `count` vertices sampling an elliptical arc.
///
/// The arc runs from `start` to `end`, in radians, inclusive at both ends.
/// When `end` is less than `start` the sweep wraps through a full turn.
///
/// # Examples
///
/// ```
/// use geo_types::Coord;
/// use tab::rasterize::generate_arc;
///
/// let mut vertices = Vec::new();
/// generate_arc(
///     &mut vertices,
///     3,
///     Coord { x: 0., y: 0. },
///     Coord { x: 1., y: 1. },
///     0.,
///     std::f64::consts::PI,
/// );
/// assert_eq!(3, vertices.len());
/// assert_eq!(1., vertices[0].x);
/// ```
pub fn generate_arc(
    vertices: &mut Vec<Coord<f64>>,
    count: usize,
    center: Coord<f64>,
    radii: Coord<f64>,
    start: f64,
    end: f64,
) {
    let end = if end < start { end + 2. * PI } else { end };
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.
    };
    for i in 0..count {
        let angle = start + step * i as f64;
        vertices.push(Coord {
            x: center.x + radii.x * angle.cos(),
            y: center.y + radii.y * angle.sin(),
        });
    }
}

/// Closes a ring by repeating its first vertex at the end, if needed.
///
/// # Examples
///
/// ```
/// use geo_types::Coord;
/// use tab::rasterize::close_ring;
///
/// let mut ring = vec![Coord { x: 0., y: 0. }, Coord { x: 1., y: 0. }];
/// close_ring(&mut ring);
/// assert_eq!(3, ring.len());
/// close_ring(&mut ring);
/// assert_eq!(3, ring.len());
/// ```
pub fn close_ring(vertices: &mut Vec<Coord<f64>>) {
    if let Some(&first) = vertices.first()
        && vertices.last() != Some(&first)
    {
        vertices.push(first);
    }
}

/// Returns the number of vertices used to materialize an arc.
///
/// Arcs are sampled at one vertex per two degrees of sweep, with at least two
/// vertices. Angles are in degrees; a backwards sweep wraps through a full
/// turn.
///
/// # Examples
///
/// ```
/// use tab::rasterize::arc_vertex_count;
/// assert_eq!(16, arc_vertex_count(30., 60.));
/// assert_eq!(2, arc_vertex_count(0., 1.));
/// ```
pub fn arc_vertex_count(start: f64, end: f64) -> usize {
    let end = if end < start { end + 360. } else { end };
    (((end - start).abs() / 2.).ceil() as usize + 1).max(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_ellipse() {
        let mut vertices = Vec::new();
        generate_arc(
            &mut vertices,
            180,
            Coord { x: 0., y: 0. },
            Coord { x: 2., y: 1. },
            0.,
            2. * PI,
        );
        close_ring(&mut vertices);
        assert_eq!(181, vertices.len());
        assert_eq!(vertices[0], vertices[180]);
    }

    #[test]
    fn quarter_arc_endpoints() {
        let mut vertices = Vec::new();
        generate_arc(
            &mut vertices,
            46,
            Coord { x: 10., y: 20. },
            Coord { x: 3., y: 4. },
            0.,
            PI / 2.,
        );
        assert_eq!(46, vertices.len());
        let first = vertices[0];
        let last = vertices[45];
        assert!((first.x - 13.).abs() < 1e-9);
        assert!((first.y - 20.).abs() < 1e-9);
        assert!((last.x - 10.).abs() < 1e-9);
        assert!((last.y - 24.).abs() < 1e-9);
    }

    #[test]
    fn backwards_sweep_wraps() {
        let mut vertices = Vec::new();
        generate_arc(
            &mut vertices,
            2,
            Coord { x: 0., y: 0. },
            Coord { x: 1., y: 1. },
            3. * PI / 2.,
            PI / 2.,
        );
        assert!((vertices[0].y + 1.).abs() < 1e-9);
        assert!((vertices[1].y - 1.).abs() < 1e-9);
    }

    #[test]
    fn vertex_counts() {
        assert_eq!(2, arc_vertex_count(0., 0.));
        assert_eq!(16, arc_vertex_count(30., 60.));
        assert_eq!(181, arc_vertex_count(0., 360.));
        // A backwards sweep covers the complement of the direct span.
        assert_eq!(136, arc_vertex_count(90., 0.));
    }
}
