use crate::{Error, Result};

/// A scale and an offset that transforms one axis between world and storage
/// coordinates.
///
/// The map file stores every coordinate as a signed 32-bit integer. The
/// header's affine turns those integers back into world coordinates, and the
/// same affine is shared by every feature in the file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// The scale.
    pub scale: f64,
    /// The offset.
    pub offset: f64,
}

impl Transform {
    /// Applies this transform to a storage integer, returning a world
    /// coordinate.
    ///
    /// # Examples
    ///
    /// ```
    /// use tab::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(3., transform.direct(1));
    /// ```
    pub fn direct(&self, n: i32) -> f64 {
        self.scale * f64::from(n) + self.offset
    }

    /// Applies the inverse transform, rounding the result to the nearest
    /// storage integer.
    ///
    /// Returns [Error::CoordinateOverflow] when the world coordinate does not
    /// map into the 32-bit integer range.
    ///
    /// # Examples
    ///
    /// ```
    /// use tab::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(1, transform.inverse(2.9).unwrap());
    /// assert!(transform.inverse(f64::MAX).is_err());
    /// ```
    pub fn inverse(&self, n: f64) -> Result<i32> {
        let value = ((n - self.offset) / self.scale).round();
        if value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
            Ok(value as i32)
        } else {
            Err(Error::CoordinateOverflow(n))
        }
    }

    /// Applies only the scale to a storage integer, for distances.
    ///
    /// Distances are not anchored anywhere, so the offset never applies.
    ///
    /// # Examples
    ///
    /// ```
    /// use tab::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(6., transform.direct_distance(3));
    /// ```
    pub fn direct_distance(&self, n: i32) -> f64 {
        self.scale * f64::from(n)
    }

    /// Applies only the inverse scale to a world distance.
    ///
    /// # Examples
    ///
    /// ```
    /// use tab::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(3, transform.inverse_distance(6.).unwrap());
    /// ```
    pub fn inverse_distance(&self, n: f64) -> Result<i32> {
        let value = (n / self.scale).round();
        if value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
            Ok(value as i32)
        } else {
            Err(Error::CoordinateOverflow(n))
        }
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform {
            scale: 1.,
            offset: 0.,
        }
    }
}

impl From<(f64, f64)> for Transform {
    fn from((scale, offset): (f64, f64)) -> Transform {
        Transform { scale, offset }
    }
}
