//! Native library for reading and writing vector features stored in the
//! MapInfo TAB map format.
//!
//! A TAB dataset keeps one logical table in three sidecar files: a small
//! text manifest with the attribute schema, a fixed-record attribute store,
//! and a block-structured binary map file holding geometry, symbology, and
//! projection parameters. This crate implements the map file's feature
//! codec: the tagged binary records for points, lines, polylines, regions,
//! rectangles, ellipses, arcs, and text labels, together with the integer
//! coordinate transform and the deduplicated pen, brush, font, and symbol
//! pools they reference.
//!
//! # Reading and writing features
//!
//! A [MapFile] owns the object stream, the coordinate stream, the style
//! pools, and the coordinate transform, which is everything the codec
//! needs:
//!
//! ```
//! use geo_types::Point;
//! use tab::{Feature, MapFile, SymbolDef};
//!
//! let mut map = MapFile::memory();
//! let feature = Feature::symbol(Point::new(10., 20.), SymbolDef::default());
//! map.write_feature(&feature, false).unwrap();
//!
//! map.rewind().unwrap();
//! let read = map.read_feature().unwrap();
//! assert_eq!(feature, read);
//! ```
//!
//! # Shapes and geometry
//!
//! Geometries use the [geo-types](geo_types) model. Each [Feature] pairs a
//! geometry with a [Shape] that picks the on-disk record and carries the
//! drawing style. Parameter-only shapes are materialized into vertices on
//! read, so a decoded ellipse is a polygon you can hand straight to other
//! geometry code:
//!
//! ```
//! use geo_types::{Coord, Geometry};
//! use tab::{BrushDef, Feature, PenDef};
//!
//! let ellipse = Feature::ellipse(
//!     Coord { x: 0., y: 0. },
//!     Coord { x: 10., y: 5. },
//!     PenDef::default(),
//!     BrushDef::default(),
//! );
//! assert!(matches!(ellipse.geometry, Some(Geometry::Polygon(_))));
//! ```
//!
//! # Compressed coordinates
//!
//! Every record has a compressed flavor that stores vertices as 16-bit
//! offsets from a per-feature origin. Reading handles both flavors
//! transparently; writing picks the flavor from the `compress` argument of
//! [MapFile::write_feature].

#![deny(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]

pub mod feature;
pub mod rasterize;

mod bounds;
mod color;
mod cursor;
mod error;
mod geom_type;
mod map;
mod projection;
mod style;
mod transform;
mod vector;

pub use crate::bounds::Bounds;
pub use crate::color::Color;
pub use crate::cursor::MapCursor;
pub use crate::error::Error;
pub use crate::feature::{Feature, Shape};
pub use crate::geom_type::GeomType;
pub use crate::map::MapFile;
pub use crate::projection::ProjectionRecord;
pub use crate::style::{BrushDef, FontDef, PenDef, StylePool, SymbolDef};
pub use crate::transform::Transform;
pub use crate::vector::Vector;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;
