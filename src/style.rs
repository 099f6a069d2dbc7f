//! Shared drawing-tool definitions and the pools that deduplicate them.
//!
//! Pens, brushes, fonts, and symbols are stored once per distinct value in
//! the map file and referenced from features by one-byte indices. Indices are
//! 1-based, zero means "no definition" and resolves to the format's default.

use crate::{Color, Error, Result};

/// A line style definition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PenDef {
    /// Line width in pixels.
    pub width: u8,

    /// Line pattern number.
    pub pattern: u8,

    /// Line style modifier.
    pub style: u8,

    /// Line color.
    pub color: Color,
}

impl Default for PenDef {
    fn default() -> PenDef {
        PenDef {
            width: 1,
            pattern: 2,
            style: 0,
            color: Color::default(),
        }
    }
}

/// A fill style definition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushDef {
    /// Fill pattern number.
    pub pattern: u8,

    /// True if the fill background is transparent.
    pub transparent: bool,

    /// Foreground fill color.
    pub foreground: Color,

    /// Background fill color.
    pub background: Color,
}

impl Default for BrushDef {
    fn default() -> BrushDef {
        BrushDef {
            pattern: 1,
            transparent: false,
            foreground: Color::default(),
            background: Color::new(0xff, 0xff, 0xff),
        }
    }
}

/// A font definition.
///
/// Only the face name is shared through the pool, sizes and styles are stored
/// on the features that use the font.
#[derive(Clone, Debug, PartialEq)]
pub struct FontDef {
    /// The font face name.
    pub name: String,
}

impl Default for FontDef {
    fn default() -> FontDef {
        FontDef {
            name: "Arial".to_string(),
        }
    }
}

/// A point symbol definition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SymbolDef {
    /// Symbol shape number.
    pub shape: u16,

    /// Symbol size in points.
    pub point_size: u8,

    /// Symbol color.
    pub color: Color,
}

impl Default for SymbolDef {
    fn default() -> SymbolDef {
        SymbolDef {
            shape: 35,
            point_size: 12,
            color: Color::default(),
        }
    }
}

#[derive(Clone, Debug)]
struct Entry<T> {
    def: T,
    ref_count: u32,
}

fn lookup<T: Clone + Default>(entries: &[Entry<T>], index: u8) -> Result<T> {
    if index == 0 {
        Ok(T::default())
    } else {
        entries
            .get(usize::from(index) - 1)
            .map(|entry| entry.def.clone())
            .ok_or(Error::StyleIndexOutOfRange(index))
    }
}

fn intern<T: PartialEq>(entries: &mut Vec<Entry<T>>, def: T) -> Result<u8> {
    if let Some(position) = entries.iter().position(|entry| entry.def == def) {
        entries[position].ref_count += 1;
        Ok(position as u8 + 1)
    } else if entries.len() == usize::from(u8::MAX) {
        Err(Error::StyleIndexOutOfRange(u8::MAX))
    } else {
        entries.push(Entry { def, ref_count: 1 });
        Ok(entries.len() as u8)
    }
}

fn push<T>(entries: &mut Vec<Entry<T>>, def: T) -> Result<u8> {
    if entries.len() == usize::from(u8::MAX) {
        Err(Error::StyleIndexOutOfRange(u8::MAX))
    } else {
        entries.push(Entry { def, ref_count: 0 });
        Ok(entries.len() as u8)
    }
}

/// The four style-definition pools of one map file.
///
/// On write, [StylePool::intern_pen] and friends return the index of an
/// existing byte-equal definition and only append when the payload is new. On
/// read, definitions are pushed in on-disk order and resolved by index.
/// An index never changes during a session and a pooled definition is
/// immutable.
///
/// # Examples
///
/// ```
/// use tab::{PenDef, StylePool};
///
/// let mut pool = StylePool::default();
/// let index = pool.intern_pen(PenDef::default()).unwrap();
/// assert_eq!(1, index);
/// // Interning a byte-equal payload returns the existing index.
/// assert_eq!(1, pool.intern_pen(PenDef::default()).unwrap());
/// assert_eq!(PenDef::default(), pool.pen(1).unwrap());
/// ```
#[derive(Clone, Debug, Default)]
pub struct StylePool {
    pens: Vec<Entry<PenDef>>,
    brushes: Vec<Entry<BrushDef>>,
    fonts: Vec<Entry<FontDef>>,
    symbols: Vec<Entry<SymbolDef>>,
}

impl StylePool {
    /// Resolves a pen index.
    ///
    /// Index zero is "no pen" and resolves to the default definition.
    pub fn pen(&self, index: u8) -> Result<PenDef> {
        lookup(&self.pens, index)
    }

    /// Resolves a brush index.
    pub fn brush(&self, index: u8) -> Result<BrushDef> {
        lookup(&self.brushes, index)
    }

    /// Resolves a font index.
    pub fn font(&self, index: u8) -> Result<FontDef> {
        lookup(&self.fonts, index)
    }

    /// Resolves a symbol index.
    pub fn symbol(&self, index: u8) -> Result<SymbolDef> {
        lookup(&self.symbols, index)
    }

    /// Interns a pen definition, returning its 1-based index.
    pub fn intern_pen(&mut self, def: PenDef) -> Result<u8> {
        intern(&mut self.pens, def)
    }

    /// Interns a brush definition.
    pub fn intern_brush(&mut self, def: BrushDef) -> Result<u8> {
        intern(&mut self.brushes, def)
    }

    /// Interns a font definition.
    pub fn intern_font(&mut self, def: FontDef) -> Result<u8> {
        intern(&mut self.fonts, def)
    }

    /// Interns a symbol definition.
    pub fn intern_symbol(&mut self, def: SymbolDef) -> Result<u8> {
        intern(&mut self.symbols, def)
    }

    /// Appends a pen definition as it appears in the on-disk pool.
    pub fn push_pen(&mut self, def: PenDef) -> Result<u8> {
        push(&mut self.pens, def)
    }

    /// Appends a brush definition as it appears in the on-disk pool.
    pub fn push_brush(&mut self, def: BrushDef) -> Result<u8> {
        push(&mut self.brushes, def)
    }

    /// Appends a font definition as it appears in the on-disk pool.
    pub fn push_font(&mut self, def: FontDef) -> Result<u8> {
        push(&mut self.fonts, def)
    }

    /// Appends a symbol definition as it appears in the on-disk pool.
    pub fn push_symbol(&mut self, def: SymbolDef) -> Result<u8> {
        push(&mut self.symbols, def)
    }

    /// Returns the number of interned pens.
    pub fn pen_count(&self) -> usize {
        self.pens.len()
    }

    /// Returns the number of interned brushes.
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    /// Returns the number of interned fonts.
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Returns the number of interned symbols.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}
