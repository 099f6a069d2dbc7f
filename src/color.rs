/// A 24-bit RGB color value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    /// Red channel.
    pub red: u8,

    /// Green channel.
    pub green: u8,

    /// Blue channel.
    pub blue: u8,
}

impl Color {
    /// Creates a new color.
    ///
    /// # Examples
    ///
    /// ```
    /// use tab::Color;
    /// let color = Color::new(1, 2, 3);
    /// assert_eq!(1, color.red);
    /// assert_eq!(2, color.green);
    /// assert_eq!(3, color.blue);
    /// ```
    pub fn new(red: u8, green: u8, blue: u8) -> Color {
        Color { red, green, blue }
    }
}

impl From<u32> for Color {
    fn from(n: u32) -> Color {
        Color {
            red: (n >> 16) as u8,
            green: (n >> 8) as u8,
            blue: n as u8,
        }
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> u32 {
        (u32::from(color.red) << 16) + (u32::from(color.green) << 8) + u32::from(color.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing() {
        let color = Color::from(0xff8001);
        assert_eq!(Color::new(0xff, 0x80, 0x01), color);
        assert_eq!(0xff8001u32, color.into());
    }
}
