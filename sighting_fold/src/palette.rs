//! The default colour palette of the BIFF8 (Excel 97) file format.
//!
//! Colour codes read from the identifier cells are indexes in this palette.

use crate::config::NO_FILL_COLOUR;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct PaletteColour {
    pub index: u16,
    pub name: &'static str,
    /// 0xRRGGBB
    pub rgb: u32,
}

impl PaletteColour {
    pub fn hex(&self) -> String {
        format!("#{:06X}", self.rgb)
    }
}

/// The background of a rendered cell.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Fill {
    NoFill,
    Solid(PaletteColour),
}

const FIRST_INDEX: u16 = 8;

const PALETTE: [(&str, u32); 56] = [
    ("black", 0x000000),
    ("white", 0xFFFFFF),
    ("red", 0xFF0000),
    ("bright green", 0x00FF00),
    ("blue", 0x0000FF),
    ("yellow", 0xFFFF00),
    ("pink", 0xFF00FF),
    ("turquoise", 0x00FFFF),
    ("dark red", 0x800000),
    ("green", 0x008000),
    ("dark blue", 0x000080),
    ("dark yellow", 0x808000),
    ("violet", 0x800080),
    ("teal", 0x008080),
    ("grey 25%", 0xC0C0C0),
    ("grey 50%", 0x808080),
    ("periwinkle", 0x9999FF),
    ("plum", 0x993366),
    ("ivory", 0xFFFFCC),
    ("light turquoise", 0xCCFFFF),
    ("dark purple", 0x660066),
    ("coral", 0xFF8080),
    ("ocean blue", 0x0066CC),
    ("ice blue", 0xCCCCFF),
    ("dark blue", 0x000080),
    ("pink", 0xFF00FF),
    ("yellow", 0xFFFF00),
    ("turquoise", 0x00FFFF),
    ("violet", 0x800080),
    ("dark red", 0x800000),
    ("teal", 0x008080),
    ("blue", 0x0000FF),
    ("sky blue", 0x00CCFF),
    ("light turquoise", 0xCCFFFF),
    ("light green", 0xCCFFCC),
    ("very light yellow", 0xFFFF99),
    ("pale blue", 0x99CCFF),
    ("rose", 0xFF99CC),
    ("lavender", 0xCC99FF),
    ("tan", 0xFFCC99),
    ("light blue", 0x3366FF),
    ("aqua", 0x33CCCC),
    ("lime", 0x99CC00),
    ("gold", 0xFFCC00),
    ("light orange", 0xFF9900),
    ("orange", 0xFF6600),
    ("blue grey", 0x666699),
    ("grey 40%", 0x969696),
    ("dark teal", 0x003366),
    ("sea green", 0x339966),
    ("dark green", 0x003300),
    ("olive green", 0x333300),
    ("brown", 0x993300),
    ("plum", 0x993366),
    ("indigo", 0x333399),
    ("grey 80%", 0x333333),
];

pub fn palette_colour(index: u16) -> Option<PaletteColour> {
    let offset = index.checked_sub(FIRST_INDEX)? as usize;
    PALETTE
        .get(offset)
        .map(|&(name, rgb)| PaletteColour { index, name, rgb })
}

/// Maps a colour code to the fill of the identifier cell.
///
/// `"192"` is the default background. Codes that are not palette indexes also
/// render without fill.
pub fn fill_for_code(colour_code: &str) -> Fill {
    let code = colour_code.trim();
    if code.is_empty() || code == NO_FILL_COLOUR {
        return Fill::NoFill;
    }
    code.parse::<u16>()
        .ok()
        .and_then(palette_colour)
        .map(Fill::Solid)
        .unwrap_or(Fill::NoFill)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_background_has_no_fill() {
        assert_eq!(fill_for_code("192"), Fill::NoFill);
        assert_eq!(fill_for_code(""), Fill::NoFill);
    }

    #[test]
    fn palette_lookup() {
        match fill_for_code("10") {
            Fill::Solid(c) => {
                assert_eq!(c.name, "red");
                assert_eq!(c.hex(), "#FF0000");
            }
            x => panic!("unexpected fill {:?}", x),
        }
        assert_eq!(palette_colour(63).map(|c| c.name), Some("grey 80%"));
        assert_eq!(palette_colour(13).map(|c| c.rgb), Some(0xFFFF00));
    }

    #[test]
    fn unknown_codes_have_no_fill() {
        assert_eq!(fill_for_code("7"), Fill::NoFill);
        assert_eq!(fill_for_code("64"), Fill::NoFill);
        assert_eq!(fill_for_code("blue"), Fill::NoFill);
    }
}
