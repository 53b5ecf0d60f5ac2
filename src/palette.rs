use plotters::style::RGBColor;

/// The ten-color categorical palette used for wedges and series
pub const TAB10: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

pub fn color(index: usize) -> RGBColor {
    TAB10[index % TAB10.len()]
}

/// `n` colors, cycling through the palette
pub fn colors(n: usize) -> Vec<RGBColor> {
    (0..n).map(color).collect()
}
