/// A single palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xff]
    }
}

/// Palette built from the packed RGB triples that follow the logical screen
/// descriptor (global) or an image descriptor (local).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    entries: Box<[Rgb]>,
}

impl ColorTable {
    pub const MAX_ENTRIES: usize = 256;

    /// Number of entries announced by the low three bits of a packed flags byte.
    pub fn size_from_packed(packed_fields: u8) -> usize {
        2 << (packed_fields & 0b00000111)
    }

    /// Builds a table from raw triples. Trailing bytes that do not form a full
    /// triple are ignored.
    pub fn from_rgb_bytes(bytes: &[u8]) -> Self {
        let entries = bytes
            .chunks_exact(3)
            .take(Self::MAX_ENTRIES)
            .map(|rgb| Rgb::new(rgb[0], rgb[1], rgb[2]))
            .collect();

        Self { entries }
    }

    pub fn get(&self, index: u8) -> Option<Rgb> {
        self.entries.get(index as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_size_covers_full_range() {
        assert_eq!(ColorTable::size_from_packed(0b1000_0000), 2);
        assert_eq!(ColorTable::size_from_packed(0b1000_0001), 4);
        assert_eq!(ColorTable::size_from_packed(0b1111_0111), 256);
    }

    #[test]
    fn builds_from_triples() {
        let table = ColorTable::from_rgb_bytes(&[255, 0, 0, 0, 0, 255, 9]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0), Some(Rgb::new(255, 0, 0)));
        assert_eq!(table.get(1), Some(Rgb::new(0, 0, 255)));
        assert_eq!(table.get(2), None);
    }
}
