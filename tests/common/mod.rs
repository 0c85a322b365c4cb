#![allow(dead_code)]

pub const WHITE: [u8; 3] = [255, 255, 255];
pub const RED: [u8; 3] = [255, 0, 0];
pub const GREEN: [u8; 3] = [0, 255, 0];
pub const BLUE: [u8; 3] = [0, 0, 255];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn rgba(rgb: [u8; 3]) -> [u8; 4] {
    [rgb[0], rgb[1], rgb[2], 0xff]
}

/// Assembles GIF streams block by block.
pub struct GifBuilder {
    bytes: Vec<u8>,
}

impl GifBuilder {
    pub fn new(width: u16, height: u16, global: Option<&[[u8; 3]]>, background: u8) -> Self {
        let mut bytes = b"GIF89a".to_vec();
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());

        match global {
            Some(table) => {
                let (size_bits, padded) = pad_table(table);
                bytes.push(0b1000_0000 | 0b0111_0000 | size_bits);
                bytes.push(background);
                bytes.push(0);
                bytes.extend_from_slice(&padded);
            }
            None => {
                bytes.push(0);
                bytes.push(background);
                bytes.push(0);
            }
        }

        Self { bytes }
    }

    pub fn graphic_control(mut self, disposal: u8, transparent: Option<u8>, delay_cs: u16) -> Self {
        let packed = (disposal << 2) | u8::from(transparent.is_some());
        self.bytes.extend_from_slice(&[0x21, 0xf9, 4, packed]);
        self.bytes.extend_from_slice(&delay_cs.to_le_bytes());
        self.bytes.push(transparent.unwrap_or(0));
        self.bytes.push(0);
        self
    }

    pub fn netscape_loop(mut self, count: u16) -> Self {
        self.bytes.extend_from_slice(&[0x21, 0xff, 11]);
        self.bytes.extend_from_slice(b"NETSCAPE2.0");
        self.bytes.extend_from_slice(&[3, 1]);
        self.bytes.extend_from_slice(&count.to_le_bytes());
        self.bytes.push(0);
        self
    }

    pub fn application(mut self, identifier: &[u8; 11], data: &[u8]) -> Self {
        self.bytes.extend_from_slice(&[0x21, 0xff, 11]);
        self.bytes.extend_from_slice(identifier);
        push_sub_blocks(&mut self.bytes, data);
        self
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.bytes.extend_from_slice(&[0x21, 0xfe]);
        push_sub_blocks(&mut self.bytes, text.as_bytes());
        self
    }

    /// An extension this decoder has no use for (plain text).
    pub fn plain_text(mut self) -> Self {
        self.bytes.extend_from_slice(&[0x21, 0x01, 12]);
        self.bytes.extend_from_slice(&[0; 12]);
        push_sub_blocks(&mut self.bytes, b"hello");
        self
    }

    pub fn image(self, left: u16, top: u16, width: u16, height: u16, indicies: &[u8]) -> Self {
        self.image_with(Image {
            left,
            top,
            width,
            height,
            interlace: false,
            local: None,
            indicies,
        })
    }

    pub fn image_with(mut self, image: Image<'_>) -> Self {
        assert_eq!(image.indicies.len(), image.width as usize * image.height as usize);

        self.bytes.push(0x2c);
        for field in [image.left, image.top, image.width, image.height] {
            self.bytes.extend_from_slice(&field.to_le_bytes());
        }

        let mut packed = if image.interlace { 0b0100_0000 } else { 0 };
        let local = image.local.map(pad_table);
        if let Some((size_bits, _)) = &local {
            packed |= 0b1000_0000 | size_bits;
        }
        self.bytes.push(packed);
        if let Some((_, padded)) = local {
            self.bytes.extend_from_slice(&padded);
        }

        let max_index = image.indicies.iter().copied().max().unwrap_or(0);
        let mut minimum_code_size = 2;
        while (1u16 << minimum_code_size) <= u16::from(max_index) {
            minimum_code_size += 1;
        }

        self.bytes.push(minimum_code_size);
        push_sub_blocks(&mut self.bytes, &lzw_literals(minimum_code_size, image.indicies));
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes.push(0x3b);
        self.bytes
    }

    pub fn without_trailer(self) -> Vec<u8> {
        self.bytes
    }
}

pub struct Image<'a> {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    pub interlace: bool,
    pub local: Option<&'a [[u8; 3]]>,
    pub indicies: &'a [u8],
}

// pads a palette to a power of two and returns the packed size bits
fn pad_table(table: &[[u8; 3]]) -> (u8, Vec<u8>) {
    let mut size_bits = 0;
    while (2usize << size_bits) < table.len() {
        size_bits += 1;
    }

    let mut padded: Vec<u8> = table.iter().flatten().copied().collect();
    padded.resize(3 * (2usize << size_bits), 0);
    (size_bits, padded)
}

fn push_sub_blocks(bytes: &mut Vec<u8>, data: &[u8]) {
    for chunk in data.chunks(255) {
        bytes.push(chunk.len() as u8);
        bytes.extend_from_slice(chunk);
    }
    bytes.push(0);
}

/// Uncompressed LZW: a clear code, every index as a literal, then the end
/// code, tracking the code width the decoder will be using.
pub fn lzw_literals(minimum_code_size: u8, indicies: &[u8]) -> Vec<u8> {
    let clear_code = 1u32 << minimum_code_size;
    let mut width = u32::from(minimum_code_size) + 1;
    let mut next_code = clear_code + 2;

    let mut out = Vec::new();
    let mut bits = 0u32;
    let mut bit_count = 0u32;
    let mut emit = |code: u32, width: u32| {
        bits |= code << bit_count;
        bit_count += width;
        while bit_count >= 8 {
            out.push(bits as u8);
            bits >>= 8;
            bit_count -= 8;
        }
    };

    emit(clear_code, width);
    for (i, &index) in indicies.iter().enumerate() {
        emit(u32::from(index), width);
        if i > 0 && next_code < 4096 {
            next_code += 1;
            if next_code >= 1 << width && width < 12 {
                width += 1;
            }
        }
    }
    emit(clear_code + 1, width);

    if bit_count > 0 {
        out.push(bits as u8);
    }
    out
}
