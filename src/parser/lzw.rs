use super::bit_reader::BitReader;
use crate::error::FormatError;

use log::{trace, warn};

const MAX_CODE_SIZE: u32 = 12;
const MAX_CODES: usize = 1 << MAX_CODE_SIZE;

/// Decodes one image's LZW data (sub-blocks already concatenated) into at most
/// `pixel_count` color indices in raster order. Short data is returned as is;
/// the compositor draws the missing tail as index 0.
pub fn lzw_decode(buf: &[u8], minimum_code_size: u8, pixel_count: usize) -> Result<Vec<u8>, FormatError> {
    // indices are single bytes, so literal codes must stay below 256
    if !(1..=8).contains(&minimum_code_size) {
        return Err(FormatError::InvalidMinCodeSize(minimum_code_size));
    }

    let mut code_table = CodeTable::new(minimum_code_size);
    let mut reader = BitReader::new(buf);

    // grows with the data actually decoded, not with the declared image size
    let mut indicies: Vec<u8> = Vec::new();
    let mut run: Vec<u8> = Vec::with_capacity(MAX_CODES);

    while indicies.len() < pixel_count {
        let Some(code) = reader.next(code_table.code_size) else {
            break;
        };

        if code == code_table.clear_code {
            trace!("clear code after {} indicies", indicies.len());
            code_table.reset();
            continue;
        }

        if code == code_table.end_code {
            break;
        }

        code_table.expand(code, &mut run)?;
        // runs are built back to front while walking the prefix chain
        indicies.extend(run.iter().rev());
    }

    if indicies.len() < pixel_count {
        warn!(
            "lzw data produced {} of {} indicies, the rest is drawn as index 0",
            indicies.len(),
            pixel_count
        );
    } else if indicies.len() > pixel_count {
        warn!("lzw data carries more than {} indicies, discarding the rest", pixel_count);
        indicies.truncate(pixel_count);
    }

    Ok(indicies)
}

/// Dictionary stored as two parallel arrays indexed by code: the code each
/// entry extends and the byte it appends.
struct CodeTable {
    minimum_code_size: u8,
    clear_code: u16,
    end_code: u16,

    code_size: u32,
    next_code: u16,
    previous: Option<u16>,
    // first byte of the previous code's expansion
    previous_first: u8,

    prefix: [u16; MAX_CODES],
    suffix: [u8; MAX_CODES],
}

impl CodeTable {
    fn new(minimum_code_size: u8) -> Self {
        let clear_code: u16 = 1 << minimum_code_size;

        let mut code_table = Self {
            minimum_code_size,
            clear_code,
            end_code: clear_code + 1,
            code_size: u32::from(minimum_code_size) + 1,
            next_code: clear_code + 2,
            previous: None,
            previous_first: 0,
            prefix: [0; MAX_CODES],
            suffix: [0; MAX_CODES],
        };

        for code in 0..clear_code {
            code_table.suffix[code as usize] = code as u8;
        }

        code_table
    }

    fn reset(&mut self) {
        self.code_size = u32::from(self.minimum_code_size) + 1;
        self.next_code = self.clear_code + 2;
        self.previous = None;
    }

    /// Writes the expansion of `code` into `run` in reverse order and grows the
    /// table by one entry when a previous code exists.
    fn expand(&mut self, code: u16, run: &mut Vec<u8>) -> Result<(), FormatError> {
        run.clear();

        let mut current = match (self.previous, code.cmp(&self.next_code)) {
            (_, std::cmp::Ordering::Less) => code,
            // code not in the table yet: {previous} + first byte of {previous}
            (Some(previous), std::cmp::Ordering::Equal) => {
                run.push(self.previous_first);
                previous
            }
            _ => {
                return Err(FormatError::InvalidCode {
                    code,
                    next: self.next_code,
                })
            }
        };

        while current > self.end_code {
            run.push(self.suffix[current as usize]);
            current = self.prefix[current as usize];
        }

        let first = self.suffix[current as usize];
        run.push(first);

        if let Some(previous) = self.previous {
            // a full table stops growing until the encoder sends a clear code
            if (self.next_code as usize) < MAX_CODES {
                self.prefix[self.next_code as usize] = previous;
                self.suffix[self.next_code as usize] = first;
                self.next_code += 1;

                if self.next_code >= 1 << self.code_size && self.code_size < MAX_CODE_SIZE {
                    self.code_size += 1;
                }
            }
        }

        self.previous = Some(code);
        self.previous_first = first;

        Ok(())
    }
}
