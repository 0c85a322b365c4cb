use super::blocks::BlockReader;
use super::lzw::lzw_decode;
use super::DisposalMethod;

use crate::color_table::ColorTable;
use crate::compositor::Compositor;
use crate::error::{FormatError, Result};
use crate::frame::{Animation, Frame, LoopCount};
use crate::options::DecodeOptions;

use log::{debug, warn};

use std::io::prelude::*;

const EXTENSION_INTRODUCER: u8 = 0x21;
const IMAGE_DESCRIPTOR_LABEL: u8 = 0x2c;
const TRAILER_LABEL: u8 = 0x3b;

// Extension labels
const APPLICATION_EXTENSION: u8 = 0xff;
const COMMENT_EXTENSION: u8 = 0xfe;
const GRAPHIC_CONTROL_EXTENSION: u8 = 0xf9;

const NETSCAPE_APPLICATION: &[u8] = b"NETSCAPE2.0";
const NETSCAPE_LOOP_SUB_BLOCK: u8 = 1;

/// Settings from the most recent graphic control extension, consumed by the
/// next image descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct GraphicControl {
    pub(crate) disposal_method: DisposalMethod,
    pub(crate) transparent_index: Option<u8>,
    // hundredths of a second
    pub(crate) delay_time: u16,
}

#[derive(Debug)]
pub(crate) struct ImageDescriptor {
    pub(crate) left: u16,
    pub(crate) top: u16,

    pub(crate) width: u16,
    pub(crate) height: u16,

    pub(crate) interlace: bool,
    pub(crate) local_color_table: Option<ColorTable>,
}

#[derive(Debug)]
pub(crate) struct ImageBlock {
    control: GraphicControl,
    descriptor: ImageDescriptor,
    local_color_table_size: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalScreenDescriptor {
    pub screen_width: u16,
    pub screen_height: u16,
    pub global_color_table_flag: bool,
    pub color_resolution: u8,
    pub sort_flag: bool,
    pub global_color_table_size: Option<usize>,
    pub background_color_index: u8,
    pub pixel_aspect_ratio: u8,
}

#[derive(Debug)]
pub(crate) enum ParserState {
    ProcessMagic,
    ProcessLogicalScreenDescriptor,
    ProcessGlobalColorTable(usize),
    ProcessTrailer,

    DetermineNextBlock(Option<GraphicControl>),
    ProcessExtension {
        label: u8,
        pending: Option<GraphicControl>,
    },
    ProcessImageDescriptor(Option<GraphicControl>),
    ProcessLocalColorTable(ImageBlock),
    ProcessImageData(ImageBlock),

    Done,
}

/// Block-level GIF decoder. Frames decoded before an error stay available
/// through [`Decoder::frames`] after [`Decoder::parse`] fails.
pub struct Decoder<'a, T: Read> {
    reader: BlockReader<'a, T>,
    options: DecodeOptions,
    logical_screen_descriptor: Option<LogicalScreenDescriptor>,
    global_color_table: Option<ColorTable>,
    compositor: Compositor,
    frames: Vec<Frame>,
    loop_count: LoopCount,
}

impl<'a, T: Read> Decoder<'a, T> {
    pub fn new(inner: &'a mut T) -> Self {
        Self {
            reader: BlockReader::new(inner),
            options: DecodeOptions::default(),
            logical_screen_descriptor: None,
            global_color_table: None,
            compositor: Compositor::new(0, 0),
            frames: Vec::new(),
            loop_count: LoopCount::default(),
        }
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads the stream up to the trailer. Meant to be called once.
    pub fn parse(&mut self) -> Result<()> {
        let mut state = ParserState::ProcessMagic;

        loop {
            debug!("begin parsing state {:?}", state);

            state = self.process_next_state(state)?;
            if let ParserState::Done = state {
                break Ok(());
            }
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn loop_count(&self) -> LoopCount {
        self.loop_count
    }

    pub fn logical_screen_descriptor(&self) -> Option<&LogicalScreenDescriptor> {
        self.logical_screen_descriptor.as_ref()
    }

    pub fn global_color_table(&self) -> Option<&ColorTable> {
        self.global_color_table.as_ref()
    }

    pub fn into_animation(self) -> Animation {
        let (width, height) = self.screen_size();

        Animation {
            width,
            height,
            frames: self.frames,
            loop_count: self.loop_count,
            default_delay: self.options.default_delay,
        }
    }

    fn process_next_state(&mut self, next_state: ParserState) -> Result<ParserState> {
        use ParserState::*;

        match next_state {
            ProcessMagic => {
                let signature = self.reader.read_bytes(6, "signature")?;
                if !signature.starts_with(b"GIF") {
                    return Err(FormatError::InvalidSignature.into());
                }
                // 87a and 89a are decoded the same way
                debug!("processed signature, got version {}", String::from_utf8_lossy(&signature[3..]));

                Ok(ProcessLogicalScreenDescriptor)
            }
            ProcessLogicalScreenDescriptor => {
                let screen_width = self.reader.read_u16("screen width")?;
                let screen_height = self.reader.read_u16("screen height")?;

                let packed_fields = self.reader.read_byte("screen flags")?;

                // packed field start
                let global_color_table_flag = packed_fields & 0b10000000 != 0;
                let color_resolution = ((packed_fields >> 4) & 0b00000111) + 1;
                let sort_flag = packed_fields & 0b00001000 != 0;
                let global_color_table_size =
                    global_color_table_flag.then(|| ColorTable::size_from_packed(packed_fields));
                // packed field end

                let background_color_index = self.reader.read_byte("background color index")?;
                let pixel_aspect_ratio = self.reader.read_byte("pixel aspect ratio")?;

                let screen = LogicalScreenDescriptor {
                    screen_width,
                    screen_height,
                    global_color_table_flag,
                    color_resolution,
                    sort_flag,
                    global_color_table_size,
                    background_color_index,
                    pixel_aspect_ratio,
                };
                debug!("processed logical screen descriptor, got: {:#?}", screen);

                // the canvas is allocated right below
                self.options.check_image_size(screen_width, screen_height)?;

                self.logical_screen_descriptor = Some(screen);
                self.compositor = Compositor::new(screen_width, screen_height);

                let next_state = match global_color_table_size {
                    Some(size) => ProcessGlobalColorTable(size),
                    None => DetermineNextBlock(None),
                };

                Ok(next_state)
            }
            ProcessGlobalColorTable(size) => {
                let table = ColorTable::from_rgb_bytes(&self.reader.read_bytes(3 * size, "global color table")?);
                debug!("processed global color table with {} entries", table.len());

                if let Some(screen) = &self.logical_screen_descriptor {
                    let index = screen.background_color_index;
                    self.compositor.set_background(index, table.get(index));
                }
                self.global_color_table = Some(table);

                Ok(DetermineNextBlock(None))
            }
            ProcessTrailer => Ok(Done),
            DetermineNextBlock(pending) => {
                if let Some(max_frames) = self.options.max_frames {
                    if self.frames.len() >= max_frames {
                        debug!("reached the limit of {} frames, stopping early", max_frames);
                        return Ok(Done);
                    }
                }

                let introducer_or_label = self.reader.read_byte("block label")?;

                match introducer_or_label {
                    // extension introducer means that a label follows determining what exact type
                    // of extension it is.
                    EXTENSION_INTRODUCER => Ok(ProcessExtension {
                        label: self.reader.read_byte("extension label")?,
                        pending,
                    }),
                    IMAGE_DESCRIPTOR_LABEL => Ok(ProcessImageDescriptor(pending)),
                    TRAILER_LABEL => Ok(ProcessTrailer),
                    label => Err(FormatError::UnexpectedLabel(label).into()),
                }
            }
            ProcessExtension { label, pending } => self.process_extension(label, pending),
            ProcessImageDescriptor(pending) => {
                let left = self.reader.read_u16("image left")?;
                let top = self.reader.read_u16("image top")?;

                let width = self.reader.read_u16("image width")?;
                let height = self.reader.read_u16("image height")?;

                let packed_fields = self.reader.read_byte("image flags")?;

                self.options.check_image_size(width, height)?;

                let local_color_table_flag = packed_fields & 0b10000000 != 0;
                let interlace = packed_fields & 0b01000000 != 0;
                let local_color_table_size =
                    local_color_table_flag.then(|| ColorTable::size_from_packed(packed_fields));

                let image_block = ImageBlock {
                    control: pending.unwrap_or_default(),
                    descriptor: ImageDescriptor {
                        left,
                        top,
                        width,
                        height,
                        interlace,
                        local_color_table: None,
                    },
                    local_color_table_size,
                };

                let next_state = if local_color_table_flag {
                    ProcessLocalColorTable(image_block)
                } else {
                    ProcessImageData(image_block)
                };

                Ok(next_state)
            }
            ProcessLocalColorTable(mut image_block) => {
                let size = image_block.local_color_table_size.unwrap_or_default();
                let table = ColorTable::from_rgb_bytes(&self.reader.read_bytes(3 * size, "local color table")?);
                image_block.descriptor.local_color_table = Some(table);

                Ok(ProcessImageData(image_block))
            }
            ProcessImageData(image_block) => {
                self.process_image_data(image_block)?;

                Ok(DetermineNextBlock(None))
            }
            Done => Ok(Done),
        }
    }

    fn process_image_data(&mut self, image_block: ImageBlock) -> Result<()> {
        let ImageBlock { control, descriptor, .. } = image_block;

        let palette = descriptor
            .local_color_table
            .as_ref()
            .or(self.global_color_table.as_ref())
            .ok_or(FormatError::MissingColorTable)?;

        let lzw_code_size = self.reader.read_byte("lzw minimum code size")?;
        let data_stream = self.reader.read_data_sub_blocks()?;

        let pixel_count = descriptor.width as usize * descriptor.height as usize;
        let indicies = lzw_decode(&data_stream, lzw_code_size, pixel_count)?;

        let rgba = self.compositor.composite(&descriptor, &control, palette, &indicies);

        let (width, height) = self.screen_size();
        let frame = Frame {
            width,
            height,
            rgba,
            delay: self.options.normalize_delay(control.delay_time),
        };
        debug!(
            "processed frame {} at ({}, {}) sized {}x{}, delay {:?}",
            self.frames.len(),
            descriptor.left,
            descriptor.top,
            descriptor.width,
            descriptor.height,
            frame.delay
        );

        self.frames.push(frame);
        Ok(())
    }

    fn process_extension(&mut self, label: u8, pending: Option<GraphicControl>) -> Result<ParserState> {
        debug!("processing extension with label 0x{:02x}", label);

        match label {
            GRAPHIC_CONTROL_EXTENSION => {
                let block = self.reader.read_block()?;
                if block.len() < 4 {
                    warn!("graphic control extension holds {} bytes, ignoring it", block.len());
                    if !block.is_empty() {
                        self.reader.skip_sub_blocks()?;
                    }
                    return Ok(ParserState::DetermineNextBlock(pending));
                }

                // packed fields definition
                // XXXYYYZW
                // XXX = reserved, not needed
                // YYY = disposal method, indicates what to do with graphic after displaying
                // Z = user input flag
                // W = transparent color flag
                let packed_fields = block[0];
                let delay_time = u16::from_le_bytes([block[1], block[2]]);
                let transparent_color_index = block[3];

                let disposal_method = match DisposalMethod::from_u8((packed_fields >> 2) & 0b00000111) {
                    // unspecified disposal behaves like "do not dispose"
                    Some(DisposalMethod::None) => DisposalMethod::DoNotDispose,
                    Some(method) => method,
                    None => {
                        warn!("unknown disposal method in 0x{:02x}, not disposing", packed_fields);
                        DisposalMethod::DoNotDispose
                    }
                };
                let transparent_color_flag = packed_fields & 0b00000001 != 0;

                let graphic_control = GraphicControl {
                    disposal_method,
                    transparent_index: transparent_color_flag.then_some(transparent_color_index),
                    delay_time,
                };

                // block terminator
                self.reader.skip_sub_blocks()?;

                debug!("processed GraphicControlExtension: {:#?}", graphic_control);
                if pending.is_some() {
                    debug!("replacing an unused graphic control extension");
                }

                Ok(ParserState::DetermineNextBlock(Some(graphic_control)))
            }
            APPLICATION_EXTENSION => {
                let application = self.reader.read_block()?;
                if application.is_empty() {
                    return Ok(ParserState::DetermineNextBlock(pending));
                }

                if application == NETSCAPE_APPLICATION {
                    loop {
                        let data = self.reader.read_block()?;
                        if data.is_empty() {
                            break;
                        }
                        if data.len() >= 3 && data[0] == NETSCAPE_LOOP_SUB_BLOCK {
                            self.loop_count = LoopCount::from(u16::from_le_bytes([data[1], data[2]]));
                            debug!("processed netscape loop count, got {:?}", self.loop_count);
                        }
                    }
                } else {
                    debug!(
                        "skipping application extension {}",
                        String::from_utf8_lossy(application)
                    );
                    self.reader.skip_sub_blocks()?;
                }

                Ok(ParserState::DetermineNextBlock(pending))
            }
            COMMENT_EXTENSION => {
                let data = self.reader.read_data_sub_blocks()?;
                debug!("processed comment block, got: {}", String::from_utf8_lossy(&data));

                Ok(ParserState::DetermineNextBlock(pending))
            }
            _ => {
                self.reader.skip_sub_blocks()?;

                Ok(ParserState::DetermineNextBlock(pending))
            }
        }
    }

    fn screen_size(&self) -> (u16, u16) {
        self.logical_screen_descriptor
            .map(|screen| (screen.screen_width, screen.screen_height))
            .unwrap_or_default()
    }
}
