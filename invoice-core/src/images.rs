use crate::text::Rect;

/// Opaque handle to an image loaded into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub usize);

/// Supported logo image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// How an image is scaled to fit a bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFit {
    /// Scale to fit within the rect, preserving aspect ratio.
    Fit,
    /// Stretch to fill the rect exactly (may distort).
    Stretch,
}

/// PDF color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceRgb,
    DeviceGray,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceRgb => "DeviceRGB",
            ColorSpace::DeviceGray => "DeviceGray",
        }
    }
}

/// Decoded image data ready for embedding.
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub color_space: ColorSpace,
    /// Raw pixel data (RGB/Gray) for PNG, or the untouched JPEG bytes.
    pub data: Vec<u8>,
    /// Separate alpha channel (grayscale), if the source had one.
    pub smask_data: Option<Vec<u8>>,
}

/// Computed on-page placement of an image.
#[derive(Debug)]
pub struct ImagePlacement {
    /// Bottom-left corner in PDF coordinates.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Detect image format from magic bytes.
pub fn detect_format(data: &[u8]) -> Result<ImageFormat, String> {
    if data.len() < 4 {
        return Err("image data too short to detect format".to_string());
    }
    if data[0] == 0xFF && data[1] == 0xD8 {
        Ok(ImageFormat::Jpeg)
    } else if data[..4] == [0x89, 0x50, 0x4E, 0x47] {
        Ok(ImageFormat::Png)
    } else {
        Err("unsupported image format (expected JPEG or PNG)".to_string())
    }
}

/// Parse image bytes into embeddable data.
pub fn load_image(data: Vec<u8>) -> Result<ImageData, String> {
    match detect_format(&data)? {
        ImageFormat::Jpeg => parse_jpeg(data),
        ImageFormat::Png => parse_png(data),
    }
}

/// JPEG data is embedded as-is (DCTDecode); only the SOF marker is read
/// for dimensions and component count.
fn parse_jpeg(data: Vec<u8>) -> Result<ImageData, String> {
    let (width, height, components) = jpeg_dimensions(&data)?;
    let color_space = match components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRgb,
        n => return Err(format!("unsupported JPEG component count: {}", n)),
    };
    Ok(ImageData {
        width,
        height,
        format: ImageFormat::Jpeg,
        color_space,
        data,
        smask_data: None,
    })
}

/// Scan for SOF0–SOF3 markers and extract width/height/components.
fn jpeg_dimensions(data: &[u8]) -> Result<(u32, u32, u8), String> {
    let len = data.len();
    let mut i = 0;
    while i + 1 < len {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        if (0xC0..=0xC3).contains(&marker) {
            if i + 9 >= len {
                return Err("JPEG SOF marker truncated".to_string());
            }
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Ok((width, height, data[i + 9]));
        }
        if marker == 0xFF || marker == 0x00 {
            i += 1;
        } else if marker == 0xD8 || marker == 0xD9 || (0xD0..=0xD7).contains(&marker) {
            // Standalone markers carry no length field.
            i += 2;
        } else {
            if i + 3 >= len {
                break;
            }
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        }
    }
    Err("no SOF marker found in JPEG data".to_string())
}

/// Decode a PNG with the `png` crate, splitting alpha into an SMask.
fn parse_png(data: Vec<u8>) -> Result<ImageData, String> {
    let decoder = png::Decoder::new(data.as_slice());
    let mut reader = decoder
        .read_info()
        .map_err(|e| format!("PNG decode error: {}", e))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| format!("PNG frame error: {}", e))?;
    buf.truncate(info.buffer_size());

    let (width, height) = (info.width, info.height);
    let pixel_count = (width * height) as usize;

    let build = |color_space, data, smask_data| ImageData {
        width,
        height,
        format: ImageFormat::Png,
        color_space,
        data,
        smask_data,
    };

    match info.color_type {
        png::ColorType::Rgb => Ok(build(ColorSpace::DeviceRgb, buf, None)),
        png::ColorType::Grayscale => Ok(build(ColorSpace::DeviceGray, buf, None)),
        png::ColorType::Rgba => {
            let mut rgb = Vec::with_capacity(pixel_count * 3);
            let mut alpha = Vec::with_capacity(pixel_count);
            for px in buf.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
                alpha.push(px[3]);
            }
            Ok(build(ColorSpace::DeviceRgb, rgb, Some(alpha)))
        }
        png::ColorType::GrayscaleAlpha => {
            let mut gray = Vec::with_capacity(pixel_count);
            let mut alpha = Vec::with_capacity(pixel_count);
            for px in buf.chunks_exact(2) {
                gray.push(px[0]);
                alpha.push(px[1]);
            }
            Ok(build(ColorSpace::DeviceGray, gray, Some(alpha)))
        }
        other => Err(format!("unsupported PNG color type: {:?}", other)),
    }
}

/// Compute where an image lands inside `rect` for the given fit mode.
/// `Fit` centers the scaled image within the rect.
pub fn calculate_placement(img_w: u32, img_h: u32, rect: &Rect, fit: ImageFit) -> ImagePlacement {
    let iw = img_w as f64;
    let ih = img_h as f64;
    match fit {
        ImageFit::Fit => {
            let scale = (rect.width / iw).min(rect.height / ih);
            let w = iw * scale;
            let h = ih * scale;
            ImagePlacement {
                x: rect.x + (rect.width - w) / 2.0,
                y: rect.bottom() + (rect.height - h) / 2.0,
                width: w,
                height: h,
            }
        }
        ImageFit::Stretch => ImagePlacement {
            x: rect.x,
            y: rect.bottom(),
            width: rect.width,
            height: rect.height,
        },
    }
}
