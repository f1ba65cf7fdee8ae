use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::RenderError;
use crate::fonts::{BuiltinFont, FontMetrics};
use crate::graphics::Color;
use crate::images::{self, ImageData, ImageFit, ImageFormat, ImageId};
use crate::objects::{ObjId, PdfObject};
use crate::table::{FitResult, Row, Table, TableCursor};
use crate::text::{Rect, TextStyle};
use crate::writer::{escape_pdf_string, PdfWriter};

const CATALOG_OBJ: ObjId = ObjId(1, 0);
const PAGES_OBJ: ObjId = ObjId(2, 0);

/// High-level API for building PDF documents.
///
/// Generic over `Write` so it works with files (`BufWriter<File>`),
/// in-memory buffers (`Vec<u8>`), or any other writer.
///
/// Pages are buffered until `end_document`: nothing touches the writer
/// before then, so a failed render never leaves a truncated file behind,
/// and `open_page` can re-open any finished page to overlay content —
/// the mechanism behind "Page X of Y" footers whose total is only known
/// once every page exists.
pub struct PdfDocument<W: Write> {
    writer: W,
    compress: bool,
    info: Vec<(String, String)>,
    pages: Vec<PageBuffer>,
    current: Option<OpenPage>,
    images: Vec<ImageData>,
    fonts_used: BTreeSet<BuiltinFont>,
}

/// A finished page: one content stream per `end_page`, in draw order.
struct PageBuffer {
    width: f64,
    height: f64,
    streams: Vec<Vec<u8>>,
    images_used: BTreeSet<usize>,
}

/// The page currently being drawn. `reopened` holds the target index
/// when the page was produced by `open_page` rather than `begin_page`.
struct OpenPage {
    reopened: Option<usize>,
    width: f64,
    height: f64,
    ops: Vec<u8>,
    images_used: BTreeSet<usize>,
}

impl PdfDocument<BufWriter<File>> {
    /// Create a new PDF document that writes to a file.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> PdfDocument<W> {
    /// Create a new PDF document over the given writer. The writer is
    /// untouched until `end_document`.
    pub fn new(writer: W) -> Self {
        PdfDocument {
            writer,
            compress: false,
            info: Vec::new(),
            pages: Vec::new(),
            current: None,
            images: Vec::new(),
            fonts_used: BTreeSet::new(),
        }
    }

    /// Set a document info entry (e.g. "Title", "Author").
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    /// Enable or disable FlateDecode compression of content streams
    /// and PNG image data. Off by default.
    pub fn set_compression(&mut self, on: bool) -> &mut Self {
        self.compress = on;
        self
    }

    /// Number of completed pages. The page currently open does not count
    /// until `end_page`.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    // ---------------------------------------------------
    // Page lifecycle
    // ---------------------------------------------------

    /// Begin a new page with the given dimensions in points.
    /// An open page is closed automatically.
    pub fn begin_page(&mut self, width: f64, height: f64) -> &mut Self {
        if self.current.is_some() {
            self.end_page();
        }
        self.current = Some(OpenPage {
            reopened: None,
            width,
            height,
            ops: Vec::new(),
            images_used: BTreeSet::new(),
        });
        self
    }

    /// Re-open a finished page (1-based) to draw overlay content on top
    /// of it. The overlay becomes an extra content stream on that page.
    pub fn open_page(&mut self, page_num: usize) -> Result<&mut Self, RenderError> {
        if self.current.is_some() {
            self.end_page();
        }
        if page_num == 0 || page_num > self.pages.len() {
            return Err(RenderError::PageOutOfRange {
                requested: page_num,
                available: self.pages.len(),
            });
        }
        let idx = page_num - 1;
        self.current = Some(OpenPage {
            reopened: Some(idx),
            width: self.pages[idx].width,
            height: self.pages[idx].height,
            ops: Vec::new(),
            images_used: BTreeSet::new(),
        });
        Ok(self)
    }

    /// Finish the current page.
    pub fn end_page(&mut self) {
        let page = self
            .current
            .take()
            .expect("end_page called with no open page");
        match page.reopened {
            Some(idx) => {
                // Empty overlays leave the page untouched.
                if !page.ops.is_empty() {
                    self.pages[idx].streams.push(page.ops);
                }
                self.pages[idx].images_used.extend(page.images_used);
            }
            None => self.pages.push(PageBuffer {
                width: page.width,
                height: page.height,
                streams: vec![page.ops],
                images_used: page.images_used,
            }),
        }
    }

    fn page(&mut self, op: &'static str) -> &mut OpenPage {
        match self.current.as_mut() {
            Some(page) => page,
            None => panic!("{} called with no open page", op),
        }
    }

    fn emit(&mut self, op: &'static str, ops: String) -> &mut Self {
        self.page(op).ops.extend_from_slice(ops.as_bytes());
        self
    }

    // ---------------------------------------------------
    // Text
    // ---------------------------------------------------

    /// Place text at (x, y) using default 12pt Helvetica.
    /// Coordinates use PDF's bottom-left origin; y is the baseline.
    pub fn place_text(&mut self, text: &str, x: f64, y: f64) -> &mut Self {
        self.place_text_styled(text, x, y, &TextStyle::default())
    }

    /// Place text at (x, y) with an explicit font and size.
    pub fn place_text_styled(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) -> &mut Self {
        self.fonts_used.insert(style.font);
        let ops = format!(
            "BT\n/{} {} Tf\n{} {} Td\n({}) Tj\nET\n",
            style.font.pdf_name(),
            format_coord(style.font_size),
            format_coord(x),
            format_coord(y),
            escape_pdf_string(text),
        );
        self.emit("place_text", ops)
    }

    /// Place text so its right edge lands on `right_x`.
    pub fn place_text_right(&mut self, text: &str, right_x: f64, y: f64, style: &TextStyle) -> &mut Self {
        let width = FontMetrics::measure_text(text, style.font, style.font_size);
        self.place_text_styled(text, right_x - width, y, style)
    }

    /// Place text horizontally centered on `center_x`.
    pub fn place_text_centered(&mut self, text: &str, center_x: f64, y: f64, style: &TextStyle) -> &mut Self {
        let width = FontMetrics::measure_text(text, style.font, style.font_size);
        self.place_text_styled(text, center_x - width / 2.0, y, style)
    }

    // ---------------------------------------------------
    // Graphics
    // ---------------------------------------------------

    pub fn save_state(&mut self) -> &mut Self {
        self.emit("save_state", "q\n".to_string())
    }

    pub fn restore_state(&mut self) -> &mut Self {
        self.emit("restore_state", "Q\n".to_string())
    }

    pub fn set_fill_color(&mut self, color: Color) -> &mut Self {
        let ops = format!(
            "{} {} {} rg\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b),
        );
        self.emit("set_fill_color", ops)
    }

    pub fn set_stroke_color(&mut self, color: Color) -> &mut Self {
        let ops = format!(
            "{} {} {} RG\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b),
        );
        self.emit("set_stroke_color", ops)
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.emit("set_line_width", format!("{} w\n", format_coord(width)))
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.emit("move_to", format!("{} {} m\n", format_coord(x), format_coord(y)))
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.emit("line_to", format!("{} {} l\n", format_coord(x), format_coord(y)))
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.emit("close_path", "h\n".to_string())
    }

    /// Append a rectangle to the current path. (x, y) is the bottom-left.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        let ops = format!(
            "{} {} {} {} re\n",
            format_coord(x),
            format_coord(y),
            format_coord(width),
            format_coord(height),
        );
        self.emit("rect", ops)
    }

    /// Append a rounded rectangle to the current path. (x, y) is the
    /// bottom-left; `radius` is clamped to half the shorter side.
    pub fn round_rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64) -> &mut Self {
        let r = radius.min(width / 2.0).min(height / 2.0);
        let k = BEZIER_CIRCLE_K * r;
        let (x1, y1) = (x + width, y + height);
        let mut ops = String::new();
        ops.push_str(&format!("{} {} m\n", format_coord(x + r), format_coord(y)));
        ops.push_str(&format!("{} {} l\n", format_coord(x1 - r), format_coord(y)));
        ops.push_str(&curve(x1 - r + k, y, x1, y + r - k, x1, y + r));
        ops.push_str(&format!("{} {} l\n", format_coord(x1), format_coord(y1 - r)));
        ops.push_str(&curve(x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1));
        ops.push_str(&format!("{} {} l\n", format_coord(x + r), format_coord(y1)));
        ops.push_str(&curve(x + r - k, y1, x, y1 - r + k, x, y1 - r));
        ops.push_str(&format!("{} {} l\n", format_coord(x), format_coord(y + r)));
        ops.push_str(&curve(x, y + r - k, x + r - k, y, x + r, y));
        ops.push_str("h\n");
        self.emit("round_rect", ops)
    }

    /// Append a circle of radius `r` around (cx, cy) to the current path.
    pub fn circle(&mut self, cx: f64, cy: f64, r: f64) -> &mut Self {
        let k = BEZIER_CIRCLE_K * r;
        let mut ops = String::new();
        ops.push_str(&format!("{} {} m\n", format_coord(cx + r), format_coord(cy)));
        ops.push_str(&curve(cx + r, cy + k, cx + k, cy + r, cx, cy + r));
        ops.push_str(&curve(cx - k, cy + r, cx - r, cy + k, cx - r, cy));
        ops.push_str(&curve(cx - r, cy - k, cx - k, cy - r, cx, cy - r));
        ops.push_str(&curve(cx + k, cy - r, cx + r, cy - k, cx + r, cy));
        ops.push_str("h\n");
        self.emit("circle", ops)
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.emit("stroke", "S\n".to_string())
    }

    pub fn fill(&mut self) -> &mut Self {
        self.emit("fill", "f\n".to_string())
    }

    pub fn fill_stroke(&mut self) -> &mut Self {
        self.emit("fill_stroke", "B\n".to_string())
    }

    // ---------------------------------------------------
    // Tables
    // ---------------------------------------------------

    /// Fit a single table row at the cursor position on the current page.
    /// See `TableCursor` for the multi-page streaming pattern.
    pub fn fit_row(&mut self, table: &Table, row: &Row, cursor: &mut TableCursor) -> FitResult {
        let (ops, result, fonts) = table.generate_row_ops(row, cursor);
        self.fonts_used.extend(fonts);
        let page = self.page("fit_row");
        page.ops.extend_from_slice(&ops);
        result
    }

    // ---------------------------------------------------
    // Images
    // ---------------------------------------------------

    /// Decode PNG or JPEG bytes into a document image.
    pub fn load_image_bytes(&mut self, data: Vec<u8>) -> Result<ImageId, RenderError> {
        let image = images::load_image(data).map_err(RenderError::Image)?;
        self.images.push(image);
        Ok(ImageId(self.images.len() - 1))
    }

    /// Read and decode an image file.
    pub fn load_image_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ImageId, RenderError> {
        let data = std::fs::read(path)?;
        self.load_image_bytes(data)
    }

    /// Draw a loaded image into `rect` on the current page.
    pub fn place_image(&mut self, image: ImageId, rect: &Rect, fit: ImageFit) -> &mut Self {
        let img = &self.images[image.0];
        let placement = images::calculate_placement(img.width, img.height, rect, fit);
        let ops = format!(
            "q\n{} 0 0 {} {} {} cm\n/Im{} Do\nQ\n",
            format_coord(placement.width),
            format_coord(placement.height),
            format_coord(placement.x),
            format_coord(placement.y),
            image.0 + 1,
        );
        let page = self.page("place_image");
        page.images_used.insert(image.0);
        page.ops.extend_from_slice(ops.as_bytes());
        self
    }

    // ---------------------------------------------------
    // Serialization
    // ---------------------------------------------------

    /// Serialize the whole document and return the inner writer.
    /// Consumes self — no further operations are possible.
    pub fn end_document(mut self) -> Result<W, RenderError> {
        if self.current.is_some() {
            self.end_page();
        }

        let compress = self.compress;
        let mut writer = PdfWriter::new(self.writer);
        writer.write_header()?;

        let mut next_obj = 3u32;
        let mut alloc = move || {
            let id = ObjId(next_obj, 0);
            next_obj += 1;
            id
        };

        // Font objects for every face used anywhere in the document.
        let mut font_refs: Vec<(BuiltinFont, ObjId)> = Vec::new();
        for font in &self.fonts_used {
            let id = alloc();
            let dict = PdfObject::dict(vec![
                ("Type", PdfObject::name("Font")),
                ("Subtype", PdfObject::name("Type1")),
                ("BaseFont", PdfObject::name(font.pdf_base_name())),
                ("Encoding", PdfObject::name("WinAnsiEncoding")),
            ]);
            writer.write_object(id, &dict)?;
            font_refs.push((*font, id));
        }

        // Image XObjects (alpha channels become SMask streams).
        let mut image_refs: Vec<ObjId> = Vec::new();
        for img in &self.images {
            let smask_id = match &img.smask_data {
                Some(alpha) => {
                    let id = alloc();
                    let (filter, data) = encode_stream(compress, alpha)?;
                    let mut dict = vec![
                        ("Type", PdfObject::name("XObject")),
                        ("Subtype", PdfObject::name("Image")),
                        ("Width", PdfObject::Integer(img.width as i64)),
                        ("Height", PdfObject::Integer(img.height as i64)),
                        ("ColorSpace", PdfObject::name("DeviceGray")),
                        ("BitsPerComponent", PdfObject::Integer(8)),
                    ];
                    if let Some(name) = filter {
                        dict.push(("Filter", PdfObject::name(name)));
                    }
                    writer.write_object(id, &PdfObject::stream(dict, data))?;
                    Some(id)
                }
                None => None,
            };

            let id = alloc();
            let (filter, data) = match img.format {
                ImageFormat::Jpeg => (Some("DCTDecode"), img.data.clone()),
                ImageFormat::Png => encode_stream(compress, &img.data)?,
            };
            let mut dict = vec![
                ("Type", PdfObject::name("XObject")),
                ("Subtype", PdfObject::name("Image")),
                ("Width", PdfObject::Integer(img.width as i64)),
                ("Height", PdfObject::Integer(img.height as i64)),
                ("ColorSpace", PdfObject::name(img.color_space.pdf_name())),
                ("BitsPerComponent", PdfObject::Integer(8)),
            ];
            if let Some(name) = filter {
                dict.push(("Filter", PdfObject::name(name)));
            }
            let mut dict: Vec<(String, PdfObject)> = dict
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect();
            if let Some(smask) = smask_id {
                dict.push(("SMask".to_string(), PdfObject::Reference(smask)));
            }
            writer.write_object(id, &PdfObject::Stream { dict, data })?;
            image_refs.push(id);
        }

        // Pages: content stream(s) followed by the page dictionary.
        let mut page_ids: Vec<ObjId> = Vec::new();
        for page in &self.pages {
            let mut content_ids: Vec<ObjId> = Vec::new();
            for stream in &page.streams {
                let id = alloc();
                let (filter, data) = encode_stream(compress, stream)?;
                let dict = match filter {
                    Some(name) => vec![("Filter", PdfObject::name(name))],
                    None => vec![],
                };
                writer.write_object(id, &PdfObject::stream(dict, data))?;
                content_ids.push(id);
            }

            let contents = if content_ids.len() == 1 {
                PdfObject::Reference(content_ids[0])
            } else {
                PdfObject::Array(content_ids.iter().map(|id| PdfObject::Reference(*id)).collect())
            };

            let mut resources: Vec<(String, PdfObject)> = vec![(
                "Font".to_string(),
                PdfObject::Dictionary(
                    font_refs
                        .iter()
                        .map(|(f, id)| (f.pdf_name().to_string(), PdfObject::Reference(*id)))
                        .collect(),
                ),
            )];
            if !page.images_used.is_empty() {
                resources.push((
                    "XObject".to_string(),
                    PdfObject::Dictionary(
                        page.images_used
                            .iter()
                            .map(|&idx| {
                                (format!("Im{}", idx + 1), PdfObject::Reference(image_refs[idx]))
                            })
                            .collect(),
                    ),
                ));
            }

            let page_id = alloc();
            let dict = PdfObject::dict(vec![
                ("Type", PdfObject::name("Page")),
                ("Parent", PdfObject::Reference(PAGES_OBJ)),
                (
                    "MediaBox",
                    PdfObject::array(vec![
                        PdfObject::Integer(0),
                        PdfObject::Integer(0),
                        PdfObject::Real(page.width),
                        PdfObject::Real(page.height),
                    ]),
                ),
                ("Contents", contents),
                ("Resources", PdfObject::Dictionary(resources)),
            ]);
            writer.write_object(page_id, &dict)?;
            page_ids.push(page_id);
        }

        // Pages tree and catalog.
        let kids: Vec<PdfObject> = page_ids.iter().map(|id| PdfObject::Reference(*id)).collect();
        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            ("Kids", PdfObject::Array(kids)),
            ("Count", PdfObject::Integer(page_ids.len() as i64)),
        ]);
        writer.write_object(PAGES_OBJ, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Reference(PAGES_OBJ)),
        ]);
        writer.write_object(CATALOG_OBJ, &catalog)?;

        let info_id = if self.info.is_empty() {
            None
        } else {
            let id = alloc();
            let entries: Vec<(&str, PdfObject)> = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), PdfObject::literal_string(v)))
                .collect();
            writer.write_object(id, &PdfObject::dict(entries))?;
            Some(id)
        };

        writer.write_xref_and_trailer(CATALOG_OBJ, info_id)?;
        Ok(writer.into_inner())
    }
}

/// Compress a raw stream when compression is on. Returns the filter
/// name to declare (if any) and the bytes to embed.
fn encode_stream(compress: bool, data: &[u8]) -> io::Result<(Option<&'static str>, Vec<u8>)> {
    if !compress {
        return Ok((None, data.to_vec()));
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok((Some("FlateDecode"), encoder.finish()?))
}

/// Kappa for approximating a quarter circle with one cubic Bézier.
const BEZIER_CIRCLE_K: f64 = 0.552_284_749_831;

fn curve(x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> String {
    format!(
        "{} {} {} {} {} {} c\n",
        format_coord(x1),
        format_coord(y1),
        format_coord(x2),
        format_coord(y2),
        format_coord(x3),
        format_coord(y3),
    )
}

/// Format a coordinate value for content streams.
pub(crate) fn format_coord(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
