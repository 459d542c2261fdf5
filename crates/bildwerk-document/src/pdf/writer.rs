// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — builds a multi-page PDF with `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. The writer keeps the ops of the page in progress and
// flushes them into a `PdfPage` whenever a new page starts.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

use ::image::{ColorType, ImageDecoder, ImageFormat, ImageReader};
use bildwerk_core::error::BildwerkError;
use bildwerk_core::{OutputFormat, Rotation};
use printpdf::{
    BuiltinFont, CurTransMat, DictItem, ExternalStream, ExternalXObject, ImageCompression,
    ImageOptimizationOptions, LinePoint, Mm, Op, PaintMode, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Point, Polygon, PolygonRing, Pt, RawImage, RawImageData, RawImageFormat, TextItem,
    WindingOrder, XObjectId, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::traits::PageWriter;

/// Resolution PNG rasters are declared at, so one pixel maps to one point
/// before the unit-square scale is applied.
const EMBED_DPI: f32 = 72.0;

/// Ops of the page currently being drawn.
struct OpenPage {
    width_mm: f32,
    height_mm: f32,
    ops: Vec<Op>,
}

/// [`PageWriter`] producing a PDF document.
///
/// Page coordinates arrive in millimetres from the top-left corner and are
/// converted to PDF user space (points from the bottom-left) here.
pub struct PdfWriter {
    doc: PdfDocument,
    pages: Vec<PdfPage>,
    current: Option<OpenPage>,
}

impl PdfWriter {
    /// Create a writer whose document carries `title` in its metadata.
    pub fn new(title: &str) -> Self {
        Self {
            doc: PdfDocument::new(title),
            pages: Vec::new(),
            current: None,
        }
    }

    /// Number of pages started so far.
    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(self.current.is_some())
    }

    /// Finalize and write the document directly to a file.
    pub fn write_to_file(&mut self, path: impl AsRef<Path>) -> Result<(), BildwerkError> {
        let bytes = self.finalize()?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }

    fn page_mut(&mut self) -> Result<&mut OpenPage, BildwerkError> {
        self.current
            .as_mut()
            .ok_or_else(|| BildwerkError::Pdf("no page in progress".into()))
    }

    fn flush_page(&mut self) {
        if let Some(page) = self.current.take() {
            self.pages
                .push(PdfPage::new(Mm(page.width_mm), Mm(page.height_mm), page.ops));
        }
    }

    /// Embed encoded JPEG bytes unchanged as a `DCTDecode` image stream.
    fn embed_jpeg(&mut self, data: &[u8]) -> Result<(XObjectId, u32, u32), BildwerkError> {
        let decoder = ImageReader::with_format(Cursor::new(data), ImageFormat::Jpeg)
            .into_decoder()
            .map_err(|err| BildwerkError::Pdf(format!("unreadable JPEG header: {}", err)))?;
        let (width, height) = decoder.dimensions();
        let color_space = match decoder.color_type() {
            ColorType::L8 | ColorType::L16 => "DeviceGray",
            _ => "DeviceRGB",
        };

        let name = |value: &str| DictItem::Name(value.as_bytes().to_vec());
        let dict = BTreeMap::from([
            ("Type".to_string(), name("XObject")),
            ("Subtype".to_string(), name("Image")),
            ("Width".to_string(), DictItem::Int(i64::from(width))),
            ("Height".to_string(), DictItem::Int(i64::from(height))),
            ("ColorSpace".to_string(), name(color_space)),
            ("BitsPerComponent".to_string(), DictItem::Int(8)),
            ("Filter".to_string(), name("DCTDecode")),
        ]);
        let id = self.doc.add_xobject(&ExternalXObject {
            stream: ExternalStream {
                dict,
                content: data.to_vec(),
                compress: false,
            },
            width: None,
            height: None,
            dpi: None,
        });
        Ok((id, width, height))
    }

    /// Decode a PNG to raw samples, keeping its alpha channel as a soft mask.
    fn embed_png(&mut self, data: &[u8]) -> Result<(XObjectId, u32, u32), BildwerkError> {
        let decoded = ::image::load_from_memory_with_format(data, ImageFormat::Png)
            .map_err(|err| BildwerkError::Pdf(format!("failed to decode PNG for PDF: {}", err)))?;
        let (width, height) = (decoded.width(), decoded.height());
        let (pixels, data_format) = if decoded.color().has_alpha() {
            (decoded.to_rgba8().into_raw(), RawImageFormat::RGBA8)
        } else {
            (decoded.to_rgb8().into_raw(), RawImageFormat::RGB8)
        };
        let id = self.doc.add_image(&RawImage {
            pixels: RawImageData::U8(pixels),
            width: width as usize,
            height: height as usize,
            data_format,
            tag: Vec::new(),
        });
        Ok((id, width, height))
    }
}

/// Matrix mapping the unit image square onto a `w` by `h` point box with its
/// bottom-left corner at (`x`, `y`), turned clockwise by `rotation`.
fn placement_matrix(rotation: Rotation, x: f32, y: f32, w: f32, h: f32) -> [f32; 6] {
    match rotation {
        Rotation::Deg0 => [w, 0.0, 0.0, h, x, y],
        Rotation::Deg90 => [0.0, -h, w, 0.0, x, y + h],
        Rotation::Deg180 => [-w, 0.0, 0.0, -h, x + w, y + h],
        Rotation::Deg270 => [0.0, h, -w, 0.0, x + w, y],
    }
}

/// Transform that leaves an image drawn on the unit square. Raw images are
/// sized by printpdf from their pixel count, external ones are not.
fn unit_square(format: OutputFormat, width: u32, height: u32) -> XObjectTransform {
    match format {
        OutputFormat::Jpeg => XObjectTransform::default(),
        OutputFormat::Png => XObjectTransform {
            scale_x: Some(1.0 / width.max(1) as f32),
            scale_y: Some(1.0 / height.max(1) as f32),
            dpi: Some(EMBED_DPI),
            ..XObjectTransform::default()
        },
    }
}

/// Keep raw images lossless at full size; JPEG streams bypass this entirely.
fn save_options() -> PdfSaveOptions {
    PdfSaveOptions {
        image_optimization: Some(ImageOptimizationOptions {
            quality: None,
            max_image_size: None,
            dither_greyscale: None,
            convert_to_greyscale: Some(false),
            auto_optimize: Some(false),
            format: Some(ImageCompression::Flate),
        }),
        ..PdfSaveOptions::default()
    }
}

impl PageWriter for PdfWriter {
    fn start_page(&mut self, width_mm: f32, height_mm: f32) {
        self.flush_page();
        debug!(page = self.pages.len() + 1, width_mm, height_mm, "Starting page");
        self.current = Some(OpenPage {
            width_mm,
            height_mm,
            ops: Vec::new(),
        });
    }

    #[instrument(skip(self, data), fields(bytes_len = data.len()))]
    #[allow(clippy::too_many_arguments)]
    fn draw_image(
        &mut self,
        data: &[u8],
        format: OutputFormat,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
        rotation: Rotation,
    ) -> Result<(), BildwerkError> {
        if self.current.is_none() {
            return Err(BildwerkError::Pdf(
                "drawing requested before a page was started".into(),
            ));
        }
        let (xobject_id, width, height) = match format {
            OutputFormat::Jpeg => self.embed_jpeg(data)?,
            OutputFormat::Png => self.embed_png(data)?,
        };

        let page = self.page_mut()?;
        let bottom_mm = page.height_mm - y_mm - h_mm;
        let matrix = placement_matrix(
            rotation,
            Mm(x_mm).into_pt().0,
            Mm(bottom_mm).into_pt().0,
            Mm(w_mm).into_pt().0,
            Mm(h_mm).into_pt().0,
        );

        page.ops.push(Op::SaveGraphicsState);
        page.ops.push(Op::SetTransformationMatrix {
            matrix: CurTransMat::Raw(matrix),
        });
        page.ops.push(Op::UseXobject {
            id: xobject_id,
            transform: unit_square(format, width, height),
        });
        page.ops.push(Op::RestoreGraphicsState);

        debug!(width, height, ?rotation, "Image placed on page");
        Ok(())
    }

    fn clip_rect(&mut self, x_mm: f32, y_mm: f32, w_mm: f32, h_mm: f32) {
        let Some(page) = self.current.as_mut() else {
            warn!("clip requested before a page was started");
            return;
        };
        let top = page.height_mm - y_mm;
        let bottom = top - h_mm;
        let corner = |x: f32, y: f32| LinePoint {
            p: Point {
                x: Mm(x).into_pt(),
                y: Mm(y).into_pt(),
            },
            bezier: false,
        };

        page.ops.push(Op::SaveGraphicsState);
        page.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: vec![
                        corner(x_mm, bottom),
                        corner(x_mm + w_mm, bottom),
                        corner(x_mm + w_mm, top),
                        corner(x_mm, top),
                    ],
                }],
                mode: PaintMode::Clip,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    fn unclip(&mut self) {
        if let Some(page) = self.current.as_mut() {
            page.ops.push(Op::RestoreGraphicsState);
        }
    }

    fn draw_text(&mut self, text: &str, x_mm: f32, y_mm: f32, font_size_pt: f32) {
        let Some(page) = self.current.as_mut() else {
            warn!("text requested before a page was started");
            return;
        };
        let baseline_mm = page.height_mm - y_mm;

        page.ops.push(Op::StartTextSection);
        page.ops.push(Op::SetTextCursor {
            pos: Point {
                x: Mm(x_mm).into_pt(),
                y: Mm(baseline_mm).into_pt(),
            },
        });
        page.ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(font_size_pt),
            font: BuiltinFont::Helvetica,
        });
        page.ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(text.to_string())],
            font: BuiltinFont::Helvetica,
        });
        page.ops.push(Op::EndTextSection);
    }

    #[instrument(skip(self))]
    fn finalize(&mut self) -> Result<Vec<u8>, BildwerkError> {
        self.flush_page();
        if self.pages.is_empty() {
            return Err(BildwerkError::Pdf("document has no pages".into()));
        }

        let pages = std::mem::take(&mut self.pages);
        let page_count = pages.len();
        self.doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = self.doc.save(&save_options(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }

        info!(pages = page_count, bytes = output.len(), "PDF finalized");
        Ok(output)
    }
}
