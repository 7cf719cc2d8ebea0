//! Single-page PDF assembly around a captured raster.
//!
//! The image always spans the full page width and keeps its aspect ratio.
//! It is anchored at the top-left corner. An image taller than the page
//! runs off the bottom edge: it is neither clipped nor split across pages.

use billdesk_raster::PngImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat, dictionary};

use crate::error::{ExportError, ExportResult};

/// PDF points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

const IMAGE_NAME: &str = "Im0";
const PRODUCER: &str = concat!("billdesk ", env!("CARGO_PKG_VERSION"));

/// Page size in millimetres, portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageFormat {
    /// ISO A4, 210 × 297 mm.
    pub const A4: PageFormat = PageFormat {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    pub fn width_pt(&self) -> f64 {
        self.width_mm * PT_PER_MM
    }

    pub fn height_pt(&self) -> f64 {
        self.height_mm * PT_PER_MM
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::A4
    }
}

/// Where the image sits on the page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl ImagePlacement {
    /// Fit a `width_px × height_px` bitmap to the page width.
    pub fn fit_width(width_px: u32, height_px: u32, page: PageFormat) -> Self {
        let width_mm = page.width_mm;
        let height_mm = f64::from(height_px) * width_mm / f64::from(width_px);
        Self {
            x_mm: 0.0,
            y_mm: 0.0,
            width_mm,
            height_mm,
        }
    }

    /// `true` if the image extends below the bottom of `page`.
    pub fn overflows(&self, page: PageFormat) -> bool {
        self.y_mm + self.height_mm > page.height_mm
    }
}

/// A serialized one-page PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPdf {
    bytes: Vec<u8>,
    page: PageFormat,
    placement: ImagePlacement,
}

impl AssembledPdf {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn page(&self) -> PageFormat {
        self.page
    }

    pub fn placement(&self) -> ImagePlacement {
        self.placement
    }

    /// `true` if the image runs past the bottom of the page.
    pub fn overflows(&self) -> bool {
        self.placement.overflows(self.page)
    }
}

/// Assemble an A4 portrait PDF around `image`.
pub fn assemble_pdf(image: &PngImage, customer: &str) -> ExportResult<AssembledPdf> {
    assemble_pdf_on(image, customer, PageFormat::A4)
}

/// Assemble a one-page PDF of size `page` around `image`.
pub fn assemble_pdf_on(
    image: &PngImage,
    customer: &str,
    page: PageFormat,
) -> ExportResult<AssembledPdf> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::Assemble("image has no pixels".to_string()));
    }
    let placement = ImagePlacement::fit_width(image.width(), image.height(), page);
    if placement.overflows(page) {
        tracing::warn!(
            height_mm = placement.height_mm,
            page_height_mm = page.height_mm,
            "image is taller than the page; it will run off the bottom edge"
        );
    }

    let mut doc = lopdf::Document::with_version("1.5");
    let image_id = add_image(&mut doc, image)?;

    let content = placement_content(&placement, page);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let pages_id: ObjectId = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), page.width_pt().into(), page.height_pt().into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1_i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(info_dictionary(customer));
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    tracing::debug!(
        bytes = bytes.len(),
        width_mm = placement.width_mm,
        height_mm = placement.height_mm,
        "assembled PDF"
    );

    Ok(AssembledPdf {
        bytes,
        page,
        placement,
    })
}

/// Embed `image` as a DeviceRGB XObject, with a soft mask when it has
/// transparency.
fn add_image(doc: &mut lopdf::Document, image: &PngImage) -> ExportResult<ObjectId> {
    let pixmap = image
        .decode()
        .map_err(|e| ExportError::Assemble(e.to_string()))?;

    let pixel_count = pixmap.pixels().len();
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
        alpha.push(c.alpha());
    }
    let transparent = alpha.iter().any(|&a| a != u8::MAX);

    let width = i64::from(pixmap.width());
    let height = i64::from(pixmap.height());
    let mut dict = image_dictionary(width, height, "DeviceRGB");

    if transparent {
        let mut smask = Stream::new(image_dictionary(width, height, "DeviceGray"), alpha);
        smask.compress()?;
        let smask_id = doc.add_object(smask);
        dict.set("SMask", smask_id);
    }

    let mut stream = Stream::new(dict, rgb);
    stream.compress()?;
    Ok(doc.add_object(stream))
}

fn image_dictionary(width: i64, height: i64, color_space: &str) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width,
        "Height" => height,
        "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
        "BitsPerComponent" => 8_i64,
    }
}

/// Content stream drawing the image. PDF user space has its origin at the
/// bottom-left, so the top-left placement is flipped.
fn placement_content(placement: &ImagePlacement, page: PageFormat) -> Content {
    let w = placement.width_mm * PT_PER_MM;
    let h = placement.height_mm * PT_PER_MM;
    let x = placement.x_mm * PT_PER_MM;
    let y = page.height_pt() - (placement.y_mm + placement.height_mm) * PT_PER_MM;
    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    }
}

fn info_dictionary(customer: &str) -> Dictionary {
    let created = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
    let title = if customer.is_empty() {
        "Invoice".to_string()
    } else {
        format!("Invoice for {customer}")
    };
    dictionary! {
        "Title" => text_string(&title),
        "Producer" => text_string(PRODUCER),
        "CreationDate" => Object::string_literal(created),
    }
}

/// A PDF text string: literal when ASCII, UTF-16BE with a byte order mark
/// otherwise.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::string_literal(s);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
