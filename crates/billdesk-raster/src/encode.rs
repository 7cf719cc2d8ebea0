//! Lossless image encoding of captured bitmaps.
//!
//! [`to_image`] turns a [`Bitmap`] into PNG bytes. A [`PngImage`] can be
//! carried around as bytes or as a `data:image/png;base64,...` URI.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tiny_skia::Pixmap;

use crate::bitmap::Bitmap;
use crate::error::{RasterError, RasterResult};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A PNG-encoded image with its pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PngImage {
    /// Wrap existing PNG bytes, validating them by decoding.
    pub fn from_png_bytes(data: Vec<u8>) -> RasterResult<Self> {
        let pixmap = Pixmap::decode_png(&data)
            .map_err(|e| RasterError::Failed(format!("invalid PNG data: {e}")))?;
        Ok(Self {
            width: pixmap.width(),
            height: pixmap.height(),
            data,
        })
    }

    /// Parse a `data:image/png;base64,...` URI.
    pub fn from_data_uri(uri: &str) -> RasterResult<Self> {
        let bytes = decode_data_uri(uri).map_err(RasterError::Failed)?;
        Self::from_png_bytes(bytes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw PNG bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// The image as a `data:image/png;base64,...` URI.
    pub fn to_data_uri(&self) -> String {
        format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(&self.data))
    }

    /// Decode back into premultiplied pixels.
    pub fn decode(&self) -> RasterResult<Pixmap> {
        Pixmap::decode_png(&self.data)
            .map_err(|e| RasterError::Failed(format!("invalid PNG data: {e}")))
    }
}

/// Encode `bitmap` as PNG.
pub fn to_image(bitmap: &Bitmap) -> RasterResult<PngImage> {
    let data = bitmap
        .as_pixmap()
        .encode_png()
        .map_err(|e| RasterError::Failed(format!("PNG encoding failed: {e}")))?;
    Ok(PngImage {
        width: bitmap.width(),
        height: bitmap.height(),
        data,
    })
}

/// Extract the payload of a `data:` URI.
///
/// Base64 payloads (`;base64,`) are decoded; other payloads are returned as
/// their raw bytes.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, String> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URI".to_string())?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URI has no payload".to_string())?;
    if meta.ends_with(";base64") {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| format!("invalid base64 in data URI: {e}"))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32) -> Bitmap {
        let mut pixmap = Pixmap::new(width, height).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(200, 100, 50, 255));
        Bitmap::from_pixmap(pixmap)
    }

    #[test]
    fn to_image_produces_png_signature() {
        let png = to_image(&solid(8, 5)).unwrap();
        assert_eq!(&png.data()[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!((png.width(), png.height()), (8, 5));
    }

    #[test]
    fn encoding_is_lossless() {
        let bitmap = solid(3, 3);
        let png = to_image(&bitmap).unwrap();
        let decoded = png.decode().unwrap();
        assert_eq!(&decoded, bitmap.as_pixmap());
    }

    #[test]
    fn data_uri_has_png_prefix_and_parses_back() {
        let png = to_image(&solid(2, 2)).unwrap();
        let uri = png.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,iVBOR"));
        assert_eq!(PngImage::from_data_uri(&uri).unwrap(), png);
    }

    #[test]
    fn from_png_bytes_rejects_garbage() {
        let err = PngImage::from_png_bytes(b"not a png".to_vec()).unwrap_err();
        assert!(matches!(err, RasterError::Failed(_)));
    }

    #[test]
    fn decode_data_uri_variants() {
        assert_eq!(decode_data_uri("data:text/plain,hi").unwrap(), b"hi");
        assert_eq!(
            decode_data_uri("data:application/octet-stream;base64,AAEC").unwrap(),
            vec![0, 1, 2]
        );
        assert!(decode_data_uri("https://example.com").is_err());
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
    }
}
