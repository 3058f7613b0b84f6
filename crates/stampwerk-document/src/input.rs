// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input normalization — turn a PDF or an image file into an ordered list of
// RGB pages. Every frame of an animated image and every page of a multi-page
// TIFF becomes its own page.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{
    AnimationDecoder, DynamicImage, Frames, GrayImage, ImageBuffer, ImageFormat, ImageReader,
    Luma, LumaA, Rgb, RgbImage, Rgba, RgbaImage,
};
use stampwerk_core::error::{Result, StampError};
use tiff::ColorType as TiffColorType;
use tiff::decoder::{Decoder as TiffDecoder, DecodingResult};
use tracing::{debug, info, instrument, warn};

use crate::pdf::PdfRasterizer;

/// How an input file is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Image,
}

impl InputKind {
    /// `.pdf` (any case) is a PDF; anything else is handed to the image decoder.
    pub fn detect(path: &Path) -> Self {
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf { Self::Pdf } else { Self::Image }
    }
}

/// Decode `path` into pages. PDFs are rasterized at `dpi`.
#[instrument(skip_all, fields(path = %path.display(), dpi = dpi))]
pub fn load_pages(path: &Path, dpi: f32) -> Result<Vec<RgbImage>> {
    let kind = InputKind::detect(path);
    let pages = match kind {
        InputKind::Pdf => PdfRasterizer::new(dpi)?.rasterize_file(path)?,
        InputKind::Image => decode_image_frames(path)?,
    };

    if pages.is_empty() {
        return Err(StampError::EmptyDocument(format!(
            "{} contains no pages",
            path.display()
        )));
    }

    info!(?kind, pages = pages.len(), "Input decoded");
    Ok(pages)
}

/// Decode an image file, one page per animation frame or TIFF page. Still
/// images and single-frame files give one page.
pub fn decode_image_frames(path: &Path) -> Result<Vec<RgbImage>> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let Some(format) = reader.format() else {
        return Err(StampError::UnsupportedInput(format!(
            "{}: not a PDF or a recognised image format",
            path.display()
        )));
    };
    debug!(?format, "Image format detected");

    let frames = match format {
        ImageFormat::Gif => {
            let decoder = GifDecoder::new(open_buffered(path)?).map_err(image_error)?;
            collect_frames(decoder.into_frames())
        }
        ImageFormat::Png => {
            let decoder = PngDecoder::new(open_buffered(path)?).map_err(image_error)?;
            if decoder.is_apng().map_err(image_error)? {
                collect_frames(decoder.apng().map_err(image_error)?.into_frames())
            } else {
                Vec::new()
            }
        }
        ImageFormat::WebP => {
            let decoder = WebPDecoder::new(open_buffered(path)?).map_err(image_error)?;
            if decoder.has_animation() {
                collect_frames(decoder.into_frames())
            } else {
                Vec::new()
            }
        }
        ImageFormat::Tiff => collect_tiff_pages(path)?,
        _ => Vec::new(),
    };

    if !frames.is_empty() {
        return Ok(frames);
    }

    let still = reader.decode().map_err(image_error)?;
    Ok(vec![still.to_rgb8()])
}

fn open_buffered(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

fn image_error(err: image::ImageError) -> StampError {
    StampError::ImageError(err.to_string())
}

// A broken frame ends the sequence; earlier frames are kept.
fn collect_frames(frames: Frames<'_>) -> Vec<RgbImage> {
    let mut pages = Vec::new();
    for (index, frame) in frames.enumerate() {
        match frame {
            Ok(frame) => pages.push(DynamicImage::ImageRgba8(frame.into_buffer()).to_rgb8()),
            Err(err) => {
                warn!(frame = index, %err, "Frame decode failed, stopping");
                break;
            }
        }
    }
    pages
}

// Same rule as animation frames: a page that fails ends the document.
fn collect_tiff_pages(path: &Path) -> Result<Vec<RgbImage>> {
    let mut decoder = TiffDecoder::new(open_buffered(path)?).map_err(tiff_error)?;
    let mut pages = Vec::new();

    loop {
        match read_tiff_page(&mut decoder) {
            Ok(page) => pages.push(page),
            Err(err) => {
                warn!(page = pages.len(), %err, "TIFF page decode failed, stopping");
                break;
            }
        }
        if !decoder.more_images() {
            break;
        }
        if let Err(err) = decoder.next_image() {
            warn!(page = pages.len(), %err, "TIFF directory unreadable, stopping");
            break;
        }
    }

    debug!(pages = pages.len(), "TIFF pages decoded");
    Ok(pages)
}

fn read_tiff_page<R: Read + Seek>(decoder: &mut TiffDecoder<R>) -> Result<RgbImage> {
    let (width, height) = decoder.dimensions().map_err(tiff_error)?;
    let colortype = decoder.colortype().map_err(tiff_error)?;
    let data = decoder.read_image().map_err(tiff_error)?;

    let image = match (colortype, data) {
        (TiffColorType::Gray(8), DecodingResult::U8(buf)) => {
            GrayImage::from_raw(width, height, buf).map(DynamicImage::ImageLuma8)
        }
        (TiffColorType::GrayA(8), DecodingResult::U8(buf)) => {
            ImageBuffer::<LumaA<u8>, _>::from_raw(width, height, buf).map(DynamicImage::ImageLumaA8)
        }
        (TiffColorType::RGB(8), DecodingResult::U8(buf)) => {
            RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8)
        }
        (TiffColorType::RGBA(8), DecodingResult::U8(buf)) => {
            RgbaImage::from_raw(width, height, buf).map(DynamicImage::ImageRgba8)
        }
        (TiffColorType::Gray(16), DecodingResult::U16(buf)) => {
            ImageBuffer::<Luma<u16>, _>::from_raw(width, height, buf).map(DynamicImage::ImageLuma16)
        }
        (TiffColorType::RGB(16), DecodingResult::U16(buf)) => {
            ImageBuffer::<Rgb<u16>, _>::from_raw(width, height, buf).map(DynamicImage::ImageRgb16)
        }
        (TiffColorType::RGBA(16), DecodingResult::U16(buf)) => {
            ImageBuffer::<Rgba<u16>, _>::from_raw(width, height, buf).map(DynamicImage::ImageRgba16)
        }
        (other, _) => {
            return Err(StampError::UnsupportedInput(format!(
                "TIFF colour type {:?}",
                other
            )));
        }
    };

    image.map(|page| page.to_rgb8()).ok_or_else(|| {
        StampError::ImageError(format!(
            "TIFF page buffer does not match {}x{}",
            width, height
        ))
    })
}

fn tiff_error(err: tiff::TiffError) -> StampError {
    StampError::ImageError(err.to_string())
}
