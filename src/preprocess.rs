use std::path::Path;

use image::io::Reader as ImageReader;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

use crate::error::{AppError, Result};
use crate::models::{ChannelOrder, ModelSpec, Resize};

/// Decodes by content, so the extension does not have to match the format.
pub fn decode_file(path: &Path) -> Result<DynamicImage> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(AppError::InvalidImage)
}

/// Resizes `img` to exactly the model's input size (aspect ratio is not kept)
/// and lays it out as an NHWC tensor scaled into `[0, 1]`.
pub fn to_input_tensor(img: &DynamicImage, spec: &ModelSpec) -> Array4<f32> {
    let (src_width, src_height) = img.dimensions();
    tracing::debug!(
        "resizing {}x{} image to {}x{}",
        src_width,
        src_height,
        spec.width,
        spec.height
    );

    let rgb = img.to_rgb8();
    let resized = match spec.resize {
        Resize::Linear => resize_linear(&rgb, spec.width, spec.height),
        Resize::Nearest => resize_nearest(&rgb, spec.width, spec.height),
    };

    let (width, height) = (spec.width as usize, spec.height as usize);
    let mut tensor = Array4::zeros((1, height, width, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let ordered = match spec.channel_order {
            ChannelOrder::Rgb => [r, g, b],
            ChannelOrder::Bgr => [b, g, r],
        };
        for (c, value) in ordered.iter().enumerate() {
            tensor[[0, y as usize, x as usize, c]] = *value as f32 / 255.0;
        }
    }
    tensor
}

// (lower index, upper index, weight of upper) per output pixel, OpenCV INTER_LINEAR mapping
fn linear_taps(src_len: u32, dst_len: u32) -> Vec<(u32, u32, f32)> {
    let scale = src_len as f32 / dst_len as f32;
    let last = src_len - 1;
    (0..dst_len)
        .map(|d| {
            let pos = (d as f32 + 0.5) * scale - 0.5;
            let floor = pos.floor();
            let (i, frac) = if floor < 0.0 {
                (0, 0.0)
            } else if floor as u32 >= last {
                (last, 0.0)
            } else {
                (floor as u32, pos - floor)
            };
            (i, (i + 1).min(last), frac)
        })
        .collect()
}

fn resize_linear(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let xs = linear_taps(src.width(), width);
    let ys = linear_taps(src.height(), height);

    RgbImage::from_fn(width, height, |x, y| {
        let (x0, x1, fx) = xs[x as usize];
        let (y0, y1, fy) = ys[y as usize];
        let (p00, p10) = (src.get_pixel(x0, y0), src.get_pixel(x1, y0));
        let (p01, p11) = (src.get_pixel(x0, y1), src.get_pixel(x1, y1));

        let mut out = [0u8; 3];
        for c in 0..3 {
            let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
            let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
            out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    })
}

fn resize_nearest(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let nearest = |d: u32, src_len: u32, dst_len: u32| {
        let pos = ((d as f64 + 0.5) * src_len as f64 / dst_len as f64).floor() as u32;
        pos.min(src_len - 1)
    };

    RgbImage::from_fn(width, height, |x, y| {
        *src.get_pixel(
            nearest(x, src.width(), width),
            nearest(y, src.height(), height),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelKind;
    use image::{ImageBuffer, Rgba};
    use std::io::Write;

    fn solid(width: u32, height: u32, px: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb(px)))
    }

    fn row(values: &[u8]) -> RgbImage {
        RgbImage::from_fn(values.len() as u32, 1, |x, _| {
            let v = values[x as usize];
            Rgb([v, v, v])
        })
    }

    fn red_channel(img: &RgbImage) -> Vec<u8> {
        img.pixels().map(|p| p[0]).collect()
    }

    #[test]
    fn tensor_shape_is_nhwc() {
        let img = solid(640, 480, [10, 20, 30]);
        let tensor = to_input_tensor(&img, &ModelKind::Histopathology.spec());
        assert_eq!(tensor.shape(), &[1, 150, 150, 3]);
    }

    #[test]
    fn histopathology_keeps_rgb_order() {
        let img = solid(32, 32, [255, 0, 51]);
        let tensor = to_input_tensor(&img, &ModelKind::Histopathology.spec());
        assert_eq!(tensor[[0, 0, 0, 0]], 1.0);
        assert_eq!(tensor[[0, 0, 0, 1]], 0.0);
        assert!((tensor[[0, 0, 0, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn ct_scan_swaps_to_bgr() {
        let img = solid(32, 32, [255, 0, 51]);
        let tensor = to_input_tensor(&img, &ModelKind::CtScan.spec());
        assert!((tensor[[0, 75, 75, 0]] - 0.2).abs() < 1e-6);
        assert_eq!(tensor[[0, 75, 75, 1]], 0.0);
        assert_eq!(tensor[[0, 75, 75, 2]], 1.0);
    }

    #[test]
    fn linear_upscale_matches_opencv() {
        // cv2.resize([[0, 255]], (4, 1)) == [[0, 64, 191, 255]]
        let out = resize_linear(&row(&[0, 255]), 4, 1);
        assert_eq!(red_channel(&out), vec![0, 64, 191, 255]);
    }

    #[test]
    fn linear_downscale_does_not_blur_across_taps() {
        // columns 0,0,255,255 repeating; halving samples inside each pair
        let src = RgbImage::from_fn(300, 300, |x, _| {
            let v = if x % 4 < 2 { 0 } else { 255 };
            Rgb([v, v, v])
        });
        let tensor = to_input_tensor(&DynamicImage::ImageRgb8(src), &ModelKind::CtScan.spec());
        let values: Vec<f32> = (0..6).map(|x| tensor[[0, 75, x, 0]]).collect();
        assert_eq!(values, vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn nearest_downscale_picks_pixel_centres() {
        let out = resize_nearest(&row(&[10, 20, 30, 40]), 2, 1);
        assert_eq!(red_channel(&out), vec![20, 40]);
    }

    #[test]
    fn histopathology_upscale_keeps_checkerboard_pure() {
        let board = RgbImage::from_fn(3, 3, |x, y| {
            let v = if (x + y) % 2 == 0 { 0 } else { 255 };
            Rgb([v, v, v])
        });
        let tensor = to_input_tensor(
            &DynamicImage::ImageRgb8(board),
            &ModelKind::Histopathology.spec(),
        );
        assert!(tensor.iter().all(|v| *v == 0.0 || *v == 1.0));
        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
        assert_eq!(tensor[[0, 0, 75, 0]], 1.0);
    }

    #[test]
    fn values_are_scaled_to_unit_range() {
        let img = solid(300, 100, [128, 64, 255]);
        let tensor = to_input_tensor(&img, &ModelKind::CtScan.spec());
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn alpha_is_dropped_and_grey_is_expanded() {
        let rgba = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(8, 8, Rgba([0, 255, 0, 0])));
        let tensor = to_input_tensor(&rgba, &ModelKind::Histopathology.spec());
        assert_eq!(tensor[[0, 10, 10, 1]], 1.0);

        let grey = DynamicImage::new_luma8(8, 8);
        let tensor = to_input_tensor(&grey, &ModelKind::Histopathology.spec());
        assert_eq!(tensor.shape(), &[1, 150, 150, 3]);
        assert!(tensor.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn garbage_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a png").unwrap();
        let err = decode_file(file.path()).unwrap_err();
        assert!(matches!(err, AppError::InvalidImage(_)));
    }
}
