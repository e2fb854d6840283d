use std::io::Cursor;

use super::*;

fn png_bytes(img: image::DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 128u8]).unwrap();
    let buf = png_bytes(image::DynamicImage::ImageRgba8(img));

    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
    assert!(decode_depth_map(b"").is_err());
}

#[test]
fn depth_map_keeps_luma_layout() {
    let img = image::GrayImage::from_raw(2, 2, vec![0, 255, 255, 0]).unwrap();
    let buf = png_bytes(image::DynamicImage::ImageLuma8(img));

    let depth = decode_depth_map(&buf).unwrap();
    assert_eq!((depth.width(), depth.height()), (2, 2));
    assert_eq!(depth.data(), &[0, 255, 255, 0]);
}

#[test]
fn unpremultiply_restores_straight_alpha() {
    let mut px = vec![64u8, 32, 0, 128, 10, 20, 30, 255, 9, 9, 9, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[128, 64, 0, 128]);
    assert_eq!(&px[4..8], &[10, 20, 30, 255]);
    assert_eq!(&px[8..], &[9, 9, 9, 0]);
}
