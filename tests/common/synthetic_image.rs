use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{Rgb, RgbImage};
use marker_scale::image::io::encode_png;
use marker_scale::synthetic::{render_scene, SceneSpec};

/// Default 400x300 scene with one 80 px marker, rotated by `rotation_deg`.
pub fn marker_scene(rotation_deg: f32) -> RgbImage {
    render_scene(&SceneSpec {
        rotation_deg,
        ..SceneSpec::default()
    })
    .expect("scene renders")
}

/// Uniform image of the given colour.
pub fn blank_rgb(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

/// Black squares with no code inside; a detector must reject all of them.
pub fn plain_squares(width: u32, height: u32) -> RgbImage {
    let mut img = blank_rgb(width, height, 255);
    for (ox, oy, side) in [(40u32, 40u32, 60u32), (200, 80, 90)] {
        for y in oy..oy + side {
            for x in ox..ox + side {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
    }
    img
}

/// PNG-encode and base64 the image, optionally with a data-URI header.
pub fn png_base64(img: &RgbImage, data_uri: bool) -> String {
    let png = encode_png(img).expect("png encodes");
    let encoded = STANDARD.encode(png);
    if data_uri {
        format!("data:image/png;base64,{encoded}")
    } else {
        encoded
    }
}
