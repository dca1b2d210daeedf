pub mod f32;
pub mod gray;
pub mod io;
pub mod rgb8;
pub mod traits;
pub mod u8;

pub use self::f32::ImageF32;
pub use self::gray::{luma, mean_intensity, to_grayscale, GrayImageU8};
pub use self::rgb8::ImageRgb8;
pub use self::traits::{ImageView, ImageViewMut, Rows};
pub use self::u8::ImageU8;
