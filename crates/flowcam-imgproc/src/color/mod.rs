mod gray;
mod rgba;

pub use gray::gray_from_bgr_u8;
pub use rgba::bgra_from_rgba_inplace;
