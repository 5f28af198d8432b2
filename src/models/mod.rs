pub mod api;
pub mod image;
pub mod text;
pub mod thumbnail;

pub use api::*;
pub use image::*;
pub use text::*;
pub use thumbnail::*;
