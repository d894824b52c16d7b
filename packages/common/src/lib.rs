pub mod config;
pub mod display_order;
pub mod photo_source;
pub mod retry;
pub mod storage;

pub use display_order::{DEFAULT_DISPLAY_ORDER, extract_display_order, is_image_file};
pub use photo_source::PhotoSource;
