pub mod caption_layout;
pub mod caption_renderer;
pub mod caption_style;
