pub mod bitmap_text;
pub mod gif_caption_renderer;
