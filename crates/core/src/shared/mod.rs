pub mod constants;
pub mod frame;
pub mod model_resolver;
pub mod time_span;
pub mod video_metadata;
