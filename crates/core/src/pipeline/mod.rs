pub mod artifact;
pub mod caption_video_use_case;
pub mod pipeline_config;
pub mod pipeline_error;
pub mod pipeline_factory;
pub mod pipeline_logger;
pub mod progress;
