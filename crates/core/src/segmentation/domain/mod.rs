pub mod segment_window;
