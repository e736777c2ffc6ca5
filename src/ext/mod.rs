mod duration_ext;

pub use duration_ext::DurationExt;
