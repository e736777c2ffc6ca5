use std::time::Duration;

pub trait DurationExt {
    /// Formats whole seconds as zero-padded `HH:MM:SS`. Hours do not wrap at 24.
    fn to_hms(&self) -> String;
}

impl DurationExt for Duration {
    fn to_hms(&self) -> String {
        let secs = self.as_secs();
        format!(
            "{:02}:{:02}:{:02}",
            secs / 3600,
            secs / 60 % 60,
            secs % 60
        )
    }
}
