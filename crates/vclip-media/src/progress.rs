//! Parsed state from FFmpeg's `-progress pipe:2` stream.

#[derive(Debug, Clone, Default)]
pub struct FfmpegProgress {
    pub out_time_ms: i64,
    pub out_time: String,
    pub frame: u64,
    pub fps: f64,
    pub speed: f64,
    pub is_complete: bool,
}

pub type ProgressCallback = Box<dyn Fn(FfmpegProgress) + Send>;
