use std::path::PathBuf;

pub const DEFAULT_FRAMES_PATH: &str = "./frames";

pub fn default_frames_path() -> PathBuf {
    PathBuf::from(DEFAULT_FRAMES_PATH)
}
