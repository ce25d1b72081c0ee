pub(crate) mod blur;
pub(crate) mod ffmpeg;
pub(crate) mod gif;
pub(crate) mod sink;
