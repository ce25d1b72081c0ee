pub(crate) mod options;
pub(crate) mod scene_file;
