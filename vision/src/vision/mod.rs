pub mod blobs;
pub mod segmentation;
