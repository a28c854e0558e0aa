pub mod records;
pub mod subscription;
