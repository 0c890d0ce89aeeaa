pub mod portal;
pub mod status;
