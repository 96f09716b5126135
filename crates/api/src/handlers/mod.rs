pub mod assembly;
pub mod parts;
pub mod scene;
pub mod upload;
