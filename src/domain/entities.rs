pub mod demo;
pub mod project;
pub mod upload;
