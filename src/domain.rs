pub mod catalog;
pub mod entities;
pub mod use_cases;
