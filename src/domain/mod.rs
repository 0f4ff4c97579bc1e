pub mod error;
pub mod workbench_settings;

// Column classification and dimension mapping
pub mod classification;
