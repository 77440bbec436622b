pub mod writer;
pub mod xml;

pub use writer::{write_report, write_report_logged};
pub use xml::render;
