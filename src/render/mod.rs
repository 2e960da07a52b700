//! Pure presentation: formatting helpers and the HTML fragments each panel
//! displays. Nothing in here touches the document or the network.

pub mod format;
pub mod html;

pub use format::Confidence;
