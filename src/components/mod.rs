//! UI components.

pub mod keyword_cloud;
