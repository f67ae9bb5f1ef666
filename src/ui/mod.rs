//! Rendering: side panel filters, top bar, key statistics and report tabs.

pub mod charts;
pub mod panels;
pub mod tabs;
