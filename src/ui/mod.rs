/// UI module exports

pub mod popup;
pub mod session_panel;
