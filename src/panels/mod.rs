//! Presentation of launcher state.

pub mod app_list;
