//! Per-language adapters

pub mod css;
pub mod html;
pub mod java;
pub mod javascript;
pub mod python;
pub mod visitor_keys;
