#![allow(clippy::new_without_default)]

pub mod catalog;
pub mod client;
pub mod control;
pub mod dispatch;
pub mod error;
pub mod library;
pub mod system_info;
