#![allow(clippy::new_without_default)]

pub mod app;
pub mod command;
pub mod config;
pub mod ctx;
pub mod menu;
pub mod nav;
pub mod page;
pub mod pages;
pub mod render;
pub mod subscription;
pub mod timer;

#[cfg(test)]
pub(crate) mod testutil;
