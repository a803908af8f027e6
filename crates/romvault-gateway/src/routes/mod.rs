//! HTTP route handlers.

pub mod health;
pub mod pages;
pub mod roms;
pub mod saves;
pub mod static_files;
