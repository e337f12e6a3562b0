//! leaf-id
//!
//! 葉の写真 → Geminiで識別 → 標本カード → 位置・地名付きでローカルに保存。

pub mod browse;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod geocode;
pub mod identify;
pub mod location;
pub mod scanner;
pub mod store;
pub mod views;
