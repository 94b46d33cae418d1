//! Command handlers

pub mod account;
pub mod book;
pub mod circulation;
pub mod config;
pub mod course;
pub mod logs;
pub mod stats;
pub mod student;
