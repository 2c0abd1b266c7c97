#![allow(dead_code)]

pub mod book;
pub mod config;
