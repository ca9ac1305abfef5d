#![allow(dead_code)]

pub mod command;
pub mod file;
pub mod memory;

const TMPDIR: &str = "../playground";

pub fn redirect_temp_dir() {
    unsafe {
        std::env::set_var("TMPDIR", TMPDIR);
    }

    // Ensure the TMPDIR exists
    if !std::path::Path::new(TMPDIR).exists() {
        std::fs::create_dir_all(TMPDIR).expect("Failed to create TMPDIR");
    }
}
