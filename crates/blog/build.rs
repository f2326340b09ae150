//! Build script for the blog crate.
//!
//! Hashes the stylesheet so templates can append `?v=<hash>` and browsers
//! pick up a new file whenever it changes.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=CSS_HASH=dev");
        return;
    };
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let short_hash = match fs::read(&css_path) {
        Ok(content) => {
            let hash = hex::encode(Sha256::digest(&content));
            hash[..8].to_owned()
        }
        Err(e) => {
            println!("cargo:warning=Could not read main.css: {e}");
            "dev".to_owned()
        }
    };

    println!("cargo:rustc-env=CSS_HASH={short_hash}");
}
