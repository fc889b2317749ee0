// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Input generators for preview gate tests.

use std::path::PathBuf;

/// Generate `count` distinct client addresses.
pub fn generate_clients(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("10.{}.{}.{}", (i >> 16) & 0xff, (i >> 8) & 0xff, i & 0xff))
        .collect()
}

/// Generate wrong keys of the same length as `key`, each differing at one position.
pub fn single_byte_mismatches(key: &str) -> Vec<String> {
    (0..key.len())
        .map(|pos| {
            key.bytes()
                .enumerate()
                .map(|(i, b)| if i == pos { flip(b) } else { b as char })
                .collect()
        })
        .collect()
}

fn flip(b: u8) -> char {
    if b == b'a' {
        'b'
    } else {
        'a'
    }
}

/// JSON body `{"key": "<key>", "pad": "xxx..."}` of exactly `size` bytes.
pub fn padded_body(key: &str, size: usize) -> String {
    let skeleton = format!(r#"{{"key":"{}","pad":""}}"#, key);
    assert!(size >= skeleton.len(), "size too small for skeleton");
    let pad = "x".repeat(size - skeleton.len());
    format!(r#"{{"key":"{}","pad":"{}"}}"#, key, pad)
}

/// Create a throwaway static site with an index page and one asset.
pub fn static_site(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "preview-gate-{}-{}",
        name,
        std::process::id()
    ));
    std::fs::create_dir_all(dir.join("assets")).expect("create site dir");
    std::fs::write(dir.join("index.html"), "<!doctype html><title>index</title>")
        .expect("write index");
    std::fs::write(dir.join("assets").join("app.js"), "console.log('app');")
        .expect("write asset");
    dir
}
