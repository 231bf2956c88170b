// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use mirror::{from_bytes, reflect_class, to_bytes};

#[derive(Debug, Default, PartialEq)]
struct Leaf {
    flag: bool,
    glyph: char,
    id: u32,
    ratio: f64,
    name: String,
}
reflect_class!(Leaf {
    flag,
    glyph,
    id,
    ratio,
    name
});

#[derive(Debug, Default, PartialEq)]
struct Node {
    leaf: Leaf,
    values: Vec<i16>,
    children: Vec<Node>,
    tags: Vec<String>,
}
reflect_class!(Node {
    leaf,
    values,
    children,
    tags
});

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must be rejected with an error, never a panic.
    if let Ok(node) = from_bytes::<Node>(data) {
        // Anything accepted re-encodes to the same bytes (NaN payloads included).
        let bytes = to_bytes(&node).expect("decoded value re-encodes");
        assert_eq!(bytes, data);
    }
});
