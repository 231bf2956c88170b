// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use mirror::reflect::Reflect;
use mirror::ClassMember;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let member = ClassMember::new("fuzzed", 0, u8::type_desc(), source);
    for entry in member.metadata_entries() {
        let _ = entry.as_bool();
        let _ = entry.as_int();
        let _ = entry.as_float();
        assert!(member.metadata(entry.name()).is_some());
    }
});
