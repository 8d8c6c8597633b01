//! Fuzz target for v2 manifest parsing and conversion.
//!
//! Run with:
//!   cargo +nightly fuzz run v2_manifest_convert

#![no_main]

use iiifconv::config::ConvertConfig;
use iiifconv::convert::convert_manifest;
use iiifconv::io_json::{manifest_from_slice, to_json_vec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(manifest) = manifest_from_slice(data) else {
        return;
    };
    if let Ok(converted) = convert_manifest(&manifest, &ConvertConfig::default()) {
        let _ = to_json_vec(&converted.document);
    }
});
