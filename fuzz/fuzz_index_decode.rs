//! Fuzz target for SCIP index decoding.
//!
//! Run with: cargo +nightly fuzz run fuzz_index_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use sciplens_core::ScipIndex;

fuzz_target!(|data: &[u8]| {
    if let Ok(index) = ScipIndex::decode(data) {
        let stats = index.stats();
        assert!(stats.definitions <= stats.occurrences);
    }
});
