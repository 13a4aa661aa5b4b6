//! Fuzz target for the SCIP symbol grammar.
//!
//! Run with: cargo +nightly fuzz run fuzz_symbol_parser
//!
//! Symbol parsing is total: any string yields a name and kind.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sciplens_core::outline::module_name;
use sciplens_core::symbol::{extract_enclosing_type, parse};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let _ = parse(s);
    let _ = extract_enclosing_type(s);
    let _ = module_name(s);
});
