#![no_main]

use libfuzzer_sys::fuzz_target;
use pkgroot::dependency::{CompoundDepend, DepKind};

fuzz_target!(|data: &str| {
    let _ = CompoundDepend::parse_field(DepKind::Depend, data);
});
