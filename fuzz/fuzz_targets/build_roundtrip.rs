#![no_main]
use columnar_fuzz::{check_roundtrip, Sample};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|sample: Sample| {
    check_roundtrip(&sample);
});
