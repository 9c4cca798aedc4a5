#![no_main]
use libfuzzer_sys::fuzz_target;
use raidsave::{decode_typed_value, TypedValue};

fuzz_target!(|data: (u8, &str)| {
    let (data_type, raw) = data;
    if let TypedValue::Str(x) = decode_typed_value(data_type, raw) {
        if data_type != 4 {
            assert_eq!(x, raw);
        }
    }
});
