#![no_main]

use libfuzzer_sys::fuzz_target;
use rebind::ModuleImage;

fuzz_target!(|data: &[u8]| {
    let _ = ModuleImage::from_mem(data.to_vec());
});
