#![no_main]

use libfuzzer_sys::fuzz_target;
use lsif_transform::{DocumentIndex, TransformConfig};

// Feed arbitrary newline-delimited bytes through the line dispatcher.
// Malformed lines are expected to abort with an error; only panics and
// out-of-bounds store writes are bugs here.
fuzz_target!(|data: &[u8]| {
    let config = TransformConfig {
        temp_dir: std::env::temp_dir(),
        process_references: true,
    };
    let Ok(mut index) = DocumentIndex::new(&config) else {
        return;
    };

    for line in data.split(|&b| b == b'\n') {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        if index.read_line(line).is_err() {
            return;
        }
    }
});
