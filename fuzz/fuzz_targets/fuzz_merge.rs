#![no_main]

use libfuzzer_sys::fuzz_target;
use miditape_merge::{merge_inputs, InputFile, MergeConfig, ResolutionPolicy};
use std::path::PathBuf;

fuzz_target!(|data: &[u8]| {
    let input = InputFile {
        path: PathBuf::from("fuzz.mid"),
        bytes: data.to_vec(),
    };
    let inputs = [input.clone(), input];

    // Arbitrary bytes must merge cleanly or fail with an error, never panic.
    for policy in [ResolutionPolicy::Passthrough, ResolutionPolicy::Rescale] {
        let config = MergeConfig::default().resolution_policy(policy);
        let _ = merge_inputs(&inputs, &config);
    }
});
