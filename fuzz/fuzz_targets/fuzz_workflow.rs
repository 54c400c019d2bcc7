#![no_main]

use actions_deps::document::parse_document;
use actions_deps::parsers::extractor::references_in_manifest;
use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(document) = parse_document(content) {
            let references = references_in_manifest(&document);

            let unique: HashSet<&String> = references.iter().collect();
            assert_eq!(
                unique.len(),
                references.len(),
                "references must be deduplicated"
            );
        }
    }
});
