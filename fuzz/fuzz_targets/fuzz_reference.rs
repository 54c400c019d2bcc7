#![no_main]

use actions_deps::parsers::reference::{ActionReference, classify_reference};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Some(ActionReference::Repository(parsed)) = classify_reference(raw) {
            assert!(!parsed.owner.is_empty(), "owner must not be empty");
            assert!(!parsed.repo.is_empty(), "repo must not be empty");
            assert!(!parsed.git_ref.is_empty(), "ref must not be empty");
            assert!(
                !parsed.git_ref.contains('\n'),
                "ref must stop at the end of the line"
            );
            assert!(
                raw.starts_with(&parsed.name()),
                "name must be a prefix of the reference"
            );
            if let Some(path) = &parsed.path {
                assert!(path.starts_with('/'), "path must start with a slash");
                assert!(!path.contains('@'), "path must not contain @");
            }
        }
    }
});
