// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fuzz target for root-relative path resolution

#![no_main]

use arbitrary::Arbitrary;
use burrow_core::path::{resolve, RelativePath};
use libfuzzer_sys::fuzz_target;
use std::path::{Component, Path};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    base: &'a str,
    tail: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let root = Path::new("/srv/burrow");

    if let Ok(resolved) = resolve(root, input.base) {
        // Whatever resolves must stay lexically under the root.
        assert!(resolved.starts_with(root));
        assert!(!resolved.components().any(|c| c == Component::ParentDir));
    }

    if let Ok(base) = RelativePath::parse(input.base) {
        let _ = base.to_path_string();
        let _ = base.name();
        let _ = base.parent();

        if let Ok(joined) = base.join(input.tail) {
            assert!(joined.segments().len() >= base.segments().len());
            assert!(joined.under(root).starts_with(root));
        }
    }
});
