// Copyright 2024 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Line lists with comments, as used by `build-data/` files.

use std::io::{self, BufRead};

/// Reads non-empty lines with `comment` and everything after it removed.
///
/// Surrounding whitespace is trimmed. The comment marker cannot be escaped.
pub fn read_simple_lines<R: BufRead>(reader: R, comment: &str) -> io::Result<Vec<String>> {
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let content = line.split(comment).next().unwrap_or_default().trim();
        if !content.is_empty() {
            out.push(content.to_string());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blanks() {
        let text = "# header\nENGINE_MAKEFILE\n\n  CC   # compiler\n#\nCXXFLAGS#inline\n";
        let lines = read_simple_lines(text.as_bytes(), "#").unwrap();
        assert_eq!(lines, vec!["ENGINE_MAKEFILE", "CC", "CXXFLAGS"]);
    }
}
