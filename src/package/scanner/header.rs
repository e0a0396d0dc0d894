use once_cell::sync::Lazy;
use regex::Regex;

use crate::package::types::SourceHeader;

/// Line prefix that opts a package into export
pub const GO_EXPORTED_DIRECTIVE: &str = "// melo:";

static PACKAGE_CLAUSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^package\s+([\p{L}_][\p{L}\p{N}_]*)").expect("package clause pattern is valid")
});

/// Read the export directive and package clause out of a source file.
///
/// Both markers are looked for independently of their relative order; the
/// first directive line wins.
pub fn parse_header(content: &str) -> SourceHeader {
    let mut header = SourceHeader::default();

    for line in content.lines() {
        if header.bridge_path.is_none() {
            if let Some(bridge_path) = line.strip_prefix(GO_EXPORTED_DIRECTIVE) {
                header.bridge_path = Some(bridge_path.trim_end().to_string());
            }
        }

        if header.package_name.is_none() {
            if let Some(captures) = PACKAGE_CLAUSE_RE.captures(line) {
                header.package_name = Some(captures[1].to_string());
            }
        }

        if header.bridge_path.is_some() && header.package_name.is_some() {
            break;
        }
    }

    header
}

/// Read only the package clause of a source file
pub fn parse_package_name(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| PACKAGE_CLAUSE_RE.captures(line).map(|c| c[1].to_string()))
}
