use crate::tree::{UciPackage, UciSection, UciValue};

/// Serialize one package into UCI text.
///
/// The output starts with the `package` line, separates sections with one
/// blank line and always ends with a newline. A package without sections
/// still produces its `package` line.
pub fn write(package: &UciPackage) -> String {
    let mut out = format!("package {}\n", package.name);
    for section in &package.sections {
        out.push('\n');
        write_section(&mut out, section);
    }
    out
}

/// Serialize several packages, separated by a blank line.
///
/// Empty packages (no sections) are skipped entirely.
pub fn write_all(packages: &[UciPackage]) -> String {
    packages
        .iter()
        .filter(|package| !package.is_empty())
        .map(write)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Quote a value for UCI, escaping embedded single quotes as `'\''`.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn write_section(out: &mut String, section: &UciSection) {
    match &section.name {
        Some(name) => out.push_str(&format!("config {} {}\n", section.kind, quote(name))),
        None => out.push_str(&format!("config {}\n", section.kind)),
    }
    for (key, value) in &section.entries {
        match value {
            UciValue::Option(text) => {
                out.push_str(&format!("\toption {key} {}\n", quote(text)));
            }
            UciValue::List(items) => {
                for item in items {
                    out.push_str(&format!("\tlist {key} {}\n", quote(item)));
                }
            }
        }
    }
}
