use std::fmt::{self, Display, Formatter};

/// A single `option` or `list` value inside a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciValue {
    /// Written as `option <key> '<value>'`.
    Option(String),
    /// Written as one `list <key> '<item>'` line per item.
    List(Vec<String>),
}

/// A `config <kind> ['<name>']` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UciSection {
    /// Section type, for example `interface` or `wifi-iface`.
    pub kind: String,
    /// Optional section name. Anonymous sections omit it.
    pub name: Option<String>,
    /// Entries in insertion order.
    pub entries: Vec<(String, UciValue)>,
}

impl UciSection {
    /// Create an anonymous section of the given type.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            entries: Vec::new(),
        }
    }

    /// Create a named section of the given type.
    pub fn named(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: Some(name.into()),
            entries: Vec::new(),
        }
    }

    /// Set an option, replacing an existing entry with the same key in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.put(key.into(), UciValue::Option(value.into()));
        self
    }

    /// Set a list entry. Empty lists are not recorded.
    pub fn set_list<I, S>(&mut self, key: impl Into<String>, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if !items.is_empty() {
            self.put(key.into(), UciValue::List(items));
        }
        self
    }

    /// Return the entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&UciValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Return the option text stored under `key`, ignoring lists.
    pub fn get_option(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            UciValue::Option(value) => Some(value.as_str()),
            UciValue::List(_) => None,
        }
    }

    fn put(&mut self, key: String, value: UciValue) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

/// One UCI package, i.e. one file under `/etc/config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UciPackage {
    /// Package name written on the `package` line.
    pub name: String,
    /// Sections in output order.
    pub sections: Vec<UciSection>,
}

impl UciPackage {
    /// Create an empty package.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: Vec::new(),
        }
    }

    /// Append a section and return a mutable handle to it.
    pub fn push(&mut self, section: UciSection) -> &mut UciSection {
        self.sections.push(section);
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    /// Return the first section with the provided name.
    pub fn section(&self, name: &str) -> Option<&UciSection> {
        self.sections
            .iter()
            .find(|section| section.name.as_deref() == Some(name))
    }

    /// Return all sections of the provided type.
    pub fn sections_of(&self, kind: &str) -> Vec<&UciSection> {
        self.sections
            .iter()
            .filter(|section| section.kind == kind)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Display for UciPackage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::writer::write(self))
    }
}

/// Turn an arbitrary interface or section name into a valid UCI identifier.
///
/// UCI names accept ASCII letters, digits and underscores; everything else
/// (dots in VLAN names, dashes in bridge names) becomes `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// Whether `name` can be written unquoted as a package name, section name
/// or option key.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Whether `kind` can be written as a section type. Types also accept `-`,
/// as in `wifi-iface`.
pub fn is_valid_type(kind: &str) -> bool {
    !kind.is_empty()
        && kind
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

#[cfg(test)]
mod tests {
    use super::{is_valid_name, is_valid_type, sanitize_name, UciSection, UciValue};

    #[test]
    fn set_replaces_existing_option_in_place() {
        let mut section = UciSection::named("interface", "lan");
        section.set("proto", "none").set("mtu", "1500").set("proto", "static");
        assert_eq!(section.entries.len(), 2);
        assert_eq!(section.entries[0].0, "proto");
        assert_eq!(section.get_option("proto"), Some("static"));
    }

    #[test]
    fn empty_lists_are_skipped() {
        let mut section = UciSection::new("timeserver");
        section.set_list("server", Vec::<String>::new());
        assert!(section.entries.is_empty());
        section.set_list("server", ["0.pool.ntp.org"]);
        assert_eq!(
            section.get("server"),
            Some(&UciValue::List(vec!["0.pool.ntp.org".to_string()]))
        );
        assert_eq!(section.get_option("server"), None);
    }

    #[test]
    fn sanitizes_vlan_and_bridge_names() {
        assert_eq!(sanitize_name("eth0.1"), "eth0_1");
        assert_eq!(sanitize_name("br-lan"), "br_lan");
        assert_eq!(sanitize_name("wlan0"), "wlan0");
    }

    #[test]
    fn identifiers_reject_whitespace_and_quotes() {
        assert!(is_valid_name("dns_search"));
        assert!(!is_valid_name("wifi-iface"));
        assert!(!is_valid_name("opt\n\toption x"));
        assert!(!is_valid_name(""));
        assert!(is_valid_type("wifi-iface"));
        assert!(!is_valid_type("bar baz"));
        assert!(!is_valid_type("it's"));
    }
}
