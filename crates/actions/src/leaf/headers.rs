//! Manifest style header file codec
//!
//! Headers are `Name: value` lines; a line starting with a single space
//! continues the previous header. Parsing keeps every header's raw text so an
//! unchanged file renders back byte for byte. Only headers whose value was
//! set are refolded.

/// Maximum line length in bytes, line terminator excluded
pub const MAX_LINE: usize = 72;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    value: String,
    raw: String,
    changed: bool,
}

impl Header {
    fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            raw: String::new(),
            changed: true,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value; returns whether it differed
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value == self.value {
            return false;
        }
        self.value = value;
        self.changed = true;
        true
    }

    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.changed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Header(Header),
    /// Blank section separators and anything that is not a header, verbatim
    Other(String),
}

/// A parsed header file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFile {
    items: Vec<Item>,
    newline: &'static str,
}

impl HeaderFile {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let mut items: Vec<Item> = Vec::new();

        for raw in text.split_inclusive('\n') {
            let content = raw.trim_end_matches(['\n', '\r']);

            if let Some(continuation) = content.strip_prefix(' ') {
                if let Some(Item::Header(header)) = items.last_mut() {
                    header.value.push_str(continuation);
                    header.raw.push_str(raw);
                    continue;
                }
            }

            match content.split_once(':') {
                Some((name, value)) if is_header_name(name) => {
                    items.push(Item::Header(Header {
                        name: name.to_string(),
                        value: value.strip_prefix(' ').unwrap_or(value).to_string(),
                        raw: raw.to_string(),
                        changed: false,
                    }));
                }
                _ => items.push(Item::Other(raw.to_string())),
            }
        }

        Self { items, newline }
    }

    /// Headers of every section, in file order
    pub fn headers_mut(&mut self) -> impl Iterator<Item = &mut Header> {
        self.items.iter_mut().filter_map(|item| match item {
            Item::Header(header) => Some(header),
            Item::Other(_) => None,
        })
    }

    /// Header of the main section, matched ignoring case
    #[must_use]
    pub fn main_header(&self, name: &str) -> Option<&Header> {
        self.main_section()
            .iter()
            .find_map(|item| match item {
                Item::Header(header) if header.name.eq_ignore_ascii_case(name) => Some(header),
                _ => None,
            })
    }

    pub fn main_header_mut(&mut self, name: &str) -> Option<&mut Header> {
        let end = self.main_section_len();
        self.items[..end].iter_mut().find_map(|item| match item {
            Item::Header(header) if header.name.eq_ignore_ascii_case(name) => Some(header),
            _ => None,
        })
    }

    /// Set a main section header, appending it after the last main header
    /// when absent. Returns whether anything changed.
    pub fn set_main_header(&mut self, name: &str, value: &str) -> bool {
        if let Some(header) = self.main_header_mut(name) {
            return header.set_value(value);
        }

        let position = self.items[..self.main_section_len()]
            .iter()
            .rposition(|item| matches!(item, Item::Header(_)))
            .map_or(0, |index| index + 1);

        // The previous line may lack a terminator at end of file.
        let newline = self.newline;
        if let Some(Item::Header(previous)) = position.checked_sub(1).map(|i| &mut self.items[i]) {
            if !previous.raw.is_empty() && !previous.raw.ends_with('\n') {
                previous.raw.push_str(newline);
            }
        }

        self.items
            .insert(position, Item::Header(Header::new(name, value)));
        true
    }

    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, Item::Header(header) if header.changed))
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            match item {
                Item::Header(header) if header.changed => {
                    fold(&mut out, &header.name, &header.value, self.newline);
                }
                Item::Header(header) => out.push_str(&header.raw),
                Item::Other(raw) => out.push_str(raw),
            }
        }
        out
    }

    fn main_section(&self) -> &[Item] {
        &self.items[..self.main_section_len()]
    }

    /// Items before the first blank line
    fn main_section_len(&self) -> usize {
        self.items
            .iter()
            .position(|item| matches!(item, Item::Other(raw) if raw.trim().is_empty()))
            .unwrap_or(self.items.len())
    }
}

/// Write `name: value` folded at [`MAX_LINE`] bytes
fn fold(out: &mut String, name: &str, value: &str, newline: &str) {
    let line = format!("{name}: {value}");
    let mut rest = line.as_str();
    let mut limit = MAX_LINE;

    while !rest.is_empty() {
        let mut end = rest.len().min(limit);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        out.push_str(&rest[..end]);
        out.push_str(newline);
        rest = &rest[end..];
        if !rest.is_empty() {
            out.push(' ');
            limit = MAX_LINE - 1;
        }
    }
}

fn is_header_name(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
