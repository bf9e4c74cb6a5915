// A minimal XML tree, enough to write the CVR documents.

use std::borrow::Cow;

const INDENT: &str = "  ";

/// An XML element under construction: attributes, then either text or child elements.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: &'static str) -> Element {
        Element {
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub fn attr(mut self, key: &'static str, value: &str) -> Element {
        self.attributes.push((key, value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Element {
        self.text = Some(text.to_string());
        self
    }

    pub fn child(mut self, child: Element) -> Element {
        self.children.push(child);
        self
    }

    pub fn opt_child(self, child: Option<Element>) -> Element {
        match child {
            Some(c) => self.child(c),
            None => self,
        }
    }

    pub fn children<I: IntoIterator<Item = Element>>(mut self, children: I) -> Element {
        self.children.extend(children);
        self
    }

    /// Appends `<name>text</name>`.
    pub fn text_child(self, name: &'static str, text: &str) -> Element {
        self.child(Element::new(name).text(text))
    }

    pub fn opt_text_child(self, name: &'static str, text: Option<&str>) -> Element {
        match text {
            Some(t) => self.text_child(name, t),
            None => self,
        }
    }

    #[cfg(test)]
    pub(crate) fn child_elements(&self) -> &[Element] {
        &self.children
    }
}

/// Renders a full document: XML declaration, then the root element indented
/// by two spaces per level.
pub fn write_document(root: &Element) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_element(&mut out, root, 0);
    out
}

fn write_element(out: &mut String, elt: &Element, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push('<');
    out.push_str(elt.name);
    for (key, value) in elt.attributes.iter() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value, true));
        out.push('"');
    }

    match (&elt.text, elt.children.is_empty()) {
        (None, true) => {
            out.push_str("/>\n");
        }
        (Some(text), true) => {
            out.push('>');
            out.push_str(&escape(text, false));
            close_tag(out, elt.name);
        }
        (text, false) => {
            out.push_str(">\n");
            if let Some(t) = text {
                for _ in 0..=depth {
                    out.push_str(INDENT);
                }
                out.push_str(&escape(t, false));
                out.push('\n');
            }
            for c in elt.children.iter() {
                write_element(out, c, depth + 1);
            }
            for _ in 0..depth {
                out.push_str(INDENT);
            }
            close_tag(out, elt.name);
        }
    }
}

fn close_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

// Characters outside the XML 1.0 range.
fn is_forbidden(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
    )
}

/// Escapes markup characters. Characters that XML cannot carry are replaced
/// with U+FFFD.
pub fn escape(s: &str, in_attribute: bool) -> Cow<'_, str> {
    let needs_escape = |c: char| {
        matches!(c, '&' | '<' | '>') || (in_attribute && c == '"') || is_forbidden(c)
    };
    if !s.chars().any(needs_escape) {
        return Cow::Borrowed(s);
    }
    let mut res = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' if in_attribute => res.push_str("&quot;"),
            c if is_forbidden(c) => res.push(char::REPLACEMENT_CHARACTER),
            _ => res.push(c),
        }
    }
    Cow::Owned(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_elements_are_indented() {
        let root = Element::new("Party")
            .attr("ObjectId", "_Dem")
            .text_child("Abbreviation", "DEM")
            .opt_text_child("Name", Some("Democratic"))
            .opt_text_child("Notes", None)
            .child(Element::new("Empty"));
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<Party ObjectId=\"_Dem\">
  <Abbreviation>DEM</Abbreviation>
  <Name>Democratic</Name>
  <Empty/>
</Party>
";
        assert_eq!(write_document(&root), expected);
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let root = Element::new("Name")
            .attr("ObjectId", "a\"b<c")
            .text("Q&A <yes>");
        let doc = write_document(&root);
        assert!(doc.contains("<Name ObjectId=\"a&quot;b&lt;c\">Q&amp;A &lt;yes&gt;</Name>"));
        assert_eq!(escape("plain \"text\"", false), "plain \"text\"");
    }

    #[test]
    fn control_characters_are_replaced() {
        let root = Element::new("Name")
            .attr("ObjectId", "_evers\u{1}")
            .text("Evers\u{1}\u{ffff}\ttab");
        let doc = write_document(&root);
        assert!(doc.contains("<Name ObjectId=\"_evers\u{fffd}\">Evers\u{fffd}\u{fffd}\ttab</Name>"));
        let parsed = roxmltree::Document::parse(&doc).unwrap();
        assert_eq!(parsed.root_element().text(), Some("Evers\u{fffd}\u{fffd}\ttab"));
        assert_eq!(escape("line\nbreak", false), "line\nbreak");
    }
}
