use quick_xml::encoding::Decoder;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ExtractError;

/// Minimal element tree over a member page, enough for tag lookups.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub name: String,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    fn named(name: String) -> Self {
        Element {
            name,
            children: Vec::new(),
        }
    }

    /// First descendant with this tag, depth-first in document order.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|child| match child {
            Node::Element(e) if e.name == name => Some(e),
            Node::Element(e) => e.find(name),
            Node::Text(_) => None,
        })
    }

    /// Every descendant with this tag, document order.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if let Node::Element(e) = child {
                if e.name == name {
                    found.push(e);
                }
                e.collect(name, found);
            }
        }
    }

    /// All descendant text, concatenated.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.push_text(out),
            }
        }
    }
}

/// Build a tree from page bytes, decoded per the BOM or the `<?xml encoding=...?>`
/// declaration. Stray or mismatched end tags are tolerated and anything left
/// open at end of input is closed; tokenizer errors and tags whose name isn't
/// a name (a bare `<` in text) fail.
pub fn parse(bytes: &[u8]) -> Result<Element, ExtractError> {
    let mut reader = Reader::from_reader(bytes);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut stack = vec![Element::named("[document]".to_string())];
    let mut buf = Vec::new();

    loop {
        let decoder = reader.decoder();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = tag_name(decoder, e.local_name().as_ref())?;
                stack.push(Element::named(name));
            }
            Event::Empty(e) => {
                let name = tag_name(decoder, e.local_name().as_ref())?;
                append(&mut stack, Node::Element(Element::named(name)));
            }
            Event::End(e) => {
                let name = decode(decoder, e.local_name().as_ref());
                // Ignore an end tag with no matching open element
                if let Some(depth) = stack.iter().skip(1).rposition(|el| el.name == name) {
                    while stack.len() > depth + 1 {
                        close(&mut stack);
                    }
                }
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map(|t| t.into_owned())
                    .unwrap_or_else(|_| decode(decoder, &e));
                append(&mut stack, Node::Text(text));
            }
            Event::CData(e) => {
                append(&mut stack, Node::Text(decode(decoder, &e)));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    while stack.len() > 1 {
        close(&mut stack);
    }
    Ok(stack.pop().unwrap_or_default())
}

/// Text in the document's encoding; undecodable bytes become U+FFFD.
fn decode(decoder: Decoder, bytes: &[u8]) -> String {
    decoder
        .decode(bytes)
        .map(|t| t.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())
}

fn tag_name(decoder: Decoder, raw: &[u8]) -> Result<String, ExtractError> {
    let name = decode(decoder, raw);
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    if starts_ok && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.')) {
        Ok(name)
    } else {
        Err(ExtractError::BadTagName(name))
    }
}

fn append(stack: &mut [Element], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

fn close(stack: &mut Vec<Element>) {
    if let Some(done) = stack.pop() {
        append(stack, Node::Element(done));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_searches_descendants_in_order() {
        let doc = parse(b"<A><B><C>one</C></B><C>two</C></A>").unwrap();
        let a = doc.find("A").unwrap();
        assert_eq!(a.find("C").unwrap().text(), "one");
        let all: Vec<String> = a.find_all("C").iter().map(|e| e.text()).collect();
        assert_eq!(all, vec!["one", "two"]);
        assert!(a.find("A").is_none());
    }

    #[test]
    fn text_concatenates_nested_content() {
        let doc = parse(b"<P>Hello <B>big</B> world<![CDATA[ & more]]></P>").unwrap();
        assert_eq!(doc.find("P").unwrap().text(), "Hello big world & more");
    }

    #[test]
    fn entities_decoded_and_unknown_ones_kept_raw() {
        let doc = parse(b"<P>Smith &amp; Sons</P><Q>a&nbsp;b</Q>").unwrap();
        assert_eq!(doc.find("P").unwrap().text(), "Smith & Sons");
        assert_eq!(doc.find("Q").unwrap().text(), "a&nbsp;b");
    }

    #[test]
    fn unclosed_and_stray_tags_recovered() {
        let doc = parse(b"<ROOT><X>kept</Y></X><Z>open to the end").unwrap();
        let root = doc.find("ROOT").unwrap();
        assert_eq!(root.find("X").unwrap().text(), "kept");
        assert_eq!(root.find("Z").unwrap().text(), "open to the end");
    }

    #[test]
    fn bare_angle_bracket_in_text_fails() {
        assert!(parse(b"<P>A < B</P>").is_err());
        assert!(parse(b"<P>A <3 B</P>").is_err());
    }

    #[test]
    fn declared_latin1_decoded() {
        let doc = parse(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><P>Pe\xf1a</P>").unwrap();
        assert_eq!(doc.find("P").unwrap().text(), "Pe\u{f1}a");
    }

    #[test]
    fn invalid_utf8_replaced_not_fatal() {
        let doc = parse(b"<P>ok \xff here</P>").unwrap();
        assert_eq!(doc.find("P").unwrap().text(), "ok \u{fffd} here");
    }

    #[test]
    fn namespace_prefix_ignored() {
        let doc = parse(br#"<m:MEMBINFO xmlns:m="urn:x"><m:PARTY>R</m:PARTY></m:MEMBINFO>"#).unwrap();
        assert_eq!(doc.find("MEMBINFO").unwrap().find("PARTY").unwrap().text(), "R");
    }
}
