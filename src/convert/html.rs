//! Markup string → token stream → [`Fragment`].
//!
//! Not an HTML5 parser. It recognises tags, attributes, comments and text:
//! no implied end tags, no entity decoding, no foster parenting. The stages
//! only rely on tag balance.

use compact_str::CompactString;

use crate::attr::{Attrs, AttrsExt};
use crate::error::{FormatError, FormatResult};
use crate::node::{is_void_tag, Element, Fragment, Node, Text};

/// Maximum element nesting accepted by [`from_html`].
///
/// Stages recurse once per nesting level; every stage must fit this depth on
/// a default 2 MiB thread stack in an unoptimized build.
pub const MAX_DEPTH: usize = 128;

// =============================================================================
// Tokens
// =============================================================================

/// Flat markup token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<tag attr="v">` or `<tag />`
    Open {
        tag: CompactString,
        attrs: Attrs,
        self_closing: bool,
    },
    /// `</tag>`
    Close { tag: CompactString },
    /// Character data, entities left encoded
    Text(String),
    /// Comment, doctype or processing instruction, verbatim
    Markup(String),
}

/// Split markup into a flat token list.
///
/// A `<` that does not start a well-formed tag is kept as text, so the
/// tokenizer never fails.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut scanner = Scanner { src: input, pos: 0 };
    let mut text_start = 0;

    while let Some(offset) = scanner.rest().find('<') {
        let lt = scanner.pos + offset;
        scanner.pos = lt;
        let Some(token) = scanner.markup_token() else {
            // literal '<'
            scanner.pos = lt + 1;
            continue;
        };
        if text_start < lt {
            push_text(&mut tokens, &input[text_start..lt]);
        }
        tokens.push(token);
        text_start = scanner.pos;
    }

    if text_start < input.len() {
        push_text(&mut tokens, &input[text_start..]);
    }
    tokens
}

fn push_text(tokens: &mut Vec<Token>, text: &str) {
    if let Some(Token::Text(prev)) = tokens.last_mut() {
        prev.push_str(text);
    } else {
        tokens.push(Token::Text(text.to_string()));
    }
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Parse the construct starting at `<`. On `None` the position is
    /// unspecified and the caller resets it.
    fn markup_token(&mut self) -> Option<Token> {
        let rest = self.rest();
        if rest.starts_with("<!--") {
            let end = rest[4..].find("-->").map_or(rest.len(), |i| i + 4 + 3);
            self.pos += end;
            return Some(Token::Markup(rest[..end].to_string()));
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest.find('>')? + 1;
            self.pos += end;
            return Some(Token::Markup(rest[..end].to_string()));
        }
        if rest.starts_with("</") {
            self.pos += 2;
            let tag = self.tag_name()?;
            let end = self.rest().find('>')?;
            self.pos += end + 1;
            return Some(Token::Close { tag });
        }
        self.pos += 1;
        let tag = self.tag_name()?;
        let (attrs, self_closing) = self.attributes()?;
        Some(Token::Open {
            tag,
            attrs,
            self_closing,
        })
    }

    fn tag_name(&mut self) -> Option<CompactString> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        if !bytes.get(start).is_some_and(u8::is_ascii_alphabetic) {
            return None;
        }
        let mut end = start;
        while bytes
            .get(end)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b':')
        {
            end += 1;
        }
        self.pos = end;
        Some(CompactString::from(self.src[start..end].to_ascii_lowercase()))
    }

    /// Attributes up to and including the closing `>`.
    fn attributes(&mut self) -> Option<(Attrs, bool)> {
        let mut attrs = Attrs::new();
        loop {
            self.skip_whitespace();
            match self.peek()? {
                b'>' => {
                    self.pos += 1;
                    return Some((attrs, false));
                }
                b'/' => {
                    self.pos += 1;
                    if self.peek() == Some(b'>') {
                        self.pos += 1;
                        return Some((attrs, true));
                    }
                }
                _ => {
                    let (name, value) = self.attribute()?;
                    // first occurrence wins, as in browsers
                    if !name.is_empty() && !attrs.has_attr(&name) {
                        attrs.push((name, value));
                    }
                }
            }
        }
    }

    fn attribute(&mut self) -> Option<(String, String)> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        while bytes
            .get(self.pos)
            .is_some_and(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/'))
        {
            self.pos += 1;
        }
        let name = self.src[start..self.pos].to_ascii_lowercase();
        if name.is_empty() && self.peek() == Some(b'=') {
            // `=value` with no name: consume and drop
            self.pos += 1;
        }

        self.skip_whitespace();
        if self.peek() != Some(b'=') {
            return Some((name, String::new()));
        }
        self.pos += 1;
        self.skip_whitespace();

        let value = match self.peek()? {
            quote @ (b'"' | b'\'') => {
                self.pos += 1;
                let len = self.rest().find(quote as char)?;
                let value = &self.rest()[..len];
                self.pos += len + 1;
                value
            }
            _ => {
                let begin = self.pos;
                while bytes
                    .get(self.pos)
                    .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'>')
                {
                    self.pos += 1;
                }
                &self.src[begin..self.pos]
            }
        };
        Some((name, value.to_string()))
    }
}

// =============================================================================
// Tree building
// =============================================================================

/// Parse a markup string into a [`Fragment`].
///
/// Close tags pop to the nearest matching open element; close tags without
/// a match are dropped; elements still open at the end are closed.
pub fn from_html(input: &str) -> FormatResult<Fragment> {
    from_tokens(tokenize(input))
}

/// Build a [`Fragment`] from a token list.
pub fn from_tokens(tokens: Vec<Token>) -> FormatResult<Fragment> {
    let mut builder = TreeBuilder::default();
    for token in tokens {
        match token {
            Token::Open {
                tag,
                attrs,
                self_closing,
            } => {
                let elem = Element::with_attrs(tag, attrs);
                if self_closing || elem.is_void() {
                    builder.append(Node::element(elem));
                } else {
                    builder.open(elem)?;
                }
            }
            Token::Close { tag } => builder.close(&tag),
            Token::Text(text) => builder.append_text(text),
            Token::Markup(markup) => builder.append(Node::Text(Text::markup(markup))),
        }
    }
    Ok(builder.finish())
}

#[derive(Default)]
struct TreeBuilder {
    root: Fragment,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn current_children(&mut self) -> &mut crate::node::Children {
        match self.open.last_mut() {
            Some(elem) => &mut elem.children,
            None => &mut self.root.children,
        }
    }

    fn append(&mut self, node: Node) {
        self.current_children().push(node);
    }

    fn append_text(&mut self, text: String) {
        let children = self.current_children();
        if let Some(Node::Text(prev)) = children.last_mut()
            && !prev.is_markup()
        {
            prev.content.push_str(&text);
            return;
        }
        children.push(Node::text(text));
    }

    fn open(&mut self, elem: Element) -> FormatResult<()> {
        if self.open.len() >= MAX_DEPTH {
            return Err(FormatError::NestingTooDeep { depth: MAX_DEPTH });
        }
        self.open.push(elem);
        Ok(())
    }

    fn close(&mut self, tag: &str) {
        if is_void_tag(tag) {
            return;
        }
        let Some(pos) = self.open.iter().rposition(|e| e.tag == tag) else {
            return;
        };
        while self.open.len() > pos {
            self.pop();
        }
    }

    fn pop(&mut self) {
        if let Some(elem) = self.open.pop() {
            self.append(Node::element(elem));
        }
    }

    fn finish(mut self) -> Fragment {
        while !self.open.is_empty() {
            self.pop();
        }
        self.root
    }
}

// =============================================================================
// Tests
// =============================================================================
