//! Listing data structure and Telegram Markdown rendering.

/// One classified ad read off a search-results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Site-assigned identifier
    pub id: String,

    /// Listing title
    pub title: String,

    /// Price with currency suffix
    pub price: String,

    /// Normalized listing URL
    pub link: String,

    /// Posted date as shown on the page, or a placeholder
    pub date_posted: String,

    /// Seller rating as shown on the page, or a placeholder
    pub seller_rating: String,
}

impl Listing {
    /// Format the listing for display using a legacy Markdown template.
    ///
    /// Supported placeholders:
    /// - `{id}`, `{title}`, `{price}`, `{date}`, `{rating}`, `{link}`
    ///
    /// The template is read in one pass. Each value is escaped for the
    /// Markdown span its placeholder sits in, and text coming from a value is
    /// never expanded again. Unknown placeholders are copied through.
    pub fn format(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len() + 128);
        let mut span = Span::Plain;
        let mut rest = template;

        while let Some(c) = rest.chars().next() {
            if c == '{' {
                if let Some((value, len)) = self.placeholder(rest) {
                    out.push_str(&span.escape(value));
                    rest = &rest[len..];
                    continue;
                }
            }

            if c == '\\' && span == Span::Plain {
                // Escaped markup in the template itself
                let escaped: String = rest.chars().take(2).collect();
                out.push_str(&escaped);
                rest = &rest[escaped.len()..];
                continue;
            }

            span = span.next(c, &rest[c.len_utf8()..]);
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }

        out
    }

    /// Value and byte length of the placeholder at the start of `text`.
    fn placeholder(&self, text: &str) -> Option<(&str, usize)> {
        let end = text.find('}')?;
        let value = match &text[1..end] {
            "id" => &self.id,
            "title" => &self.title,
            "price" => &self.price,
            "date" => &self.date_posted,
            "rating" => &self.seller_rating,
            "link" => &self.link,
            _ => return None,
        };
        Some((value, end + 1))
    }
}

/// Legacy Markdown span the template cursor is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Span {
    Plain,
    Bold,
    Italic,
    Code,
    LinkText,
    LinkUrl,
}

impl Span {
    /// Span after the template character `c`, given what follows it.
    fn next(self, c: char, after: &str) -> Span {
        match (self, c) {
            (Span::Plain, '*') => Span::Bold,
            (Span::Plain, '_') => Span::Italic,
            (Span::Plain, '`') => Span::Code,
            (Span::Plain, '[') => Span::LinkText,
            (Span::Bold, '*') | (Span::Italic, '_') | (Span::Code, '`') => Span::Plain,
            (Span::LinkText, ']') if after.starts_with('(') => Span::LinkUrl,
            (Span::LinkText, ']') => Span::Plain,
            (Span::LinkUrl, ')') => Span::Plain,
            (span, _) => span,
        }
    }

    /// Escape a value so it stays literal inside this span.
    ///
    /// Legacy Markdown has no escapes inside an entity, so the entity is
    /// closed around an escaped delimiter and reopened.
    fn escape(self, value: &str) -> String {
        match self {
            Span::Plain => escape_markdown(value),
            Span::Bold => value.replace('*', "*\\**"),
            Span::Italic => value.replace('_', "_\\__"),
            Span::Code => value.replace('`', "'"),
            Span::LinkText => value.replace(']', ")"),
            Span::LinkUrl => value.replace(')', "%29"),
        }
    }
}

/// Escape the characters legacy Telegram Markdown treats as markup.
///
/// Only valid for text outside any entity.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
