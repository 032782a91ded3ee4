// ── Placeholder substitution ──
//
// A deliberately small double-brace grammar:
//
//   {{name}}            scalar, substituted literally (no escaping)
//   {{{name}}} {{&name}} same as {{name}}
//   {{#name}}..{{/name}} section: once per list element, or once for non-empty text
//   {{^name}}..{{/name}} inverted section: only when the section would render nothing
//   {{! comment }}       dropped
//
// Section, inverted, closing and comment tags that sit alone on a line take
// the whole line with them, so block templates don't leave blank lines.

use std::collections::BTreeMap;

use thiserror::Error;

/// A list element: field name to text.
pub type Record = BTreeMap<String, String>;

/// Value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    List(Vec<Record>),
}

/// Placeholder bindings for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    values: BTreeMap<String, Value>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a new site: `server_name`, `root` and one `port` record per port.
    pub fn for_site(server_name: &str, root: &str, ports: &[u16]) -> Self {
        let port_records = ports
            .iter()
            .map(|port| Record::from([("port".to_owned(), port.to_string())]))
            .collect();

        Self::new()
            .with_text("server_name", server_name)
            .with_text("root", root)
            .with_list("port", port_records)
    }

    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), Value::Text(value.into()));
        self
    }

    pub fn with_list(mut self, name: impl Into<String>, records: Vec<Record>) -> Self {
        self.values.insert(name.into(), Value::List(records));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// Malformed template source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at byte {offset})")]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
}

impl SyntaxError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Render `source` against `context`.
pub fn render(source: &str, context: &RenderContext) -> Result<String, SyntaxError> {
    let nodes = parse(source)?;
    let mut out = String::with_capacity(source.len());
    let mut scopes = Vec::new();
    render_nodes(&nodes, context, &mut scopes, &mut out);
    Ok(out)
}

// ── Parsing ─────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Node {
    Text(String),
    Var(String),
    Section {
        name: String,
        inverted: bool,
        children: Vec<Node>,
    },
}

struct OpenSection {
    name: String,
    inverted: bool,
    offset: usize,
    children: Vec<Node>,
}

#[derive(Clone, Copy)]
enum Tag<'a> {
    Var(&'a str),
    Open { name: &'a str, inverted: bool },
    Close(&'a str),
    Comment,
}

impl Tag<'_> {
    /// Tags that produce no output of their own may stand alone on a line.
    fn is_block(&self) -> bool {
        !matches!(self, Tag::Var(_))
    }
}

fn classify(inner: &str, triple: bool, offset: usize) -> Result<Tag<'_>, SyntaxError> {
    let trimmed = inner.trim();
    let tag = if triple {
        Tag::Var(trimmed)
    } else if trimmed.starts_with('!') {
        return Ok(Tag::Comment);
    } else if let Some(rest) = trimmed.strip_prefix('#') {
        Tag::Open {
            name: rest.trim(),
            inverted: false,
        }
    } else if let Some(rest) = trimmed.strip_prefix('^') {
        Tag::Open {
            name: rest.trim(),
            inverted: true,
        }
    } else if let Some(rest) = trimmed.strip_prefix('/') {
        Tag::Close(rest.trim())
    } else if let Some(rest) = trimmed.strip_prefix('&') {
        Tag::Var(rest.trim())
    } else {
        Tag::Var(trimmed)
    };

    let name = match tag {
        Tag::Var(name) | Tag::Open { name, .. } | Tag::Close(name) => name,
        Tag::Comment => "",
    };
    if name.is_empty() {
        return Err(SyntaxError::new("empty tag name", offset));
    }
    Ok(tag)
}

/// If the tag spanning `start..end` is alone on its line, return the range
/// to cut instead: leading indentation through the line break.
fn standalone_span(source: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    if !source[line_start..start].chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }

    let tail = &source[end..];
    let line_end = tail.find('\n').map_or(source.len(), |i| end + i + 1);
    let trailing = source[end..line_end].trim_end_matches('\n').trim_end_matches('\r');
    if !trailing.chars().all(|c| c == ' ' || c == '\t') {
        return None;
    }
    Some((line_start, line_end))
}

fn parse(source: &str) -> Result<Vec<Node>, SyntaxError> {
    let mut stack: Vec<OpenSection> = Vec::new();
    let mut root: Vec<Node> = Vec::new();
    let mut cursor = 0;

    while let Some(found) = source[cursor..].find("{{") {
        let start = cursor + found;
        let after_open = start + 2;
        let triple = source[after_open..].starts_with('{');
        let (inner_start, closer) = if triple {
            (after_open + 1, "}}}")
        } else {
            (after_open, "}}")
        };
        let close = source[inner_start..]
            .find(closer)
            .ok_or_else(|| SyntaxError::new("unclosed tag", start))?;
        let inner = &source[inner_start..inner_start + close];
        let end = inner_start + close + closer.len();

        let tag = classify(inner, triple, start)?;
        let (text_end, next_cursor) = if tag.is_block() {
            standalone_span(source, start, end).unwrap_or((start, end))
        } else {
            (start, end)
        };

        let current = stack.last_mut().map_or(&mut root, |s| &mut s.children);
        if text_end > cursor {
            current.push(Node::Text(source[cursor..text_end].to_owned()));
        }

        match tag {
            Tag::Var(name) => current.push(Node::Var(name.to_owned())),
            Tag::Comment => {}
            Tag::Open { name, inverted } => stack.push(OpenSection {
                name: name.to_owned(),
                inverted,
                offset: start,
                children: Vec::new(),
            }),
            Tag::Close(name) => {
                let open = stack.pop().ok_or_else(|| {
                    SyntaxError::new(format!("closing tag '{name}' without open section"), start)
                })?;
                if open.name != name {
                    return Err(SyntaxError::new(
                        format!("section '{}' closed by '{name}'", open.name),
                        start,
                    ));
                }
                let parent = stack.last_mut().map_or(&mut root, |s| &mut s.children);
                parent.push(Node::Section {
                    name: open.name,
                    inverted: open.inverted,
                    children: open.children,
                });
            }
        }
        cursor = next_cursor;
    }

    if let Some(open) = stack.pop() {
        return Err(SyntaxError::new(
            format!("unclosed section '{}'", open.name),
            open.offset,
        ));
    }
    if cursor < source.len() {
        root.push(Node::Text(source[cursor..].to_owned()));
    }
    Ok(root)
}

// ── Rendering ───────────────────────────────────────────────────────

enum Lookup<'a> {
    Text(&'a str),
    List(&'a [Record]),
    Missing,
}

fn lookup<'a>(name: &str, context: &'a RenderContext, scopes: &[&'a Record]) -> Lookup<'a> {
    for &scope in scopes.iter().rev() {
        if let Some(text) = scope.get(name) {
            return Lookup::Text(text);
        }
    }
    match context.get(name) {
        Some(Value::Text(text)) => Lookup::Text(text),
        Some(Value::List(records)) => Lookup::List(records),
        None => Lookup::Missing,
    }
}

fn render_nodes<'a>(
    nodes: &[Node],
    context: &'a RenderContext,
    scopes: &mut Vec<&'a Record>,
    out: &mut String,
) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(name) => {
                if let Lookup::Text(text) = lookup(name, context, scopes) {
                    out.push_str(text);
                }
            }
            Node::Section {
                name,
                inverted,
                children,
            } => match (lookup(name, context, scopes), inverted) {
                (Lookup::List(records), false) => {
                    for record in records {
                        scopes.push(record);
                        render_nodes(children, context, scopes, out);
                        scopes.pop();
                    }
                }
                (Lookup::Text(text), false) if !text.is_empty() => {
                    render_nodes(children, context, scopes, out);
                }
                (Lookup::List(records), true) if records.is_empty() => {
                    render_nodes(children, context, scopes, out);
                }
                (Lookup::Text(text), true) if text.is_empty() => {
                    render_nodes(children, context, scopes, out);
                }
                (Lookup::Missing, true) => render_nodes(children, context, scopes, out),
                _ => {}
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn site(ports: &[u16]) -> RenderContext {
        RenderContext::for_site("app.test", "/var/www/app", ports)
    }

    #[test]
    fn substitutes_scalars() {
        let out = render("server_name {{server_name}}; root {{ root }};", &site(&[])).unwrap();
        assert_eq!(out, "server_name app.test; root /var/www/app;");
    }

    #[test]
    fn no_escaping_is_applied() {
        let ctx = RenderContext::new().with_text("v", "<a & \"b\">");
        assert_eq!(render("{{v}}|{{{v}}}|{{&v}}", &ctx).unwrap(), "<a & \"b\">|<a & \"b\">|<a & \"b\">");
    }

    #[test]
    fn unknown_placeholders_render_empty() {
        assert_eq!(render("[{{nope}}]", &site(&[])).unwrap(), "[]");
    }

    #[test]
    fn repeats_port_block_in_order() {
        let tpl = "upstream {\n{{#port}}\n    server 127.0.0.1:{{port}};\n{{/port}}\n}\n";
        let out = render(tpl, &site(&[3003, 3004])).unwrap();
        assert_eq!(
            out,
            "upstream {\n    server 127.0.0.1:3003;\n    server 127.0.0.1:3004;\n}\n"
        );
    }

    #[test]
    fn empty_port_list_emits_nothing() {
        let tpl = "a\n{{#port}}\nlisten {{port}};\n{{/port}}\nb\n";
        assert_eq!(render(tpl, &site(&[])).unwrap(), "a\nb\n");
    }

    #[test]
    fn absent_list_emits_nothing() {
        let ctx = RenderContext::new().with_text("server_name", "x");
        assert_eq!(render("{{#port}}listen {{port}};{{/port}}", &ctx).unwrap(), "");
    }

    #[test]
    fn inverted_section_supplies_default() {
        let tpl = "{{#port}}listen {{port}};{{/port}}{{^port}}listen 80;{{/port}}";
        assert_eq!(render(tpl, &site(&[])).unwrap(), "listen 80;");
        assert_eq!(render(tpl, &site(&[8080])).unwrap(), "listen 8080;");
    }

    #[test]
    fn inline_sections_keep_surrounding_text() {
        let tpl = "ports:{{#port}} {{port}}{{/port}}.";
        assert_eq!(render(tpl, &site(&[1, 2, 3])).unwrap(), "ports: 1 2 3.");
    }

    #[test]
    fn outer_values_visible_inside_sections() {
        let tpl = "{{#port}}{{server_name}}:{{port}} {{/port}}";
        assert_eq!(
            render(tpl, &site(&[80, 81])).unwrap(),
            "app.test:80 app.test:81 "
        );
    }

    #[test]
    fn text_section_renders_once_when_non_empty() {
        let ctx = RenderContext::new().with_text("ssl", "yes").with_text("off", "");
        assert_eq!(render("{{#ssl}}on{{/ssl}}{{#off}}x{{/off}}", &ctx).unwrap(), "on");
    }

    #[test]
    fn comments_are_dropped() {
        let tpl = "{{! generated }}\nserver {}\n";
        assert_eq!(render(tpl, &site(&[])).unwrap(), "server {}\n");
    }

    #[test]
    fn indented_standalone_tags_consume_line() {
        let tpl = "    {{#port}}\n    listen {{port}};\n    {{/port}}\n";
        assert_eq!(render(tpl, &site(&[80])).unwrap(), "    listen 80;\n");
    }

    #[test]
    fn crlf_line_endings_survive() {
        let tpl = "{{#port}}\r\nlisten {{port}};\r\n{{/port}}\r\n";
        assert_eq!(render(tpl, &site(&[80])).unwrap(), "listen 80;\r\n");
    }

    #[test]
    fn text_without_tags_is_untouched() {
        let tpl = "location / { try_files $uri $uri/ =404; }";
        assert_eq!(render(tpl, &site(&[])).unwrap(), tpl);
    }

    #[test]
    fn rejects_unclosed_tag() {
        let err = render("root {{root", &site(&[])).unwrap_err();
        assert_eq!(err.offset, 5);
        assert!(err.message.contains("unclosed tag"));
    }

    #[test]
    fn rejects_unclosed_section() {
        let err = render("{{#port}}listen", &site(&[])).unwrap_err();
        assert!(err.message.contains("unclosed section 'port'"));
    }

    #[test]
    fn rejects_mismatched_close() {
        let err = render("{{#port}}x{{/root}}", &site(&[])).unwrap_err();
        assert!(err.message.contains("closed by 'root'"));
    }

    #[test]
    fn rejects_stray_close() {
        assert!(render("x{{/port}}", &site(&[])).is_err());
    }

    #[test]
    fn rejects_empty_tag() {
        assert!(render("{{ }}", &site(&[])).is_err());
        assert!(render("{{#}}{{/}}", &site(&[])).is_err());
    }
}
