//! Terraform variables file bridging a published image to the provisioner.
//!
//! The file always has the same six assignments, in this order:
//!
//! ```text
//! app_name       = "<string>"
//! image_uri      = "<string>"
//! aws_region     = "<string>"
//! container_port = <integer>
//! desired_count  = <integer>
//! extra_env      = { "<K>" = "<V>", ... }
//! ```
//!
//! An empty `extra_env` is written as `{}` so the variable schema sees the
//! same shape on every run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name Terraform picks up from the root module directory.
pub const DESCRIPTOR_FILE: &str = "terraform.tfvars";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    pub app_name: String,
    pub image_uri: String,
    pub region: String,
    pub container_port: u16,
    pub desired_count: u32,
    pub extra_env: BTreeMap<String, String>,
}

impl ReleaseDescriptor {
    pub fn render(&self) -> String {
        format!(
            "app_name       = {app}\n\
             image_uri      = {image}\n\
             aws_region     = {region}\n\
             container_port = {port}\n\
             desired_count  = {count}\n\
             extra_env      = {env}\n",
            app = quote(&self.app_name),
            image = quote(&self.image_uri),
            region = quote(&self.region),
            port = self.container_port,
            count = self.desired_count,
            env = render_map(&self.extra_env),
        )
    }

    /// Write the descriptor to `path`, replacing whatever was there.
    pub fn write(&self, path: &Path) -> crate::Result<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| crate::Error::DescriptorWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path, self.render()).map_err(|e| crate::Error::DescriptorWrite {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::info!(path = %path.display(), app = %self.app_name, "wrote release descriptor");
        Ok(path.to_path_buf())
    }

    pub fn read(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::DescriptorRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse text produced by [`render`](Self::render).
    pub fn parse(text: &str) -> crate::Result<Self> {
        let mut app_name = None;
        let mut image_uri = None;
        let mut region = None;
        let mut container_port = None;
        let mut desired_count = None;
        let mut extra_env = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| parse_error(line_no, "expected `key = value`"))?;
            let key = key.trim();
            let mut cursor = Cursor::new(value, line_no);

            match key {
                "app_name" => app_name = Some(cursor.string()?),
                "image_uri" => image_uri = Some(cursor.string()?),
                "aws_region" => region = Some(cursor.string()?),
                "container_port" => container_port = Some(cursor.integer::<u16>()?),
                "desired_count" => desired_count = Some(cursor.integer::<u32>()?),
                "extra_env" => extra_env = Some(cursor.map()?),
                other => {
                    tracing::debug!(key = other, line = line_no, "ignoring unknown variable");
                    continue;
                }
            }
            cursor.end()?;
        }

        Ok(Self {
            app_name: app_name.ok_or_else(|| missing("app_name"))?,
            image_uri: image_uri.ok_or_else(|| missing("image_uri"))?,
            region: region.ok_or_else(|| missing("aws_region"))?,
            container_port: container_port.ok_or_else(|| missing("container_port"))?,
            desired_count: desired_count.ok_or_else(|| missing("desired_count"))?,
            extra_env: extra_env.ok_or_else(|| missing("extra_env"))?,
        })
    }
}

fn render_map(map: &BTreeMap<String, String>) -> String {
    if map.is_empty() {
        return "{}".to_owned();
    }
    let items = map
        .iter()
        .map(|(k, v)| format!("{} = {}", quote(k), quote(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{ {items} }}")
}

fn quote(s: &str) -> String {
    format!("\"{}\"", escape(s))
}

/// Escape a value for an HCL quoted string.
///
/// Template openers are doubled (`$${`, `%%{`) so Terraform reads them literally.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn parse_error(line: usize, reason: impl Into<String>) -> crate::Error {
    crate::Error::DescriptorParse {
        line,
        reason: reason.into(),
    }
}

fn missing(key: &str) -> crate::Error {
    parse_error(0, format!("missing `{key}`"))
}

/// Character cursor over the right-hand side of one assignment.
struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Cursor {
    fn new(text: &str, line: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> crate::Result<()> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == want => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(parse_error(self.line, format!("expected `{want}`, found `{c}`"))),
            None => Err(parse_error(self.line, format!("expected `{want}`, found end of line"))),
        }
    }

    fn end(&mut self) -> crate::Result<()> {
        self.skip_ws();
        match self.peek() {
            None => Ok(()),
            Some(c) => Err(parse_error(self.line, format!("unexpected trailing `{c}`"))),
        }
    }

    fn string(&mut self) -> crate::Result<String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            let c = self
                .peek()
                .ok_or_else(|| parse_error(self.line, "unterminated string"))?;
            self.pos += 1;
            match c {
                '"' => return Ok(out),
                '\\' => {
                    let esc = self
                        .peek()
                        .ok_or_else(|| parse_error(self.line, "dangling escape"))?;
                    self.pos += 1;
                    out.push(match esc {
                        '\\' => '\\',
                        '"' => '"',
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        other => {
                            return Err(parse_error(
                                self.line,
                                format!("unsupported escape `\\{other}`"),
                            ));
                        }
                    });
                }
                '$' | '%' if self.peek() == Some(c) && self.peek_at(1) == Some('{') => {
                    self.pos += 1;
                    out.push(c);
                }
                _ => out.push(c),
            }
        }
    }

    fn integer<T>(&mut self) -> crate::Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.skip_ws();
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits
            .parse()
            .map_err(|e| parse_error(self.line, format!("invalid integer `{digits}`: {e}")))
    }

    fn map(&mut self) -> crate::Result<BTreeMap<String, String>> {
        self.expect('{')?;
        let mut map = BTreeMap::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    return Ok(map);
                }
                Some(',') if !map.is_empty() => self.pos += 1,
                Some('"') => {
                    let key = self.string()?;
                    self.expect('=')?;
                    let value = self.string()?;
                    map.insert(key, value);
                }
                Some(c) => {
                    return Err(parse_error(self.line, format!("unexpected `{c}` in map")));
                }
                None => return Err(parse_error(self.line, "unterminated map")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_quotes_and_backslashes() {
        assert_eq!(escape(r#"a"b\c"#), r#"a\"b\\c"#);
    }

    #[test]
    fn escape_template_openers() {
        assert_eq!(escape("${var}"), "$${var}");
        assert_eq!(escape("%{if}"), "%%{if}");
        assert_eq!(escape("$5 and 50%"), "$5 and 50%");
    }

    #[test]
    fn escape_control_characters() {
        assert_eq!(escape("a\nb\tc\r"), "a\\nb\\tc\\r");
    }

    #[test]
    fn empty_map_renders_braces() {
        assert_eq!(render_map(&BTreeMap::new()), "{}");
    }
}
