// IRC wire format (RFC 1459 framing)
//
// Lines look like `[:prefix] COMMAND param param :trailing`. The trailing
// parameter may contain spaces and is kept whole.

/// A parsed inbound IRC message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

impl Message {
    /// Parse one line (without CRLF). Returns None for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return None;
        }

        let (prefix, rest) = match line.strip_prefix(':') {
            Some(rest) => {
                let (prefix, rest) = rest.split_once(' ')?;
                (Some(prefix.to_string()), rest)
            }
            None => (None, line),
        };

        let (head, trailing) = match rest.split_once(" :") {
            Some((head, trailing)) => (head, Some(trailing)),
            None => (rest, None),
        };

        let mut words = head.split_ascii_whitespace();
        let command = words.next()?.to_string();
        let mut params: Vec<String> = words.map(str::to_string).collect();
        if let Some(trailing) = trailing {
            params.push(trailing.to_string());
        }

        Some(Self {
            prefix,
            command,
            params,
        })
    }

    /// Nickname part of the prefix (`nick!user@host` -> `nick`)
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        Some(prefix.split(['!', '@']).next().unwrap_or(prefix))
    }

    /// Trailing (last) parameter, if any
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }
}
