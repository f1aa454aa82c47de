use bytes::{BufMut, BytesMut};

use crate::story::{Story, StoryStats};

#[derive(Debug, PartialEq)]
pub enum Reply {
    Ok,
    Integer(usize),
    Text(String),
    Json(serde_json::Value),
    Error(String),
}

impl Reply {
    pub fn flag(value: bool) -> Self {
        Reply::Integer(usize::from(value))
    }

    pub fn story(story: &Story) -> anyhow::Result<Self> {
        Ok(Reply::Json(serde_json::to_value(story)?))
    }

    pub fn stories(stories: &[Story]) -> anyhow::Result<Self> {
        Ok(Reply::Json(serde_json::to_value(stories)?))
    }

    pub fn stats(stats: &StoryStats) -> anyhow::Result<Self> {
        Ok(Reply::Json(serde_json::to_value(stats)?))
    }

    /// Writes the reply as a single newline-terminated line.
    pub fn serialize(&self, buf: &mut BytesMut) {
        match self {
            Reply::Ok => buf.put_slice(b"OK"),
            Reply::Integer(n) => buf.put_slice(n.to_string().as_bytes()),
            Reply::Text(s) => buf.put_slice(s.as_bytes()),
            Reply::Json(value) => buf.put_slice(value.to_string().as_bytes()),
            Reply::Error(message) => {
                buf.put_slice(b"ERR ");
                buf.put_slice(message.as_bytes());
            }
        }
        buf.put_u8(b'\n');
    }
}
