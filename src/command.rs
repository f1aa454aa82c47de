use uuid::Uuid;

use crate::{
    error::CommandError,
    story::{NewStory, StoryKind, StoryMedia},
};

/// One line of console input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Add(NewStory),
    Active,
    User(String),
    View { story_id: Uuid, viewer_id: String },
    Delete(Uuid),
    Ttl(Uuid),
    Expired(Uuid),
    Stats(String),
    Sweep,
    Quit,
}

fn parse_id(s: Option<&str>, command: &'static str) -> Result<Uuid, CommandError> {
    let s = s.ok_or(CommandError::Malformed(command))?;
    Uuid::parse_str(s).map_err(|_| CommandError::InvalidId(s.to_string()))
}

fn parse_arg(s: Option<&str>, command: &'static str) -> Result<String, CommandError> {
    s.map(str::to_string).ok_or(CommandError::Malformed(command))
}

impl Command {
    pub fn deserialize(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Err(CommandError::Empty);
        };
        let command = match name.to_ascii_lowercase().as_str() {
            "add" => {
                let user_id = parse_arg(parts.next(), "ADD")?;
                let username = parse_arg(parts.next(), "ADD")?;
                let kind = parts
                    .next()
                    .ok_or(CommandError::Malformed("ADD"))?
                    .parse::<StoryKind>()
                    .map_err(|e| CommandError::InvalidKind(e.0))?;
                let text = parts.collect::<Vec<_>>().join(" ");
                Command::Add(NewStory {
                    user_id,
                    username,
                    user_image: String::new(),
                    kind,
                    media: StoryMedia {
                        text: (!text.is_empty()).then_some(text),
                        ..Default::default()
                    },
                    is_live: kind == StoryKind::Live,
                })
            }
            "active" => Command::Active,
            "user" => Command::User(parse_arg(parts.next(), "USER")?),
            "view" => Command::View {
                story_id: parse_id(parts.next(), "VIEW")?,
                viewer_id: parse_arg(parts.next(), "VIEW")?,
            },
            "delete" => Command::Delete(parse_id(parts.next(), "DELETE")?),
            "ttl" => Command::Ttl(parse_id(parts.next(), "TTL")?),
            "expired" => Command::Expired(parse_id(parts.next(), "EXPIRED")?),
            "stats" => Command::Stats(parse_arg(parts.next(), "STATS")?),
            "sweep" => Command::Sweep,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_uppercase())),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::Command;
    use crate::{error::CommandError, story::StoryKind};

    #[test]
    fn add_with_caption() {
        match Command::deserialize("ADD u1 alice text Hello from   Kyoto").unwrap() {
            Command::Add(story) => {
                assert_eq!(story.user_id, "u1");
                assert_eq!(story.username, "alice");
                assert_eq!(story.kind, StoryKind::Text);
                assert_eq!(story.media.text.as_deref(), Some("Hello from Kyoto"));
                assert!(!story.is_live);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn add_live_without_caption() {
        match Command::deserialize("add u1 alice LIVE").unwrap() {
            Command::Add(story) => {
                assert!(story.is_live);
                assert_eq!(story.media.text, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn id_commands() {
        let id = Uuid::new_v4();
        assert_eq!(
            Command::deserialize(&format!("view {id} bob")).unwrap(),
            Command::View {
                story_id: id,
                viewer_id: "bob".into()
            }
        );
        assert_eq!(
            Command::deserialize(&format!("DELETE {id}")).unwrap(),
            Command::Delete(id)
        );
        assert_eq!(Command::deserialize(&format!("ttl {id}")).unwrap(), Command::Ttl(id));
        assert_eq!(
            Command::deserialize(&format!("expired {id}")).unwrap(),
            Command::Expired(id)
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!(Command::deserialize("active").unwrap(), Command::Active);
        assert_eq!(Command::deserialize(" SWEEP ").unwrap(), Command::Sweep);
        assert_eq!(Command::deserialize("exit").unwrap(), Command::Quit);
        assert_eq!(
            Command::deserialize("stats u9").unwrap(),
            Command::Stats("u9".into())
        );
        assert_eq!(
            Command::deserialize("user u9").unwrap(),
            Command::User("u9".into())
        );
    }

    #[test]
    fn malformed() {
        assert_eq!(Command::deserialize("   "), Err(CommandError::Empty));
        assert_eq!(
            Command::deserialize("publish x"),
            Err(CommandError::Unknown("PUBLISH".into()))
        );
        assert_eq!(Command::deserialize("view"), Err(CommandError::Malformed("VIEW")));
        assert_eq!(
            Command::deserialize("delete not-a-uuid"),
            Err(CommandError::InvalidId("not-a-uuid".into()))
        );
        assert_eq!(
            Command::deserialize("add u1 alice reel"),
            Err(CommandError::InvalidKind("reel".into()))
        );
        assert_eq!(Command::deserialize("add u1"), Err(CommandError::Malformed("ADD")));
    }
}
