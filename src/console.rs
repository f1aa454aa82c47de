use bytes::BytesMut;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{command::Command, reply::Reply, store::StoryStore};

/// Runs a command against the store. `Quit` is handled by the caller.
pub fn handle_command(store: &StoryStore, command: Command) -> anyhow::Result<Reply> {
    match command {
        Command::Add(input) => Reply::story(&store.add_story(input)),
        Command::Active => Reply::stories(&store.active_stories()),
        Command::User(user_id) => Reply::stories(&store.user_stories(&user_id)),
        Command::View {
            story_id,
            viewer_id,
        } => {
            store.view_story(story_id, &viewer_id);
            Ok(Reply::Ok)
        }
        Command::Delete(story_id) => Ok(Reply::flag(store.delete_story(story_id))),
        Command::Ttl(story_id) => Ok(Reply::Text(store.time_until_expiration(story_id))),
        Command::Expired(story_id) => Ok(Reply::flag(store.is_story_expired(story_id))),
        Command::Stats(user_id) => Reply::stats(&store.story_stats(&user_id)),
        Command::Sweep => Ok(Reply::Integer(store.sweep_expired())),
        Command::Quit => Ok(Reply::Ok),
    }
}

/// Reads commands line by line until `QUIT` or end of input.
pub async fn run<R, W>(store: &StoryStore, reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut output_buf = BytesMut::with_capacity(512);
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        output_buf.clear();
        let command = match Command::deserialize(&line) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(line = %line, error = %e, "rejected command");
                Reply::Error(e.to_string()).serialize(&mut output_buf);
                writer.write_all(&output_buf).await?;
                continue;
            }
        };
        let quit = command == Command::Quit;
        let reply = handle_command(store, command)
            .unwrap_or_else(|e| Reply::Error(format!("{e:#}")));
        reply.serialize(&mut output_buf);
        writer.write_all(&output_buf).await?;
        if quit {
            break;
        }
    }
    writer.flush().await?;
    Ok(())
}
