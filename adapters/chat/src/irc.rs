//! Minimal IRC line parsing for Twitch chat.

/// The subset of IRC traffic the Twitch transport reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum IrcLine<'a> {
    /// Keep-alive that must be answered with `PONG`.
    Ping(&'a str),
    /// A chat message.
    Privmsg {
        sender: &'a str,
        channel: &'a str,
        text: &'a str,
    },
    /// Our `JOIN` was echoed back or the names list for a channel ended.
    Joined { channel: &'a str },
    /// The server is about to drop the connection and asks clients to rejoin.
    Reconnect,
    Other,
}

/// Parses one line, with or without IRCv3 tags and the trailing `\r`.
pub(crate) fn parse(line: &str) -> IrcLine<'_> {
    let mut rest = line.trim_end_matches('\r');
    if rest.starts_with('@') {
        rest = rest.split_once(' ').map_or("", |(_, tail)| tail);
    }

    let (prefix, rest) = match rest.strip_prefix(':') {
        Some(prefixed) => prefixed.split_once(' ').unwrap_or((prefixed, "")),
        None => ("", rest),
    };
    let (command, params) = rest.split_once(' ').unwrap_or((rest, ""));

    match command {
        "PING" => IrcLine::Ping(params.strip_prefix(':').unwrap_or(params)),
        "PRIVMSG" => {
            let Some((target, text)) = params.split_once(" :") else {
                return IrcLine::Other;
            };
            let sender = prefix.split_once('!').map_or(prefix, |(nick, _)| nick);
            IrcLine::Privmsg {
                sender,
                channel: channel_name(target),
                text: strip_action(text),
            }
        }
        "JOIN" => IrcLine::Joined {
            channel: channel_name(params),
        },
        // RPL_ENDOFNAMES: "<nick> #<channel> :End of /NAMES list"
        "366" => match params.split(' ').nth(1) {
            Some(target) => IrcLine::Joined {
                channel: channel_name(target),
            },
            None => IrcLine::Other,
        },
        "RECONNECT" => IrcLine::Reconnect,
        _ => IrcLine::Other,
    }
}

/// Unwraps CTCP `ACTION` messages sent with `/me`.
fn strip_action(text: &str) -> &str {
    text.strip_prefix("\u{1}ACTION ")
        .map_or(text, |action| action.strip_suffix('\u{1}').unwrap_or(action))
}

fn channel_name(target: &str) -> &str {
    let target = target.trim();
    target.strip_prefix('#').unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privmsg_yields_sender_channel_and_text() {
        let line = ":ada!ada@ada.tmi.twitch.tv PRIVMSG #the_aia :up: we go\r";
        assert_eq!(
            parse(line),
            IrcLine::Privmsg {
                sender: "ada",
                channel: "the_aia",
                text: "up: we go",
            }
        );
    }

    #[test]
    fn tags_are_skipped() {
        let line = "@badge-info=;color=#FF0000;display-name=Ada :ada!ada@ada.tmi.twitch.tv PRIVMSG #maze :r";
        assert_eq!(
            parse(line),
            IrcLine::Privmsg {
                sender: "ada",
                channel: "maze",
                text: "r",
            }
        );
    }

    #[test]
    fn ping_payload_is_extracted() {
        assert_eq!(parse("PING :tmi.twitch.tv"), IrcLine::Ping("tmi.twitch.tv"));
    }

    #[test]
    fn join_confirmations_name_the_channel() {
        assert_eq!(
            parse(":justinfan1!justinfan1@justinfan1.tmi.twitch.tv JOIN #maze"),
            IrcLine::Joined { channel: "maze" }
        );
        assert_eq!(
            parse(":justinfan1.tmi.twitch.tv 366 justinfan1 #maze :End of /NAMES list"),
            IrcLine::Joined { channel: "maze" }
        );
    }

    #[test]
    fn me_actions_carry_their_plain_text() {
        let line = ":ada!ada@ada.tmi.twitch.tv PRIVMSG #maze :\u{1}ACTION up\u{1}";
        assert_eq!(
            parse(line),
            IrcLine::Privmsg {
                sender: "ada",
                channel: "maze",
                text: "up",
            }
        );
    }

    #[test]
    fn reconnect_requests_are_recognised() {
        assert_eq!(parse(":tmi.twitch.tv RECONNECT"), IrcLine::Reconnect);
        assert_eq!(parse("RECONNECT\r"), IrcLine::Reconnect);
    }

    #[test]
    fn unrelated_traffic_is_ignored() {
        assert_eq!(parse(":tmi.twitch.tv 001 justinfan1 :Welcome, GLHF!"), IrcLine::Other);
        assert_eq!(parse(""), IrcLine::Other);
        assert_eq!(parse(":ada!ada@ada PRIVMSG #maze"), IrcLine::Other);
    }
}
