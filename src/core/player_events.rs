//! Control-surface intents.
//!
//! These are the only inbound mutations on the board. Surfaces raise them
//! through an [`IntentEmitter`](super::event_bus::IntentEmitter); the board
//! routes each one to a player, the coordinator or the expanded view.
//!
//! Intents also have a one-line text form used by the interactive runner:
//!
//! ```text
//! play 1 | pause 1 | stop 1 | cover 1 | frame 1 12 | speed 1 250
//! global play [MS] | global pause | global cover | global speed MS | global frame N
//! expand 2 | close | resize W H | expanded play|pause|stop|cover | expanded frame N | expanded speed MS
//! ```
//!
//! Panel numbers and frame numbers in the text form are 1-based.

use crate::entities::PlayerId;

/// Per-player transport call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Play,
    Pause,
    Stop,
    ShowCover,
    /// 0-based, normalized modulo the sequence length
    GoToFrame(i64),
    SetSpeed(u32),
}

/// Global transport call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlobalCommand {
    /// Start synchronized playback, optionally with a new global speed
    Activate(Option<u32>),
    Deactivate,
    ShowCoverAll,
    SetSpeed(u32),
    GoToFrame(i64),
}

/// Expanded view call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpandedCommand {
    Open(PlayerId),
    Close,
    Resize { width: u32, height: u32 },
    /// Delegated to the bound player
    Transport(Transport),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Player(PlayerId, Transport),
    Global(GlobalCommand),
    Expanded(ExpandedCommand),
}

/// Text intent parse errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseIntentError {
    Empty,
    UnknownCommand(String),
    MissingArgument(&'static str),
    BadNumber(String),
}

impl std::fmt::Display for ParseIntentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseIntentError::Empty => write!(f, "Empty command"),
            ParseIntentError::UnknownCommand(c) => write!(f, "Unknown command: {}", c),
            ParseIntentError::MissingArgument(a) => write!(f, "Missing argument: {}", a),
            ParseIntentError::BadNumber(n) => write!(f, "Not a valid number: {}", n),
        }
    }
}

impl std::error::Error for ParseIntentError {}

impl std::str::FromStr for Intent {
    type Err = ParseIntentError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(ParseIntentError::Empty)?;
        let rest: Vec<&str> = words.collect();

        match head {
            "global" => parse_global(&rest).map(Intent::Global),
            "expand" => {
                let panel = number::<u32>(rest.first(), "panel")?;
                Ok(Intent::Expanded(ExpandedCommand::Open(PlayerId(panel))))
            }
            "close" => Ok(Intent::Expanded(ExpandedCommand::Close)),
            "resize" => Ok(Intent::Expanded(ExpandedCommand::Resize {
                width: number(rest.first(), "width")?,
                height: number(rest.get(1), "height")?,
            })),
            "expanded" => {
                let (verb, args) = rest.split_first().ok_or(ParseIntentError::MissingArgument("transport"))?;
                let transport = parse_transport(verb, args)?;
                Ok(Intent::Expanded(ExpandedCommand::Transport(transport)))
            }
            verb => {
                let (panel, args) = rest.split_first().ok_or(ParseIntentError::MissingArgument("panel"))?;
                let panel = number::<u32>(Some(panel), "panel")?;
                let transport = parse_transport(verb, args)?;
                Ok(Intent::Player(PlayerId(panel), transport))
            }
        }
    }
}

fn parse_transport(verb: &str, args: &[&str]) -> Result<Transport, ParseIntentError> {
    match verb {
        "play" => Ok(Transport::Play),
        "pause" => Ok(Transport::Pause),
        "stop" => Ok(Transport::Stop),
        "cover" => Ok(Transport::ShowCover),
        "frame" => Ok(Transport::GoToFrame(frame_number(args.first())?)),
        "speed" => Ok(Transport::SetSpeed(number(args.first(), "speed")?)),
        other => Err(ParseIntentError::UnknownCommand(other.to_string())),
    }
}

fn parse_global(args: &[&str]) -> Result<GlobalCommand, ParseIntentError> {
    let (verb, args) = args.split_first().ok_or(ParseIntentError::MissingArgument("global command"))?;
    match *verb {
        "play" => {
            let speed = match args.first() {
                Some(_) => Some(number(args.first(), "speed")?),
                None => None,
            };
            Ok(GlobalCommand::Activate(speed))
        }
        "pause" => Ok(GlobalCommand::Deactivate),
        "cover" => Ok(GlobalCommand::ShowCoverAll),
        "speed" => Ok(GlobalCommand::SetSpeed(number(args.first(), "speed")?)),
        "frame" => Ok(GlobalCommand::GoToFrame(frame_number(args.first())?)),
        other => Err(ParseIntentError::UnknownCommand(format!("global {}", other))),
    }
}

fn number<T: std::str::FromStr>(word: Option<&&str>, what: &'static str) -> Result<T, ParseIntentError> {
    let word = word.ok_or(ParseIntentError::MissingArgument(what))?;
    word.parse().map_err(|_| ParseIntentError::BadNumber(word.to_string()))
}

/// 1-based on the command line, 0-based in [`Transport::GoToFrame`]
fn frame_number(word: Option<&&str>) -> Result<i64, ParseIntentError> {
    Ok(number::<i64>(word, "frame")? - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Intent, ParseIntentError> {
        s.parse()
    }

    #[test]
    fn test_parse_player_transport() {
        assert_eq!(parse("play 1"), Ok(Intent::Player(PlayerId(1), Transport::Play)));
        assert_eq!(parse("cover 3"), Ok(Intent::Player(PlayerId(3), Transport::ShowCover)));
        assert_eq!(parse("frame 2 12"), Ok(Intent::Player(PlayerId(2), Transport::GoToFrame(11))));
        assert_eq!(parse("  speed 5   250 "), Ok(Intent::Player(PlayerId(5), Transport::SetSpeed(250))));
    }

    #[test]
    fn test_parse_global() {
        assert_eq!(parse("global play"), Ok(Intent::Global(GlobalCommand::Activate(None))));
        assert_eq!(parse("global play 200"), Ok(Intent::Global(GlobalCommand::Activate(Some(200)))));
        assert_eq!(parse("global pause"), Ok(Intent::Global(GlobalCommand::Deactivate)));
        assert_eq!(parse("global cover"), Ok(Intent::Global(GlobalCommand::ShowCoverAll)));
        assert_eq!(parse("global frame 1"), Ok(Intent::Global(GlobalCommand::GoToFrame(0))));
    }

    #[test]
    fn test_parse_expanded() {
        assert_eq!(parse("expand 4"), Ok(Intent::Expanded(ExpandedCommand::Open(PlayerId(4)))));
        assert_eq!(parse("close"), Ok(Intent::Expanded(ExpandedCommand::Close)));
        assert_eq!(
            parse("resize 800 600"),
            Ok(Intent::Expanded(ExpandedCommand::Resize { width: 800, height: 600 }))
        );
        assert_eq!(
            parse("expanded speed 100"),
            Ok(Intent::Expanded(ExpandedCommand::Transport(Transport::SetSpeed(100))))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   "), Err(ParseIntentError::Empty));
        assert_eq!(parse("play"), Err(ParseIntentError::MissingArgument("panel")));
        assert_eq!(parse("play x"), Err(ParseIntentError::BadNumber("x".into())));
        assert_eq!(parse("dance 1"), Err(ParseIntentError::UnknownCommand("dance".into())));
        assert_eq!(parse("speed 1 -5"), Err(ParseIntentError::BadNumber("-5".into())));
        assert_eq!(parse("global jump"), Err(ParseIntentError::UnknownCommand("global jump".into())));
    }
}
