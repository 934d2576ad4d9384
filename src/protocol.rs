//! Line-based text protocol for driving rooms from a terminal or a script.
//!
//! Each request is one line, optionally prefixed with a numeric id. Replies
//! start with `=` on success or `?` on failure, echo the id, and end with a
//! blank line. Lines starting with `#` are ignored.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`, `list_commands`, `known_command <cmd>`
//! - `quit` - Exit the loop
//! - `create <cols> <rows> <palette>` - Open a room, reply with its id
//! - `preset <label> <palette>` - Open a room on a named board size
//! - `preview <cols> <rows> <palette>` - Show a board without opening a room
//! - `join <room>` - Take the next free seat, reply with the player number
//! - `play <room> <player> <color>` - Apply a move
//! - `genmove <room> <player> <difficulty>` - Let the CPU move, reply with the color
//! - `valid <room> <player>` - Legal colors, space separated
//! - `score <room>` - Cells owned by each player
//! - `showboard <room>` - Text rendering of the board
//! - `state <room>` - Full state as JSON
//!
//! ## Example
//!
//! ```text
//! 1 create 10 8 5
//! =1 3f0c...
//!
//! 2 genmove 3f0c... 1 master
//! =2 4
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};

use crate::cpu::Difficulty;
use crate::room::{MoveOutcome, RoomStore};
use crate::state::{GameSettings, GameState, Player};

const PROTOCOL_VERSION: &str = "1";

const KNOWN_COMMANDS: &[&str] = &[
    "create",
    "genmove",
    "join",
    "known_command",
    "list_commands",
    "name",
    "play",
    "preset",
    "preview",
    "protocol_version",
    "quit",
    "score",
    "showboard",
    "state",
    "valid",
    "version",
];

pub struct ProtocolEngine {
    rooms: RoomStore,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolEngine {
    pub fn new() -> Self {
        Self::with_store(RoomStore::new())
    }

    pub fn with_store(rooms: RoomStore) -> Self {
        Self { rooms }
    }

    /// Run the command loop on stdin/stdout until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("reading command")?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n").context("writing reply")?;
            output.flush().context("flushing reply")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Split an optional leading numeric id off a command line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute one command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match self.dispatch(command, args) {
            Ok(reply) => (true, reply),
            Err(err) => {
                log::debug!("command '{command}' failed: {err:#}");
                (false, format!("{err:#}"))
            }
        }
    }

    fn state(&self, room: &str) -> Result<&GameState> {
        self.rooms
            .get(room)
            .map(|r| &r.state)
            .ok_or_else(|| anyhow!("room not found: {room}"))
    }

    fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<String> {
        match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),
            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),
            "protocol_version" => Ok(PROTOCOL_VERSION.to_string()),
            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),
            "known_command" => {
                let [cmd] = expect_args(args)?;
                Ok(KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str()).to_string())
            }
            "quit" => Ok(String::new()),

            "create" => {
                let settings = parse_settings(args)?;
                Ok(self.rooms.create(settings).id.clone())
            }
            "preset" => {
                let [label, palette] = expect_args(args)?;
                let settings = GameSettings::preset(label, parse_num(palette, "palette")?)?;
                Ok(self.rooms.create(settings).id.clone())
            }
            "preview" => {
                let settings = parse_settings(args)?;
                let preview = self.rooms.preview(&settings);
                Ok(format!("\n{}", preview.state))
            }
            "join" => {
                let [room] = expect_args(args)?;
                Ok(self.rooms.join(room)?.to_string())
            }
            "play" => {
                let [room, player, color] = expect_args(args)?;
                let outcome = self
                    .rooms
                    .apply_move(room, parse_player(player)?, parse_num(color, "color")?)?;
                Ok(summarize(&outcome))
            }
            "genmove" => {
                let [room, player, difficulty] = expect_args(args)?;
                let difficulty: Difficulty = difficulty.parse()?;
                let (color, outcome) = self.rooms.cpu_move(room, parse_player(player)?, difficulty)?;
                let summary = summarize(&outcome);
                Ok(if summary.is_empty() {
                    color.to_string()
                } else {
                    format!("{color} {summary}")
                })
            }
            "valid" => {
                let [room, player] = expect_args(args)?;
                let player = parse_player(player)?;
                let state = self.state(room)?;
                let colors: Vec<String> = state
                    .valid_moves(player)
                    .iter()
                    .enumerate()
                    .filter(|&(_, &ok)| ok)
                    .map(|(c, _)| c.to_string())
                    .collect();
                Ok(colors.join(" "))
            }
            "score" => {
                let [room] = expect_args(args)?;
                let state = self.state(room)?;
                Ok(format!("{} {}", state.score[1], state.score[2]))
            }
            "showboard" => {
                let [room] = expect_args(args)?;
                let state = self.state(room)?;
                Ok(format!("\n{state}"))
            }
            "state" => {
                let [room] = expect_args(args)?;
                let outcome = MoveOutcome::of(self.state(room)?);
                serde_json::to_string(&outcome).context("encoding state")
            }

            _ => bail!("unknown command: {command}"),
        }
    }
}

/// Trailing text after a move: empty while the game goes on.
fn summarize(outcome: &MoveOutcome) -> String {
    match &outcome.result {
        Some(result) => match result.winner {
            Some(p) => format!("game over, player {p} wins {}-{}", result.score1, result.score2),
            None => format!("game over, draw {}-{}", result.score1, result.score2),
        },
        None => String::new(),
    }
}

fn expect_args<'a, const N: usize>(args: &[&'a str]) -> Result<[&'a str; N]> {
    <[&str; N]>::try_from(args)
        .map_err(|_| anyhow!("expected {N} argument(s), got {}", args.len()))
}

fn parse_num<T: std::str::FromStr>(arg: &str, what: &str) -> Result<T> {
    arg.parse().map_err(|_| anyhow!("invalid {what}: {arg}"))
}

fn parse_player(arg: &str) -> Result<Player> {
    parse_num::<u8>(arg, "player")
        .ok()
        .and_then(Player::from_id)
        .ok_or_else(|| anyhow!("invalid player: {arg} (expected 1 or 2)"))
}

fn parse_settings(args: &[&str]) -> Result<GameSettings> {
    let [cols, rows, palette] = expect_args(args)?;
    Ok(GameSettings::new(
        parse_num(cols, "cols")?,
        parse_num(rows, "rows")?,
        parse_num(palette, "palette")?,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ProtocolEngine {
        ProtocolEngine::with_store(RoomStore::with_seed(5))
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = ProtocolEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = ProtocolEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_known_command() {
        let mut engine = engine();
        assert_eq!(engine.execute("known_command", &["genmove"]), (true, "true".into()));
        assert_eq!(engine.execute("known_command", &["komi"]), (true, "false".into()));
        assert!(!engine.execute("known_command", &[]).0);
    }

    #[test]
    fn test_create_join_and_play() {
        let mut engine = engine();
        let (ok, room) = engine.execute("create", &["6", "5", "5"]);
        assert!(ok);
        let room = room.as_str();
        assert_eq!(engine.execute("join", &[room]), (true, "1".into()));
        assert_eq!(engine.execute("join", &[room]), (true, "2".into()));
        assert!(!engine.execute("join", &[room]).0);

        let (ok, valid) = engine.execute("valid", &[room, "1"]);
        assert!(ok);
        let color = valid.split(' ').next().unwrap();
        assert!(engine.execute("play", &[room, "1", color]).0);

        // Same player again is out of turn.
        let (ok, msg) = engine.execute("play", &[room, "1", color]);
        assert!(!ok);
        assert!(msg.contains("turn"), "{msg}");

        let (ok, reply) = engine.execute("genmove", &[room, "2", "ultra"]);
        assert!(ok);
        assert!(reply.split(' ').next().unwrap().parse::<u8>().is_ok());
    }

    #[test]
    fn test_bad_arguments() {
        let mut engine = engine();
        assert!(!engine.execute("create", &["0", "5", "5"]).0);
        assert!(!engine.execute("create", &["5", "5"]).0);
        assert!(!engine.execute("preset", &["1x1", "5"]).0);
        assert!(!engine.execute("score", &["missing"]).0);
        let (ok, room) = engine.execute("preset", &["25x20", "7"]);
        assert!(ok);
        let room = room.as_str();
        assert!(!engine.execute("genmove", &[room, "1", "godlike"]).0);
        assert!(!engine.execute("play", &[room, "3", "0"]).0);
    }

    #[test]
    fn test_serve_formats_replies() {
        let mut engine = engine();
        let input = b"# comment\n7 name\nbogus\nquit\nname\n";
        let mut out = Vec::new();
        engine.serve(&input[..], &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "=7 filler-rust\n\n? unknown command: bogus\n\n= \n\n"
        );
    }

    #[test]
    fn test_state_is_json() {
        let mut engine = engine();
        let (_, room) = engine.execute("create", &["4", "3", "5"]);
        let (ok, json) = engine.execute("state", &[room.as_str()]);
        assert!(ok);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["state"]["cols"], 4);
        assert_eq!(value["validMoves"].as_array().map(Vec::len), Some(5));
    }
}
