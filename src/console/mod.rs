//! Terminal front end: command parsing, gating, and rendering
//!
//! The browser UI this console replaces had buttons whose enabled state
//! was a pure function of the session flags. Here that gating lives in
//! [`CommandGates`], `Command::parse` turns an input line into a command,
//! and the render helpers produce the status and log panels. All of it is
//! pure so the REPL loop in the binary stays a thin shell.

use colored::Colorize;

use crate::controller::SessionState;
use crate::log::{LogEntry, Severity};

/// A connection setting the operator can edit with `set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    /// Signaling endpoint URL (locked while connected)
    Url,
    /// SIP user (locked while connected)
    User,
    /// Credential secret (locked while connected)
    Secret,
    /// Outbound call target (always editable)
    Target,
}

/// One parsed operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Bring up the signaling transport
    Connect,
    /// Tear down the signaling transport
    Disconnect,
    /// Send a SIP registration
    Register,
    /// Call the given target, or the configured default when omitted
    Call(Option<String>),
    /// Accept the ringing inbound call
    Answer,
    /// End the active or ringing call
    Hangup,
    /// Edit one connection setting
    Set(SetField, String),
    /// Show the session flags
    Status,
    /// Show the rolling event log
    Log,
    /// Dump the rolling event log as JSON
    LogJson,
    /// Inject an inbound call through the loopback backend
    Ring,
    /// Show the command list
    Help,
    /// Leave the console
    Quit,
}

impl Command {
    /// Parse one input line; returns a usage message on failure
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err("empty command, try `help`".into());
        };
        let command = match head {
            "connect" => Self::Connect,
            "disconnect" => Self::Disconnect,
            "register" => Self::Register,
            "call" => Self::Call(words.next().map(str::to_string)),
            "answer" => Self::Answer,
            "hangup" => Self::Hangup,
            "set" => {
                let field = match words.next() {
                    Some("url") => SetField::Url,
                    Some("user") => SetField::User,
                    Some("secret") => SetField::Secret,
                    Some("target") => SetField::Target,
                    Some(other) => {
                        return Err(format!(
                            "unknown setting `{other}`, expected url|user|secret|target"
                        ))
                    }
                    None => return Err("usage: set <url|user|secret|target> <value>".into()),
                };
                let Some(value) = words.next() else {
                    return Err("usage: set <url|user|secret|target> <value>".into());
                };
                Self::Set(field, value.to_string())
            }
            "status" => Self::Status,
            "log" => match words.next() {
                None => Self::Log,
                Some("json") => Self::LogJson,
                Some(other) => return Err(format!("unknown log subcommand `{other}`")),
            },
            "ring" => Self::Ring,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command `{other}`, try `help`")),
        };
        if let Some(extra) = words.next() {
            return Err(format!("unexpected argument `{extra}`"));
        }
        Ok(command)
    }
}

/// Which session actions are currently available
///
/// A pure function of the four state flags, mirroring the button gating of
/// the original UI: one connect/disconnect toggle, register only while
/// connected and unregistered, answer only while an inbound call rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandGates {
    /// `connect` is available (disconnected)
    pub connect: bool,
    /// `disconnect` is available (connected)
    pub disconnect: bool,
    /// `register` is available (connected and unregistered)
    pub register: bool,
    /// `call` is available (connected, no established call)
    pub call: bool,
    /// `answer` is available (inbound call ringing)
    pub answer: bool,
    /// `hangup` is available (call active or ringing)
    pub hangup: bool,
    /// `set url|user|secret`; the call target is always editable
    pub edit_connection: bool,
}

impl CommandGates {
    /// Derive the gates from the session flags
    pub fn for_state(state: SessionState) -> Self {
        Self {
            connect: !state.connected,
            disconnect: state.connected,
            register: state.connected && !state.registered,
            call: state.connected && !state.in_call,
            answer: state.incoming_call,
            hangup: state.in_call || state.incoming_call,
            edit_connection: !state.connected,
        }
    }

    /// Whether the given command may run right now
    ///
    /// Informational commands are always allowed.
    pub fn allows(&self, command: &Command) -> bool {
        match command {
            Command::Connect => self.connect,
            Command::Disconnect => self.disconnect,
            Command::Register => self.register,
            Command::Call(_) => self.call,
            Command::Answer => self.answer,
            Command::Hangup => self.hangup,
            Command::Set(SetField::Target, _) => true,
            Command::Set(_, _) => self.edit_connection,
            Command::Status
            | Command::Log
            | Command::LogJson
            | Command::Ring
            | Command::Help
            | Command::Quit => true,
        }
    }
}

/// Render the three composite status indicators
pub fn render_status(state: SessionState) -> String {
    let connection = if state.connected {
        "connected".green()
    } else {
        "disconnected".red()
    };
    let registration = if state.registered {
        "registered".green()
    } else {
        "unregistered".red()
    };
    let call = match state.call_display() {
        "in call" => "in call".green(),
        "ringing" => "ringing".yellow(),
        other => other.normal(),
    };
    format!("connection: {connection}  registration: {registration}  call: {call}")
}

/// Render the rolling log, oldest first
pub fn render_log(entries: &[LogEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let message = match entry.severity {
            Severity::Info => entry.message.normal(),
            Severity::Error => entry.message.red(),
            Severity::Success => entry.message.green(),
        };
        out.push_str(&format!("[{}] {}\n", entry.time(), message));
    }
    out
}

/// The `help` text
pub fn help_text() -> &'static str {
    "commands:\n\
     \x20 connect                        bring up the signaling transport\n\
     \x20 disconnect                     tear it down\n\
     \x20 register                       send a SIP registration\n\
     \x20 call [target]                  place a call (default: configured target)\n\
     \x20 answer                         accept the ringing inbound call\n\
     \x20 hangup                         end the active or ringing call\n\
     \x20 set <url|user|secret|target> <value>\n\
     \x20 status                         show the session flags\n\
     \x20 log [json]                     show the rolling event log\n\
     \x20 ring                           simulate an inbound call (loopback)\n\
     \x20 quit"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(Command::parse("connect").unwrap(), Command::Connect);
        assert_eq!(Command::parse("  hangup  ").unwrap(), Command::Hangup);
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
        assert_eq!(Command::parse("exit").unwrap(), Command::Quit);
    }

    #[test]
    fn parses_call_with_and_without_target() {
        assert_eq!(Command::parse("call").unwrap(), Command::Call(None));
        assert_eq!(
            Command::parse("call sip:200@pbx").unwrap(),
            Command::Call(Some("sip:200@pbx".into()))
        );
    }

    #[test]
    fn parses_set_and_rejects_bad_fields() {
        assert_eq!(
            Command::parse("set user alice").unwrap(),
            Command::Set(SetField::User, "alice".into())
        );
        assert!(Command::parse("set password x").is_err());
        assert!(Command::parse("set target").is_err());
    }

    #[test]
    fn rejects_unknown_and_trailing_input() {
        assert!(Command::parse("").is_err());
        assert!(Command::parse("dial sip:200@pbx").is_err());
        assert!(Command::parse("answer now").is_err());
    }

    #[test]
    fn gates_cover_all_sixteen_flag_combinations() {
        for bits in 0u8..16 {
            let state = SessionState {
                connected: bits & 1 != 0,
                registered: bits & 2 != 0,
                in_call: bits & 4 != 0,
                incoming_call: bits & 8 != 0,
            };
            let gates = CommandGates::for_state(state);
            assert_eq!(gates.connect, !state.connected);
            assert_eq!(gates.disconnect, state.connected);
            assert_eq!(gates.register, state.connected && !state.registered);
            assert_eq!(gates.call, state.connected && !state.in_call);
            assert_eq!(gates.answer, state.incoming_call);
            assert_eq!(gates.hangup, state.in_call || state.incoming_call);
            assert_eq!(gates.edit_connection, !state.connected);
        }
    }

    #[test]
    fn target_edits_are_never_gated() {
        let connected = SessionState {
            connected: true,
            registered: true,
            in_call: true,
            incoming_call: false,
        };
        let gates = CommandGates::for_state(connected);
        assert!(gates.allows(&Command::Set(SetField::Target, "sip:300@pbx".into())));
        assert!(!gates.allows(&Command::Set(SetField::Secret, "pw".into())));
        assert!(gates.allows(&Command::Status));
    }

    #[test]
    fn status_renders_composite_indicators() {
        colored::control::set_override(false);
        let state = SessionState {
            connected: true,
            registered: false,
            in_call: false,
            incoming_call: true,
        };
        let rendered = render_status(state);
        assert!(rendered.contains("connected"));
        assert!(rendered.contains("unregistered"));
        assert!(rendered.contains("ringing"));
        colored::control::unset_override();
    }
}
