//! UCI (Universal Chess Interface) protocol types and utilities.
//!
//! The decision source is an engine process speaking UCI over its standard
//! streams. This module only knows the words of the protocol; spawning and
//! talking to the process is done in the models layer.

/// UCI commands that can be sent to an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    /// Initialize UCI mode
    Uci,
    /// Check if engine is ready
    IsReady,
    /// Set a new game
    UciNewGame,
    /// Set position: the starting position followed by the game so far
    Position { moves: Vec<String> },
    /// Search to a fixed depth
    GoDepth(u32),
    /// Quit the engine
    Quit,
}

impl UciCommand {
    /// Convert command to UCI protocol string
    pub fn to_uci_string(&self) -> String {
        match self {
            UciCommand::Uci => "uci".to_string(),
            UciCommand::IsReady => "isready".to_string(),
            UciCommand::UciNewGame => "ucinewgame".to_string(),
            UciCommand::Position { moves } => {
                let mut cmd = String::from("position startpos");
                if !moves.is_empty() {
                    cmd.push_str(" moves ");
                    cmd.push_str(&moves.join(" "));
                }
                cmd
            }
            UciCommand::GoDepth(d) => format!("go depth {}", d),
            UciCommand::Quit => "quit".to_string(),
        }
    }
}

/// Raw UCI output line types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciOutputKind {
    /// "uciok" - engine is ready for UCI
    UciOk,
    /// "readyok" - engine is ready
    ReadyOk,
    /// "info ..." - analysis information
    Info(String),
    /// "bestmove ..." - the answer to a search; `None` when the engine has no move
    BestMove(Option<String>),
    /// Engine identification
    Id(String),
    /// Unknown/other output
    Other(String),
}

impl UciOutputKind {
    /// Parse a raw UCI output line into a categorized type
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if line == "uciok" {
            UciOutputKind::UciOk
        } else if line == "readyok" {
            UciOutputKind::ReadyOk
        } else if let Some(rest) = line.strip_prefix("info ") {
            UciOutputKind::Info(rest.to_string())
        } else if let Some(rest) = line.strip_prefix("bestmove") {
            // "bestmove e2e4 ponder e7e5" or "bestmove (none)"
            let best = rest
                .split_whitespace()
                .next()
                .filter(|mv| *mv != "(none)")
                .map(str::to_string);
            UciOutputKind::BestMove(best)
        } else if let Some(rest) = line.strip_prefix("id ") {
            UciOutputKind::Id(rest.to_string())
        } else {
            UciOutputKind::Other(line.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_startpos() {
        let cmd = UciCommand::Position { moves: vec![] };
        assert_eq!(cmd.to_uci_string(), "position startpos");
    }

    #[test]
    fn test_position_with_moves() {
        let cmd = UciCommand::Position {
            moves: vec!["e2e4".to_string(), "e7e5".to_string()],
        };
        assert_eq!(cmd.to_uci_string(), "position startpos moves e2e4 e7e5");
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(UciCommand::Uci.to_uci_string(), "uci");
        assert_eq!(UciCommand::IsReady.to_uci_string(), "isready");
        assert_eq!(UciCommand::UciNewGame.to_uci_string(), "ucinewgame");
        assert_eq!(UciCommand::GoDepth(15).to_uci_string(), "go depth 15");
        assert_eq!(UciCommand::Quit.to_uci_string(), "quit");
    }

    #[test]
    fn test_parse_info() {
        let kind = UciOutputKind::parse("info depth 20 score cp 35 pv e2e4 e7e5");
        assert!(matches!(kind, UciOutputKind::Info(_)));
    }

    #[test]
    fn test_parse_bestmove() {
        let kind = UciOutputKind::parse("bestmove e2e4 ponder e7e5");
        assert_eq!(kind, UciOutputKind::BestMove(Some("e2e4".to_string())));

        let kind = UciOutputKind::parse("bestmove e7e8q");
        assert_eq!(kind, UciOutputKind::BestMove(Some("e7e8q".to_string())));
    }

    #[test]
    fn test_parse_bestmove_none() {
        assert_eq!(
            UciOutputKind::parse("bestmove (none)"),
            UciOutputKind::BestMove(None)
        );
    }

    #[test]
    fn test_parse_handshake() {
        assert_eq!(UciOutputKind::parse("uciok"), UciOutputKind::UciOk);
        assert_eq!(UciOutputKind::parse("readyok\r"), UciOutputKind::ReadyOk);
        assert!(matches!(
            UciOutputKind::parse("id name Stockfish 16"),
            UciOutputKind::Id(_)
        ));
        assert!(matches!(
            UciOutputKind::parse("Stockfish 16 by the Stockfish developers"),
            UciOutputKind::Other(_)
        ));
    }
}
