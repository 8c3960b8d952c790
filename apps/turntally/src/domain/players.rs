use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::errors::domain::{DomainError, ValidationKind};

/// Opaque player identity, stable for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(Ulid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self).map_err(|_| {
            DomainError::validation(ValidationKind::UnknownPlayer, format!("bad player id '{s}'"))
        })
    }
}

/// The fixed palette players choose their color from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Black,
    White,
}

impl PlayerColor {
    pub const PALETTE: [PlayerColor; 8] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Yellow,
        PlayerColor::Purple,
        PlayerColor::Orange,
        PlayerColor::Black,
        PlayerColor::White,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerColor::Red => "RED",
            PlayerColor::Blue => "BLUE",
            PlayerColor::Green => "GREEN",
            PlayerColor::Yellow => "YELLOW",
            PlayerColor::Purple => "PURPLE",
            PlayerColor::Orange => "ORANGE",
            PlayerColor::Black => "BLACK",
            PlayerColor::White => "WHITE",
        }
    }
}

impl FromStr for PlayerColor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PlayerColor::PALETTE
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::UnknownColor,
                    format!("'{wanted}' is not in the palette"),
                )
            })
    }
}

/// A seated player and their running score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub side: Option<String>,
    pub color: Option<PlayerColor>,
    pub background_image: Option<String>,
    /// Committed victory points; never negative.
    pub total_vp: u32,
    /// Entered but not yet committed; may be negative.
    pub pending_vp: i32,
}

/// One entry of the setup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub name: String,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub color: Option<PlayerColor>,
    #[serde(default)]
    pub background_image: Option<String>,
}

impl PlayerSetup {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            side: None,
            color: None,
            background_image: None,
        }
    }

    pub fn with_side(mut self, side: impl Into<String>) -> Self {
        self.side = Some(side.into());
        self
    }

    pub fn with_color(mut self, color: PlayerColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_background_image(mut self, reference: impl Into<String>) -> Self {
        self.background_image = Some(reference.into());
        self
    }
}

/// The setup payload a session is started from. List order is seat order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameSetup {
    pub players: Vec<PlayerSetup>,
}

impl GameSetup {
    pub fn new(players: Vec<PlayerSetup>) -> Self {
        Self { players }
    }

    /// Check required fields and per-game uniqueness of names and colors.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.players.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::NoPlayers,
                "At least one player is required",
            ));
        }

        let mut names = HashSet::new();
        let mut colors = HashSet::new();
        for (seat, p) in self.players.iter().enumerate() {
            let name = p.name.trim();
            if name.is_empty() {
                return Err(DomainError::validation(
                    ValidationKind::BlankName,
                    format!("Player in seat {seat} has no name"),
                ));
            }
            if !names.insert(name.to_lowercase()) {
                return Err(DomainError::validation(
                    ValidationKind::DuplicateName,
                    format!("Name '{name}' is used more than once"),
                ));
            }
            if let Some(color) = p.color {
                if !colors.insert(color) {
                    return Err(DomainError::validation(
                        ValidationKind::DuplicateColor,
                        format!("Color {} is used more than once", color.as_str()),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Validate and mint fresh players with zeroed scores.
    pub fn into_players(self) -> Result<Vec<Player>, DomainError> {
        self.validate()?;
        Ok(self
            .players
            .into_iter()
            .map(|p| Player {
                id: PlayerId::new(),
                name: p.name.trim().to_string(),
                side: p.side.filter(|s| !s.trim().is_empty()),
                color: p.color,
                background_image: p.background_image,
                total_vp: 0,
                pending_vp: 0,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(names: &[&str]) -> GameSetup {
        GameSetup::new(names.iter().map(|n| PlayerSetup::named(*n)).collect())
    }

    #[test]
    fn empty_setup_is_rejected() {
        let err = GameSetup::default().validate().unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::NoPlayers, _)
        ));
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = setup(&["Ann", "  "]).validate().unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::BlankName, _)
        ));
    }

    #[test]
    fn names_are_unique_case_insensitively() {
        let err = setup(&["Ann", "ann "]).validate().unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::DuplicateName, _)
        ));
    }

    #[test]
    fn colors_are_unique() {
        let s = GameSetup::new(vec![
            PlayerSetup::named("Ann").with_color(PlayerColor::Red),
            PlayerSetup::named("Bob").with_color(PlayerColor::Red),
        ]);
        let err = s.validate().unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::DuplicateColor, _)
        ));
    }

    #[test]
    fn into_players_keeps_seat_order_and_zeroes_scores() {
        let s = GameSetup::new(vec![
            PlayerSetup::named(" Ann ").with_side("Empire").with_color(PlayerColor::Blue),
            PlayerSetup::named("Bob").with_side(""),
        ]);
        let players = s.into_players().unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Ann");
        assert_eq!(players[0].side.as_deref(), Some("Empire"));
        assert_eq!(players[1].side, None);
        assert!(players.iter().all(|p| p.total_vp == 0 && p.pending_vp == 0));
        assert_ne!(players[0].id, players[1].id);
    }

    #[test]
    fn color_parse_is_case_insensitive() {
        assert_eq!("purple".parse::<PlayerColor>().unwrap(), PlayerColor::Purple);
        assert!("teal".parse::<PlayerColor>().is_err());
    }

    #[test]
    fn player_id_round_trips_through_string() {
        let id = PlayerId::new();
        assert_eq!(id.to_string().parse::<PlayerId>().unwrap(), id);
        assert!("not-a-ulid".parse::<PlayerId>().is_err());
    }
}
