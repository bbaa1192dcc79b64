use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const USER_SCHEMA_VERSION: u8 = 1;
pub const ROOM_SCHEMA_VERSION: u8 = 1;
pub const DOOR_SCHEMA_VERSION: u8 = 1;

/// Compass directions an exit can point in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// The direction a traveller arrives from when passing this way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Direction {
    type Err = ();

    /// Case-insensitive; accepts the single-letter shortcuts players type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "N" | "NORTH" => Ok(Direction::North),
            "S" | "SOUTH" => Ok(Direction::South),
            "E" | "EAST" => Ok(Direction::East),
            "W" | "WEST" => Ok(Direction::West),
            "U" | "UP" => Ok(Direction::Up),
            "D" | "DOWN" => Ok(Direction::Down),
            _ => Err(()),
        }
    }
}

/// A persisted player identity. Sessions reference users by id after a
/// successful login; the password hash is an opaque PHC string and is
/// only ever fed to the verifier, never inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub schema_version: u8,
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub current_room_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: &str, password_hash: String, current_room_id: Uuid) -> Self {
        User {
            schema_version: USER_SCHEMA_VERSION,
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            current_room_id,
            created_at: Utc::now(),
        }
    }
}

/// A directed, possibly door-gated edge between two rooms. `door_id` of
/// `None` means the exit is always passable. Both sides of the same
/// passage reference one shared door record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exit {
    pub direction: Direction,
    pub target_room_id: Uuid,
    pub door_id: Option<Uuid>,
}

impl Exit {
    pub fn new(direction: Direction, target_room_id: Uuid) -> Self {
        Exit {
            direction,
            target_room_id,
            door_id: None,
        }
    }

    pub fn with_door(direction: Direction, target_room_id: Uuid, door_id: Uuid) -> Self {
        Exit {
            direction,
            target_room_id,
            door_id: Some(door_id),
        }
    }
}

/// A node in the navigable world graph. Exits keep their insertion
/// order; at most one exit per direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub schema_version: u8,
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub exits: Vec<Exit>,
}

impl Room {
    pub fn new(id: Uuid, name: &str, description: &str) -> Self {
        Room {
            schema_version: ROOM_SCHEMA_VERSION,
            id,
            name: name.to_string(),
            description: description.to_string(),
            exits: Vec::new(),
        }
    }

    /// Builder-style helper used by the world seed and tests.
    pub fn with_exit(mut self, exit: Exit) -> Self {
        debug_assert!(
            self.exit(exit.direction).is_none(),
            "duplicate exit direction in room {}",
            self.id
        );
        self.exits.push(exit);
        self
    }

    /// The room's exit in `direction`, if any.
    pub fn exit(&self, direction: Direction) -> Option<&Exit> {
        self.exits.iter().find(|e| e.direction == direction)
    }
}

/// An open/closed gate shared by the exits on both sides of a passage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Door {
    pub schema_version: u8,
    pub id: Uuid,
    pub is_open: bool,
}

impl Door {
    pub fn new(id: Uuid, is_open: bool) -> Self {
        Door {
            schema_version: DOOR_SCHEMA_VERSION,
            id,
            is_open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("north".parse::<Direction>(), Ok(Direction::North));
        assert_eq!("NORTH".parse::<Direction>(), Ok(Direction::North));
        assert_eq!("n".parse::<Direction>(), Ok(Direction::North));
        assert_eq!("sw".parse::<Direction>(), Err(()));
    }

    #[test]
    fn direction_display_is_lowercase() {
        assert_eq!(Direction::West.to_string(), "west");
        assert_eq!(Direction::Down.to_string(), "down");
    }

    #[test]
    fn opposite_round_trips() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn room_exit_lookup_matches_direction_exactly() {
        let target = Uuid::new_v4();
        let room = Room::new(Uuid::new_v4(), "Cellar", "Dusty.")
            .with_exit(Exit::new(Direction::Up, target));
        assert_eq!(room.exit(Direction::Up).map(|e| e.target_room_id), Some(target));
        assert!(room.exit(Direction::North).is_none());
    }
}
