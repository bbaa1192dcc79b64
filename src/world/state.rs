use uuid::Uuid;

use crate::world::types::{Direction, Door, Exit, Room};

/// Room every new character wakes up in. Must always resolve via
/// `WorldStore::find_room`; `seed_world_if_needed` guarantees it.
pub const STARTER_ROOM_ID: Uuid = Uuid::from_u128(0x0b1d_40aa_9c2e_4f6b_8d21_55e3_a0c7_1001);

const VILLAGE_GREEN_ID: Uuid = Uuid::from_u128(0x0b1d_40aa_9c2e_4f6b_8d21_55e3_a0c7_1002);
const HARBOUR_ROAD_ID: Uuid = Uuid::from_u128(0x0b1d_40aa_9c2e_4f6b_8d21_55e3_a0c7_1003);
const LIGHTHOUSE_BASE_ID: Uuid = Uuid::from_u128(0x0b1d_40aa_9c2e_4f6b_8d21_55e3_a0c7_1004);
const LIGHTHOUSE_LAMP_ID: Uuid = Uuid::from_u128(0x0b1d_40aa_9c2e_4f6b_8d21_55e3_a0c7_1005);
const CELLAR_ID: Uuid = Uuid::from_u128(0x0b1d_40aa_9c2e_4f6b_8d21_55e3_a0c7_1006);

/// Both sides of the inn's cellar hatch share this door.
const CELLAR_DOOR_ID: Uuid = Uuid::from_u128(0x0b1d_40aa_9c2e_4f6b_8d21_55e3_a0c7_2001);
/// Door between the lighthouse base and the lamp room.
const LAMP_DOOR_ID: Uuid = Uuid::from_u128(0x0b1d_40aa_9c2e_4f6b_8d21_55e3_a0c7_2002);

/// The sample world that ships with the server: six rooms around a small
/// fishing village. Only `STARTER_ROOM_ID` is a system requirement; the
/// rest is set dressing operators are free to replace.
pub fn canonical_world_rooms() -> Vec<Room> {
    vec![
        Room::new(
            STARTER_ROOM_ID,
            "The Driftwood Inn",
            "A low-beamed common room that smells of tar and spilled ale. A chalkboard by the bar lists yesterday's catch.",
        )
        .with_exit(Exit::new(Direction::North, VILLAGE_GREEN_ID))
        .with_exit(Exit::with_door(Direction::Down, CELLAR_ID, CELLAR_DOOR_ID)),
        Room::new(
            VILLAGE_GREEN_ID,
            "Village Green",
            "A patch of salt-bitten grass ringed by cottages. Gulls argue on the well roof.",
        )
        .with_exit(Exit::new(Direction::South, STARTER_ROOM_ID))
        .with_exit(Exit::new(Direction::East, HARBOUR_ROAD_ID)),
        Room::new(
            HARBOUR_ROAD_ID,
            "Harbour Road",
            "Cobblestones slick with spray run down toward the moorings. The lighthouse stands at the far end.",
        )
        .with_exit(Exit::new(Direction::West, VILLAGE_GREEN_ID))
        .with_exit(Exit::new(Direction::East, LIGHTHOUSE_BASE_ID)),
        Room::new(
            LIGHTHOUSE_BASE_ID,
            "Lighthouse Base",
            "A round stone chamber. A spiral stair winds up into the dark; coils of rope hang from iron pegs.",
        )
        .with_exit(Exit::new(Direction::West, HARBOUR_ROAD_ID))
        .with_exit(Exit::with_door(Direction::Up, LIGHTHOUSE_LAMP_ID, LAMP_DOOR_ID)),
        Room::new(
            LIGHTHOUSE_LAMP_ID,
            "Lamp Room",
            "Glass on every side and the great lamp at the centre. On clear nights you can see three parishes.",
        )
        .with_exit(Exit::with_door(Direction::Down, LIGHTHOUSE_BASE_ID, LAMP_DOOR_ID)),
        Room::new(
            CELLAR_ID,
            "Inn Cellar",
            "Barrels, cobwebs, and a single guttering candle. Something scurries behind the cider racks.",
        )
        .with_exit(Exit::with_door(Direction::Up, STARTER_ROOM_ID, CELLAR_DOOR_ID)),
    ]
}

/// Doors referenced by the canonical rooms. The cellar hatch starts
/// closed so new players meet the open-door mechanic early; the lamp
/// room door starts open.
pub fn canonical_world_doors() -> Vec<Door> {
    vec![
        Door::new(CELLAR_DOOR_ID, false),
        Door::new(LAMP_DOOR_ID, true),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_contains_starter_room() {
        assert!(canonical_world_rooms().iter().any(|r| r.id == STARTER_ROOM_ID));
    }

    #[test]
    fn seed_exit_directions_are_unique_per_room() {
        for room in canonical_world_rooms() {
            let mut seen = std::collections::HashSet::new();
            for exit in &room.exits {
                assert!(seen.insert(exit.direction), "duplicate exit in {}", room.name);
            }
        }
    }

    #[test]
    fn seed_doors_are_shared_by_both_sides() {
        let rooms = canonical_world_rooms();
        let doors = canonical_world_doors();
        for room in &rooms {
            for exit in &room.exits {
                let Some(door_id) = exit.door_id else { continue };
                assert!(doors.iter().any(|d| d.id == door_id));
                let target = rooms
                    .iter()
                    .find(|r| r.id == exit.target_room_id)
                    .expect("exit target exists in seed");
                let back = target
                    .exit(exit.direction.opposite())
                    .expect("gated passage has a return exit");
                assert_eq!(back.door_id, Some(door_id));
            }
        }
    }
}
