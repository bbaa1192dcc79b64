use std::path::{Path, PathBuf};

use argon2::Argon2;
use log::{debug, info};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier};
use sled::IVec;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::world::errors::WorldError;
use crate::world::state::{canonical_world_doors, canonical_world_rooms};
use crate::world::types::{
    Door, Room, User, DOOR_SCHEMA_VERSION, ROOM_SCHEMA_VERSION, USER_SCHEMA_VERSION,
};

const TREE_USERS: &str = "users";
const TREE_USERNAMES: &str = "usernames";
const TREE_ROOMS: &str = "rooms";
const TREE_DOORS: &str = "doors";

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct WorldStoreBuilder {
    path: PathBuf,
    ensure_world_seed: bool,
}

impl WorldStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ensure_world_seed: true,
        }
    }

    /// Opt out of seeding the canonical world during initialization
    /// (useful for targeted tests that build their own rooms).
    pub fn without_world_seed(mut self) -> Self {
        self.ensure_world_seed = false;
        self
    }

    pub fn open(self) -> Result<WorldStore, WorldError> {
        WorldStore::open_with_options(self.path, self.ensure_world_seed)
    }
}

struct WorldDb {
    _db: sled::Db,
    users: sled::Tree,
    usernames: sled::Tree,
    rooms: sled::Tree,
    doors: sled::Tree,
}

impl WorldDb {
    fn open(path: &Path) -> Result<Self, WorldError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        let users = db.open_tree(TREE_USERS)?;
        let usernames = db.open_tree(TREE_USERNAMES)?;
        let rooms = db.open_tree(TREE_ROOMS)?;
        let doors = db.open_tree(TREE_DOORS)?;
        Ok(WorldDb {
            _db: db,
            users,
            usernames,
            rooms,
            doors,
        })
    }

    /// Insert the canonical starter world when the room tree is empty.
    /// Returns the number of rooms written.
    fn seed_world_if_needed(&self) -> Result<usize, WorldError> {
        if !self.rooms.is_empty() {
            return Ok(0);
        }
        let rooms = canonical_world_rooms();
        for room in &rooms {
            let bytes = serialize(room)?;
            self.rooms.insert(room.id.as_bytes(), bytes)?;
        }
        for door in canonical_world_doors() {
            let bytes = serialize(&door)?;
            self.doors.insert(door.id.as_bytes(), bytes)?;
        }
        self.rooms.flush()?;
        self.doors.flush()?;
        info!("seeded starter world with {} rooms", rooms.len());
        Ok(rooms.len())
    }
}

fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, WorldError> {
    Ok(bincode::serialize(value)?)
}

fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, WorldError> {
    Ok(bincode::deserialize::<T>(&bytes)?)
}

fn check_schema(entity: &'static str, expected: u8, found: u8) -> Result<(), WorldError> {
    if expected != found {
        return Err(WorldError::SchemaMismatch {
            entity,
            expected,
            found,
        });
    }
    Ok(())
}

fn username_key(username: &str) -> Vec<u8> {
    username.to_lowercase().into_bytes()
}

/// Sled-backed persistence for users, rooms and doors.
///
/// Records are read, mutated in memory and re-saved within a single
/// command invocation; there is no per-entity locking or version check,
/// so two commands racing on the same record resolve last-write-wins.
/// The handle sits behind an async `RwLock<Option<..>>` only so
/// [`WorldStore::reload_storage`] can drop the open db (sled holds an
/// exclusive file lock per path) and swap in a fresh one; individual
/// operations take the read side.
pub struct WorldStore {
    inner: RwLock<Option<WorldDb>>,
    path: PathBuf,
    argon2: Argon2<'static>,
}

impl WorldStore {
    /// Open (or create) the world store rooted at `path`. The canonical
    /// starter world is inserted if no rooms exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WorldError> {
        Self::open_with_options(path.as_ref().to_path_buf(), true)
    }

    fn open_with_options(path: PathBuf, seed_world: bool) -> Result<Self, WorldError> {
        let db = WorldDb::open(&path)?;
        if seed_world {
            db.seed_world_if_needed()?;
        }
        Ok(Self {
            inner: RwLock::new(Some(db)),
            path,
            argon2: Argon2::default(),
        })
    }

    // -- users ------------------------------------------------------------

    /// Fetch a user by id; `Ok(None)` when absent.
    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>, WorldError> {
        let guard = self.inner.read().await;
        let db = db_handle(&guard)?;
        let Some(bytes) = db.users.get(id.as_bytes())? else {
            return Ok(None);
        };
        let user: User = deserialize(bytes)?;
        check_schema("user", USER_SCHEMA_VERSION, user.schema_version)?;
        Ok(Some(user))
    }

    /// Fetch a user by (case-insensitive) username via the index tree.
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, WorldError> {
        let id = {
            let guard = self.inner.read().await;
            let db = db_handle(&guard)?;
            match db.usernames.get(username_key(username))? {
                Some(bytes) => Uuid::from_slice(&bytes)
                    .map_err(|_| WorldError::NotFound(format!("username index: {}", username)))?,
                None => return Ok(None),
            }
        };
        self.find_user(id).await
    }

    /// Insert or update a user record, maintaining the username index.
    pub async fn save_user(&self, user: &User) -> Result<(), WorldError> {
        let guard = self.inner.read().await;
        let db = db_handle(&guard)?;
        let bytes = serialize(user)?;
        db.users.insert(user.id.as_bytes(), bytes)?;
        db.usernames
            .insert(username_key(&user.username), user.id.as_bytes().to_vec())?;
        db.users.flush()?;
        Ok(())
    }

    pub async fn user_count(&self) -> Result<usize, WorldError> {
        let guard = self.inner.read().await;
        Ok(db_handle(&guard)?.users.len())
    }

    /// Create a new user with a freshly hashed password and place them in
    /// the starter room. Fails with [`WorldError::UsernameAlreadyTaken`]
    /// when the name is in use.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User, WorldError> {
        if self.find_user_by_username(username).await?.is_some() {
            return Err(WorldError::UsernameAlreadyTaken);
        }
        let salt = password_hash::SaltString::generate(&mut rand::thread_rng());
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string();
        let user = User::new(username, hash, crate::world::state::STARTER_ROOM_ID);
        self.save_user(&user).await?;
        info!("created user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Verify a username/password pair, returning the user on success.
    /// An unknown username and a wrong password both surface as
    /// [`WorldError::PasswordMismatch`].
    pub async fn verify_login(&self, username: &str, password: &str) -> Result<User, WorldError> {
        let Some(user) = self.find_user_by_username(username).await? else {
            return Err(WorldError::PasswordMismatch);
        };
        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| WorldError::PasswordHash(e.to_string()))?;
        if self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(WorldError::PasswordMismatch);
        }
        Ok(user)
    }

    // -- rooms ------------------------------------------------------------

    pub async fn find_room(&self, id: Uuid) -> Result<Option<Room>, WorldError> {
        let guard = self.inner.read().await;
        let db = db_handle(&guard)?;
        let Some(bytes) = db.rooms.get(id.as_bytes())? else {
            return Ok(None);
        };
        let room: Room = deserialize(bytes)?;
        check_schema("room", ROOM_SCHEMA_VERSION, room.schema_version)?;
        Ok(Some(room))
    }

    pub async fn save_room(&self, room: &Room) -> Result<(), WorldError> {
        let guard = self.inner.read().await;
        let db = db_handle(&guard)?;
        let bytes = serialize(room)?;
        db.rooms.insert(room.id.as_bytes(), bytes)?;
        db.rooms.flush()?;
        Ok(())
    }

    pub async fn room_count(&self) -> Result<usize, WorldError> {
        let guard = self.inner.read().await;
        Ok(db_handle(&guard)?.rooms.len())
    }

    // -- doors ------------------------------------------------------------

    pub async fn find_door(&self, id: Uuid) -> Result<Option<Door>, WorldError> {
        let guard = self.inner.read().await;
        let db = db_handle(&guard)?;
        let Some(bytes) = db.doors.get(id.as_bytes())? else {
            return Ok(None);
        };
        let door: Door = deserialize(bytes)?;
        check_schema("door", DOOR_SCHEMA_VERSION, door.schema_version)?;
        Ok(Some(door))
    }

    pub async fn save_door(&self, door: &Door) -> Result<(), WorldError> {
        let guard = self.inner.read().await;
        let db = db_handle(&guard)?;
        let bytes = serialize(door)?;
        db.doors.insert(door.id.as_bytes(), bytes)?;
        db.doors.flush()?;
        Ok(())
    }

    pub async fn door_count(&self) -> Result<usize, WorldError> {
        let guard = self.inner.read().await;
        Ok(db_handle(&guard)?.doors.len())
    }

    // -- maintenance ------------------------------------------------------

    /// Re-run world seeding (no-op when rooms already exist).
    pub async fn seed_world_if_needed(&self) -> Result<usize, WorldError> {
        let guard = self.inner.read().await;
        db_handle(&guard)?.seed_world_if_needed()
    }

    /// Discard the open database handle and reopen from disk. Used by
    /// tests and recovery paths; in-flight readers finish first. The old
    /// handle must drop before the reopen because sled takes an exclusive
    /// file lock on the path.
    pub async fn reload_storage(&self) -> Result<(), WorldError> {
        let mut guard = self.inner.write().await;
        guard.take();
        let fresh = WorldDb::open(&self.path)?;
        *guard = Some(fresh);
        debug!("reloaded world storage from {}", self.path.display());
        Ok(())
    }
}

/// A `None` handle means a reload failed mid-swap; surface that as an IO
/// error instead of panicking in a command task.
fn db_handle<'a>(
    guard: &'a tokio::sync::RwLockReadGuard<'_, Option<WorldDb>>,
) -> Result<&'a WorldDb, WorldError> {
    guard.as_ref().ok_or_else(|| {
        WorldError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "world storage is offline (reload in progress failed)",
        ))
    })
}
