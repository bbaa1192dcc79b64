//! Test utilities & fixtures: throwaway worlds backed by temp
//! directories, plus helpers for minting logged-in players.

use std::sync::Arc;

use tempfile::TempDir;
use uuid::Uuid;
use wiremud::mud::{CommandProcessor, Session, SessionRegistry};
use wiremud::world::{WorldStore, WorldStoreBuilder};

/// A complete engine wired to a temp-dir store and a fresh registry.
/// Dropping it removes the data directory.
pub struct TestWorld {
    pub processor: CommandProcessor,
    pub store: Arc<WorldStore>,
    pub registry: Arc<SessionRegistry>,
    _tmp: TempDir,
}

/// World with the canonical starter rooms seeded.
pub fn seeded_world() -> TestWorld {
    build_world(true)
}

/// World with no rooms at all; tests construct their own geography.
pub fn empty_world() -> TestWorld {
    build_world(false)
}

fn build_world(seed: bool) -> TestWorld {
    let tmp = TempDir::new().expect("tempdir");
    let mut builder = WorldStoreBuilder::new(tmp.path().join("world"));
    if !seed {
        builder = builder.without_world_seed();
    }
    let store = Arc::new(builder.open().expect("open world store"));
    let registry = Arc::new(SessionRegistry::new());
    TestWorld {
        processor: CommandProcessor::new(Arc::clone(&store), Arc::clone(&registry)),
        store,
        registry,
        _tmp: tmp,
    }
}

/// Unique throwaway username.
pub fn test_username(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Create a user in `room_id`, plus a logged-in session registered in
/// the world's registry. Returns the session and the user's id.
#[allow(dead_code)] // not every integration test file mints players
pub async fn spawn_player(world: &TestWorld, room_id: Uuid, prefix: &str) -> (Session, Uuid) {
    let username = test_username(prefix);
    let mut user = world
        .store
        .create_user(&username, "password")
        .await
        .expect("create user");
    user.current_room_id = room_id;
    world.store.save_user(&user).await.expect("save user");

    let mut session = Session::new();
    session.player_id = Some(user.id);
    world.registry.replace_or_store(session.clone());
    (session, user.id)
}
