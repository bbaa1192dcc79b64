//! Command catalog and the gated execution engine.
//!
//! Raw lines become a [`Verb`], the catalog resolves the verb into a
//! [`MudCommand`], and [`CommandProcessor`] runs it: authorization first,
//! then domain logic against the world store and session registry. Every
//! invocation produces at least one addressed response — failures are
//! ordinary text to the invoker, never silence and never a disconnect
//! (CLOSE excepted, which is a successful request to disconnect).
use std::sync::Arc;

use log::{debug, error};

use crate::logutil::escape_log;
use crate::metrics;
use crate::mud::session::{MudResponse, Session, SessionRegistry};
use crate::mud::verb::Verb;
use crate::validation::validate_username;
use crate::world::errors::WorldError;
use crate::world::types::{Direction, Room, User};
use crate::world::WorldStore;

/// Uniform reply when a login-required command runs on a session with no
/// associated player.
pub const COULD_NOT_FIND_PLAYER: &str =
    "Could not find a player for this session. Please LOGIN or CREATE_USER first.";

/// Reply for lines that parse to `Verb::Illegal`.
pub const ILLEGAL_COMMAND_MESSAGE: &str =
    "Unrecognized or incomplete command. Type HELP for a list of commands.";

/// Reply for blank lines (`Verb::Empty`).
pub const EMPTY_COMMAND_MESSAGE: &str =
    "Please enter a command. Type HELP for a list of commands.";

/// Reply when a command aborts on a storage failure. The engine
/// guarantees the invoker still hears *something*.
pub const INTERNAL_ERROR_MESSAGE: &str =
    "Something went wrong while handling that command. Please try again.";

pub const HELP_STRING: &str = "\
These are the commands I understand:
  HELP                               this overview
  CLOSE                              disconnect from the server
  CREATE_USER <username> <password>  create a new character
  LOGIN <username> <password>        log in as an existing character
  LOOK                               describe your surroundings
  GO <direction>                     move north, south, east, west, up or down
  OPEN_DOOR <direction>              open the door blocking an exit
  SAY <message>                      talk to everyone in your room
  WHISPER <player> <message>         talk privately to one player";

/// An executable unit bound to a verb and the session that issued it.
#[derive(Debug, Clone)]
pub enum MudCommand {
    Help {
        session: Session,
    },
    Close {
        session: Session,
    },
    CreateUser {
        session: Session,
        username: String,
        password: String,
    },
    Login {
        session: Session,
        username: String,
        password: String,
    },
    Look {
        session: Session,
    },
    Go {
        session: Session,
        direction: Direction,
    },
    OpenDoor {
        session: Session,
        direction: Direction,
    },
    Say {
        session: Session,
        sentence: String,
    },
    Whisper {
        session: Session,
        target: String,
        message: String,
    },
}

impl MudCommand {
    pub fn session(&self) -> &Session {
        match self {
            MudCommand::Help { session }
            | MudCommand::Close { session }
            | MudCommand::CreateUser { session, .. }
            | MudCommand::Login { session, .. }
            | MudCommand::Look { session }
            | MudCommand::Go { session, .. }
            | MudCommand::OpenDoor { session, .. }
            | MudCommand::Say { session, .. }
            | MudCommand::Whisper { session, .. } => session,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MudCommand::Help { .. } => "HELP",
            MudCommand::Close { .. } => "CLOSE",
            MudCommand::CreateUser { .. } => "CREATE_USER",
            MudCommand::Login { .. } => "LOGIN",
            MudCommand::Look { .. } => "LOOK",
            MudCommand::Go { .. } => "GO",
            MudCommand::OpenDoor { .. } => "OPEN_DOOR",
            MudCommand::Say { .. } => "SAY",
            MudCommand::Whisper { .. } => "WHISPER",
        }
    }

    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            MudCommand::Look { .. }
                | MudCommand::Go { .. }
                | MudCommand::OpenDoor { .. }
                | MudCommand::Say { .. }
                | MudCommand::Whisper { .. }
        )
    }
}

/// Static description of one command type: its verb word, arity, login
/// requirement and constructor. `all_commands()` is the closed catalog
/// used for dispatch and for generic property tests (e.g. iterating
/// every login-gated command).
pub struct CommandSpec {
    pub name: &'static str,
    pub expected_argument_count: usize,
    pub requires_login: bool,
    pub create: fn(&[String], Session) -> Option<MudCommand>,
}

static CATALOG: [CommandSpec; 9] = [
    CommandSpec {
        name: "HELP",
        expected_argument_count: 0,
        requires_login: false,
        create: |_, session| Some(MudCommand::Help { session }),
    },
    CommandSpec {
        name: "CLOSE",
        expected_argument_count: 0,
        requires_login: false,
        create: |_, session| Some(MudCommand::Close { session }),
    },
    CommandSpec {
        name: "CREATE_USER",
        expected_argument_count: 2,
        requires_login: false,
        create: |args, session| {
            Some(MudCommand::CreateUser {
                session,
                username: args.first()?.clone(),
                password: args.get(1)?.clone(),
            })
        },
    },
    CommandSpec {
        name: "LOGIN",
        expected_argument_count: 2,
        requires_login: false,
        create: |args, session| {
            Some(MudCommand::Login {
                session,
                username: args.first()?.clone(),
                password: args.get(1)?.clone(),
            })
        },
    },
    CommandSpec {
        name: "LOOK",
        expected_argument_count: 0,
        requires_login: true,
        create: |_, session| Some(MudCommand::Look { session }),
    },
    CommandSpec {
        name: "GO",
        expected_argument_count: 1,
        requires_login: true,
        create: |args, session| {
            let direction = args.first()?.parse::<Direction>().ok()?;
            Some(MudCommand::Go { session, direction })
        },
    },
    CommandSpec {
        name: "OPEN_DOOR",
        expected_argument_count: 1,
        requires_login: true,
        create: |args, session| {
            let direction = args.first()?.parse::<Direction>().ok()?;
            Some(MudCommand::OpenDoor { session, direction })
        },
    },
    CommandSpec {
        name: "SAY",
        expected_argument_count: 1,
        requires_login: true,
        create: |args, session| {
            Some(MudCommand::Say {
                session,
                sentence: args.first()?.clone(),
            })
        },
    },
    CommandSpec {
        name: "WHISPER",
        expected_argument_count: 2,
        requires_login: true,
        create: |args, session| {
            Some(MudCommand::Whisper {
                session,
                target: args.first()?.clone(),
                message: args.get(1)?.clone(),
            })
        },
    },
];

/// The enumerable catalog of every command type.
pub fn all_commands() -> &'static [CommandSpec] {
    &CATALOG
}

/// Resolve a catalog entry by verb word (case-sensitive; verbs already
/// normalize during parsing).
pub fn command_spec(name: &str) -> Option<&'static CommandSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

/// Runs commands against the world store and session registry.
///
/// Per invocation the processor moves through parse → authorization →
/// execution and always returns a non-empty response list. Session
/// mutations performed by commands are written back through
/// [`SessionRegistry::replace_or_store`] before the responses return, so
/// the transport and later commands observe them.
pub struct CommandProcessor {
    store: Arc<WorldStore>,
    registry: Arc<SessionRegistry>,
}

impl CommandProcessor {
    pub fn new(store: Arc<WorldStore>, registry: Arc<SessionRegistry>) -> Self {
        CommandProcessor { store, registry }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<WorldStore> {
        &self.store
    }

    /// Handle one raw input line from `session`: parse, resolve against
    /// the catalog, execute. Total — every line yields at least one
    /// response.
    pub async fn process_line(&self, session: Session, raw: &str) -> Vec<MudResponse> {
        let verb = Verb::parse(raw);
        debug!(
            "session {}: line {:?} parsed to {}",
            session.id,
            escape_log(raw),
            verb.command_name().unwrap_or("<rejected>")
        );

        let Some(name) = verb.command_name() else {
            let message = match verb {
                Verb::Empty => EMPTY_COMMAND_MESSAGE,
                _ => ILLEGAL_COMMAND_MESSAGE,
            };
            return vec![MudResponse::new(session, message)];
        };

        let spec = command_spec(name).expect("catalog covers every parseable verb");
        match (spec.create)(&verb.arguments(), session.clone()) {
            Some(command) => self.execute(command).await,
            None => vec![MudResponse::new(session, ILLEGAL_COMMAND_MESSAGE)],
        }
    }

    /// Run one command through authorization and domain logic.
    pub async fn execute(&self, command: MudCommand) -> Vec<MudResponse> {
        metrics::inc_commands_executed();

        if command.requires_login() && !command.session().is_logged_in() {
            return vec![MudResponse::new(
                command.session().clone(),
                COULD_NOT_FIND_PLAYER,
            )];
        }

        let session = command.session().clone();
        match self.run(command).await {
            Ok(responses) => {
                debug_assert!(!responses.is_empty(), "commands must produce a response");
                responses
            }
            Err(err) => {
                error!("command failed for session {}: {}", session.id, err);
                vec![MudResponse::new(session, INTERNAL_ERROR_MESSAGE)]
            }
        }
    }

    async fn run(&self, command: MudCommand) -> Result<Vec<MudResponse>, WorldError> {
        match command {
            MudCommand::Help { session } => {
                Ok(vec![MudResponse::new(session, HELP_STRING)])
            }
            MudCommand::Close { session } => self.close(session),
            MudCommand::CreateUser {
                session,
                username,
                password,
            } => self.create_user(session, &username, &password).await,
            MudCommand::Login {
                session,
                username,
                password,
            } => self.login(session, &username, &password).await,
            MudCommand::Look { session } => self.look(session).await,
            MudCommand::Go { session, direction } => self.go(session, direction).await,
            MudCommand::OpenDoor { session, direction } => {
                self.open_door(session, direction).await
            }
            MudCommand::Say { session, sentence } => self.say(session, &sentence).await,
            MudCommand::Whisper {
                session,
                target,
                message,
            } => self.whisper(session, &target, &message).await,
        }
    }

    // -- command bodies ---------------------------------------------------

    fn close(&self, mut session: Session) -> Result<Vec<MudResponse>, WorldError> {
        session.should_close = true;
        self.registry.replace_or_store(session.clone());
        Ok(vec![MudResponse::new(
            session,
            "Closing the connection. Goodbye!",
        )])
    }

    async fn create_user(
        &self,
        mut session: Session,
        username: &str,
        password: &str,
    ) -> Result<Vec<MudResponse>, WorldError> {
        if let Err(reason) = validate_username(username) {
            return Ok(vec![MudResponse::new(
                session,
                format!("Error creating user: {}", reason),
            )]);
        }

        match self.store.create_user(username, password).await {
            Ok(user) => {
                session.player_id = Some(user.id);
                self.registry.replace_or_store(session.clone());
                Ok(vec![MudResponse::new(
                    session,
                    format!("Welcome, {}!", user.username),
                )])
            }
            Err(WorldError::UsernameAlreadyTaken) => Ok(vec![MudResponse::new(
                session,
                format!("Error creating user: {}", WorldError::UsernameAlreadyTaken),
            )]),
            Err(other) => Err(other),
        }
    }

    async fn login(
        &self,
        mut session: Session,
        username: &str,
        password: &str,
    ) -> Result<Vec<MudResponse>, WorldError> {
        match self.store.verify_login(username, password).await {
            Ok(user) => {
                session.player_id = Some(user.id);
                self.registry.replace_or_store(session.clone());
                debug!("session {} logged in as {}", session.id, user.username);
                Ok(vec![MudResponse::new(
                    session,
                    format!("Welcome back, {}!", user.username),
                )])
            }
            Err(WorldError::PasswordMismatch) => Ok(vec![MudResponse::new(
                session,
                format!("Error logging in user: {}", WorldError::PasswordMismatch),
            )]),
            Err(other) => Err(other),
        }
    }

    async fn look(&self, session: Session) -> Result<Vec<MudResponse>, WorldError> {
        let Some(player) = self.player_for(&session).await? else {
            return Ok(vec![MudResponse::new(session, COULD_NOT_FIND_PLAYER)]);
        };
        let Some(room) = self.store.find_room(player.current_room_id).await? else {
            return Ok(vec![MudResponse::new(
                session,
                "You are nowhere to be found. That should not happen.",
            )]);
        };
        let rendered = self.render_room(&room).await?;
        Ok(vec![MudResponse::new(session, rendered)])
    }

    async fn go(
        &self,
        session: Session,
        direction: Direction,
    ) -> Result<Vec<MudResponse>, WorldError> {
        let Some(mut player) = self.player_for(&session).await? else {
            return Ok(vec![MudResponse::new(session, COULD_NOT_FIND_PLAYER)]);
        };
        let Some(room) = self.store.find_room(player.current_room_id).await? else {
            return Ok(vec![MudResponse::new(
                session,
                "You are nowhere to be found. That should not happen.",
            )]);
        };

        let Some(exit) = room.exit(direction).cloned() else {
            return Ok(vec![MudResponse::new(
                session,
                format!("No exit found in direction {}.", direction),
            )]);
        };

        if let Some(door_id) = exit.door_id {
            if let Some(door) = self.store.find_door(door_id).await? {
                if !door.is_open {
                    return Ok(vec![MudResponse::new(session, "The exit is impassable.")]);
                }
            }
        }

        player.current_room_id = exit.target_room_id;
        self.store.save_user(&player).await?;

        let message = match self.store.find_room(exit.target_room_id).await? {
            Some(destination) => self.render_room(&destination).await?,
            None => format!("You go {} into the unknown.", direction),
        };
        Ok(vec![MudResponse::new(session, message)])
    }

    async fn open_door(
        &self,
        session: Session,
        direction: Direction,
    ) -> Result<Vec<MudResponse>, WorldError> {
        let Some(player) = self.player_for(&session).await? else {
            return Ok(vec![MudResponse::new(session, COULD_NOT_FIND_PLAYER)]);
        };
        let Some(room) = self.store.find_room(player.current_room_id).await? else {
            return Ok(vec![MudResponse::new(
                session,
                "You are nowhere to be found. That should not happen.",
            )]);
        };

        let Some(exit) = room.exit(direction).cloned() else {
            return Ok(vec![MudResponse::new(
                session,
                format!("No exit found in direction {}.", direction),
            )]);
        };

        let Some(door_id) = exit.door_id else {
            return Ok(vec![MudResponse::new(
                session,
                format!("There is no door in direction {}.", direction),
            )]);
        };
        let Some(mut door) = self.store.find_door(door_id).await? else {
            return Ok(vec![MudResponse::new(
                session,
                format!("There is no door in direction {}.", direction),
            )]);
        };

        if door.is_open {
            return Ok(vec![MudResponse::new(
                session,
                format!("Door in direction {} is already open.", direction),
            )]);
        }

        door.is_open = true;
        self.store.save_door(&door).await?;
        Ok(vec![MudResponse::new(
            session,
            format!("You open the door in direction {}.", direction),
        )])
    }

    async fn say(&self, session: Session, sentence: &str) -> Result<Vec<MudResponse>, WorldError> {
        let Some(player) = self.player_for(&session).await? else {
            return Ok(vec![MudResponse::new(session, COULD_NOT_FIND_PLAYER)]);
        };

        let mut responses = vec![MudResponse::new(
            session.clone(),
            format!("You say: {}", sentence),
        )];
        let heard = format!("{} says: {}", player.username, sentence);
        for other in self.room_mates(&session, player.current_room_id).await? {
            responses.push(MudResponse::new(other, heard.clone()));
        }
        Ok(responses)
    }

    async fn whisper(
        &self,
        session: Session,
        target: &str,
        message: &str,
    ) -> Result<Vec<MudResponse>, WorldError> {
        let Some(player) = self.player_for(&session).await? else {
            return Ok(vec![MudResponse::new(session, COULD_NOT_FIND_PLAYER)]);
        };

        let Some(target_user) = self.store.find_user_by_username(target).await? else {
            return Ok(vec![MudResponse::new(
                session,
                format!("Could not find player with name {}.", target),
            )]);
        };

        if target_user.id == player.id {
            return Ok(vec![MudResponse::new(session, "Talking to yourself much, eh?")]);
        }

        let Some(target_session) = self
            .registry
            .first_where(|s| s.player_id == Some(target_user.id))
        else {
            return Ok(vec![MudResponse::new(
                session,
                format!("{} is not online right now.", target_user.username),
            )]);
        };

        let mut responses = vec![
            MudResponse::new(
                session.clone(),
                format!("You whisper to {}: {}", target_user.username, message),
            ),
            MudResponse::new(
                target_session.clone(),
                format!("{} whispers to you: {}", player.username, message),
            ),
        ];

        let overheard = format!(
            "{} whispers something to {}, but you can't quite make out what is said.",
            player.username, target_user.username
        );
        for other in self.room_mates(&session, player.current_room_id).await? {
            if other.id == target_session.id {
                continue;
            }
            responses.push(MudResponse::new(other, overheard.clone()));
        }
        Ok(responses)
    }

    // -- shared helpers ---------------------------------------------------

    async fn player_for(&self, session: &Session) -> Result<Option<User>, WorldError> {
        match session.player_id {
            Some(id) => self.store.find_user(id).await,
            None => Ok(None),
        }
    }

    /// Every registered session other than `session` whose player is
    /// currently in `room_id`, in registry scan order.
    async fn room_mates(
        &self,
        session: &Session,
        room_id: uuid::Uuid,
    ) -> Result<Vec<Session>, WorldError> {
        let mut mates = Vec::new();
        for other in self.registry.snapshot() {
            if other.id == session.id {
                continue;
            }
            let Some(player_id) = other.player_id else {
                continue;
            };
            let Some(user) = self.store.find_user(player_id).await? else {
                continue;
            };
            if user.current_room_id == room_id {
                mates.push(other);
            }
        }
        Ok(mates)
    }

    /// Room rendering shared by LOOK and a successful GO: name first,
    /// then description, then the exit list with door state.
    async fn render_room(&self, room: &Room) -> Result<String, WorldError> {
        if room.exits.is_empty() {
            return Ok(format!(
                "{}\n{}\nThere are no obvious exits.",
                room.name, room.description
            ));
        }

        let mut exits = Vec::with_capacity(room.exits.len());
        for exit in &room.exits {
            match exit.door_id {
                None => exits.push(exit.direction.to_string()),
                Some(door_id) => {
                    let state = match self.store.find_door(door_id).await? {
                        Some(door) if door.is_open => "open",
                        Some(_) => "closed",
                        None => "open",
                    };
                    exits.push(format!("{} (door, {})", exit.direction, state));
                }
            }
        }
        Ok(format!(
            "{}\n{}\nExits: {}.",
            room.name,
            room.description,
            exits.join(", ")
        ))
    }
}
