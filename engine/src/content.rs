//! Content compiled into the engine so a battle can run without any files.

pub const BUILTIN_MOVES: &str = include_str!("../content/moves.json");
pub const BUILTIN_ARENAS: &str = include_str!("../content/arenas.yaml");
pub const DEFAULT_CONFIG: &str = include_str!("../content/battle.yaml");
