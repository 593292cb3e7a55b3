use crate::p2_conditions::P2_CONDITIONS_HEX;
use crate::p2_delegated_puzzle_or_hidden_puzzle::{
    DEFAULT_HIDDEN_PUZZLE_HEX, P2_DELEGATED_PUZZLE_OR_HIDDEN_PUZZLE_HEX, SYNTHETIC_PUBLIC_KEY_HEX,
};
use dashmap::DashMap;
use dg_wallet_core::blockchain::sized_bytes::Bytes32;
use dg_wallet_core::clvm::program::Program;
use log::{debug, warn};
use std::io::{Error, ErrorKind};
use std::path::Path;

pub const CAT: &str = "cat";
pub const SYNTHETIC_PUBLIC_KEY: &str = "synthetic_public_key";
pub const DEFAULT_HIDDEN: &str = "default_hidden";
pub const PAY_TO_CONDITIONS: &str = "pay_to_conditions";
pub const PAY_TO_DELEGATED_OR_HIDDEN: &str = "pay_to_delegated_or_hidden";
pub const TAILS_DIR: &str = "tails";
pub const TEMPLATE_EXTENSION: &str = ".clvm.hex";

/// Tree hash of the version 2 asset token mod.
pub const CAT_MOD_HASH_HEX: &str = "37bef360ee858133b69d595a906dc45d01af50379dad515eb9518abb7c1d2a7a";

/// Named, content addressed puzzle templates.
///
/// The standard puzzles are built in. The asset token mod and the tails are loaded from disk with
/// [`PuzzleStore::load_dir`] or added with [`PuzzleStore::register`].
#[derive(Debug, Default)]
pub struct PuzzleStore {
    puzzles: DashMap<String, Program>,
}
impl PuzzleStore {
    pub fn new() -> Result<Self, Error> {
        let store = PuzzleStore::default();
        for (name, hex) in [
            (PAY_TO_CONDITIONS, P2_CONDITIONS_HEX),
            (PAY_TO_DELEGATED_OR_HIDDEN, P2_DELEGATED_PUZZLE_OR_HIDDEN_PUZZLE_HEX),
            (DEFAULT_HIDDEN, DEFAULT_HIDDEN_PUZZLE_HEX),
            (SYNTHETIC_PUBLIC_KEY, SYNTHETIC_PUBLIC_KEY_HEX),
        ] {
            store.register(name, Program::from_hex(hex)?);
        }
        Ok(store)
    }

    /// Adds or replaces a template, returning the previous one.
    pub fn register(&self, name: &str, program: Program) -> Option<Program> {
        if name == CAT {
            let hash = program.tree_hash();
            if Bytes32::try_from(CAT_MOD_HASH_HEX).is_ok_and(|expected| expected != hash) {
                warn!("Asset token template hash {hash} does not match the known mod hash");
            }
        }
        debug!("Registered puzzle {name}");
        self.puzzles.insert(name.to_string(), program)
    }

    pub fn get(&self, name: &str) -> Result<Program, Error> {
        self.puzzles
            .get(name)
            .map(|p| p.value().clone())
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("Could not find puzzle: {name}")))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.puzzles.contains_key(name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.puzzles.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Loads every `{name}.clvm.hex` in `path` and in its `tails` folder. Returns the number loaded.
    pub async fn load_dir(&self, path: &Path) -> Result<usize, Error> {
        let mut loaded = self.load_files(path).await?;
        let tails = path.join(TAILS_DIR);
        if tokio::fs::try_exists(&tails).await? {
            loaded += self.load_files(&tails).await?;
        }
        Ok(loaded)
    }

    async fn load_files(&self, path: &Path) -> Result<usize, Error> {
        let mut loaded = 0;
        let mut entries = tokio::fs::read_dir(path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name
                .to_str()
                .and_then(|n| n.strip_suffix(TEMPLATE_EXTENSION))
            else {
                continue;
            };
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let contents = tokio::fs::read_to_string(entry.path()).await?;
            let program = Program::from_hex(contents.trim()).map_err(|e| {
                Error::new(
                    ErrorKind::InvalidData,
                    format!("Failed to load puzzle {name}: {e}"),
                )
            })?;
            self.register(name, program);
            loaded += 1;
        }
        Ok(loaded)
    }
}
