use mars_stats::{GameRecord, GameSet, GameSource};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode game records in {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("game id {game:?} cannot name a log file")]
    UnsafeGameId { game: String },
}

/// A game id usable as a file stem inside the logs directory.
fn is_plain_file_stem(game: &str) -> bool {
    let mut components = Path::new(game).components();
    matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
        && !game.contains(['/', '\\'])
}

/// Game records from a JSON array, logs from `<logs_dir>/<game id>.txt`.
#[derive(Debug, Clone)]
pub struct JsonGameSource {
    games_path: PathBuf,
    logs_dir: Option<PathBuf>,
}

impl JsonGameSource {
    pub const fn new(games_path: PathBuf, logs_dir: Option<PathBuf>) -> Self {
        Self {
            games_path,
            logs_dir,
        }
    }

    fn read_log(dir: &Path, game: &str) -> Result<Option<String>, LoadError> {
        if !is_plain_file_stem(game) {
            return Err(LoadError::UnsafeGameId {
                game: game.to_string(),
            });
        }
        let path = dir.join(format!("{game}.txt"));
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("no log for game {game} at {}", path.display());
                Ok(None)
            }
            Err(source) => Err(LoadError::Io { path, source }),
        }
    }
}

impl GameSource for JsonGameSource {
    type Error = LoadError;

    fn load_games(&self) -> Result<GameSet, Self::Error> {
        let raw = std::fs::read_to_string(&self.games_path).map_err(|source| LoadError::Io {
            path: self.games_path.clone(),
            source,
        })?;
        let records: Vec<GameRecord> =
            serde_json::from_str(&raw).map_err(|source| LoadError::Decode {
                path: self.games_path.clone(),
                source,
            })?;

        let mut games = GameSet::new();
        for record in records {
            let log = match &self.logs_dir {
                Some(dir) => Self::read_log(dir, &record.id)?,
                None => None,
            };
            games.push(record, log);
        }
        log::info!(
            "loaded {} games ({} with logs) from {}",
            games.len(),
            games.logged_count(),
            self.games_path.display()
        );
        Ok(games)
    }
}
