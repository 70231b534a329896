use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::config::RoundConfig;
use crate::error::{BingoError, Result};
use crate::store::record::{FinishReason, RoundRecord};
use crate::store::RoundStore;
use crate::types::PlayerName;

/// Round store backed by one text file per round
#[derive(Debug, Clone, Default)]
pub struct FileRoundStore;

impl FileRoundStore {
    /// Create a file-backed store
    pub fn new() -> Self {
        Self
    }

    fn append(&self, path: &Path, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => BingoError::NotFound(path.to_path_buf()),
                _ => BingoError::Io(e),
            })?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

impl RoundStore for FileRoundStore {
    fn create(&self, path: &Path, config: &RoundConfig) -> Result<RoundRecord> {
        config.validate()?;

        // create_new fails atomically if the file exists, so an existing round
        // is never truncated
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => BingoError::AlreadyExists(path.to_path_buf()),
                _ => BingoError::Io(e),
            })?;

        let record = RoundRecord::new(config.clone());
        file.write_all(record.to_string().as_bytes())?;
        file.flush()?;

        tracing::debug!("Round file {} created", path.display());
        Ok(record)
    }

    fn read(&self, path: &Path) -> Result<RoundRecord> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BingoError::NotFound(path.to_path_buf()),
            _ => BingoError::Io(e),
        })?;
        RoundRecord::parse(&text)
    }

    fn try_join(&self, path: &Path, player: &PlayerName) -> Result<()> {
        let record = self.read(path)?;
        record.check_join(player)?;
        self.append(path, &RoundRecord::player_line(player))?;
        tracing::debug!("Player '{}' appended to {}", player, path.display());
        Ok(())
    }

    fn mark_finished(&self, path: &Path, reason: FinishReason) -> Result<bool> {
        let record = self.read(path)?;
        if record.finished {
            return Ok(false);
        }
        self.append(path, &RoundRecord::finish_lines(reason))?;
        tracing::debug!("Round {} marked finished ({:?})", path.display(), reason);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PlayerName {
        PlayerName::new(s).unwrap()
    }

    #[test]
    fn test_create_then_read_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRoundStore::new();

        for (height, width) in [(1, 1), (3, 3), (4, 4), (5, 5), (2, 7), (9, 3)] {
            let path = dir.path().join(format!("round_{}x{}", height, width));
            let config = RoundConfig::new(3, height, width, "words.txt");
            store.create(&path, &config).unwrap();
            assert_eq!(store.read_config(&path).unwrap(), config);
            assert!(store.read_roster(&path).unwrap().is_empty());
        }
    }

    #[test]
    fn test_create_refuses_existing_round() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round");
        let store = FileRoundStore::new();

        store.create(&path, &RoundConfig::new(2, 5, 5, "w")).unwrap();
        store.try_join(&path, &name("ann")).unwrap();

        let again = store.create(&path, &RoundConfig::new(4, 3, 3, "other"));
        assert!(matches!(again, Err(BingoError::AlreadyExists(_))));

        // Original content survives
        let record = store.read(&path).unwrap();
        assert_eq!(record.config.max_players, 2);
        assert_eq!(record.players, vec![name("ann")]);
    }

    #[test]
    fn test_create_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round");
        let store = FileRoundStore::new();

        let result = store.create(&path, &RoundConfig::new(1, 5, 5, "w"));
        assert!(matches!(result, Err(BingoError::InvalidConfig(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_join_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round");
        let store = FileRoundStore::new();

        assert!(matches!(
            store.try_join(&path, &name("ann")),
            Err(BingoError::NotFound(_))
        ));

        store.create(&path, &RoundConfig::new(3, 5, 5, "w")).unwrap();
        store.try_join(&path, &name("ann")).unwrap();
        assert!(matches!(
            store.try_join(&path, &name("ann")),
            Err(BingoError::NameTaken(_))
        ));
        store.try_join(&path, &name("bob")).unwrap();
        store.try_join(&path, &name("cid")).unwrap();
        assert!(matches!(
            store.try_join(&path, &name("dan")),
            Err(BingoError::Full { max_players: 3 })
        ));

        assert_eq!(
            store.read_roster(&path).unwrap(),
            vec![name("ann"), name("bob"), name("cid")]
        );
    }

    #[test]
    fn test_full_for_every_join_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRoundStore::new();
        let orders = [
            ["ann", "bob", "cid"],
            ["ann", "cid", "bob"],
            ["bob", "ann", "cid"],
            ["bob", "cid", "ann"],
            ["cid", "ann", "bob"],
            ["cid", "bob", "ann"],
        ];

        for (i, order) in orders.iter().enumerate() {
            let path = dir.path().join(format!("round{}", i));
            store.create(&path, &RoundConfig::new(2, 3, 3, "w")).unwrap();
            store.try_join(&path, &name(order[0])).unwrap();
            store.try_join(&path, &name(order[1])).unwrap();
            assert!(matches!(
                store.try_join(&path, &name(order[2])),
                Err(BingoError::Full { .. })
            ));
            for taken in &order[..2] {
                // Full is reported before NameTaken once capacity is reached
                assert!(store.try_join(&path, &name(taken)).is_err());
            }
        }
    }

    #[test]
    fn test_mark_finished_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round");
        let store = FileRoundStore::new();

        store.create(&path, &RoundConfig::new(2, 5, 5, "w")).unwrap();
        store.try_join(&path, &name("ann")).unwrap();

        assert!(store.mark_finished(&path, FinishReason::Won).unwrap());
        let once = std::fs::read_to_string(&path).unwrap();
        assert!(!store.mark_finished(&path, FinishReason::Aborted).unwrap());
        let twice = std::fs::read_to_string(&path).unwrap();
        assert_eq!(once, twice);

        let record = store.read(&path).unwrap();
        assert!(record.finished);
        assert!(!record.aborted);
        assert!(matches!(
            store.try_join(&path, &name("bob")),
            Err(BingoError::Finished)
        ));
    }

    #[test]
    fn test_abort_appends_marker_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round");
        let store = FileRoundStore::new();

        store.create(&path, &RoundConfig::new(2, 5, 5, "w")).unwrap();
        store.mark_finished(&path, FinishReason::Aborted).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("finished\nGame aborted\n"));
        assert!(store.read(&path).unwrap().aborted);
    }

    #[test]
    fn test_mark_finished_missing_round() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRoundStore::new();
        assert!(matches!(
            store.mark_finished(&dir.path().join("nope"), FinishReason::Won),
            Err(BingoError::NotFound(_))
        ));
    }
}
