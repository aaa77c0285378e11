use std::path::{Path, PathBuf};
use tokio::fs;
use crate::rounds::{Combination, MatchDefinition, Round};
use crate::utils::{GameError, GameResult};
use tracing::{info, warn};

pub const TEMPLATE_MATCH_ID: &str = "classic";

/// Reads and writes match definitions stored as `<id>.json` files.
pub struct MatchLoader {
    matches_directory: PathBuf,
}

impl MatchLoader {
    pub fn new<P: AsRef<Path>>(matches_directory: P) -> Self {
        Self {
            matches_directory: matches_directory.as_ref().to_path_buf(),
        }
    }

    fn match_path(&self, match_id: &str) -> PathBuf {
        self.matches_directory.join(format!("{}.json", match_id))
    }

    pub async fn load_match(&self, match_id: &str) -> GameResult<MatchDefinition> {
        let match_path = self.match_path(match_id);

        info!("Loading match from: {:?}", match_path);

        if !match_path.exists() {
            return Err(GameError::match_not_found(match_id));
        }

        let content = fs::read_to_string(&match_path).await?;
        let definition: MatchDefinition = serde_json::from_str(&content)?;

        if let Err(errors) = definition.validate() {
            let error_msg = errors.join("; ");
            return Err(GameError::invalid_match(format!("{}: {}", match_id, error_msg)));
        }

        info!("Successfully loaded match: {} ({})", definition.title, definition.id);
        Ok(definition)
    }

    pub async fn list_available_matches(&self) -> GameResult<Vec<MatchMetadata>> {
        info!("Scanning for matches in: {:?}", self.matches_directory);

        if !self.matches_directory.exists() {
            warn!("Matches directory does not exist, creating: {:?}", self.matches_directory);
            fs::create_dir_all(&self.matches_directory).await?;
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.matches_directory).await?;
        let mut matches = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                match self.load_match_metadata(&path).await {
                    Ok(metadata) => matches.push(metadata),
                    Err(e) => {
                        warn!("Failed to load metadata for match at {:?}: {}", path, e);
                        continue;
                    }
                }
            }
        }

        matches.sort_by(|a, b| a.title.cmp(&b.title));

        info!("Found {} matches", matches.len());
        Ok(matches)
    }

    pub fn match_exists(&self, match_id: &str) -> bool {
        self.match_path(match_id).exists()
    }

    pub async fn save_match(&self, definition: &MatchDefinition) -> GameResult<()> {
        if let Err(errors) = definition.validate() {
            let error_msg = errors.join("; ");
            return Err(GameError::invalid_match(format!("Cannot save invalid match: {}", error_msg)));
        }

        let match_path = self.match_path(&definition.id);

        if let Some(parent) = match_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(definition)?;
        fs::write(&match_path, json).await?;

        info!("Saved match: {} to {:?}", definition.id, match_path);
        Ok(())
    }

    pub async fn create_match_template(&self, match_id: &str, title: &str) -> GameResult<MatchDefinition> {
        if self.match_exists(match_id) {
            return Err(GameError::invalid_match(format!("Match already exists: {}", match_id)));
        }

        let definition = Self::classic_template(match_id, title);
        self.save_match(&definition).await?;

        info!("Created match template: {}", match_id);
        Ok(definition)
    }

    /// Writes the classic template if the directory holds no match with that id.
    pub async fn ensure_template(&self) -> GameResult<()> {
        if !self.match_exists(TEMPLATE_MATCH_ID) {
            self.create_match_template(TEMPLATE_MATCH_ID, "Classic").await?;
        }
        Ok(())
    }

    async fn load_match_metadata(&self, path: &Path) -> GameResult<MatchMetadata> {
        let content = fs::read_to_string(path).await?;

        // Only the summary fields; full validation happens on load
        let value: serde_json::Value = serde_json::from_str(&content)?;

        let id = value.get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| GameError::invalid_match(format!("{:?} has no id", path)))?
            .to_string();

        Ok(MatchMetadata {
            id,
            title: value.get("title")
                .and_then(|v| v.as_str())
                .unwrap_or("Untitled")
                .to_string(),
            description: value.get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("No description available")
                .to_string(),
            number_of_rounds: value.get("number_of_rounds")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as usize,
            seconds_per_round: value.get("seconds_per_round")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
            house_count: value.get("house_count")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as usize,
        })
    }

    /// Four houses, three rounds that get harder: two houses, then three,
    /// then all four.
    pub fn classic_template(match_id: &str, title: &str) -> MatchDefinition {
        let mut definition = MatchDefinition::new(match_id, title, 10.0, 4)
            .with_input_maps(["q", "w", "e", "r"], ["u", "i", "o", "p"]);
        definition.description = "Three rounds on four houses, each harder than the last".to_string();

        definition.add_round(Round::new(vec![
            Combination::new([0, 1]),
            Combination::new([1, 2]),
            Combination::new([2, 3]),
            Combination::new([0, 3]),
        ]));
        definition.add_round(Round::new(vec![
            Combination::new([0, 1, 2]),
            Combination::new([1, 2, 3]),
            Combination::new([0, 2, 3]),
        ]));
        definition.add_round(Round::single(Combination::new([0, 1, 2, 3])));

        definition
    }
}

#[derive(Debug, Clone)]
pub struct MatchMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub number_of_rounds: usize,
    pub seconds_per_round: f64,
    pub house_count: usize,
}

impl MatchMetadata {
    pub fn display_name(&self) -> String {
        format!(
            "{} ({} rounds, {} houses, {}s per round)",
            self.title, self.number_of_rounds, self.house_count, self.seconds_per_round
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_match_loader_creation() {
        let temp_dir = tempdir().unwrap();
        let loader = MatchLoader::new(temp_dir.path().join("matches"));

        let matches = loader.list_available_matches().await.unwrap();
        assert!(matches.is_empty());
        assert!(temp_dir.path().join("matches").exists());
    }

    #[tokio::test]
    async fn test_template_round_trip() {
        let temp_dir = tempdir().unwrap();
        let loader = MatchLoader::new(temp_dir.path());

        let created = loader.create_match_template("classic", "Classic").await.unwrap();
        assert_eq!(created.number_of_rounds, 3);
        assert!(loader.match_exists("classic"));

        let loaded = loader.load_match("classic").await.unwrap();
        assert_eq!(loaded, created);

        let matches = loader.list_available_matches().await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "classic");
        assert_eq!(matches[0].house_count, 4);
        assert_eq!(
            matches[0].display_name(),
            "Classic (3 rounds, 4 houses, 10s per round)"
        );

        assert!(loader.create_match_template("classic", "Again").await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_template_is_idempotent() {
        let temp_dir = tempdir().unwrap();
        let loader = MatchLoader::new(temp_dir.path());

        loader.ensure_template().await.unwrap();
        loader.ensure_template().await.unwrap();

        assert_eq!(loader.list_available_matches().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_match() {
        let temp_dir = tempdir().unwrap();
        let loader = MatchLoader::new(temp_dir.path());

        let error = loader.load_match("nope").await.unwrap_err();
        assert!(matches!(error, GameError::MatchNotFound { .. }));
    }

    #[tokio::test]
    async fn test_invalid_match_is_rejected_on_load() {
        let temp_dir = tempdir().unwrap();
        let loader = MatchLoader::new(temp_dir.path());

        let mut definition = MatchLoader::classic_template("broken", "Broken");
        definition.player2_input_map.pop();
        let json = serde_json::to_string(&definition).unwrap();
        std::fs::write(temp_dir.path().join("broken.json"), json).unwrap();

        let error = loader.load_match("broken").await.unwrap_err();
        assert!(matches!(error, GameError::InvalidMatch { .. }));
        assert!(loader.save_match(&definition).await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_files_are_skipped_in_listing() {
        let temp_dir = tempdir().unwrap();
        let loader = MatchLoader::new(temp_dir.path());

        loader.ensure_template().await.unwrap();
        std::fs::write(temp_dir.path().join("garbage.json"), "not json").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let matches = loader.list_available_matches().await.unwrap();
        assert_eq!(matches.len(), 1);
    }
}
