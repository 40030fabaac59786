//! Story library loaded from JSON files at startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use story_core::{ContentError, Story, StorySummary};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid story file {path}: {source}")]
    Content {
        path: PathBuf,
        source: ContentError,
    },
    #[error("Duplicate story id: {0}")]
    DuplicateStory(String),
}

/// Immutable set of stories, keyed by id.
#[derive(Debug, Default)]
pub struct StoryLibrary {
    stories: BTreeMap<String, Arc<Story>>,
}

impl StoryLibrary {
    pub fn from_stories(stories: impl IntoIterator<Item = Story>) -> Result<Self, LibraryError> {
        let mut library = Self::default();
        for story in stories {
            if library.stories.contains_key(&story.id) {
                return Err(LibraryError::DuplicateStory(story.id));
            }
            library.stories.insert(story.id.clone(), Arc::new(story));
        }
        Ok(library)
    }

    /// Load every `*.json` file of a directory.
    ///
    /// A missing directory yields an empty library.
    pub async fn load_dir(dir: &Path) -> Result<Self, LibraryError> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(dir = %dir.display(), "stories directory not found, library is empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(LibraryError::Io {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };

        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| LibraryError::Io { path, source }
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error(dir))? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut stories = Vec::with_capacity(paths.len());
        for path in paths {
            let json = tokio::fs::read_to_string(&path)
                .await
                .map_err(io_error(&path))?;
            let story = Story::from_json(&json).map_err(|source| LibraryError::Content {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(story = %story.id, games = story.games.len(), "loaded story");
            stories.push(story);
        }

        let library = Self::from_stories(stories)?;
        tracing::info!(count = library.len(), dir = %dir.display(), "story library loaded");
        Ok(library)
    }

    pub fn get(&self, story_id: &str) -> Option<Arc<Story>> {
        self.stories.get(story_id).cloned()
    }

    pub fn summaries(&self) -> Vec<StorySummary> {
        self.stories.values().map(|story| story.summary()).collect()
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}
