use crate::config::{ConfigErrors, LoaderConfig};
use ignore::{DirEntry, WalkBuilder};
use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, trace, warn};

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Result root {0:?} is not a directory")]
    NotADirectory(PathBuf),
    #[error("Failed to walk result directory")]
    Walk(#[from] ignore::Error),
    #[error("Collector config is invalid")]
    Config(#[from] ConfigErrors),
}

/// How result files are laid out below the root directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `root/<node>/<batch>.json`, records are tagged with the node directory name
    Results,
    /// `root/<batch>.json`, records are tagged with the file name minus `.json`
    Flat,
}

impl Layout {
    /// depth of result files relative to the root
    fn depth(self) -> usize {
        match self {
            Self::Results => 2,
            Self::Flat => 1,
        }
    }

    fn id(self, entry: &DirEntry) -> Option<String> {
        match self {
            Self::Results => entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned()),
            Self::Flat => {
                let name = entry.file_name().to_string_lossy();

                Some(name.strip_suffix(".json").unwrap_or(&*name).to_owned())
            }
        }
    }
}

/// A single result file and the id every record in it is tagged with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSource {
    pub id: String,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct Collector {
    layout: Layout,
    sources: VecDeque<ResultSource>,
}

impl Collector {
    pub fn load(layout: Layout, root: &Path, config: &LoaderConfig) -> Result<Self, CollectorError> {
        if !root.is_dir() {
            return Err(CollectorError::NotADirectory(root.to_path_buf()));
        }

        let glob = config.compile_glob()?;
        let depth = layout.depth();
        let mut builder = WalkBuilder::new(root);

        debug!("Filtering with glob: {glob:?}");
        // result directories are plain data, hidden files and ignore files are not special
        builder
            .standard_filters(false)
            .follow_links(true)
            .max_depth(Some(depth));
        if config.sort {
            builder.sort_by_file_name(|a, b| a.cmp(b));
        }

        let mut sources = VecDeque::new();

        for entry in builder.build() {
            let entry = entry?;

            if entry.depth() != depth {
                continue;
            }
            if !entry.file_type().map_or(false, |kind| kind.is_file()) {
                trace!(path = ?entry.path(), "Skipped non-file entry");
                continue;
            }
            if !glob.is_match(entry.file_name()) {
                trace!(path = ?entry.path(), "Skipped file not matching glob");
                continue;
            }

            match layout.id(&entry) {
                Some(id) => sources.push_back(ResultSource {
                    id,
                    path: entry.into_path(),
                }),
                None => warn!(path = ?entry.path(), "Failed to derive an id, skipping"),
            }
        }

        debug!(count = sources.len(), layout = ?layout, "Collected result files");

        Ok(Self { layout, sources })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl Iterator for Collector {
    type Item = ResultSource;

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.sources.len(), Some(self.sources.len()))
    }

    fn next(&mut self) -> Option<Self::Item> {
        self.sources.pop_front()
    }
}

impl ExactSizeIterator for Collector {}
