//! Repository layout, path resolution, and discovery.

use crate::config::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Reserved name of the metadata directory under the working tree.
pub const METADATA_DIR: &str = ".arca";

/// Bootstrap content of the `description` file.
const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

/// Bootstrap content of the `HEAD` symbolic reference.
const DEFAULT_HEAD: &str = "ref: refs/heads/master\n";

/// One version-control repository: a working tree plus its private
/// metadata directory.
///
/// Constructed by [`Repository::create`], [`Repository::open`], or
/// [`Repository::discover`]; never structurally mutated afterwards.
#[derive(Debug)]
pub struct Repository {
    worktree: PathBuf,
    store_dir: PathBuf,
    config: Config,
}

impl Repository {
    /// The working tree root.
    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    /// The metadata directory (`worktree/.arca`).
    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// The repository configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Join `segments` onto the metadata directory. Pure, never fails.
    pub fn path(&self, segments: &[&str]) -> PathBuf {
        let mut path = self.store_dir.clone();
        for segment in segments {
            path.push(segment);
        }
        path
    }

    /// Resolve a directory under the metadata directory.
    ///
    /// Fails if the path exists as a file. When absent, creates the full
    /// chain if `create` is set, otherwise returns `Ok(None)`.
    pub fn dir(&self, segments: &[&str], create: bool) -> Result<Option<PathBuf>> {
        let path = self.path(segments);

        if path.exists() {
            if path.is_dir() {
                return Ok(Some(path));
            }
            return Err(Error::not_a_directory(path));
        }

        if create {
            fs::create_dir_all(&path)?;
            return Ok(Some(path));
        }

        Ok(None)
    }

    /// Resolve a file path under the metadata directory.
    ///
    /// All but the last segment are resolved as a directory (created when
    /// `create_parent` is set); the last segment is appended as the file
    /// name. `Ok(None)` when the parent directory is absent, or when
    /// `segments` is empty.
    pub fn file(&self, segments: &[&str], create_parent: bool) -> Result<Option<PathBuf>> {
        let Some((name, parents)) = segments.split_last() else {
            return Ok(None);
        };
        Ok(self.dir(parents, create_parent)?.map(|dir| dir.join(name)))
    }

    /// Create a new repository rooted at `path`.
    ///
    /// The working tree is created if absent. An existing metadata
    /// directory must be empty. Writes the required subtree (`branches/`,
    /// `objects/`, `refs/tags/`, `refs/heads/`) and the bootstrap
    /// `description`, `HEAD`, and `config` files.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let worktree = path.as_ref().to_path_buf();
        let store_dir = worktree.join(METADATA_DIR);

        if worktree.exists() {
            if !worktree.is_dir() {
                return Err(Error::repository_exists(
                    &worktree,
                    "working tree exists and is not a directory",
                ));
            }
            if store_dir.exists() {
                if !store_dir.is_dir() {
                    return Err(Error::not_a_directory(store_dir));
                }
                if fs::read_dir(&store_dir)?.next().is_some() {
                    return Err(Error::repository_exists(
                        &worktree,
                        "metadata directory is not empty",
                    ));
                }
            }
        } else {
            fs::create_dir_all(&worktree)?;
        }

        let repo = Self {
            worktree,
            store_dir,
            config: Config::repository_default(),
        };

        // Required subtree. A failure here leaves no usable layout, so the
        // whole operation aborts rather than continuing partially.
        repo.dir(&["branches"], true)?;
        repo.dir(&["objects"], true)?;
        repo.dir(&["refs", "tags"], true)?;
        repo.dir(&["refs", "heads"], true)?;

        fs::write(repo.path(&["description"]), DEFAULT_DESCRIPTION)?;
        fs::write(repo.path(&["HEAD"]), DEFAULT_HEAD)?;
        fs::write(repo.path(&["config"]), repo.config.render())?;

        Ok(repo)
    }

    /// Open an existing repository rooted at `path`.
    ///
    /// Requires the metadata directory, the configuration document, and a
    /// supported `repositoryformatversion` (`0`).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(path.as_ref(), false)
    }

    /// Open a repository without validating its layout or configuration.
    ///
    /// Used internally by [`Repository::create`]-like flows and by tools
    /// that must look at a damaged repository.
    pub fn open_forced<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(path.as_ref(), true)
    }

    fn load(path: &Path, forced: bool) -> Result<Self> {
        let worktree = path.to_path_buf();
        let store_dir = worktree.join(METADATA_DIR);

        if !forced && !store_dir.is_dir() {
            return Err(Error::not_a_repository(&worktree));
        }

        let mut repo = Self {
            worktree,
            store_dir,
            config: Config::new(),
        };

        match repo.file(&["config"], false)? {
            Some(config_path) if config_path.exists() => {
                let text = fs::read_to_string(&config_path)?;
                repo.config = Config::parse(&text)?;
            }
            _ if forced => {}
            _ => return Err(Error::missing_configuration(&repo.store_dir)),
        }

        if !forced {
            let version = repo.config.repository_format_version()?;
            if version != 0 {
                return Err(Error::unsupported_format_version(version.to_string()));
            }
        }

        Ok(repo)
    }

    /// Find the nearest enclosing repository by walking upward from `start`.
    ///
    /// `start` is canonicalized first, so symlinked ancestors are resolved
    /// before the walk. The walk never scans siblings or descends; it stops
    /// at the filesystem root (the path with no parent). With `required`
    /// the root case is `NotARepository`, otherwise `Ok(None)`.
    pub fn discover<P: AsRef<Path>>(start: P, required: bool) -> Result<Option<Self>> {
        let mut current = fs::canonicalize(start.as_ref())?;

        loop {
            if current.join(METADATA_DIR).is_dir() {
                return Self::open(&current).map(Some);
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => {
                    return if required {
                        Err(Error::not_a_repository(start.as_ref()))
                    } else {
                        Ok(None)
                    };
                }
            }
        }
    }
}
