use anyhow::{Context, Result};
use arca_core::{Hash, METADATA_DIR, Object, ObjectKind, Repository};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod output;

use output::{HashObjectOutput, InitOutput, OutputWriter};

/// Arca - a content-addressed object store for version control
#[derive(Parser)]
#[command(name = "arca")]
#[command(about = "Content-addressed object store and repository layout", long_about = None)]
#[command(version)]
struct Cli {
    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new, empty repository
    Init {
        /// Where to create the repository
        #[arg(default_value = ".")]
        directory: PathBuf,
    },

    /// Compute the object hash of a file, optionally storing it
    HashObject {
        /// Object kind to hash as
        #[arg(short = 't', long = "type", default_value = "blob")]
        kind: String,

        /// Write the object into the enclosing repository
        #[arg(short, long)]
        write: bool,

        /// File whose bytes become the payload
        file: PathBuf,
    },

    /// Write an object's payload to stdout
    CatFile {
        /// Expected object kind
        kind: String,

        /// Hash of the object
        hash: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let out = OutputWriter::new(cli.json);

    match cli.command {
        Commands::Init { directory } => cmd_init(&directory, &out),
        Commands::HashObject { kind, write, file } => cmd_hash_object(&kind, write, &file, &out),
        Commands::CatFile { kind, hash } => cmd_cat_file(&kind, &hash),
    }
}

fn cmd_init(directory: &Path, out: &OutputWriter) -> Result<()> {
    let repo = Repository::create(directory)
        .with_context(|| format!("failed to initialize repository at {}", directory.display()))?;

    let worktree = fs::canonicalize(repo.worktree())?;
    let metadata_dir = worktree.join(METADATA_DIR);

    out.write(
        &InitOutput {
            success: true,
            worktree: worktree.display().to_string(),
            metadata_dir: metadata_dir.display().to_string(),
        },
        || {
            format!(
                "Initialized empty arca repository in {}/\n",
                metadata_dir.display()
            )
        },
    )
}

fn cmd_hash_object(kind: &str, write: bool, file: &Path, out: &OutputWriter) -> Result<()> {
    let kind = ObjectKind::parse(kind).with_context(|| format!("invalid object kind: {}", kind))?;
    let payload =
        fs::read(file).with_context(|| format!("failed to read file: {}", file.display()))?;
    let object = Object::deserialize(kind, &payload)?;

    let hash = if write {
        let repo = Repository::discover(".", true)
            .context("failed to locate enclosing repository")?
            .context("no enclosing repository")?;
        repo.write_object(&object)
            .with_context(|| format!("failed to store object from {}", file.display()))?
    } else {
        object.content_hash()
    };

    out.write(
        &HashObjectOutput {
            success: true,
            kind: kind.as_str().to_string(),
            hash,
            stored: write,
        },
        || format!("{}\n", hash),
    )
}

fn cmd_cat_file(kind: &str, hash_str: &str) -> Result<()> {
    let kind = ObjectKind::parse(kind).with_context(|| format!("invalid object kind: {}", kind))?;
    let hash = Hash::from_hex(hash_str).with_context(|| format!("invalid hash: {}", hash_str))?;

    let repo = Repository::discover(".", true)
        .context("failed to locate enclosing repository")?
        .context("no enclosing repository")?;

    let object = repo
        .read_object(&hash)
        .with_context(|| format!("failed to read object {}", hash))?
        .with_context(|| format!("object not found: {}", hash))?;

    if object.kind() != kind {
        anyhow::bail!(
            "object {} is a {}, not a {}",
            hash,
            object.kind(),
            kind
        );
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(&object.serialize())?;

    Ok(())
}
