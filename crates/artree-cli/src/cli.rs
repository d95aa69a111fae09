use std::path::PathBuf;

use artree_sdk::{ArtreeConfig, DigestConfig};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "artree",
    about = "Build and inspect content-addressed artifact dependency trees",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Object store root [default: .bom]
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Digest configuration: sha1, sha256 or sha1+sha256
    #[arg(long, global = true)]
    pub digest: Option<DigestConfig>,

    /// Maximum number of hashing threads
    #[arg(short = 'j', long, global = true)]
    pub jobs: Option<usize>,

    /// Stop at the first file that cannot be hashed
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Config file [default: ./artree.toml if present]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

impl Cli {
    /// Apply command-line flags on top of a loaded config.
    pub fn apply(&self, mut config: ArtreeConfig) -> ArtreeConfig {
        if let Some(store) = &self.store {
            config.store_root = store.clone();
        }
        if let Some(digest) = self.digest {
            config.digest = digest;
        }
        if let Some(jobs) = self.jobs {
            config.max_workers = Some(jobs);
        }
        config.fail_fast |= self.fail_fast;
        config
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Hash files and directories into a stored artifact tree
    ArtifactTree(ArtifactTreeArgs),
    /// Record an artifact together with the tree of its inputs
    Bom(BomArgs),
    /// Print the blob identity of files without storing anything
    HashObject(HashObjectArgs),
    /// Print a stored artifact tree
    Show(ShowArgs),
}

#[derive(Args)]
pub struct ArtifactTreeArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct BomArgs {
    pub artifact: PathBuf,
    #[arg(required = true)]
    pub deps: Vec<PathBuf>,
}

#[derive(Args)]
pub struct HashObjectArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub identity: String,
}
