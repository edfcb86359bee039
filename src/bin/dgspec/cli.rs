//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// dgspec - build and query dependency graph restore specifications
#[derive(Parser)]
#[command(name = "dgspec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a restore document from an evaluated item file
    Build(BuildArgs),

    /// Rewrite a restore document in canonical form
    Normalize(NormalizeArgs),

    /// List every project reachable from a project
    Closure(ProjectArgs),

    /// List the projects that reference a project
    Parents(ProjectArgs),

    /// List the restore roots
    Roots(DocumentArgs),

    /// Print the document hash
    Hash(DocumentArgs),

    /// List projects in dependency order
    Sort(DocumentArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// How project names compare.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PathCaseArg {
    Platform,
    Sensitive,
    Insensitive,
}

/// Which JSON reader loads documents.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReaderArg {
    Streaming,
    ValueTree,
}

/// Options shared by every command that reads a document.
#[derive(Args)]
pub struct ReadOptions {
    /// Override the configured path comparison
    #[arg(long, value_enum)]
    pub path_case: Option<PathCaseArg>,

    /// Override the configured JSON reader
    #[arg(long, value_enum)]
    pub reader: Option<ReaderArg>,
}

#[derive(Args)]
pub struct BuildArgs {
    /// JSON item file
    pub items: PathBuf,

    /// Output file (defaults to the configured output, then restore.dg)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the document hash after writing it
    #[arg(long)]
    pub hash: bool,

    /// Override the configured path comparison
    #[arg(long, value_enum)]
    pub path_case: Option<PathCaseArg>,
}

#[derive(Args)]
pub struct NormalizeArgs {
    /// Restore document
    pub file: PathBuf,

    /// Output file (defaults to rewriting the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep only the closure of this project
    #[arg(short, long)]
    pub project: Option<String>,

    #[command(flatten)]
    pub read: ReadOptions,
}

#[derive(Args)]
pub struct ProjectArgs {
    /// Restore document
    pub file: PathBuf,

    /// Project unique name
    pub project: String,

    #[command(flatten)]
    pub read: ReadOptions,
}

#[derive(Args)]
pub struct DocumentArgs {
    /// Restore document
    pub file: PathBuf,

    #[command(flatten)]
    pub read: ReadOptions,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
