use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "reelforge", version, about = "Reelforge build engine CLI")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Store root directory.
    #[arg(long, global = true, default_value = ".reelforge")]
    pub store_root: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the on-disk directory skeleton for a new movie.
    Init {
        movie_id: String,
    },

    /// Load a blueprint, append pending input/artefact edits, and persist a
    /// new execution plan.
    Plan {
        movie_id: String,

        /// Path to the root blueprint YAML file. Sub-blueprint `source`
        /// references resolve relative to this file's directory.
        #[arg(long)]
        blueprint: String,

        /// A pending input edit, `Input:Name=<json-or-plain-value>`.
        /// Repeatable.
        #[arg(long = "input", value_name = "ID=VALUE")]
        inputs: Vec<String>,

        /// An explicit dimension counter override, `symbol=value`.
        /// Repeatable.
        #[arg(long = "count", value_name = "SYMBOL=VALUE")]
        counts: Vec<String>,
    },

    /// Execute a previously persisted plan and promote a new manifest.
    Run {
        movie_id: String,

        /// Revision whose `runs/<rev>-plan.json` should be executed.
        #[arg(long)]
        revision: String,

        /// Maximum concurrently running jobs within a layer.
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },

    /// Print the current manifest snapshot.
    Show {
        movie_id: String,
    },

    /// Run environment and storage sanity checks.
    Doctor {
        /// Optional movie id to additionally check the pointer/manifest of.
        movie_id: Option<String>,
    },
}
