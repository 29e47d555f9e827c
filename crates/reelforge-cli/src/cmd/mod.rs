use anyhow::Result;

use crate::args::{Cli, Command};

mod doctor;
mod init;
mod plan;
mod run;
mod show;

pub async fn dispatch(cli: Cli) -> Result<()> {
    let store_root = cli.store_root.clone();
    match cli.command {
        Command::Init { movie_id } => init::run(&store_root, &movie_id).await,
        Command::Plan {
            movie_id,
            blueprint,
            inputs,
            counts,
        } => plan::run(&store_root, &movie_id, &blueprint, &inputs, &counts).await,
        Command::Run {
            movie_id,
            revision,
            concurrency,
        } => run::run(&store_root, &movie_id, &revision, concurrency).await,
        Command::Show { movie_id } => show::run(&store_root, &movie_id).await,
        Command::Doctor { movie_id } => doctor::run(&store_root, movie_id.as_deref()).await,
    }
}
