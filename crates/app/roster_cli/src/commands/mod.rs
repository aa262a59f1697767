mod auth;
mod characters;
mod servers;
mod users;

use crate::Result;
use crate::cli::Commands;
use crate::context::AppContext;

pub async fn dispatch(ctx: &mut AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Version => Ok(()),
        Commands::Login => auth::login(ctx),
        Commands::Callback { url } => auth::callback(ctx, &url),
        Commands::Logout => auth::logout(ctx),
        Commands::Me => auth::me(ctx).await,
        Commands::Servers(cmd) => servers::run(ctx, cmd),
        Commands::Characters(cmd) => characters::run(ctx, cmd).await,
        Commands::Users(cmd) => users::run(ctx, cmd).await,
    }
}
