use roster_core::models::Server;
use roster_core::servers::find_by_slug;

use crate::cli::ServerCommands;
use crate::context::AppContext;
use crate::{Error, Result};

pub fn run(ctx: &mut AppContext, cmd: ServerCommands) -> Result<()> {
    match cmd {
        ServerCommands::List => list(ctx),
        ServerCommands::Current => current(ctx),
        ServerCommands::Select { slug } => {
            let server = find_by_slug(&ctx.catalog, &slug)
                .cloned()
                .ok_or_else(|| Error::Custom(format!("unknown server '{slug}'")))?;
            ctx.selection.set(Some(server.clone()))?;
            println!("Selected {} {}", server.emoji, server.name);
            Ok(())
        }
        ServerCommands::Clear => {
            ctx.selection.clear()?;
            println!("Server selection cleared.");
            Ok(())
        }
    }
}

fn list(ctx: &AppContext) -> Result<()> {
    if ctx.json {
        return ctx.print_json(&ctx.catalog);
    }

    let selected = ctx.selection.selected().map(|s| s.id.as_str());
    for server in &ctx.catalog {
        let marker = if Some(server.id.as_str()) == selected { "*" } else { " " };
        println!("{marker} {}", describe(server));
    }
    Ok(())
}

fn current(ctx: &AppContext) -> Result<()> {
    match ctx.selection.selected() {
        Some(server) if ctx.json => ctx.print_json(server),
        Some(server) => {
            println!("{}", describe(server));
            Ok(())
        }
        None => {
            println!("No server selected.");
            Ok(())
        }
    }
}

fn describe(server: &Server) -> String {
    let mut line = format!(
        "{:>3}  {:<10} {} {}",
        server.server_id, server.id, server.emoji, server.name
    );
    if let Some(description) = &server.description {
        line.push_str(" - ");
        line.push_str(description);
    }
    line
}
