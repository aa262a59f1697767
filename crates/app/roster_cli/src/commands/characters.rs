use chrono::Utc;
use log::info;
use roster_core::models::{Character, CharacterForm, Server};

use crate::cli::{CharacterCommands, CharacterFields, CharacterUpdate, StatusArg};
use crate::context::AppContext;
use crate::{Error, Result};

pub async fn run(ctx: &mut AppContext, cmd: CharacterCommands) -> Result<()> {
    match cmd {
        CharacterCommands::List { server } => {
            let Some(server) = resolve(ctx, server.as_deref()) else {
                return Ok(());
            };
            let characters = ctx.service.characters(server.server_id).await?;
            print_list(ctx, &server, &characters)
        }
        CharacterCommands::Create { server, fields } => {
            let Some(server) = resolve(ctx, server.as_deref()) else {
                return Ok(());
            };
            let created = ctx
                .service
                .create_character(server.server_id, new_form(fields))
                .await?;
            print_one(ctx, "Created", &created)
        }
        CharacterCommands::Update { id, server, fields } => {
            let Some(server) = resolve(ctx, server.as_deref()) else {
                return Ok(());
            };
            let existing = ctx
                .service
                .characters(server.server_id)
                .await?
                .into_iter()
                .find(|c| c.id == id)
                .ok_or_else(|| {
                    Error::Custom(format!("character {id} not found on {}", server.name))
                })?;

            let form = apply_update(CharacterForm::from(&existing), fields);
            let updated = ctx
                .service
                .update_character(&id, server.server_id, &form)
                .await?;
            print_one(ctx, "Updated", &updated)
        }
        CharacterCommands::Delete { id, server } => {
            let Some(server) = resolve(ctx, server.as_deref()) else {
                return Ok(());
            };
            ctx.service.delete_character(&id, server.server_id).await?;
            println!("Deleted character {id}.");
            Ok(())
        }
    }
}

/// The server to act on; prints a hint and yields `None` when there is none.
fn resolve(ctx: &mut AppContext, slug: Option<&str>) -> Option<Server> {
    let server = ctx.active_server(slug);
    if server.is_none() {
        match slug {
            Some(slug) => println!("Unknown server '{slug}'. See `roster servers list`."),
            None => println!("No server selected. Use --server or `roster servers select`."),
        }
    }
    server
}

fn new_form(fields: CharacterFields) -> CharacterForm {
    let mut form = CharacterForm {
        name: fields.name,
        level: fields.level,
        cash: fields.cash,
        bank: fields.bank,
        ..Default::default()
    };
    grant(&mut form, &fields.status);
    form
}

fn apply_update(mut form: CharacterForm, update: CharacterUpdate) -> CharacterForm {
    if let Some(name) = update.name {
        form.name = name;
    }
    if let Some(level) = update.level {
        form.level = level;
    }
    if let Some(cash) = update.cash {
        form.cash = cash;
    }
    if let Some(bank) = update.bank {
        form.bank = bank;
    }
    grant(&mut form, &update.status);
    for kind in update.revoke {
        form.status.set(kind, false, None);
    }
    form
}

fn grant(form: &mut CharacterForm, status: &[StatusArg]) {
    for arg in status {
        form.status.set(arg.kind, true, arg.expires_at);
    }
}

fn print_list(ctx: &AppContext, server: &Server, characters: &[Character]) -> Result<()> {
    if ctx.json {
        return ctx.print_json(characters);
    }

    println!("{} {} ({} characters)", server.emoji, server.name, characters.len());
    for character in characters {
        println!("  {}", summary(character));
    }
    info!("{} characters on server {}", characters.len(), server.server_id);
    Ok(())
}

fn print_one(ctx: &AppContext, verb: &str, character: &Character) -> Result<()> {
    if ctx.json {
        return ctx.print_json(character);
    }
    println!("{verb} {}", summary(character));
    Ok(())
}

fn summary(character: &Character) -> String {
    let flags: Vec<String> = character
        .status
        .active_at(Utc::now())
        .iter()
        .map(|kind| kind.to_string())
        .collect();
    let mut line = format!(
        "{:<12} {:<20} lvl {:>3}  cash {:>9}  bank {:>10}",
        character.id, character.name, character.level, character.cash, character.bank
    );
    if !flags.is_empty() {
        line.push_str("  [");
        line.push_str(&flags.join(", "));
        line.push(']');
    }
    line
}
