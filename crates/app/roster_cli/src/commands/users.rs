use roster_core::models::User;

use crate::cli::UserCommands;
use crate::context::AppContext;
use crate::{Error, Result};

pub async fn run(ctx: &AppContext, cmd: UserCommands) -> Result<()> {
    // Client-side gate only; the API authorizes these calls on its own.
    require_admin(ctx).await?;

    match cmd {
        UserCommands::List => {
            let users = ctx.service.users().await?;
            if ctx.json {
                return ctx.print_json(&users);
            }
            for user in &users {
                println!("{}", row(user));
            }
            Ok(())
        }
        UserCommands::SetRole { user_id, role } => {
            ctx.service.update_user_role(&user_id, role).await?;
            println!("User {user_id} is now {role}.");
            Ok(())
        }
    }
}

async fn require_admin(ctx: &AppContext) -> Result<User> {
    match ctx.service.current_user().await? {
        Some(user) if user.is_admin() => Ok(user),
        Some(user) => Err(Error::Custom(format!(
            "admin role required (signed in as {})",
            user.role
        ))),
        None => Err(Error::Custom("not signed in; run `roster login`".into())),
    }
}

fn row(user: &User) -> String {
    format!(
        "{:>6}  {:<24} {:<10} {}",
        user.id,
        user.display_name(),
        user.role.as_str(),
        user.created_at.format("%Y-%m-%d")
    )
}
