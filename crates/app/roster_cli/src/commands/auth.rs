use log::{error, info};
use roster_core::session::{CallbackOutcome, login_url};
use url::Url;

use crate::context::AppContext;
use crate::{Error, Result};

pub fn login(ctx: &AppContext) -> Result<()> {
    println!("Sign in with Discord at:");
    println!("  {}", login_url(&ctx.config.base_url));
    println!("then run `roster callback '<redirected URL>'`.");
    Ok(())
}

pub fn callback(ctx: &AppContext, raw_url: &str) -> Result<()> {
    let url = Url::parse(raw_url)?;
    let outcome = CallbackOutcome::from_url(&url);
    let target = outcome.complete(ctx.service.client().session())?;

    match outcome {
        CallbackOutcome::Authenticated(_) => {
            info!("credentials stored in {}", ctx.config.data_dir.display());
            println!("Signed in. Continue at {target}");
            Ok(())
        }
        CallbackOutcome::Failed(reason) => {
            error!("authentication error: {reason}");
            Err(Error::Custom(format!("sign-in failed ({target})")))
        }
        CallbackOutcome::MissingTokens => Err(Error::Custom(format!(
            "callback URL carried no token pair ({target})"
        ))),
    }
}

pub fn logout(ctx: &AppContext) -> Result<()> {
    ctx.service.logout()?;
    println!("Signed out.");
    Ok(())
}

pub async fn me(ctx: &AppContext) -> Result<()> {
    let Some(user) = ctx.service.current_user().await? else {
        println!("Not signed in. Run `roster login`.");
        return Ok(());
    };

    if ctx.json {
        return ctx.print_json(&user);
    }

    println!("{}", user.display_name());
    println!("  id:         {}", user.id);
    println!("  discord id: {}", user.discord_id);
    println!("  role:       {}", user.role);
    if let Some(server_id) = user.preferred_server_id {
        println!("  preferred:  server {server_id}");
    }
    println!("  joined:     {}", user.created_at.format("%Y-%m-%d"));
    Ok(())
}
