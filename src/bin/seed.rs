use std::env;

use anyhow::{bail, Context, Result};
use diesel::prelude::*;
use uuid::Uuid;

use fleetdesk::{
    auth::{password, ROLE_ADMIN, ROLE_USER},
    db,
    models::{NewUser, User},
    routes::auth::normalize_email,
    schema::users,
};

const USAGE: &str = "Usage: seed <email> <password> <name> [admin|user]";

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    fleetdesk::init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let (email, secret, name, role) = match args.as_slice() {
        [email, secret, name] => (email, secret, name, ROLE_ADMIN),
        [email, secret, name, role] => (email, secret, name, role.as_str()),
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };
    if role != ROLE_ADMIN && role != ROLE_USER {
        bail!("role must be `{ROLE_ADMIN}` or `{ROLE_USER}`, got `{role}`");
    }
    if secret.len() < 8 {
        bail!("password must be at least 8 characters");
    }

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = db::init_pool(&database_url)?;
    let applied = db::run_migrations(&pool)?;
    tracing::info!(component = "seed", applied, "database migrations up to date");

    let mut conn = pool.get().context("failed to get database connection")?;
    let email = normalize_email(email);

    let existing: Option<User> = users::table
        .filter(users::email.eq(&email))
        .first(&mut conn)
        .optional()
        .context("failed to look up user")?;
    if let Some(user) = existing {
        println!("User {} already exists ({}), leaving it unchanged.", user.email, user.role);
        return Ok(());
    }

    let new_user = NewUser {
        id: Uuid::new_v4(),
        email,
        password_hash: password::hash_password(secret)?,
        name: name.trim().to_string(),
        role: role.to_string(),
    };
    diesel::insert_into(users::table)
        .values(&new_user)
        .execute(&mut conn)
        .context("failed to insert user")?;

    println!("Created {} user {}.", new_user.role, new_user.email);
    Ok(())
}
