use anyhow::{anyhow, Result};

use datesweep_core::{
    content::{NewUser, Role},
    storage::{Database, UserRepository},
    AppConfig,
};

pub async fn add(config: &AppConfig, login: &str, name: &str, email: &str, role: &str) -> Result<()> {
    let role = Role::parse(role).ok_or_else(|| {
        anyhow!("unknown role '{}' (expected administrator, editor, author or subscriber)", role)
    })?;

    let db = Database::new(config).await?;
    let repo = UserRepository::new(&db);
    if repo.find_by_login(login).await?.is_some() {
        println!("User '{}' already exists.", login);
        return Ok(());
    }

    let (user, token) = repo
        .create(&NewUser {
            login: login.to_string(),
            display_name: name.to_string(),
            email: email.to_string(),
            role,
        })
        .await?;

    println!("Created {} '{}' ({})", user.role.as_str(), user.login, user.id);
    println!("Access token (shown once): {}", token);

    Ok(())
}

pub async fn reset_token(config: &AppConfig, login: &str) -> Result<()> {
    let db = Database::new(config).await?;
    let repo = UserRepository::new(&db);

    let user = repo
        .find_by_login(login)
        .await?
        .ok_or_else(|| anyhow!("no user named '{}'", login))?;
    let token = repo.rotate_token(user.id).await?;

    println!("New access token for '{}': {}", user.login, token);
    Ok(())
}
