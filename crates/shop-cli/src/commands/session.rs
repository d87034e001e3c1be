use anyhow::{Context, Result};

use super::context::AppContext;

pub async fn register(context: &AppContext, account: &str, email: &str, password: &str) -> Result<()> {
    context
        .api
        .register(account, email, password)
        .await
        .context("Registration failed")?;
    println!("✅ Registered '{}'. Sign in with `shop login {}`.", account, account);
    Ok(())
}

pub async fn login(context: &AppContext, account: &str, password: &str) -> Result<()> {
    let session = context
        .api
        .login(account, password)
        .await
        .context("Login failed")?;
    println!("✅ Signed in as {} ({})", session.account, session.role);
    Ok(())
}

pub async fn profile(context: &AppContext) -> Result<()> {
    if !context.api.session().is_logged_in().await {
        anyhow::bail!("Not signed in. Run `shop login <account>` first.");
    }

    let session = context
        .api
        .sync_profile()
        .await
        .context("Failed to fetch profile")?;
    println!("account: {}", session.account);
    println!("role:    {}", session.role);
    println!("cart:    {}", session.cart);
    println!("avatar:  {}", session.avatar_url());
    Ok(())
}

pub async fn logout(context: &AppContext) {
    context.api.logout().await;
    println!("👋 Signed out");
}

pub async fn status(context: &AppContext) {
    let session = context.api.session().snapshot().await;
    println!("api:       {}", context.config.api.base_url);
    println!("signed in: {}", session.is_logged_in());
    if session.is_logged_in() {
        println!("admin:     {}", session.is_admin());
    }
}
