use anyhow::Result;
use shop_core::i18n::I18n;
use shop_core::router::RouteTable;
use shop_interaction::Navigator;

use super::context::AppContext;

pub async fn run(context: AppContext, path: &str) -> Result<()> {
    let i18n = I18n::bundled(&context.config.i18n)?;
    let navigator = Navigator::new(context.api, RouteTable::storefront(), i18n);

    let page = navigator.navigate(path).await;
    if page.redirected {
        println!("↪ {} -> {}", path, page.path);
    }
    println!("{}", page.title);
    Ok(())
}
