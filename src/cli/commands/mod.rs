mod add;
mod catalog;
mod episodes;
mod list;
mod remove;
mod scan;

pub use add::{cmd_add_show, cmd_edit_show};
pub use catalog::{cmd_catalog_list, cmd_catalog_remove, cmd_catalog_rename, cmd_catalog_set};
pub use episodes::cmd_episodes;
pub use list::cmd_list_shows;
pub use remove::{cmd_remove_show, cmd_reset_show};
pub use scan::cmd_scan;

use crate::config::Config;
use crate::db::{LedgerStore, Store};
use crate::services::{Edit, Library, apply_edit};

async fn load_library(config: &Config) -> (Store, Library) {
    let store = Store::from_config(config);
    let library = Library::new(store.load_shows().await, store.load_catalog().await);
    (store, library)
}

/// Applies `edit` to the stored library and writes the files it touched.
async fn commit(config: &Config, edit: Edit) -> anyhow::Result<Library> {
    let (store, library) = load_library(config).await;
    let touches_catalog = edit.touches_catalog();
    let next = apply_edit(&library, edit)?;

    store.save_shows(&next.shows).await?;
    if touches_catalog {
        store.save_catalog(&next.catalog).await?;
    }
    Ok(next)
}
