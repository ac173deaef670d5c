use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::cli::connect_postgres;
use crate::config::AppConfig;
use crate::database::schema::{document_id, Collection, Document, CREATED_AT, ID};
use crate::database::Store;
use crate::services::refresh_average_rating;

#[derive(Subcommand)]
pub enum SeedCommands {
    #[command(about = "Import users, bootcamps, courses and reviews from JSON files")]
    Import {
        #[arg(long, default_value = "data", help = "Directory holding <table>.json files")]
        dir: PathBuf,
    },

    #[command(about = "Delete every record")]
    Destroy,
}

pub async fn handle(cmd: SeedCommands, config: &AppConfig) -> anyhow::Result<()> {
    let store = connect_postgres(config).await?;

    let result = match cmd {
        SeedCommands::Import { dir } => import(&store, &dir).await,
        SeedCommands::Destroy => destroy(&store).await,
    };
    store.close().await;
    result
}

/// Load every collection in dependency order, then recompute bootcamp ratings
pub async fn import(store: &dyn Store, dir: &Path) -> anyhow::Result<()> {
    for collection in Collection::ALL {
        let docs = read_documents(dir, collection)?;
        let count = docs.len();
        for doc in docs {
            store
                .create(collection, with_defaults(doc))
                .await
                .with_context(|| format!("failed to import into {}", collection.table()))?;
        }
        info!("Imported {} {}", count, collection.table());
    }

    for bootcamp in store.find(Collection::Bootcamp, &Default::default()).await? {
        if let Some(id) = document_id(&bootcamp) {
            refresh_average_rating(store, id).await?;
        }
    }

    println!("Data imported");
    Ok(())
}

/// Remove all records, children first
pub async fn destroy(store: &dyn Store) -> anyhow::Result<()> {
    for collection in Collection::ALL.iter().rev() {
        let removed = store.delete_many(*collection, &[]).await?;
        info!("Deleted {} {}", removed, collection.table());
    }
    println!("Data destroyed");
    Ok(())
}

fn read_documents(dir: &Path, collection: Collection) -> anyhow::Result<Vec<Document>> {
    let path = dir.join(format!("{}.json", collection.table()));
    if !path.exists() {
        info!("Skipping {} (no file)", path.display());
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let docs: Vec<Document> =
        serde_json::from_str(&raw).with_context(|| format!("{} must hold an array of objects", path.display()))?;
    Ok(docs)
}

fn with_defaults(mut doc: Document) -> Document {
    if document_id(&doc).is_none() {
        doc.insert(ID.name.to_string(), Value::String(Uuid::new_v4().to_string()));
    }
    doc.entry(CREATED_AT.name.to_string())
        .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::filter::ListQuery;
    use serde_json::json;

    fn write(dir: &Path, name: &str, value: Value) {
        std::fs::write(dir.join(name), value.to_string()).unwrap();
    }

    #[tokio::test]
    async fn import_recomputes_ratings_and_destroy_clears() {
        let dir = std::env::temp_dir().join(format!("devcamper-seed-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let owner = Uuid::new_v4();
        let reviewer = Uuid::new_v4();
        let bootcamp = Uuid::new_v4();
        write(&dir, "users.json", json!([
            { "id": owner, "name": "Pub", "email": "pub@example.com", "role": "publisher" },
            { "id": reviewer, "name": "Rev", "email": "rev@example.com", "role": "user" }
        ]));
        write(&dir, "bootcamps.json", json!([
            { "id": bootcamp, "name": "Camp", "description": "d", "user": owner }
        ]));
        write(&dir, "reviews.json", json!([
            { "title": "ok", "text": "t", "rating": 7, "bootcamp": bootcamp, "user": reviewer }
        ]));

        let store = MemoryStore::new();
        import(&store, &dir).await.unwrap();

        let camp = store.get(Collection::Bootcamp, bootcamp).await.unwrap().unwrap();
        assert_eq!(camp["averageRating"], json!(7.0));

        destroy(&store).await.unwrap();
        assert!(store.find(Collection::User, &ListQuery::new()).await.unwrap().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }
}
