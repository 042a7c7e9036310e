use mongodb::Client;

use crate::config::AppConfig;

pub async fn get_db_client(config: &AppConfig) -> anyhow::Result<Client> {
    let client = Client::with_uri_str(&config.database_url).await?;

    let db = client.database(&config.database_name);

    // Verify the database is reachable by listing collections
    match db.list_collection_names().await {
        Ok(collections) => {
            tracing::info!("✅ Connected to database: {}", config.database_name);
            tracing::info!("📂 Collections found: {:?}", collections);

            if !collections.contains(&"tournaments".to_string()) {
                tracing::warn!("'tournaments' collection not found, it will be created on first write");
            }
        }
        Err(e) => {
            tracing::error!(
                "Database '{}' may not exist or is inaccessible: {}",
                config.database_name,
                e
            );
        }
    }

    Ok(client)
}
