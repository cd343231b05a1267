use anyhow::{Context, Result};
use std::path::Path;

use crate::models::NewCheese;
use crate::store::CheeseStore;

/// Read a JSON array of cheeses to insert at startup
pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<NewCheese>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse seed file: {}", path.display()))
}

/// Insert `cheeses` in order unless the store already holds records.
///
/// Returns the number of records inserted.
pub async fn seed_store(store: &dyn CheeseStore, cheeses: Vec<NewCheese>) -> Result<usize> {
    let existing = store.list().await?.len();
    if existing > 0 {
        tracing::info!(
            "Store already holds {} cheeses, skipping seed",
            existing
        );
        return Ok(0);
    }

    let count = cheeses.len();
    for cheese in cheeses {
        let created = store.insert(cheese).await?;
        tracing::debug!("Seeded cheese {} ({})", created.id, created.name);
    }

    tracing::info!("Seeded {} cheeses into {} store", count, store.backend());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::io::Write;

    fn write_seed(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_seed_file() {
        let file = write_seed(
            r#"[
                {"name": "Cheddar", "price": 3, "is_best_seller": true},
                {"name": "Limburger", "price": 8.5, "is_best_seller": false}
            ]"#,
        );

        let cheeses = load_seed_file(file.path()).unwrap();
        assert_eq!(cheeses.len(), 2);
        assert_eq!(cheeses[0].name, "Cheddar");
        assert_eq!(cheeses[0].price, 3.0);
        assert!(cheeses[0].is_best_seller);
        assert_eq!(cheeses[1].price, 8.5);
    }

    #[test]
    fn test_bundled_seed_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/seeds.json");
        let cheeses = load_seed_file(path).unwrap();
        assert_eq!(cheeses.len(), 3);
        assert_eq!(cheeses[0].name, "Cheddar");
    }

    #[test]
    fn test_missing_seed_file() {
        let error = load_seed_file("does/not/exist.json").unwrap_err();
        assert!(error.to_string().contains("Failed to read seed file"));
    }

    #[test]
    fn test_malformed_seed_file() {
        let file = write_seed(r#"[{"name": "Cheddar"}]"#);
        let error = load_seed_file(file.path()).unwrap_err();
        assert!(error.to_string().contains("Failed to parse seed file"));
    }

    #[tokio::test]
    async fn test_seed_store_inserts_in_order() {
        let store = MemoryStore::new();
        let cheeses = vec![
            NewCheese {
                name: "Cheddar".to_string(),
                price: 3.0,
                is_best_seller: true,
            },
            NewCheese {
                name: "Pepper Jack".to_string(),
                price: 4.0,
                is_best_seller: true,
            },
        ];

        let inserted = seed_store(&store, cheeses).await.unwrap();
        assert_eq!(inserted, 2);

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].id, 1);
        assert_eq!(listed[0].name, "Cheddar");
        assert_eq!(listed[1].id, 2);
        assert_eq!(listed[1].name, "Pepper Jack");
    }

    #[tokio::test]
    async fn test_seed_store_skips_non_empty_store() {
        let store = MemoryStore::new();
        let cheddar = NewCheese {
            name: "Cheddar".to_string(),
            price: 3.0,
            is_best_seller: true,
        };
        store.insert(cheddar.clone()).await.unwrap();

        let inserted = seed_store(&store, vec![cheddar]).await.unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
