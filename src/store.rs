use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{Cheese, NewCheese};

/// Persistence seam for cheese records
///
/// Implementations own every record they hold. Ids are assigned on insert,
/// start at 1, increase monotonically and are never reused.
#[async_trait]
pub trait CheeseStore: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    /// All records in insertion order
    async fn list(&self) -> Result<Vec<Cheese>>;

    /// Look up a single record; `Ok(None)` when no record has this id
    async fn find_by_id(&self, id: i64) -> Result<Option<Cheese>>;

    /// Store a new record under the next free id and return it
    async fn insert(&self, cheese: NewCheese) -> Result<Cheese>;

    /// Verify the backing store is reachable
    async fn health_check(&self) -> Result<()>;
}

#[derive(Default)]
struct MemoryInner {
    cheeses: Vec<Cheese>,
    last_id: i64,
}

/// In-process store backed by an insertion-ordered `Vec`
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheeseStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<Cheese>> {
        Ok(self.inner.read().await.cheeses.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Cheese>> {
        let inner = self.inner.read().await;
        Ok(inner.cheeses.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, cheese: NewCheese) -> Result<Cheese> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let cheese = cheese.into_cheese(inner.last_id);
        inner.cheeses.push(cheese.clone());

        tracing::debug!("Inserted cheese with id: {}", cheese.id);
        Ok(cheese)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
