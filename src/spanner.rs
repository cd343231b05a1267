use anyhow::{Context, Result};
use async_trait::async_trait;
use gcloud_gax::grpc::{Code, Status};
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::client::{Client, ClientConfig};
use gcloud_spanner::mutation::insert;
use gcloud_spanner::row::Row;
use gcloud_spanner::statement::Statement;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::config::SpannerConfig;
use crate::models::{Cheese, NewCheese};
use crate::store::CheeseStore;

const TABLE: &str = "cheeses";
const COLUMNS: [&str; 4] = ["id", "name", "price", "is_best_seller"];

/// Cheese store backed by a Cloud Spanner table
///
/// Ids are allocated in-process from an atomic counter seeded with
/// `MAX(id)` at connect time. Rows are written with the `insert` mutation,
/// so a second writer allocating the same id is rejected by Spanner instead
/// of overwriting an existing record.
#[derive(Clone)]
pub struct SpannerStore {
    inner: Arc<Client>,
    last_id: Arc<AtomicI64>,
}

impl SpannerStore {
    /// Connect to Spanner, auto-provisioning the instance, database and
    /// `cheeses` table when they don't exist.
    ///
    /// The gcloud-spanner library automatically detects the
    /// SPANNER_EMULATOR_HOST environment variable and connects to
    /// the emulator when set, or production Spanner otherwise.
    pub async fn connect(config: &SpannerConfig) -> Result<Self> {
        auto_provision(config).await?;

        let database_path = config.database_path();

        match &config.emulator_host {
            Some(host) => tracing::info!("Connecting to Spanner emulator at: {}", host),
            None => tracing::info!("Connecting to production Spanner"),
        }

        // ClientConfig::default() automatically uses SPANNER_EMULATOR_HOST if set
        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!(
            "Successfully connected to Spanner database: {}",
            database_path
        );

        let store = Self {
            inner: Arc::new(client),
            last_id: Arc::new(AtomicI64::new(0)),
        };
        let max_id = store.max_id().await?;
        store.last_id.store(max_id, Ordering::SeqCst);
        tracing::debug!("Id allocator starts after: {}", max_id);

        Ok(store)
    }

    async fn max_id(&self) -> Result<i64> {
        let statement = Statement::new(
            "SELECT COALESCE(MAX(id), 0) AS max_id FROM cheeses"
        );

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction for max id")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query max id")?;

        match result_set.next().await? {
            Some(row) => Ok(row.column_by_name("max_id")?),
            None => Ok(0),
        }
    }
}

fn cheese_from_row(row: &Row) -> Result<Cheese> {
    Ok(Cheese {
        id: row.column_by_name("id")?,
        name: row.column_by_name("name")?,
        price: row.column_by_name("price")?,
        is_best_seller: row.column_by_name("is_best_seller")?,
    })
}

#[async_trait]
impl CheeseStore for SpannerStore {
    fn backend(&self) -> &'static str {
        "spanner"
    }

    async fn list(&self) -> Result<Vec<Cheese>> {
        let statement = Statement::new(
            "SELECT id, name, price, is_best_seller FROM cheeses ORDER BY id ASC"
        );

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction for list")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query cheeses from Spanner")?;

        let mut cheeses = Vec::new();
        while let Some(row) = result_set.next().await? {
            cheeses.push(cheese_from_row(&row)?);
        }

        tracing::debug!("Listed {} cheeses", cheeses.len());
        Ok(cheeses)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Cheese>> {
        let mut statement = Statement::new(
            "SELECT id, name, price, is_best_seller FROM cheeses WHERE id = @id"
        );
        statement.add_param("id", &id);

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query cheese from Spanner")?;

        if let Some(row) = result_set.next().await? {
            tracing::debug!("Read cheese with id: {}", id);
            Ok(Some(cheese_from_row(&row)?))
        } else {
            tracing::debug!("Cheese not found with id: {}", id);
            Ok(None)
        }
    }

    async fn insert(&self, cheese: NewCheese) -> Result<Cheese> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;

        let mutation = insert(
            TABLE,
            &COLUMNS,
            &[&id, &cheese.name, &cheese.price, &cheese.is_best_seller],
        );

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to insert cheese into Spanner")?;

        tracing::debug!("Inserted cheese with id: {}", id);
        Ok(cheese.into_cheese(id))
    }

    /// Perform a health check by executing a lightweight `SELECT 1`
    async fn health_check(&self) -> Result<()> {
        let statement = Statement::new("SELECT 1");

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create health check transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute health check query")?;

        if result_set.next().await?.is_some() {
            tracing::debug!("Health check query succeeded");
            Ok(())
        } else {
            Err(anyhow::anyhow!("Health check query returned no results"))
        }
    }
}

/// Automatically provision Spanner instance, database, and table
///
/// Enables zero-setup local development with the emulator.
async fn auto_provision(config: &SpannerConfig) -> Result<()> {
    tracing::info!("Starting auto-provisioning checks...");

    let admin_client = AdminClient::new(AdminClientConfig::default())
        .await
        .context("Failed to create Spanner admin client")?;

    let project_path = format!("projects/{}", config.project);
    let instance_path = format!("{}/instances/{}", project_path, config.instance);
    let database_path = config.database_path();

    ensure_instance_exists(&admin_client, config, &project_path, &instance_path).await?;
    ensure_database_exists(&admin_client, config, &instance_path, &database_path).await?;
    ensure_table_exists(&admin_client, &database_path).await?;

    tracing::info!("Auto-provisioning complete");
    Ok(())
}

/// Create a provisioned resource only when its lookup reported `NotFound`
async fn get_or_create<T, C, F>(
    kind: &str,
    path: &str,
    lookup: std::result::Result<T, Status>,
    create: C,
) -> Result<()>
where
    C: FnOnce() -> F,
    F: Future<Output = Result<()>>,
{
    match lookup {
        Ok(_) => {
            tracing::info!("{} already exists: {}", kind, path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("{} not found, creating: {}", kind, path);
            create().await?;
            tracing::info!("{} created successfully: {}", kind, path);
            Ok(())
        }
        Err(status) => Err(anyhow::anyhow!(
            "Failed to check {} existence: {}",
            kind.to_lowercase(),
            status.message()
        )),
    }
}

async fn ensure_instance_exists(
    admin_client: &AdminClient,
    config: &SpannerConfig,
    project_path: &str,
    instance_path: &str,
) -> Result<()> {
    let lookup = admin_client
        .instance()
        .get_instance(
            GetInstanceRequest {
                name: instance_path.to_string(),
                field_mask: None,
            },
            None,
        )
        .await;

    get_or_create("Instance", instance_path, lookup, move || async move {
        // The emulator only accepts its own instance config
        let instance_config = match config.emulator_host {
            Some(_) => format!("{}/instanceConfigs/emulator-config", project_path),
            None => format!("{}/instanceConfigs/regional-us-central1", project_path),
        };

        let create_request = CreateInstanceRequest {
            parent: project_path.to_string(),
            instance_id: config.instance.clone(),
            instance: Some(Instance {
                name: instance_path.to_string(),
                config: instance_config,
                display_name: format!("{} instance", config.instance),
                node_count: 1,
                ..Default::default()
            }),
        };

        admin_client
            .instance()
            .create_instance(create_request, None)
            .await
            .context("Failed to start instance creation")?
            .wait(None)
            .await
            .context("Failed to create instance")?;
        Ok::<(), anyhow::Error>(())
    })
    .await
}

async fn ensure_database_exists(
    admin_client: &AdminClient,
    config: &SpannerConfig,
    instance_path: &str,
    database_path: &str,
) -> Result<()> {
    let lookup = admin_client
        .database()
        .get_database(
            GetDatabaseRequest {
                name: database_path.to_string(),
            },
            None,
        )
        .await;

    get_or_create("Database", database_path, lookup, move || async move {
        let create_request = CreateDatabaseRequest {
            parent: instance_path.to_string(),
            create_statement: format!("CREATE DATABASE `{}`", config.database),
            extra_statements: vec![],
            encryption_config: None,
            database_dialect: 1, // Google Standard SQL
            proto_descriptors: vec![],
        };

        admin_client
            .database()
            .create_database(create_request, None)
            .await
            .context("Failed to start database creation")?
            .wait(None)
            .await
            .context("Failed to create database")?;
        Ok::<(), anyhow::Error>(())
    })
    .await
}

fn has_cheeses_table(statements: &[String]) -> bool {
    statements
        .iter()
        .any(|stmt| stmt.contains("CREATE TABLE cheeses") || stmt.contains("CREATE TABLE `cheeses`"))
}

async fn ensure_table_exists(admin_client: &AdminClient, database_path: &str) -> Result<()> {
    let get_ddl_request = GetDatabaseDdlRequest {
        database: database_path.to_string(),
    };

    let ddl_response = admin_client
        .database()
        .get_database_ddl(get_ddl_request, None)
        .await
        .context("Failed to get database DDL")?;

    if has_cheeses_table(&ddl_response.into_inner().statements) {
        tracing::info!("Table 'cheeses' already exists");
        return Ok(());
    }

    tracing::info!("Table 'cheeses' not found, creating...");

    let create_table_ddl = r#"
CREATE TABLE cheeses (
    id INT64 NOT NULL,
    name STRING(MAX) NOT NULL,
    price FLOAT64 NOT NULL,
    is_best_seller BOOL NOT NULL,
) PRIMARY KEY (id)
"#
    .trim()
    .to_string();

    let update_request = UpdateDatabaseDdlRequest {
        database: database_path.to_string(),
        statements: vec![create_table_ddl],
        operation_id: String::new(),
        proto_descriptors: vec![],
        throughput_mode: false,
    };

    let mut operation = admin_client
        .database()
        .update_database_ddl(update_request, None)
        .await
        .context("Failed to start table creation")?;

    operation
        .wait(None)
        .await
        .context("Failed to create table")?;

    tracing::info!("Table 'cheeses' created successfully");
    Ok(())
}
