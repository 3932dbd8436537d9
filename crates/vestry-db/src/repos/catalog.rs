//! Catalog repository: modules, agents, bundles and bundle membership.
//!
//! The catalog is global. Churches only read it; `import_catalog` is the
//! administrative write path.

use std::collections::{HashMap, HashSet};

use vestry_core::catalog::{Catalog, CatalogSeed};
use vestry_core::entities::{Agent, Bundle, Module};
use vestry_core::errors::CoreError;
use vestry_core::responses::CatalogImportReport;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_price, get_opt_string};
use crate::service::EntitlementService;
use crate::tx;

fn row_to_module(row: &libsql::Row) -> Result<Module, DatabaseError> {
    Ok(Module {
        module_name: row.get(0)?,
        name: get_opt_string(row, 1)?,
        price: get_opt_price(row, 2)?,
        purpose: get_opt_string(row, 3)?,
        category: get_opt_string(row, 4)?,
    })
}

fn row_to_agent(row: &libsql::Row) -> Result<Agent, DatabaseError> {
    Ok(Agent {
        module_name: row.get(0)?,
        agent_name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        price: get_opt_price(row, 3)?,
        required: get_bool(row, 4)?,
    })
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub(crate) async fn fetch_modules(conn: &libsql::Connection) -> Result<Vec<Module>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT module_name, name, price, purpose, category
             FROM available_modules ORDER BY rowid",
            (),
        )
        .await?;
    let mut modules = Vec::new();
    while let Some(row) = rows.next().await? {
        modules.push(row_to_module(&row)?);
    }
    Ok(modules)
}

/// Agents in catalog order: grouped by their module's position, then by
/// insertion order within the module.
pub(crate) async fn fetch_agents(
    conn: &libsql::Connection,
    module_name: Option<&str>,
) -> Result<Vec<Agent>, DatabaseError> {
    let base = "SELECT a.module_name, a.agent_name, a.description, a.price, a.required
                FROM module_agents a
                JOIN available_modules m ON m.module_name = a.module_name";
    let mut rows = match module_name {
        Some(name) => {
            conn.query(
                &format!("{base} WHERE a.module_name = ?1 ORDER BY m.rowid, a.rowid"),
                [name],
            )
            .await?
        }
        None => {
            conn.query(&format!("{base} ORDER BY m.rowid, a.rowid"), ())
                .await?
        }
    };
    let mut agents = Vec::new();
    while let Some(row) = rows.next().await? {
        agents.push(row_to_agent(&row)?);
    }
    Ok(agents)
}

pub(crate) async fn fetch_bundles(conn: &libsql::Connection) -> Result<Vec<Bundle>, DatabaseError> {
    let mut members: HashMap<String, Vec<String>> = HashMap::new();
    let mut rows = conn
        .query(
            "SELECT bundle_id, module_name FROM bundle_modules ORDER BY bundle_id, position",
            (),
        )
        .await?;
    while let Some(row) = rows.next().await? {
        members
            .entry(row.get::<String>(0)?)
            .or_default()
            .push(row.get::<String>(1)?);
    }

    let mut rows = conn
        .query(
            "SELECT bundle_id, name, description, price FROM bundles ORDER BY rowid",
            (),
        )
        .await?;
    let mut bundles = Vec::new();
    while let Some(row) = rows.next().await? {
        let bundle_id: String = row.get(0)?;
        bundles.push(Bundle {
            modules: members.remove(&bundle_id).unwrap_or_default(),
            name: row.get(1)?,
            description: get_opt_string(&row, 2)?,
            price: get_opt_price(&row, 3)?.unwrap_or(0.0),
            bundle_id,
        });
    }
    Ok(bundles)
}

pub(crate) async fn fetch_catalog(conn: &libsql::Connection) -> Result<Catalog, DatabaseError> {
    Ok(Catalog {
        modules: fetch_modules(conn).await?,
        agents: fetch_agents(conn, None).await?,
        bundles: fetch_bundles(conn).await?,
    })
}

async fn write_catalog(
    conn: &libsql::Connection,
    catalog: &Catalog,
) -> Result<CatalogImportReport, DatabaseError> {
    let mut report = CatalogImportReport::default();

    for module in &catalog.modules {
        conn.execute(
            "INSERT INTO available_modules (module_name, name, price, purpose, category)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(module_name) DO UPDATE SET
                name = excluded.name,
                price = excluded.price,
                purpose = excluded.purpose,
                category = excluded.category",
            libsql::params![
                module.module_name.as_str(),
                module.name.as_deref(),
                module.price,
                module.purpose.as_deref(),
                module.category.as_deref()
            ],
        )
        .await?;
    }
    report.modules = count(catalog.modules.len());

    for agent in &catalog.agents {
        conn.execute(
            "INSERT INTO module_agents (module_name, agent_name, description, price, required)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(module_name, agent_name) DO UPDATE SET
                description = excluded.description,
                price = excluded.price,
                required = excluded.required",
            libsql::params![
                agent.module_name.as_str(),
                agent.agent_name.as_str(),
                agent.description.as_deref(),
                agent.price,
                i64::from(agent.required)
            ],
        )
        .await?;
    }
    report.agents = count(catalog.agents.len());

    for bundle in &catalog.bundles {
        conn.execute(
            "INSERT INTO bundles (bundle_id, name, description, price)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(bundle_id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                price = excluded.price",
            libsql::params![
                bundle.bundle_id.as_str(),
                bundle.name.as_str(),
                bundle.description.as_deref(),
                bundle.price
            ],
        )
        .await?;

        conn.execute(
            "DELETE FROM bundle_modules WHERE bundle_id = ?1",
            [bundle.bundle_id.as_str()],
        )
        .await?;

        let mut seen = HashSet::new();
        for module_name in bundle.modules.iter().filter(|m| seen.insert(m.as_str())) {
            conn.execute(
                "INSERT INTO bundle_modules (bundle_id, module_name, position) VALUES (?1, ?2, ?3)",
                libsql::params![
                    bundle.bundle_id.as_str(),
                    module_name.as_str(),
                    i64::from(report.bundle_links)
                ],
            )
            .await?;
            report.bundle_links += 1;
        }
    }
    report.bundles = count(catalog.bundles.len());

    Ok(report)
}

impl EntitlementService {
    /// Upsert a catalog definition. Existing entries not named in `seed` are
    /// kept; the membership of every bundle in `seed` is replaced.
    ///
    /// # Errors
    ///
    /// Returns `Core(NotFound)` if a bundle names a module that is neither in
    /// the seed nor already in the catalog. The import is all-or-nothing.
    pub async fn import_catalog(
        &self,
        seed: &CatalogSeed,
    ) -> Result<CatalogImportReport, DatabaseError> {
        let incoming = seed.clone().into_catalog();

        let existing = fetch_modules(self.db().conn()).await?;
        let known: HashSet<&str> = existing
            .iter()
            .chain(&incoming.modules)
            .map(|m| m.module_name.as_str())
            .collect();
        for bundle in &incoming.bundles {
            if let Some(missing) = bundle.modules.iter().find(|m| !known.contains(m.as_str())) {
                return Err(CoreError::not_found("module", missing.as_str()).into());
            }
        }

        let tx = self.db().conn().transaction().await?;
        let outcome = write_catalog(&tx, &incoming).await;
        let report = tx::finish(tx, outcome, "catalog import").await?;

        tracing::info!(
            modules = report.modules,
            agents = report.agents,
            bundles = report.bundles,
            "catalog imported"
        );
        Ok(report)
    }

    /// Full catalog snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any query fails.
    pub async fn load_catalog(&self) -> Result<Catalog, DatabaseError> {
        fetch_catalog(self.db().conn()).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_catalog_modules(&self) -> Result<Vec<Module>, DatabaseError> {
        fetch_modules(self.db().conn()).await
    }

    /// Catalog agents, optionally limited to one module.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_catalog_agents(
        &self,
        module_name: Option<&str>,
    ) -> Result<Vec<Agent>, DatabaseError> {
        fetch_agents(self.db().conn(), module_name).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_catalog_bundles(&self) -> Result<Vec<Bundle>, DatabaseError> {
        fetch_bundles(self.db().conn()).await
    }
}
