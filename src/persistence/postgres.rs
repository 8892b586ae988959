//! PostgreSQL implementation of the store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{
    ListChangesetEventsOpts, ListChangesetsOpts, ListExternalServicesOpts, Store, effective_limit,
};
use crate::domain::{
    Changeset, ChangesetEvent, ChangesetEventKind, ChangesetId, ExternalService,
    ExternalServiceKind,
};
use crate::error::GatewayError;

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn persistence_err(e: sqlx::Error) -> GatewayError {
    GatewayError::PersistenceError(e.to_string())
}

fn parse_service_kind(raw: &str) -> Result<ExternalServiceKind, GatewayError> {
    ExternalServiceKind::parse(raw).ok_or_else(|| {
        GatewayError::PersistenceError(format!("unknown external service kind: {raw}"))
    })
}

fn parse_event_kind(raw: &str) -> Result<ChangesetEventKind, GatewayError> {
    ChangesetEventKind::parse(raw)
        .ok_or_else(|| GatewayError::PersistenceError(format!("unknown event kind: {raw}")))
}

#[async_trait]
impl Store for PostgresStore {
    async fn upsert_external_services(
        &self,
        services: &[ExternalService],
    ) -> Result<(), GatewayError> {
        for svc in services {
            sqlx::query(
                "INSERT INTO external_services (id, kind, display_name, config, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 ON CONFLICT (id) DO UPDATE SET \
                   kind = EXCLUDED.kind, \
                   display_name = EXCLUDED.display_name, \
                   config = EXCLUDED.config, \
                   updated_at = EXCLUDED.updated_at",
            )
            .bind(svc.id)
            .bind(svc.kind.as_str())
            .bind(&svc.display_name)
            .bind(&svc.config)
            .bind(svc.created_at)
            .bind(svc.updated_at)
            .execute(&self.pool)
            .await
            .map_err(persistence_err)?;
        }
        Ok(())
    }

    async fn list_external_services(
        &self,
        opts: ListExternalServicesOpts,
    ) -> Result<Vec<ExternalService>, GatewayError> {
        type Row = (
            i64,
            String,
            String,
            serde_json::Value,
            DateTime<Utc>,
            DateTime<Utc>,
        );
        let rows: Vec<Row> = if let Some(kind) = opts.kind {
            sqlx::query_as(
                "SELECT id, kind, display_name, config, created_at, updated_at \
                 FROM external_services WHERE kind = $1 ORDER BY id ASC",
            )
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as(
                "SELECT id, kind, display_name, config, created_at, updated_at \
                 FROM external_services ORDER BY id ASC",
            )
            .fetch_all(&self.pool)
            .await
        }
        .map_err(persistence_err)?;

        rows.into_iter()
            .map(|(id, kind, display_name, config, created_at, updated_at)| {
                Ok(ExternalService {
                    id,
                    kind: parse_service_kind(&kind)?,
                    display_name,
                    config,
                    created_at,
                    updated_at,
                })
            })
            .collect()
    }

    async fn create_changesets(&self, changesets: &[Changeset]) -> Result<(), GatewayError> {
        for cs in changesets {
            sqlx::query(
                "INSERT INTO changesets (repo, external_id, external_created_at, metadata) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (repo, external_id) DO NOTHING",
            )
            .bind(&cs.repo)
            .bind(&cs.external_id)
            .bind(cs.external_created_at)
            .bind(&cs.metadata)
            .execute(&self.pool)
            .await
            .map_err(persistence_err)?;
        }
        Ok(())
    }

    async fn get_changeset(
        &self,
        repo: &str,
        external_id: &str,
    ) -> Result<Option<Changeset>, GatewayError> {
        type Row = (i64, String, String, Option<DateTime<Utc>>, serde_json::Value);
        let row: Option<Row> = sqlx::query_as(
            "SELECT id, repo, external_id, external_created_at, metadata \
             FROM changesets WHERE lower(repo) = lower($1) AND external_id = $2",
        )
        .bind(repo)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence_err)?;

        Ok(
            row.map(|(id, repo, external_id, external_created_at, metadata)| Changeset {
                id: ChangesetId::new(id),
                repo,
                external_id,
                external_created_at,
                metadata,
            }),
        )
    }

    async fn upsert_changeset_events(&self, events: &[ChangesetEvent]) -> Result<(), GatewayError> {
        for event in events {
            sqlx::query(
                "INSERT INTO changeset_events \
                   (changeset_id, kind, source_id, occurred_at, metadata, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (changeset_id, kind, source_id) DO NOTHING",
            )
            .bind(event.changeset_id.value())
            .bind(event.kind.as_str())
            .bind(&event.source_id)
            .bind(event.timestamp)
            .bind(&event.metadata)
            .bind(event.created_at)
            .bind(event.updated_at)
            .execute(&self.pool)
            .await
            .map_err(persistence_err)?;
        }
        Ok(())
    }

    async fn list_changesets(
        &self,
        opts: ListChangesetsOpts,
    ) -> Result<Vec<Changeset>, GatewayError> {
        type Row = (i64, String, String, Option<DateTime<Utc>>, serde_json::Value);
        let rows: Vec<Row> = sqlx::query_as(
            "SELECT id, repo, external_id, external_created_at, metadata \
             FROM changesets ORDER BY id ASC LIMIT $1",
        )
        .bind(effective_limit(opts.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(persistence_err)?;

        Ok(rows
            .into_iter()
            .map(|(id, repo, external_id, external_created_at, metadata)| Changeset {
                id: ChangesetId::new(id),
                repo,
                external_id,
                external_created_at,
                metadata,
            })
            .collect())
    }

    async fn list_changeset_events(
        &self,
        opts: ListChangesetEventsOpts,
    ) -> Result<Vec<ChangesetEvent>, GatewayError> {
        type Row = (
            i64,
            i64,
            String,
            String,
            DateTime<Utc>,
            serde_json::Value,
            DateTime<Utc>,
            DateTime<Utc>,
        );
        let limit = effective_limit(opts.limit);
        let rows: Vec<Row> = if opts.changeset_ids.is_empty() {
            sqlx::query_as(
                "SELECT id, changeset_id, kind, source_id, occurred_at, metadata, created_at, updated_at \
                 FROM changeset_events ORDER BY id ASC LIMIT $1",
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        } else {
            let ids: Vec<i64> = opts.changeset_ids.iter().map(|id| id.value()).collect();
            sqlx::query_as(
                "SELECT id, changeset_id, kind, source_id, occurred_at, metadata, created_at, updated_at \
                 FROM changeset_events WHERE changeset_id = ANY($1) ORDER BY id ASC LIMIT $2",
            )
            .bind(ids)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(persistence_err)?;

        rows.into_iter()
            .map(
                |(id, changeset_id, kind, source_id, occurred_at, metadata, created_at, updated_at)| {
                    Ok(ChangesetEvent {
                        id,
                        changeset_id: ChangesetId::new(changeset_id),
                        kind: parse_event_kind(&kind)?,
                        source_id,
                        timestamp: occurred_at,
                        metadata,
                        created_at,
                        updated_at,
                    })
                },
            )
            .collect()
    }
}
