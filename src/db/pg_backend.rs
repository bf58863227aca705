// src/db/pg_backend.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::error::BackendError;
use crate::db::backend::{
    ensure_identifier, ensure_query_identifiers, into_record, Backend, Direction, Filter,
    FilterValue, Query, Record,
};

// O backend de produção. As linhas saem do banco já como JSON
// (`to_jsonb`) e entram via `jsonb_populate_record`, então o mesmo SQL
// serve para qualquer tabela e o Postgres cuida da conversão de tipos.
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapa os curingas do LIKE para que o termo seja comparado literalmente
/// (usado com `ESCAPE '\'`).
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &[Filter]) {
    for (i, filter) in filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });

        match filter {
            Filter::Eq(column, value) => {
                builder.push("t.").push(column).push(" = ");
                match value {
                    FilterValue::Uuid(id) => builder.push_bind(*id),
                    FilterValue::Bool(b) => builder.push_bind(*b),
                    FilterValue::Text(s) => builder.push_bind(s.clone()),
                };
            }
            Filter::In(column, ids) => {
                builder
                    .push("t.")
                    .push(column)
                    .push(" = ANY(")
                    .push_bind(ids.clone())
                    .push(")");
            }
            Filter::Search { columns, term } => {
                let search_term = format!("%{}%", escape_like(term));
                builder.push("(");
                for (j, column) in columns.iter().enumerate() {
                    if j > 0 {
                        builder.push(" OR ");
                    }
                    builder
                        .push("t.")
                        .push(column)
                        .push("::text ILIKE ")
                        .push_bind(search_term.clone())
                        .push(" ESCAPE '\\'");
                }
                builder.push(")");
            }
        }
    }
}

fn direction_sql(direction: Direction) -> &'static str {
    match direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
    }
}

// --- Montagem do SQL ---
// Funções puras: os identificadores já foram validados por quem chama.

fn select_query<'a>(table: &str, query: &Query) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT to_jsonb(t) FROM ");
    builder.push(table).push(" t");

    push_filters(&mut builder, &query.filters);

    if let Some(order) = &query.order {
        let direction = direction_sql(order.direction);
        builder.push(" ORDER BY ");
        if order.numeric_text {
            builder
                .push("length(t.")
                .push(&order.column)
                .push(") ")
                .push(direction)
                .push(", ");
        }
        builder.push("t.").push(&order.column).push(" ").push(direction);
    }

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(limit);
    }

    builder
}

fn find_query<'a>(table: &str, id: Uuid) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT to_jsonb(t) FROM ");
    builder.push(table).push(" t WHERE t.id = ").push_bind(id);
    builder
}

fn insert_query<'a>(table: &str, record: Record) -> QueryBuilder<'a, Postgres> {
    let columns: Vec<String> = record.keys().cloned().collect();

    let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO ");
    builder.push(table);

    if columns.is_empty() {
        builder.push(" DEFAULT VALUES");
    } else {
        // INSERT INTO t (a, b) SELECT r.a, r.b FROM jsonb_populate_record(NULL::t, $1) r
        builder.push(" (").push(columns.join(", ")).push(") SELECT ");
        let selected: Vec<String> = columns.iter().map(|c| format!("r.{}", c)).collect();
        builder
            .push(selected.join(", "))
            .push(" FROM jsonb_populate_record(NULL::")
            .push(table)
            .push(", ")
            .push_bind(Value::Object(record))
            .push(") r");
    }

    builder.push(" RETURNING to_jsonb(").push(table).push(".*)");
    builder
}

/// `None` para patch vazio: não há o que atualizar, basta reler a linha.
fn update_query<'a>(table: &str, id: Uuid, patch: Record) -> Option<QueryBuilder<'a, Postgres>> {
    if patch.is_empty() {
        return None;
    }

    let assignments: Vec<String> = patch
        .keys()
        .map(|column| format!("{c} = r.{c}", c = column))
        .collect();

    let mut builder = QueryBuilder::<Postgres>::new("UPDATE ");
    builder
        .push(table)
        .push(" AS t SET ")
        .push(assignments.join(", "))
        .push(" FROM jsonb_populate_record(NULL::")
        .push(table)
        .push(", ")
        .push_bind(Value::Object(patch))
        .push(") r WHERE t.id = ")
        .push_bind(id)
        .push(" RETURNING to_jsonb(t.*)");

    Some(builder)
}

#[async_trait]
impl Backend for PgBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Record>, BackendError> {
        ensure_query_identifiers(table, query)?;

        let rows: Vec<Value> = select_query(table, query)
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(into_record).collect()
    }

    async fn find(&self, table: &str, id: Uuid) -> Result<Record, BackendError> {
        ensure_identifier(table)?;

        let row: Option<Value> = find_query(table, id)
            .build_query_scalar::<Value>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(into_record).unwrap_or(Err(BackendError::NotFound))
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record, BackendError> {
        ensure_identifier(table)?;
        for column in record.keys() {
            ensure_identifier(column)?;
        }

        let row: Value = insert_query(table, record)
            .build_query_scalar::<Value>()
            .fetch_one(&self.pool)
            .await?;

        into_record(row)
    }

    async fn update(&self, table: &str, id: Uuid, patch: Record) -> Result<Record, BackendError> {
        ensure_identifier(table)?;
        for column in patch.keys() {
            ensure_identifier(column)?;
        }

        let Some(mut builder) = update_query(table, id, patch) else {
            return self.find(table, id).await;
        };

        let row: Option<Value> = builder
            .build_query_scalar::<Value>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(into_record).unwrap_or(Err(BackendError::NotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("esperava um objeto"),
        }
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("c:\\tmp"), "c:\\\\tmp");
        assert_eq!(escape_like("Saúde"), "Saúde");
    }

    #[test]
    fn select_combines_filters_order_and_limit() {
        let query = Query::new()
            .eq("excluido", false)
            .any_of("id", &[Uuid::new_v4()])
            .search(&["nome", "sigla"], Some("50%"))
            .order_by_numeric_text("codigo", Direction::Desc)
            .limit(1);

        let builder = select_query("orgaos", &query);
        assert_eq!(
            builder.sql(),
            "SELECT to_jsonb(t) FROM orgaos t \
             WHERE t.excluido = $1 \
             AND t.id = ANY($2) \
             AND (t.nome::text ILIKE $3 ESCAPE '\\' OR t.sigla::text ILIKE $4 ESCAPE '\\') \
             ORDER BY length(t.codigo) DESC, t.codigo DESC \
             LIMIT $5"
        );
    }

    #[test]
    fn select_without_filters_reads_the_whole_table() {
        let builder = select_query("bancos", &Query::new().order_by("nome", Direction::Asc));
        assert_eq!(builder.sql(), "SELECT to_jsonb(t) FROM bancos t ORDER BY t.nome ASC");
    }

    #[test]
    fn insert_populates_only_the_given_columns() {
        let builder = insert_query("bancos", record(json!({ "nome": "Banco do Brasil", "codigo": "001" })));
        assert_eq!(
            builder.sql(),
            "INSERT INTO bancos (codigo, nome) SELECT r.codigo, r.nome \
             FROM jsonb_populate_record(NULL::bancos, $1) r \
             RETURNING to_jsonb(bancos.*)"
        );

        let empty = insert_query("bancos", Record::new());
        assert_eq!(empty.sql(), "INSERT INTO bancos DEFAULT VALUES RETURNING to_jsonb(bancos.*)");
    }

    #[test]
    fn update_sets_patched_columns_from_the_json_record() {
        let builder = update_query(
            "instituicoes",
            Uuid::new_v4(),
            record(json!({ "sigla": null, "nome": "Prefeitura" })),
        )
        .unwrap();
        assert_eq!(
            builder.sql(),
            "UPDATE instituicoes AS t SET nome = r.nome, sigla = r.sigla \
             FROM jsonb_populate_record(NULL::instituicoes, $1) r \
             WHERE t.id = $2 RETURNING to_jsonb(t.*)"
        );
    }

    #[test]
    fn empty_patch_builds_no_update() {
        assert!(update_query("instituicoes", Uuid::new_v4(), Record::new()).is_none());
    }
}
