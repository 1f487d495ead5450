use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::search::{self, ProjectSearch};

/// One stored attachment reference. The list on a project only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub web_view_link: String,
    pub downloadable_link: String,
}

/// Project record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
    pub cost: Option<String>,
    pub posting_date: Option<String>,
    pub dateline: Option<String>,
    pub summary: Option<String>,
    pub attachments: Json<Vec<Attachment>>,
    #[serde(rename = "assignedOn")]
    pub assigned_user_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

/// Fields accepted when inserting a project.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
    pub cost: Option<String>,
    pub posting_date: Option<String>,
    pub dateline: Option<String>,
    pub summary: Option<String>,
    #[serde(rename = "assignedOn")]
    pub assigned_user_id: Option<Uuid>,
}

pub async fn insert_one(db: &PgPool, new: &NewProject) -> anyhow::Result<Project> {
    let project = sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (name, description, country, cost, posting_date, dateline, summary, assigned_user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, name, description, country, cost, posting_date, dateline, summary,
                  attachments, assigned_user_id, created_at
        "#,
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.country)
    .bind(&new.cost)
    .bind(&new.posting_date)
    .bind(&new.dateline)
    .bind(&new.summary)
    .bind(new.assigned_user_id)
    .fetch_one(db)
    .await?;
    Ok(project)
}

/// Bulk insert, all-or-nothing.
pub async fn insert_many(db: &PgPool, projects: &[NewProject]) -> anyhow::Result<u64> {
    let mut tx = db.begin().await?;
    for p in projects {
        sqlx::query(
            r#"
            INSERT INTO projects (name, description, country, cost, posting_date, dateline, summary, assigned_user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&p.name)
        .bind(&p.description)
        .bind(&p.country)
        .bind(&p.cost)
        .bind(&p.posting_date)
        .bind(&p.dateline)
        .bind(&p.summary)
        .bind(p.assigned_user_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(projects.len() as u64)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Project>> {
    let project = sqlx::query_as::<_, Project>(
        r#"
        SELECT id, name, description, country, cost, posting_date, dateline, summary,
               attachments, assigned_user_id, created_at
        FROM projects
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(project)
}

/// List projects matching the search filters, newest first.
pub async fn list(db: &PgPool, params: &ProjectSearch) -> anyhow::Result<Vec<Project>> {
    let mut qb = QueryBuilder::new(
        "SELECT id, name, description, country, cost, posting_date, dateline, summary, \
         attachments, assigned_user_id, created_at FROM projects WHERE TRUE",
    );
    search::apply_project_filters(&mut qb, params);
    qb.push(" ORDER BY created_at DESC");
    let rows = qb.build_query_as::<Project>().fetch_all(db).await?;
    Ok(rows)
}

pub async fn list_by_assignee(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Project>> {
    let rows = sqlx::query_as::<_, Project>(
        r#"
        SELECT id, name, description, country, cost, posting_date, dateline, summary,
               attachments, assigned_user_id, created_at
        FROM projects
        WHERE assigned_user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Append one attachment entry. The `||` concat keeps existing entries, so
/// concurrent uploads both land.
pub async fn append_attachment(
    db: &PgPool,
    id: Uuid,
    attachment: &Attachment,
) -> anyhow::Result<bool> {
    let res = sqlx::query("UPDATE projects SET attachments = attachments || $2::jsonb WHERE id = $1")
        .bind(id)
        .bind(Json(attachment))
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Set the assignee. Single-valued, last writer wins.
pub async fn assign_user(db: &PgPool, project_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("UPDATE projects SET assigned_user_id = $2 WHERE id = $1")
        .bind(project_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_wire_shape_is_camel_case() {
        let att = Attachment {
            file_name: "plan.pdf".into(),
            web_view_link: "https://s.example/uploads/plan.pdf".into(),
            downloadable_link:
                "https://s.example/uploads/plan.pdf?response-content-disposition=attachment".into(),
        };
        let json = serde_json::to_value(&att).unwrap();
        assert_eq!(json["fileName"], "plan.pdf");
        assert!(json["webViewLink"].as_str().unwrap().contains("plan.pdf"));
        assert!(json["downloadableLink"]
            .as_str()
            .unwrap()
            .contains("attachment"));
    }

    #[test]
    fn project_serializes_assignee_as_assigned_on() {
        let id = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let project = Project {
            id,
            name: Some("Bridge".into()),
            description: None,
            country: None,
            cost: None,
            posting_date: Some("2024-05-01".into()),
            dateline: None,
            summary: None,
            attachments: Json(vec![]),
            assigned_user_id: Some(assignee),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["assignedOn"], assignee.to_string());
        assert!(json.get("assigned_user_id").is_none());
        assert!(json["attachments"].as_array().unwrap().is_empty());
    }

    #[test]
    fn new_project_accepts_assigned_on_key() {
        let body = serde_json::json!({
            "name": "Bridge",
            "posting_date": "2024-05-01",
            "assignedOn": Uuid::new_v4().to_string(),
        });
        let parsed: NewProject = serde_json::from_value(body).unwrap();
        assert!(parsed.assigned_user_id.is_some());
        assert_eq!(parsed.name.as_deref(), Some("Bridge"));
    }
}
