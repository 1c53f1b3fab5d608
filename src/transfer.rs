//! CSV import and export of the trivia dataset, one file per table.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::queries::categories::{get_all_categories, import_categories};
use crate::db::queries::questions::{get_all_questions, import_questions};
use crate::db::{Category, Question};

pub const CATEGORIES_FILE: &str = "categories.csv";
pub const QUESTIONS_FILE: &str = "questions.csv";

fn write_to(path: &Path, data: Vec<impl Serialize>) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut rdr =
        csv::Reader::from_path(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record.with_context(|| format!("Malformed row in {}", path.display()))?;
        out.push(record);
    }
    Ok(out)
}

pub async fn export_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    let categories = get_all_categories(&mut tx).await?;
    let questions = get_all_questions(&mut tx).await?;
    tx.commit().await?;

    if !dir.exists() {
        std::fs::create_dir_all(dir)?
    }
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Exporting to {}",
        dir.display()
    );
    write_to(&dir.join(CATEGORIES_FILE), categories)?;
    write_to(&dir.join(QUESTIONS_FILE), questions)?;
    Ok(())
}

/// Upserts both files in one transaction, categories first so question references resolve.
pub async fn import_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(&dir.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(&dir.join(QUESTIONS_FILE))?;
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Importing from {}",
        dir.display()
    );

    let mut tx = pool.begin().await?;
    import_categories(&mut tx, categories)
        .await
        .context("Cannot import categories")?;
    import_questions(&mut tx, questions)
        .await
        .context("Cannot import questions")?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use std::fs;

    #[tokio::test]
    async fn exported_data_imports_into_an_edited_database() {
        let source = test_pool().await;
        let dir = tempfile::tempdir().unwrap();
        export_data(&source, dir.path()).await.unwrap();

        let categories = fs::read_to_string(dir.path().join(CATEGORIES_FILE)).unwrap();
        assert!(categories.starts_with("id,type\n1,Science\n"));

        let target = test_pool().await;
        sqlx::query("UPDATE questions SET answer = 'Kidney' WHERE id = 20")
            .execute(&target)
            .await
            .unwrap();
        import_data(&target, dir.path()).await.unwrap();

        let mut conn = target.acquire().await.unwrap();
        let questions = get_all_questions(&mut conn).await.unwrap();
        assert_eq!(questions.len(), 19);
        assert_eq!(
            questions.iter().find(|q| q.id == 20).map(|q| q.answer.as_str()),
            Some("The Liver")
        );
    }

    #[tokio::test]
    async fn broken_reference_rolls_back_the_import() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CATEGORIES_FILE), "id,type\n7,Music\n").unwrap();
        fs::write(
            dir.path().join(QUESTIONS_FILE),
            "id,question,answer,category,difficulty\n30,Who wrote Clair de Lune?,Debussy,99,3\n",
        )
        .unwrap();

        let pool = test_pool().await;
        assert!(import_data(&pool, dir.path()).await.is_err());

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(get_all_categories(&mut conn).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn missing_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_pool().await;
        assert!(import_data(&pool, dir.path()).await.is_err());
    }
}
