use anyhow::{anyhow, Result};
use cadence_core::error::CoreError;
use cadence_core::repository::Repository;
use uuid::Uuid;

const MIN_SHORT_ID_LEN: usize = 2;

fn check_short_id(short_id: &str) -> Result<()> {
    if short_id.len() < MIN_SHORT_ID_LEN {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    Ok(())
}

fn pick_one(kind: &str, short_id: &str, matches: Vec<(Uuid, String)>) -> Result<Uuid> {
    match matches.as_slice() {
        [(id, _)] => Ok(*id),
        [] => Err(anyhow!(CoreError::NotFound(format!(
            "No {} found with ID prefix '{}'",
            kind, short_id
        )))),
        _ => Err(anyhow!(CoreError::AmbiguousId(
            matches
                .into_iter()
                .map(|(id, title)| (id.to_string(), title))
                .collect()
        ))),
    }
}

pub async fn resolve_series_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    check_short_id(short_id)?;
    let series = repo.find_series_by_short_id_prefix(short_id).await?;
    pick_one(
        "series",
        short_id,
        series.into_iter().map(|s| (s.id, s.title)).collect(),
    )
}

pub async fn resolve_occurrence_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    check_short_id(short_id)?;
    let occurrences = repo.find_occurrences_by_short_id_prefix(short_id).await?;
    pick_one(
        "occurrence",
        short_id,
        occurrences
            .into_iter()
            .map(|o| (o.id, format!("{} on {}", o.title, o.date)))
            .collect(),
    )
}
