//! Seed-table discovery.
//!
//! Reads the make selector on the catalog home page, then asks the taxonomy
//! API for each make's models. The result is the CSV consumed by
//! `crawl --seed-file`.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::{collapse_whitespace, parse_selector_unsafe};

static MAKE_OPTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("select#make option", "MAKE_OPTION_SELECTOR"));

/// Concurrent model lookups.
const MODEL_LOOKUP_CONCURRENCY: usize = 8;

/// One make as listed in the home-page selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Make {
    pub name: String,
    pub id: String,
}

/// One row of the seed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeModel {
    pub make_name: String,
    pub make_id: String,
    pub model: String,
}

/// Makes from the `select#make` options. Options without a value or text
/// (placeholders) are skipped.
pub fn parse_makes(document: &Html) -> Vec<Make> {
    document
        .select(&MAKE_OPTION_SELECTOR)
        .filter_map(|option| {
            let id = option.value().attr("value")?.trim().to_string();
            let name = collapse_whitespace(&option.text().collect::<String>());
            if id.is_empty() || name.is_empty() {
                None
            } else {
                Some(Make { name, id })
            }
        })
        .collect()
}

/// Model names from a taxonomy response (`models.model.values[].name`).
pub fn parse_models(body: &Value) -> Vec<String> {
    body.pointer("/models/model/values")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn models_url(base_url: &str, make_id: &str) -> String {
    format!(
        "{}/as24-home/api/taxonomy/cars/makes/{}/models",
        base_url.trim_end_matches('/'),
        make_id
    )
}

async fn fetch_models(client: &reqwest::Client, base_url: &str, make: &Make) -> Result<Vec<String>> {
    let body: Value = client
        .get(models_url(base_url, &make.id))
        .send()
        .await
        .context("Failed to send taxonomy request")?
        .error_for_status()
        .context("Taxonomy endpoint returned an error status")?
        .json()
        .await
        .context("Failed to decode taxonomy response")?;
    Ok(parse_models(&body))
}

/// Builds the full make/model table.
///
/// A make whose model lookup fails is logged and left out; the home page
/// itself must load.
pub async fn discover(client: Arc<reqwest::Client>, base_url: &str) -> Result<Vec<MakeModel>> {
    let home = format!("{}/", base_url.trim_end_matches('/'));
    let html = client
        .get(&home)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", home))?
        .error_for_status()?
        .text()
        .await?;
    let makes = parse_makes(&Html::parse_document(&html));
    log::info!("Found {} makes", makes.len());

    let mut lookups = FuturesUnordered::new();
    let mut pending = makes.iter();
    let mut rows = Vec::new();

    loop {
        while lookups.len() < MODEL_LOOKUP_CONCURRENCY {
            let Some(make) = pending.next() else { break };
            let client = Arc::clone(&client);
            lookups.push(async move {
                let models = fetch_models(&client, base_url, make).await;
                (make, models)
            });
        }

        let Some((make, models)) = lookups.next().await else {
            break;
        };
        match models {
            Ok(models) => {
                log::debug!("{}: {} models", make.name, models.len());
                rows.extend(models.into_iter().map(|model| MakeModel {
                    make_name: make.name.clone(),
                    make_id: make.id.clone(),
                    model,
                }));
            }
            Err(e) => log::warn!("Skipping make {} ({}): {:#}", make.name, make.id, e),
        }
    }

    // Completion order is arbitrary
    rows.sort_by(|a, b| (&a.make_name, &a.model).cmp(&(&b.make_name, &b.model)));
    Ok(rows)
}

/// Writes the seed table with a `make_name,make_id,model` header.
pub fn write_seed_table(path: &Path, rows: &[MakeModel]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    if rows.is_empty() {
        writer.write_record(["make_name", "make_id", "model"])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_makes_skips_placeholder() {
        let html = Html::parse_document(
            r#"<select id="make">
                <option value="">Any make</option>
                <option value="9">Audi</option>
                <option value="13"> BMW </option>
            </select>
            <select id="other"><option value="1">Nope</option></select>"#,
        );
        assert_eq!(
            parse_makes(&html),
            vec![
                Make { name: "Audi".into(), id: "9".into() },
                Make { name: "BMW".into(), id: "13".into() },
            ]
        );
    }

    #[test]
    fn test_parse_models() {
        let body = json!({"models": {"model": {"values": [
            {"id": 1, "name": "A3"},
            {"id": 2, "name": "A4"},
            {"id": 3}
        ]}}});
        assert_eq!(parse_models(&body), vec!["A3", "A4"]);
        assert!(parse_models(&json!({"models": null})).is_empty());
    }

    #[test]
    fn test_models_url() {
        assert_eq!(
            models_url("https://x.test/", "9"),
            "https://x.test/as24-home/api/taxonomy/cars/makes/9/models"
        );
    }

    #[test]
    fn test_seed_table_round_trips_through_seed_loader() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("makes_and_models.csv");
        write_seed_table(
            &path,
            &[MakeModel {
                make_name: "Alfa Romeo".into(),
                make_id: "6".into(),
                model: "Giulia".into(),
            }],
        )
        .expect("write");

        let seeds = crate::seed::load_seed_file(&path, "").expect("seeds");
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].make, "alfa-romeo");
        assert_eq!(seeds[0].model, "giulia");
    }
}
