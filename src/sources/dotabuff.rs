use super::MatchupSource;
use crate::analysis::matchup::MatchupRecord;
use crate::api::client::StatsApiClient;
use crate::cache::{partitions, Store};
use crate::error::{AppError, Result};
use crate::heroes;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;
use tracing::warn;

pub const SOURCE_TAG: &str = "dotabuff";

pub struct DotabuffSource<'a> {
    client: &'a StatsApiClient,
    store: &'a Store,
}

impl<'a> DotabuffSource<'a> {
    pub fn new(client: &'a StatsApiClient, store: &'a Store) -> Self {
        DotabuffSource { client, store }
    }
}

impl MatchupSource for DotabuffSource<'_> {
    fn tag(&self) -> &'static str {
        SOURCE_TAG
    }

    fn counters(&self, hero: &str, ds: &str) -> Result<Vec<MatchupRecord>> {
        let slug = heroes::slug(hero);
        let partition = partitions::source_table(SOURCE_TAG, ds, &slug);

        self.store.cached_derived(&partition, || {
            let page = self.store.cached_text(
                &partitions::dotabuff_raw(ds, &slug),
                "html",
                ds,
                || {
                    warn!(hero, "downloading Dotabuff counters page");
                    self.client.get_dotabuff_counters_page(&slug)
                },
            )?;
            parse_counters_page(hero, &page)
        })
    }
}

pub(super) fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| AppError::ParseError(format!("bad selector {}: {:?}", css, e)))
}

fn data_value<T: FromStr>(cell: &ElementRef, row: usize, column: &str) -> Result<T> {
    cell.value()
        .attr("data-value")
        .and_then(|raw| raw.trim().parse().ok())
        .ok_or_else(|| {
            AppError::ParseError(format!("counters row {}: unreadable {} cell", row, column))
        })
}

/// Parses the single sortable counters table: icon, hero link, disadvantage,
/// win rate and match count, the numbers taken from `data-value`.
pub fn parse_counters_page(hero: &str, html: &str) -> Result<Vec<MatchupRecord>> {
    let document = Html::parse_document(html);
    let table_selector = selector("table.sortable")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;
    let link_selector = selector("a")?;

    let tables: Vec<ElementRef> = document.select(&table_selector).collect();
    if tables.len() != 1 {
        return Err(AppError::ParseError(format!(
            "expected one counters table for {}, found {}",
            hero,
            tables.len()
        )));
    }

    let mut records = Vec::new();
    for (idx, row) in tables[0].select(&row_selector).enumerate() {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.is_empty() {
            continue; // header
        }
        if cells.len() != 5 {
            return Err(AppError::ParseError(format!(
                "counters row {}: expected 5 cells, found {}",
                idx,
                cells.len()
            )));
        }

        let counter_hero = cells[1]
            .select(&link_selector)
            .next()
            .map(|a| a.text().collect::<String>().trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::ParseError(format!("counters row {}: no hero link", idx)))?;

        records.push(MatchupRecord::new(
            hero,
            counter_hero,
            data_value(&cells[2], idx, "disadvantage")?,
            data_value(&cells[3], idx, "win rate")?,
            data_value(&cells[4], idx, "matches")?,
            SOURCE_TAG,
        ));
    }

    Ok(records)
}
