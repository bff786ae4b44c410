use super::dotabuff::selector;
use super::PlayerHistory;
use crate::analysis::player_stats::{PlayerHeroStats, PlayerStatsTracker};
use crate::api::client::StatsApiClient;
use crate::cache::{partitions, Store};
use crate::error::{AppError, Result};
use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};

// Upper bound on pages walked per player.
const MAX_MATCH_PAGES: u32 = 100;

/// One row of a player's Dotabuff match list.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedMatch {
    pub hero: String,
    /// Icon titles from the role cell: role first, then lane.
    pub roles: Vec<String>,
    /// `None` for results other than a win or a loss.
    pub won: Option<bool>,
    pub played_on: NaiveDate,
}

pub struct DotabuffHistory<'a> {
    client: &'a StatsApiClient,
    store: &'a Store,
}

impl<'a> DotabuffHistory<'a> {
    pub fn new(client: &'a StatsApiClient, store: &'a Store) -> Self {
        DotabuffHistory { client, store }
    }

    /// Walks match pages, newest first, until the last row on a page is
    /// older than `days` before `ds`.
    pub fn played_matches(&self, player_id: u64, days: u32, ds: &str) -> Result<Vec<PlayedMatch>> {
        let as_of = parse_ds(ds)?;
        let mut matches = Vec::new();

        for page in 1..=MAX_MATCH_PAGES {
            let html = self.store.cached_text(
                &partitions::player_match_page(ds, player_id, days, page),
                "html",
                ds,
                || {
                    warn!(player_id, page, "downloading Dotabuff match page");
                    self.client.get_dotabuff_match_page(player_id, page)
                },
            )?;

            let rows = parse_match_page(&html)?;
            let Some(oldest) = rows.last().map(|m| m.played_on) else {
                break;
            };
            matches.extend(rows);
            if (as_of - oldest).num_days() > days as i64 {
                break;
            }
        }

        info!(player_id, matches = matches.len(), "finished reading match pages");
        Ok(matches)
    }
}

impl PlayerHistory for DotabuffHistory<'_> {
    fn hero_stats(&self, player_id: u64, days: u32, ds: &str) -> Result<Vec<PlayerHeroStats>> {
        self.store
            .cached_derived(&partitions::player_stats(ds, player_id, days), || {
                let matches = self.played_matches(player_id, days, ds)?;
                Ok(hero_stats_from_matches(&matches, parse_ds(ds)?, days))
            })
    }
}

fn parse_ds(ds: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(ds, "%Y-%m-%d")
        .map_err(|e| AppError::ParseError(format!("bad partition date {}: {}", ds, e)))
}

/// Per hero, role and lane totals for matches played within `days` of `as_of`.
pub fn hero_stats_from_matches(
    matches: &[PlayedMatch],
    as_of: NaiveDate,
    days: u32,
) -> Vec<PlayerHeroStats> {
    let mut tracker = PlayerStatsTracker::new();

    for m in matches
        .iter()
        .filter(|m| (as_of - m.played_on).num_days() <= days as i64)
    {
        let [role, lane, ..] = m.roles.as_slice() else {
            debug!(hero = %m.hero, played_on = %m.played_on, "skipping match without role and lane");
            continue;
        };
        let Some(won) = m.won else {
            debug!(hero = %m.hero, played_on = %m.played_on, "skipping match without a result");
            continue;
        };
        tracker.add_match(&m.hero, role, lane, won);
    }

    debug!(matches = tracker.total_matches(), "counted matches in window");
    tracker.get_stats()
}

fn played_on(cell: &ElementRef, time: &ElementRef, row: usize) -> Result<NaiveDate> {
    let raw = time
        .value()
        .attr("datetime")
        .and_then(|dt| dt.get(..10))
        .map(str::to_string)
        .unwrap_or_else(|| time.text().collect::<String>().trim().to_string());

    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
        AppError::ParseError(format!(
            "match row {}: unreadable date `{}` in `{}`",
            row,
            raw,
            cell.text().collect::<String>().trim()
        ))
    })
}

/// Parses one page of a player's match list. Each body row has eight cells:
/// hero icon, hero link, role icons, result with date, type, duration, KDA
/// and items. A page with no table has no more matches.
pub fn parse_match_page(html: &str) -> Result<Vec<PlayedMatch>> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;
    let link_selector = selector("a")?;
    let icon_selector = selector("i")?;
    let time_selector = selector("time")?;

    let tables: Vec<ElementRef> = document.select(&table_selector).collect();
    match tables.len() {
        0 => {
            debug!("match page has no table");
            return Ok(Vec::new());
        }
        1 => {}
        n => {
            return Err(AppError::ParseError(format!(
                "expected one match table, found {}",
                n
            )))
        }
    }

    let mut matches = Vec::new();
    for (idx, row) in tables[0].select(&row_selector).enumerate() {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.is_empty() {
            continue;
        }
        if cells.len() != 8 {
            return Err(AppError::ParseError(format!(
                "match row {}: expected 8 cells, found {}",
                idx,
                cells.len()
            )));
        }

        let hero = cells[1]
            .select(&link_selector)
            .next()
            .map(|a| a.text().collect::<String>().trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::ParseError(format!("match row {}: no hero link", idx)))?;

        let roles = cells[2]
            .select(&icon_selector)
            .filter_map(|icon| icon.value().attr("title"))
            .map(|title| title.trim().to_string())
            .collect();

        let result = &cells[3];
        let won = match result
            .select(&link_selector)
            .next()
            .map(|a| a.text().collect::<String>())
            .as_deref()
            .map(str::trim)
        {
            Some("Won Match") => Some(true),
            Some("Lost Match") => Some(false),
            _ => None,
        };

        let time = result
            .select(&time_selector)
            .next()
            .ok_or_else(|| AppError::ParseError(format!("match row {}: no date", idx)))?;

        matches.push(PlayedMatch {
            hero,
            roles,
            won,
            played_on: played_on(result, &time, idx)?,
        });
    }

    Ok(matches)
}
