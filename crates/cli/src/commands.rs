//! Subcommand handlers. Each one drives a single use case and prints the result.

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use serde::Serialize;
use tracing::{info, warn};

use tvmaniak_core::store::run_blocking;
use tvmaniak_core::{
    AddToWatchlist, GetTvShowDetailsWithCast, GetTvShows, GetWatchlist, RemoveFromWatchlist,
    SearchTvShows, ShowSummary, StorageError,
};

use crate::App;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_shows(app: &App, shows: &[ShowSummary], with_score: bool) -> Result<()> {
    if app.json {
        return print_json(&shows);
    }
    if shows.is_empty() {
        println!("No shows.");
        return Ok(());
    }
    for show in shows {
        let marker = if show.is_in_watchlist { "*" } else { " " };
        let rating = show
            .rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "-".to_string());
        if with_score {
            println!(
                "{} {:>7}  {:<40} {:>4}  score {:.0}",
                marker, show.id, show.name, rating, show.score
            );
        } else {
            println!("{} {:>7}  {:<40} {:>4}", marker, show.id, show.name, rating);
        }
    }
    Ok(())
}

pub async fn list(app: &App, limit: usize, offset: usize) -> Result<()> {
    let mut pager = GetTvShows::new(app.repository.clone()).execute();

    let mut result = pager.start().await;
    if let Err(e) = &result {
        warn!("Catalog sync failed, showing cached shows: {}", e);
    }

    let wanted = offset + limit;
    while matches!(&result, Ok(success) if !success.end_of_pagination_reached)
        && pager.offset() as usize + pager.items().len() < wanted
    {
        result = pager.append().await;
        if let Err(e) = &result {
            warn!("Could not load more shows: {}", e);
        }
    }

    let skip = offset.saturating_sub(pager.offset() as usize);
    let shows: Vec<ShowSummary> = pager.items().iter().skip(skip).take(limit).cloned().collect();
    print_shows(app, &shows, false)
}

pub async fn refresh(app: &App) -> Result<()> {
    if app.store.is_none() {
        bail!("Local cache is unavailable, nothing to refresh");
    }

    let mut pager = GetTvShows::new(app.repository.clone()).execute();
    pager.refresh().await.context("Refresh failed")?;
    info!("Refreshed catalog: {} shows cached", pager.items().len());

    if !app.json {
        println!("Cached {} shows.", pager.items().len());
    }
    Ok(())
}

pub async fn show(app: &App, id: u32) -> Result<()> {
    let result = GetTvShowDetailsWithCast::new(app.repository.clone())
        .execute(id)
        .await
        .with_context(|| format!("Show {} is unavailable", id))?;

    if app.json {
        return print_json(&result);
    }

    let details = &result.details;
    println!("{} (#{})", details.name, details.id);
    if details.is_in_watchlist {
        println!("In watchlist");
    }
    println!("Type:     {}", details.show_type);
    println!("Language: {}", details.language);
    println!("Status:   {}", details.status);
    println!("Genres:   {}", details.genres.join(", "));
    if let Some(rating) = details.rating {
        println!("Rating:   {:.1}", rating);
    }
    println!();
    println!("{}", details.summary);
    if !result.cast.is_empty() {
        println!();
        println!("Cast:");
        for member in &result.cast {
            println!("  {}", member.name);
        }
    }
    Ok(())
}

pub async fn search(app: &App, query: &str) -> Result<()> {
    let results = SearchTvShows::new(app.repository.clone())
        .execute(query)
        .await;
    print_shows(app, &results, true)
}

pub async fn watchlist_add(app: &App, id: u32) -> Result<()> {
    AddToWatchlist::new(app.repository.clone())
        .execute(id)
        .await
        .with_context(|| format!("Could not add show {} to the watchlist", id))?;
    info!("Added show {} to the watchlist", id);
    Ok(())
}

pub async fn watchlist_remove(app: &App, id: u32) -> Result<()> {
    RemoveFromWatchlist::new(app.repository.clone())
        .execute(id)
        .await
        .with_context(|| format!("Could not remove show {} from the watchlist", id))?;
    info!("Removed show {} from the watchlist", id);
    Ok(())
}

pub async fn watchlist_list(app: &App, follow: bool) -> Result<()> {
    let usecase = GetWatchlist::new(app.repository.clone());

    if !follow {
        let shows = usecase.execute().await;
        return print_shows(app, &shows, false);
    }

    let mut updates = usecase.watch();
    loop {
        tokio::select! {
            next = updates.next() => match next {
                Some(shows) => print_shows(app, &shows, false)?,
                None => return Ok(()),
            },
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

pub async fn stats(app: &App) -> Result<()> {
    let store = app.store.clone().ok_or(StorageError::Unavailable)?;
    let stats = run_blocking(store, |store| store.stats()).await?;

    if app.json {
        return print_json(&stats);
    }

    println!("Cached shows:      {}", stats.total_shows);
    println!("Paged shows:       {}", stats.paged_shows);
    println!("Remote keys:       {}", stats.remote_keys);
    println!("Watchlist entries: {}", stats.watchlist_entries);
    match stats.last_refresh {
        Some(at) => println!("Last refresh:      {}", at.to_rfc3339()),
        None => println!("Last refresh:      never"),
    }
    Ok(())
}

pub fn print_config(app: &App) -> Result<()> {
    if app.json {
        return print_json(&app.config);
    }
    print!("{}", toml::to_string_pretty(&app.config)?);
    Ok(())
}

pub async fn clear(app: &App) -> Result<()> {
    let store = app.store.clone().ok_or(StorageError::Unavailable)?;
    run_blocking(store, |store| store.clear()).await?;
    info!("Cleared local cache");
    Ok(())
}
