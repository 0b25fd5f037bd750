use anyhow::{Context, Result};
use chrono::Utc;

use crate::api::models::Attribution;
use crate::api::{FacadeClient, Fetched};
use crate::config::Config;
use crate::error::normalize_error;

use super::episode::{extract_air_times, truncate};
use super::plan::{PlanInputs, build_plan_request, effective_country};
use super::providers::flatten_providers;

/// Unwraps a fetch for printing. On failure the error body (if any) goes to
/// stderr and the normalized message becomes the command's error.
fn load<T>(what: &str, result: Result<Fetched<T>>) -> Result<T> {
    match result {
        Ok(fetched) => {
            tracing::debug!(what, http_status = fetched.http_status, "loaded");
            Ok(fetched.body)
        }
        Err(err) => {
            let normalized = normalize_error(&err);
            if let Some(body) = normalized.pretty_body() {
                eprintln!("{body}");
            }
            Err(anyhow::Error::new(normalized)).with_context(|| format!("loading {what} failed"))
        }
    }
}

fn print_footer(retrieved_at: &str, attribution: Option<&Attribution>) {
    println!("\nRetrieved {retrieved_at}");
    if let Some(attribution) = attribution {
        match attribution.url.as_deref() {
            Some(url) => println!("{} ({url})", attribution.text),
            None => println!("{}", attribution.text),
        }
    }
}

pub(super) fn run_genres(client: &FacadeClient, config: &Config) -> Result<()> {
    let envelope = load("genres", client.genres(&config.language))?;
    if envelope.data.genres.is_empty() {
        println!("No genres returned.");
        return Ok(());
    }

    println!("{:<10} {:<30}", "ID", "GENRE");
    for genre in &envelope.data.genres {
        println!("{:<10} {:<30}", genre.id, truncate(&genre.name, 30));
    }
    print_footer(&envelope.retrieved_at, envelope.attribution.as_ref());
    Ok(())
}

pub(super) fn run_titles(client: &FacadeClient, genre_id: u64, sort_by: &str, page: u32) -> Result<()> {
    let envelope = load("titles", client.titles_by_genre(genre_id, sort_by, page))?;
    if envelope.data.results.is_empty() {
        println!("No titles for genre {genre_id}.");
        return Ok(());
    }

    println!("{:<10} {:<48} {:<12}", "TMDB ID", "TITLE", "FIRST AIR");
    for item in &envelope.data.results {
        println!(
            "{:<10} {:<48} {:<12}",
            item.id,
            truncate(&item.display_name(), 48),
            item.first_air_date.as_deref().unwrap_or("-")
        );
    }
    print_footer(&envelope.retrieved_at, envelope.attribution.as_ref());
    Ok(())
}

pub(super) fn run_availability(client: &FacadeClient, config: &Config, tmdb_id: u64) -> Result<()> {
    let country = effective_country(&config.country);
    let response = load("availability", client.availability(tmdb_id, &country))?;
    if response.assessments.is_empty() {
        println!("No availability assessments for {tmdb_id} in {country}.");
        return Ok(());
    }

    println!(
        "{:<24} {:<12} {:<8} {:<8} {:<40}",
        "SERVICE", "CATEGORY", "NOW", "CONF", "REASONS"
    );
    for assessment in &response.assessments {
        println!(
            "{:<24} {:<12} {:<8} {:<8} {:<40}",
            truncate(&assessment.service_id, 24),
            assessment.provider_category.label(),
            assessment.availability_now.label(),
            assessment.confidence.label(),
            truncate(&assessment.reason_codes.join(","), 40)
        );
    }
    println!("\nRetrieved {}", response.retrieved_at);
    Ok(())
}

pub(super) fn run_providers(client: &FacadeClient, config: &Config, tmdb_id: u64) -> Result<()> {
    let country = effective_country(&config.country).to_uppercase();
    let envelope = load("providers", client.watch_providers(tmdb_id, &country))?;
    let Some(region) = envelope.data.result.as_ref() else {
        println!("No watch providers listed for {tmdb_id} in {country}.");
        return Ok(());
    };

    println!("{:<14} {:<12} {:<36}", "OFFER", "PROVIDER ID", "NAME");
    for item in flatten_providers(region) {
        println!(
            "{:<14} {:<12} {:<36}",
            item.bucket.label(),
            item.provider.provider_id,
            truncate(&item.provider.display_name(), 36)
        );
    }
    if let Some(link) = region.link.as_deref() {
        println!("\n{link}");
    }
    print_footer(&envelope.retrieved_at, envelope.attribution.as_ref());
    Ok(())
}

pub(super) fn run_episodes(
    client: &FacadeClient,
    title: &str,
    max_upcoming: usize,
    max_past: usize,
) -> Result<()> {
    let envelope = load("episodes", client.episodes_for_title(title))?;
    let times = extract_air_times(envelope.data.episodes(), max_upcoming, max_past, Utc::now());

    let show = envelope.data.name.as_deref().unwrap_or(title);
    println!("{show} (TVmaze {})", envelope.data.id);
    println!("  Next air: {}", times.next_label());
    println!("  Last air: {}", times.last_label());

    println!("\nUPCOMING");
    if times.upcoming.is_empty() {
        println!("  (none)");
    }
    for item in &times.upcoming {
        println!("  {:<26} {}", item.label, item.episode);
    }
    println!("\nRECENT");
    if times.past.is_empty() {
        println!("  (none)");
    }
    for item in &times.past {
        println!("  {:<26} {}", item.label, item.episode);
    }
    print_footer(&envelope.retrieved_at, envelope.attribution.as_ref());
    Ok(())
}

pub(super) fn run_plan(client: &FacadeClient, config: &Config, tmdb_id: u64) -> Result<()> {
    let country = effective_country(&config.country);
    let availability = load("availability", client.availability(tmdb_id, &country))?;

    let inputs = PlanInputs {
        country: config.country.clone(),
        horizon_days: config.horizon_days.clone(),
        permanent_service_ids: config.permanent_service_ids.clone(),
    };
    let request = build_plan_request(&inputs, &availability.assessments);
    tracing::info!(
        country = %request.country,
        horizon_days = request.horizon_days,
        assessments = request.assessments.len(),
        "generating plan"
    );
    let plan = load("plan", client.generate_plan(&request))?;

    println!(
        "Plan for {} over {} days (generated {})",
        plan.country, plan.horizon_days, plan.generated_at
    );
    if plan.events.is_empty() {
        println!("No subscription changes.");
    } else {
        println!(
            "\n{:<26} {:<12} {:<24} {:<30}",
            "EFFECTIVE", "ACTION", "SERVICE", "REASONS"
        );
        for event in &plan.events {
            println!(
                "{:<26} {:<12} {:<24} {:<30}",
                truncate(&event.effective_at, 26),
                event.action.label(),
                truncate(&event.service_id, 24),
                truncate(&event.reason_codes.join(","), 30)
            );
        }
    }

    let questions = plan.questions();
    if !questions.is_empty() {
        println!("\nQUESTIONS");
        for question in questions {
            let marker = if question.required { "*" } else { " " };
            println!("  {marker} {} ({})", question.prompt, question.key);
        }
    }
    Ok(())
}
