use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use travelbuddy_core::api::{CountriesClient, GalleryClient};
use travelbuddy_core::config::Config;
use travelbuddy_core::credentials::CredentialStore;
use travelbuddy_core::models::{
    BudgetTier, DerivedStatus, DestinationFilters, NewExpense, ProfileUpdate, Trip, TripDraft,
};
use travelbuddy_core::service::{ContactForm, TripQuery, TripSort};
use travelbuddy_core::utils::{format_currency, format_date, format_relative_date, truncate_text};
use travelbuddy_core::{Clock, TravelBuddy};

const DESCRIPTION_WIDTH: usize = 60;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))
}

fn trip_dates(trip: &Trip) -> String {
    match (trip.start_date, trip.end_date) {
        (Some(start), Some(end)) => format!("{} - {}", format_date(start), format_date(end)),
        (Some(start), None) => format!("from {}", format_date(start)),
        _ => "dates not set".to_string(),
    }
}

/// The profile's preferred currency, USD when no profile is stored.
fn currency(core: &TravelBuddy) -> String {
    core.get_user_profile()
        .map(|p| p.preferences.currency)
        .unwrap_or_else(|| "USD".to_string())
}

// ===== Catalog =====

pub(crate) async fn destinations(
    core: &TravelBuddy,
    search: &str,
    continent: Option<String>,
    budget: Option<String>,
    destination_type: Option<String>,
    json: bool,
) -> Result<()> {
    let budget = budget
        .map(|b| b.parse::<BudgetTier>())
        .transpose()
        .map_err(anyhow::Error::msg)?;
    let filters = DestinationFilters {
        continent,
        budget,
        destination_type,
    };
    let results = core.search_destinations(search, &filters).await;

    if json {
        return print_json(&results);
    }
    if results.is_empty() {
        println!("No destinations found.");
        return Ok(());
    }
    let favorites = core.favorites();
    for d in &results {
        let star = if favorites.contains(&d.id) { "*" } else { " " };
        println!(
            "{star}{:>4}  {:<28} {:<14} {:<10} {}",
            d.id,
            d.display_name(),
            d.continent,
            d.budget,
            d.rating_display()
        );
    }
    if let Some(age) = core.destinations_age().await {
        println!("\nCatalog cached {age}");
    }
    Ok(())
}

pub(crate) async fn destination(
    core: &TravelBuddy,
    id: &str,
    country_info: bool,
    json: bool,
) -> Result<()> {
    let Some(d) = core.get_destination(id).await else {
        bail!("No destination with id {id}");
    };
    let info = if country_info {
        CountriesClient::new()?.lookup(&d.country).await
    } else {
        None
    };

    if json {
        return print_json(&serde_json::json!({ "destination": d, "country": info }));
    }

    println!("{} ({})", d.display_name(), d.continent);
    println!("  Rating:     {}", d.rating_display());
    println!("  Budget:     {}", d.budget);
    println!("  Avg cost:   {}", format_currency(d.average_cost, &currency(core)));
    if !d.best_time.is_empty() {
        println!("  Best time:  {}", d.best_time);
    }
    if !d.types.is_empty() {
        println!("  Types:      {}", d.types.join(", "));
    }
    if !d.description.is_empty() {
        println!("\n{}", d.description);
    }
    if !d.attractions.is_empty() {
        println!("\nAttractions:");
        for a in &d.attractions {
            println!("  - {a}");
        }
    }
    if let Some(info) = info {
        println!("\n{} ({})", info.name, info.region);
        if let Some(capital) = info.capital {
            println!("  Capital:    {capital}");
        }
        if let Some(population) = info.population {
            println!("  Population: {population}");
        }
        if !info.currencies.is_empty() {
            println!("  Currencies: {}", info.currencies.join(", "));
        }
        if !info.languages.is_empty() {
            println!("  Languages:  {}", info.languages.join(", "));
        }
    }
    Ok(())
}

pub(crate) async fn activities(
    core: &TravelBuddy,
    activity_type: Option<&str>,
    json: bool,
) -> Result<()> {
    let activities = match activity_type {
        Some(t) => core.get_activities_by_type(t).await,
        None => core.get_activities().await,
    };
    if json {
        return print_json(&activities);
    }
    let code = currency(core);
    for a in &activities {
        println!(
            "{:>4}  {:<28} {:<14} {:<10} {}",
            a.id,
            a.name,
            a.activity_type,
            a.duration,
            format_currency(a.cost, &code)
        );
    }
    Ok(())
}

pub(crate) async fn refresh(core: &TravelBuddy) -> Result<()> {
    core.refresh_destinations().await;
    let count = core.get_destinations().await.len();
    if core.destinations_age().await.is_some() {
        println!("Loaded {count} destinations.");
    } else {
        println!("Catalog unreachable, showing {count} bundled destinations.");
    }
    Ok(())
}

// ===== Trips =====

pub(crate) fn trips(
    core: &TravelBuddy,
    status: &str,
    search: String,
    sort: &str,
    json: bool,
) -> Result<()> {
    let status = match status.trim() {
        "" | "all" => None,
        s => Some(s.parse::<DerivedStatus>().map_err(anyhow::Error::msg)?),
    };
    let sort: TripSort = sort.parse().map_err(anyhow::Error::msg)?;
    let query = TripQuery {
        status,
        search,
        sort,
    };
    let trips = core.list_trips(&query);

    if json {
        return print_json(&trips);
    }

    let counts = core.status_counts();
    println!(
        "All {} | Upcoming {} | Ongoing {} | Completed {} | Draft {}\n",
        counts.all, counts.upcoming, counts.ongoing, counts.completed, counts.draft
    );
    if trips.is_empty() {
        println!("No trips found.");
        return Ok(());
    }
    let now = core.clock().now();
    for t in &trips {
        println!(
            "{:>14}  {:<24} {:<20} {:<10} {}",
            t.id,
            truncate_text(&t.name, 24),
            truncate_text(&t.destination, 20),
            t.derived_status(now),
            trip_dates(t)
        );
    }
    Ok(())
}

pub(crate) fn trip(core: &TravelBuddy, id: &str, json: bool) -> Result<()> {
    let Some(t) = core.get_trip(id) else {
        bail!("No trip with id {id}");
    };
    if json {
        return print_json(&t);
    }

    let today = core.today();
    println!("{} [{}]", t.name, t.derived_status(core.clock().now()));
    println!("  Destination: {}", t.destination);
    println!("  Dates:       {}", trip_dates(&t));
    if let Some(start) = t.start_date {
        println!("  Starts:      {}", format_relative_date(start, today));
    }
    println!("  Travelers:   {}", t.travelers);
    if let Some(budget) = t.budget {
        println!("  Budget:      {}", format_currency(budget, &currency(core)));
    }
    for day in &t.days {
        println!("\nDay {}", day.day_number);
        if day.activities.is_empty() {
            println!("  (no activities)");
        }
        for a in &day.activities {
            let time = a.time.as_deref().unwrap_or("--:--");
            match a.description.as_deref() {
                Some(desc) => println!(
                    "  {time}  {} - {}",
                    a.name,
                    truncate_text(desc, DESCRIPTION_WIDTH)
                ),
                None => println!("  {time}  {}", a.name),
            }
        }
    }
    Ok(())
}

pub(crate) struct PlanArgs {
    pub name: String,
    pub destination: String,
    pub start: String,
    pub end: String,
    pub travelers: u32,
    pub budget: Option<f64>,
    pub suggest: bool,
}

pub(crate) async fn plan(core: &TravelBuddy, args: PlanArgs, json: bool) -> Result<()> {
    let mut draft = TripDraft::new(args.name)
        .destination(args.destination)
        .dates(parse_date(&args.start)?, parse_date(&args.end)?)
        .travelers(args.travelers);
    draft.budget = args.budget;

    let id = core.plan_trip(draft.clone())?;
    let Some(mut trip) = core.get_trip(id) else {
        bail!("Trip {id} was not saved");
    };

    trip.sync_days_to_dates();
    if args.suggest {
        let suggestions = core.get_ai_suggestions(&draft).await;
        for activity in &suggestions.activities {
            trip.apply_suggestion(activity);
        }
    }
    core.save_trip(TripDraft::default().with_id(id).days(trip.days));

    if json {
        return print_json(&core.get_trip(id));
    }
    println!("Planned trip {id}.");
    Ok(())
}

pub(crate) fn delete_trip(core: &TravelBuddy, id: &str) -> Result<()> {
    if core.delete_trip(id) {
        println!("Deleted trip {id}.");
    } else {
        println!("No trip with id {id}.");
    }
    Ok(())
}

pub(crate) fn duplicate_trip(core: &TravelBuddy, id: &str) -> Result<()> {
    let Some(copy) = core.duplicate_trip(id) else {
        bail!("No trip with id {id}");
    };
    println!("Copied trip {id} to draft {copy}.");
    Ok(())
}

pub(crate) fn export(core: &TravelBuddy, id: Option<&str>) -> Result<()> {
    let out = match id {
        Some(id) => core
            .export_trip(id)
            .with_context(|| format!("No trip with id {id}"))?,
        None => core.export_trips(),
    };
    println!("{out}");
    Ok(())
}

pub(crate) fn import(core: &TravelBuddy, file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let id = core.import_trip(&contents)?;
    println!("Imported as draft {id}.");
    Ok(())
}

// ===== Budgets =====

pub(crate) fn budget(core: &TravelBuddy, trip: &str, json: bool) -> Result<()> {
    let mut session = core.budget_session();
    if !session.select_trip(trip) {
        bail!("Invalid trip id '{trip}'");
    }
    if json {
        return print_json(&session.summary());
    }

    let budget = session.budget();
    let code = currency(core);
    println!(
        "Budget {}  Spent {}  Remaining {}  ({:.0}%)\n",
        format_currency(budget.total_budget(), &code),
        format_currency(budget.total_spent(), &code),
        format_currency(budget.remaining(), &code),
        budget.percent_used()
    );
    for c in &budget.categories {
        let flag = if c.is_over_budget() { " over budget" } else { "" };
        println!(
            "  {:<20} {:>12} of {:>12}{flag}",
            c.name,
            format_currency(c.spent, &code),
            format_currency(c.budget, &code)
        );
    }
    if !budget.expenses.is_empty() {
        println!("\nExpenses:");
        for e in &budget.expenses {
            println!(
                "  {}  {:<28} {:<18} {:>12}",
                e.date,
                truncate_text(&e.description, 28),
                e.category,
                format_currency(e.amount, &code)
            );
        }
    }
    Ok(())
}

pub(crate) fn add_expense(
    core: &TravelBuddy,
    trip: &str,
    description: String,
    amount: f64,
    category: String,
    date: Option<String>,
) -> Result<()> {
    let date = date.as_deref().map(parse_date).transpose()?;
    let mut session = core.budget_session();
    if !session.select_trip(trip) {
        bail!("Invalid trip id '{trip}'");
    }
    let expense = session.add_expense(NewExpense {
        description,
        amount,
        category,
        date,
    })?;
    println!(
        "Added {} to {}.",
        format_currency(expense.amount, &currency(core)),
        expense.category
    );
    Ok(())
}

// ===== Profile =====

pub(crate) fn stats(core: &TravelBuddy, json: bool) -> Result<()> {
    let stats = core.get_trip_statistics();
    if json {
        return print_json(&stats);
    }
    println!("Trips:             {}", stats.total_trips);
    println!("Upcoming:          {}", stats.upcoming_trips);
    println!("Completed:         {}", stats.completed_trips);
    println!("Countries visited: {}", stats.countries_visited);
    println!(
        "Total spent:       {}",
        format_currency(stats.total_spent, &currency(core))
    );
    Ok(())
}

pub(crate) fn profile(core: &TravelBuddy, json: bool) -> Result<()> {
    let profile = core.get_user_profile().unwrap_or_default();
    if json {
        return print_json(&profile);
    }
    println!("{} ({})", profile.name, profile.initials());
    println!("  Email:    {}", profile.email);
    if let Some(phone) = &profile.phone {
        println!("  Phone:    {phone}");
    }
    if let Some(location) = &profile.location {
        println!("  Location: {location}");
    }
    println!(
        "  Prefers:  {} / {} / {}",
        profile.preferences.currency, profile.preferences.language, profile.preferences.travel_style
    );
    if !profile.bio.is_empty() {
        println!("\n{}", profile.bio);
    }
    Ok(())
}

pub(crate) fn profile_set(
    core: &TravelBuddy,
    name: Option<String>,
    email: Option<String>,
    bio: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    currency: Option<String>,
) -> Result<()> {
    let preferences = currency.map(|code| {
        let mut prefs = core.get_user_profile().unwrap_or_default().preferences;
        prefs.currency = code.trim().to_uppercase();
        prefs
    });
    let profile = core.save_user_profile(ProfileUpdate {
        name,
        email,
        bio,
        phone,
        location,
        preferences,
        ..ProfileUpdate::default()
    })?;
    println!("Profile saved for {}.", profile.name);
    Ok(())
}

pub(crate) fn profile_export(core: &TravelBuddy) -> Result<()> {
    println!("{}", core.export_profile());
    Ok(())
}

pub(crate) fn profile_avatar(core: &TravelBuddy, file: &Path) -> Result<()> {
    let mime = match file
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    core.set_avatar(mime, &bytes)?;
    println!("Avatar updated.");
    Ok(())
}

pub(crate) fn profile_reset(core: &TravelBuddy) -> Result<()> {
    core.reset_user_profile();
    println!("Profile reset to defaults.");
    Ok(())
}

pub(crate) fn delete_account(core: &TravelBuddy, yes: bool) -> Result<()> {
    if !yes {
        bail!("This deletes every trip, budget and profile setting. Re-run with --yes to confirm.");
    }
    if !core.delete_account() {
        bail!("Some data could not be deleted");
    }
    println!("All data deleted.");
    Ok(())
}

pub(crate) fn achievements(core: &TravelBuddy, json: bool) -> Result<()> {
    let achievements = core.achievements();
    if json {
        return print_json(&achievements);
    }
    for a in &achievements {
        let mark = if a.unlocked { "x" } else { " " };
        println!(
            "[{mark}] {} {:<16} {:<36} {}/{} ({:.0}%)",
            a.icon,
            a.title,
            a.description,
            a.progress,
            a.target,
            a.percent()
        );
    }
    Ok(())
}

// ===== Extras =====

pub(crate) async fn suggest(core: &TravelBuddy, json: bool) -> Result<()> {
    let suggestions = core.get_ai_suggestions(&TripDraft::default()).await;
    if json {
        return print_json(&suggestions);
    }
    println!("Activities:");
    for a in &suggestions.activities {
        println!("  {}  {:<28} {}", a.time, a.name, a.description);
    }
    println!("\nRestaurants:");
    for v in &suggestions.restaurants {
        println!("  {:<28} {:<14} {:.1}  {}", v.name, v.venue_type, v.rating, v.price);
    }
    println!("\nAccommodations:");
    for v in &suggestions.accommodations {
        println!("  {:<28} {:<14} {:.1}  {}", v.name, v.venue_type, v.rating, v.price);
    }
    Ok(())
}

pub(crate) fn favorite(core: &TravelBuddy, id: &str) -> Result<()> {
    if core.toggle_favorite(id) {
        println!("Added destination {id} to favorites.");
    } else {
        println!("Destination {id} is not a favorite.");
    }
    Ok(())
}

pub(crate) async fn gallery(config: &Config, json: bool) -> Result<()> {
    let key = config
        .unsplash_access_key
        .clone()
        .or_else(CredentialStore::photo_key);
    let client = GalleryClient::new(key)?;
    let photos = client.photos().await;

    if json {
        return print_json(&photos);
    }
    for p in &photos {
        println!("{:<16} {:<40} by {}", p.location, truncate_text(&p.description, 40), p.photographer);
        println!("  {}", p.image_url);
    }
    if !client.has_key() {
        println!("\nShowing bundled photos. Run `travelbuddy set-photo-key` to use Unsplash.");
    }
    Ok(())
}

pub(crate) fn contact(
    core: &TravelBuddy,
    name: String,
    email: String,
    subject: String,
    message: String,
) -> Result<()> {
    core.submit_contact(ContactForm {
        name,
        email,
        subject,
        message,
    })?;
    println!("Thanks for your message! We'll get back to you soon.");
    Ok(())
}

pub(crate) fn set_photo_key(key: &str) -> Result<()> {
    CredentialStore::store_photo_key(key)?;
    println!("Access key stored in the system keychain.");
    Ok(())
}

pub(crate) fn clear_photo_key() -> Result<()> {
    CredentialStore::delete_photo_key()?;
    println!("Access key removed.");
    Ok(())
}
