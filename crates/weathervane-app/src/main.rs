use anyhow::Result;
use weathervane_app::{App, DetailAction, PresentationAction, SearchAction, SearchOutcome};
use weathervane_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    let app = App::new(config)?;

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        let searches = app.searches().list_searches().await?;
        println!("Weathervane - recent searches");
        for search in &searches {
            println!("  {:<20} {:>7}  {}", search.city, search.temperature, search.description());
        }
        app.shutdown();
        return Ok(());
    }

    match app.search(query.as_str()).await? {
        SearchOutcome::Found(_) => {}
        SearchOutcome::Failed(error) => {
            eprintln!("{}", error);
            app.shutdown();
            return Ok(());
        }
        SearchOutcome::NoConditions => {
            println!("No current conditions for {}", query.trim());
            app.shutdown();
            return Ok(());
        }
    }

    let mut transitions = app.store().transitions();
    app.send(SearchAction::Detail(PresentationAction::Presented(
        DetailAction::HistoricalForecastsRequested,
    )));
    let state = loop {
        let transition = transitions.recv().await?;
        if let SearchAction::Detail(PresentationAction::Presented(
            DetailAction::HistoricalForecastsApplied(_) | DetailAction::HistoricalFetchFailed(_),
        )) = transition.action
        {
            break transition.state.clone();
        }
    };

    if let Some(detail) = state.detail {
        let record = &detail.detail;
        println!("{} - {}", record.city, record.time);
        println!("  {} {}", record.temperature, record.description());
        println!("\nNext hours:");
        for point in &record.hourly {
            println!("  {:>6}  {:>7}  {}", point.time, point.temperature, point.description());
        }
        println!("\nNext days:");
        for day in &record.daily {
            println!(
                "  {:<4} {:>7} / {:<7} {}",
                day.time,
                day.temperature_max,
                day.temperature_min,
                day.description()
            );
        }
        if let Some(error) = detail.error {
            eprintln!("\nHistory unavailable: {}", error);
        } else if !detail.daily_history.is_empty() {
            println!("\nRecent days:");
            for day in &detail.daily_history {
                println!(
                    "  {:<4} {:>7} / {:<7} {}",
                    day.time,
                    day.temperature_max,
                    day.temperature_min,
                    day.description()
                );
            }
        }
    }

    app.shutdown();
    Ok(())
}
