use std::path::PathBuf;

use clap::{Parser, Subcommand};
use meteo_forecast::{
    chart,
    config::{ChartSettings, ForecastSettings},
    load, table, Column, Observations, Order,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meteo-forecast")]
#[command(about = "Daily weather observations and a moving-average forecast")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the observations as a table
    Show {
        /// CSV or JSON file with date, t_min, t_max and t_avg columns
        input: PathBuf,

        /// Column to sort the table by
        #[arg(short, long, value_enum, default_value_t = Column::Date)]
        sort: Column,

        #[arg(short, long)]
        descending: bool,
    },
    /// Forecast the average temperature of the next days
    Forecast {
        input: PathBuf,

        #[command(flatten)]
        settings: ForecastSettings,

        /// Print the forecast as JSON
        #[arg(long)]
        json: bool,
    },
    /// Draw the temperature and forecast charts
    Plot {
        input: PathBuf,

        #[command(flatten)]
        forecast: ForecastSettings,

        #[command(flatten)]
        chart: ChartSettings,
    },
}

fn print_swings(observations: &Observations) {
    let strongest = observations.strongest_swing();
    let weakest = observations.weakest_swing();
    println!(
        "Strongest swing: {:.1} °C ({}); weakest: {:.1} °C ({})",
        strongest.swing(),
        strongest.date,
        weakest.swing(),
        weakest.date
    );
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "meteo_forecast=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            input,
            sort,
            descending,
        } => {
            let observations = load(&input)?;
            let order = if descending {
                Order::Descending
            } else {
                Order::Ascending
            };
            print!("{}", table::render(observations.sorted_by(sort, order)));
            print_swings(&observations);
        }
        Commands::Forecast {
            input,
            settings,
            json,
        } => {
            let observations = load(&input)?;
            let forecast = observations.forecast(settings.window, settings.horizon)?;
            if json {
                let points: Vec<_> = forecast
                    .points
                    .iter()
                    .map(|(date, value)| json!({ "date": date.to_string(), "t_avg": value }))
                    .collect();
                println!(
                    "{:#}",
                    json!({ "window": forecast.window, "forecast": points })
                );
            } else {
                println!(
                    "Forecast of the average temperature (n={}):",
                    forecast.window
                );
                for (date, value) in &forecast.points {
                    println!("{date}  {value:.1} °C");
                }
            }
        }
        Commands::Plot {
            input,
            forecast,
            chart: settings,
        } => {
            let observations = load(&input)?;
            for path in chart::export(&observations, &forecast, &settings)? {
                println!("Wrote {}", path.display());
            }
            print_swings(&observations);
        }
    }

    Ok(())
}
