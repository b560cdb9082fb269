use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "carbon-cli")]
#[command(about = "Command-line client for the carbon footprint backend", long_about = None)]
struct Cli {
    #[arg(short, long, env = "CARBON_URL", default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum EnergyUnit {
    Kwh,
    Mwh,
}

#[derive(Clone, Copy, ValueEnum)]
enum LengthUnit {
    Mi,
    Km,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate emissions from electricity use
    Electricity {
        /// ISO country code, e.g. "us"
        #[arg(long)]
        country: String,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        value: f64,
        #[arg(long, value_enum, default_value = "kwh")]
        unit: EnergyUnit,
    },
    /// Estimate emissions from a vehicle trip
    Vehicle {
        #[arg(long)]
        distance: f64,
        #[arg(long, value_enum, default_value = "km")]
        unit: LengthUnit,
        #[arg(long)]
        model: Option<String>,
    },
    /// Estimate emissions from a flight, legs given as FROM-TO (e.g. SFO-LAX)
    Flight {
        #[arg(long, default_value_t = 1)]
        passengers: u32,
        #[arg(required = true)]
        legs: Vec<String>,
    },
    /// List vehicle makes
    Makes,
    /// List models for a vehicle make
    Models { make_id: String },
    /// List saved estimations
    History,
    /// Show one saved estimation
    Show { id: String },
    /// Aggregate saved estimations by type and day
    Summary,
    /// Delete every saved estimation
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Electricity { country, state, value, unit } => {
            let mut body = json!({
                "country": country,
                "electricity_value": value,
                "electricity_unit": match unit {
                    EnergyUnit::Kwh => "kwh",
                    EnergyUnit::Mwh => "mwh",
                },
            });
            if let Some(state) = state {
                body["state"] = Value::String(state);
            }
            client.post(format!("{}/estimate/electricity", base)).json(&body).send().await?
        }
        Commands::Vehicle { distance, unit, model } => {
            let mut body = json!({
                "distance_value": distance,
                "distance_unit": match unit {
                    LengthUnit::Mi => "mi",
                    LengthUnit::Km => "km",
                },
            });
            if let Some(model) = model {
                body["vehicle_model_id"] = Value::String(model);
            }
            client.post(format!("{}/estimate/vehicle", base)).json(&body).send().await?
        }
        Commands::Flight { passengers, legs } => {
            let legs = legs
                .iter()
                .map(|leg| parse_leg(leg))
                .collect::<Result<Vec<_>, _>>()?;
            let body = json!({ "passengers": passengers, "legs": legs });
            client.post(format!("{}/estimate/flight", base)).json(&body).send().await?
        }
        Commands::Makes => client.get(format!("{}/vehicle/makes", base)).send().await?,
        Commands::Models { make_id } => {
            client
                .get(format!("{}/vehicle/makes/{}/models", base, make_id))
                .send()
                .await?
        }
        Commands::History => client.get(format!("{}/history", base)).send().await?,
        Commands::Show { id } => client.get(format!("{}/history/{}", base, id)).send().await?,
        Commands::Summary => client.get(format!("{}/history/summary", base)).send().await?,
        Commands::Clear => client.delete(format!("{}/history/clear", base)).send().await?,
    };

    print_response(res).await
}

fn parse_leg(leg: &str) -> Result<Value, String> {
    match leg.split_once('-') {
        Some((from, to)) if !from.is_empty() && !to.is_empty() => Ok(json!({
            "departure_airport": from,
            "destination_airport": to,
        })),
        _ => Err(format!("invalid leg '{}', expected FROM-TO", leg)),
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: backend returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
