use std::path::PathBuf;

use clap::Parser;
use gharmol::features::PropertyInput;
use gharmol::predictor::{Predictor, UNRESOLVED_CITY_WARNING};
use gharmol::server;

/// Gharmol v0.3 — House Price Estimator for Indian Metros
///
/// Detects the city from a free-text address and scores a pre-fit
/// gradient-boosted model over the usual listing attributes.
///
/// Examples:
///   gharmol "Flat in Whitefield, Bangalore"
///   gharmol "2 BHK near Andheri, Mumbai" --square-ft 850 --resale
///   gharmol --address Bangalour --posted-by Dealer --bhk 3
///   gharmol --serve --port 8501
#[derive(Parser)]
#[command(name = "gharmol", version, about, long_about = None)]
struct Cli {
    /// Property address (positional). The city is inferred from it.
    #[arg(index = 1)]
    address_positional: Option<String>,

    /// Property address (named). Example: --address "Flat in Pune"
    #[arg(long)]
    address: Option<String>,

    /// Who is posting the listing: Builder, Dealer or Owner.
    #[arg(long, default_value = "Builder")]
    posted_by: String,

    /// Layout kind: BHK or RK.
    #[arg(long, default_value = "BHK")]
    bhk_or_rk: String,

    /// Number of bedrooms (1 to 20).
    #[arg(long, default_value_t = 2)]
    bhk: u32,

    /// Carpet area in square feet (100 to 10000).
    #[arg(long, default_value_t = 1000.0)]
    square_ft: f64,

    /// Property is still under construction.
    #[arg(long)]
    under_construction: bool,

    /// Project is RERA-registered.
    #[arg(long)]
    rera: bool,

    /// Property is ready to move into.
    #[arg(long)]
    ready_to_move: bool,

    /// Listing is a resale, not a first sale.
    #[arg(long)]
    resale: bool,

    /// Longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true, default_value_t = 77.0)]
    longitude: f64,

    /// Latitude (-90 to 90).
    #[arg(long, allow_hyphen_values = true, default_value_t = 28.0)]
    latitude: f64,

    /// Directory holding the fitted artifacts.
    #[arg(long, default_value = "artifacts")]
    artifacts: PathBuf,

    /// Run the web app instead of a one-shot prediction.
    #[arg(long)]
    serve: bool,

    /// Host to bind in --serve mode.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind in --serve mode.
    #[arg(long, short = 'p', default_value_t = 8501)]
    port: u16,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // ── Load artifacts ──────────────────────────────────────────

    let predictor = Predictor::load(&cli.artifacts).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    // ── Serve mode ──────────────────────────────────────────────

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start async runtime: {}", e);
            std::process::exit(1);
        });
        runtime.block_on(server::start(&cli.host, cli.port, predictor));
        return;
    }

    // ── Assemble input ──────────────────────────────────────────

    let input = property_input(&cli);

    // ── Predict ─────────────────────────────────────────────────

    let prediction = predictor.predict(&input).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let prediction = match prediction {
        Some(p) => p,
        None => {
            eprintln!("  \u{26A0}\u{FE0F}  {}", UNRESOLVED_CITY_WARNING);
            std::process::exit(1);
        }
    };

    // ── Print banner + JSON ─────────────────────────────────────

    eprintln!(
        "  \u{1F4CD} {} ({} match, score {:.2})",
        prediction.city.name, prediction.city.method, prediction.city.score,
    );
    eprintln!(
        "  \u{1F3E0} Estimated price: {:.2} Lakhs",
        prediction.price_lakhs,
    );

    println!("{}", serde_json::to_string_pretty(&prediction).unwrap());
}

fn property_input(cli: &Cli) -> PropertyInput {
    // Priority: --address > positional address > error

    let address = match cli.address.clone().or_else(|| cli.address_positional.clone()) {
        Some(a) => a,
        None => {
            eprintln!("Error: No address specified.");
            eprintln!();
            eprintln!("Usage:");
            eprintln!("  gharmol \"Flat in Whitefield, Bangalore\"");
            eprintln!("  gharmol --address \"2 BHK near Andheri, Mumbai\" --square-ft 850");
            eprintln!("  gharmol --serve");
            std::process::exit(1);
        }
    };

    if !(1..=20).contains(&cli.bhk) {
        eprintln!("Error: BHK must be 1-20");
        std::process::exit(1);
    }
    if !(100.0..=10_000.0).contains(&cli.square_ft) {
        eprintln!("Error: Square footage must be 100-10000");
        std::process::exit(1);
    }
    if !(-90.0..=90.0).contains(&cli.latitude) || !(-180.0..=180.0).contains(&cli.longitude) {
        eprintln!("Error: Invalid coordinates. Lat: -90..90, Lon: -180..180");
        std::process::exit(1);
    }

    PropertyInput {
        address,
        posted_by: cli.posted_by.clone(),
        bhk_or_rk: cli.bhk_or_rk.clone(),
        bhk: cli.bhk,
        square_ft: cli.square_ft,
        under_construction: cli.under_construction,
        rera: cli.rera,
        ready_to_move: cli.ready_to_move,
        resale: cli.resale,
        longitude: cli.longitude,
        latitude: cli.latitude,
    }
}
