use clap::Parser;
use parish_feed::config::toml_config::ScoringConfig;
use parish_feed::core::location::{self, GazetteerReverseGeocoder, ResolveError};
use parish_feed::core::pipeline::USER_LOCATION_KEY;
use parish_feed::core::ranker::ScoringWeights;
use parish_feed::domain::model::Coordinates;
use parish_feed::domain::ports::Storage;
use parish_feed::utils::error::FeedError;
use parish_feed::utils::{logger, validation, validation::Validate};
use parish_feed::{ChurchFeedPipeline, CliConfig, FeedEngine, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting parish-feed CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(config.storage_path.clone());

    // Optional location update before the feed is built.
    if let Some(input) = &config.location {
        match location::resolve_manual_input(input) {
            Ok(resolved) => {
                storage
                    .write_file(USER_LOCATION_KEY, &serde_json::to_vec(&resolved)?)
                    .await?;
                tracing::info!("📍 Location set to {}", resolved.display_address);
            }
            Err(e) => {
                print_resolve_help(&e);
                std::process::exit(2);
            }
        }
    } else if let Some(raw) = &config.gps {
        match parse_coordinates(raw) {
            Ok(coordinates) => {
                let resolved = location::resolve_from_device_coordinates(
                    coordinates,
                    &GazetteerReverseGeocoder::default(),
                );
                storage
                    .write_file(USER_LOCATION_KEY, &serde_json::to_vec(&resolved)?)
                    .await?;
                tracing::info!("📍 Location set to {}", resolved.display_address);
            }
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 Pass coordinates as \"lat,lon\", e.g. --gps \"33.749,-84.388\"");
                std::process::exit(1);
            }
        }
    }

    let weights = match &config.weights_file {
        Some(path) => match ScoringConfig::load(path) {
            Ok(scoring) => {
                tracing::info!("Loaded scoring weights from {}", path);
                scoring.into_weights()
            }
            Err(e) => {
                tracing::error!("❌ Could not load weights file: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 {}", e.recovery_suggestion());
                std::process::exit(1);
            }
        },
        None => ScoringWeights::default(),
    };

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = ChurchFeedPipeline::new(storage, config, weights);
    let engine = FeedEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Feed build completed successfully!");
            println!("✅ Feed build completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Feed build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                parish_feed::utils::error::ErrorSeverity::Low => 0,
                parish_feed::utils::error::ErrorSeverity::Medium => 2,
                parish_feed::utils::error::ErrorSeverity::High => 1,
                parish_feed::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn parse_coordinates(raw: &str) -> Result<Coordinates, FeedError> {
    let invalid = |reason: &str| FeedError::InvalidConfigValueError {
        field: "gps".to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| invalid("Expected \"lat,lon\""))?;
    let latitude: f64 = lat
        .trim()
        .parse()
        .map_err(|_| invalid("Latitude is not a number"))?;
    let longitude: f64 = lon
        .trim()
        .parse()
        .map_err(|_| invalid("Longitude is not a number"))?;

    validation::validate_range("gps latitude", latitude, -90.0, 90.0)?;
    validation::validate_range("gps longitude", longitude, -180.0, 180.0)?;

    Ok(Coordinates {
        latitude,
        longitude,
    })
}

fn print_resolve_help(err: &ResolveError) {
    eprintln!("❌ {}", err);
    match err {
        ResolveError::InvalidFormat { suggestions, .. } => {
            eprintln!(
                "💡 Enter a location as \"City, State\" (e.g. \"Atlanta, GA\"), \"City, Country\" (e.g. \"London, UK\"), or a zip code (e.g. \"30309\")"
            );
            if !suggestions.is_empty() {
                eprintln!("   Did you mean: {}?", suggestions.join(" or "));
            }
        }
        ResolveError::NotFound { .. } => {
            eprintln!(
                "💡 Try a major city or zip code, for example: {}",
                location::location_examples().join(", ")
            );
            eprintln!("   Or pass --gps \"lat,lon\" to use device coordinates instead");
        }
    }
}
