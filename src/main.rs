use anyhow::Context;
use car_storefront::config::cli::{Cli, Command, CurrencyCommand, FavoritesCommand};
use car_storefront::core::comparison::{to_csv, PriceDisplay};
use car_storefront::core::currency::{self, CurrencyStatus};
use car_storefront::domain::model::{Credentials, FinancingDocument, ImportRequest};
use car_storefront::domain::ports::GeoLocator;
use car_storefront::utils::error::ErrorSeverity;
use car_storefront::utils::{logger, validation::Validate};
use car_storefront::{IpGeoLocator, LocalStorage, LocaleLocator, Storefront, StorefrontConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli
        .load_config()
        .with_context(|| format!("Failed to load config file '{}'", cli.config.display()))?;

    // logging
    if config.logging.json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("Config: {:?}", config);

    // validate before touching the network
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(&config.session.storage_path);
    let mut storefront = Storefront::new(&config, storage)?;
    if storefront.start().await? {
        tracing::debug!("Restored saved session");
    }

    if let Err(e) = run(&cli, &config, &mut storefront).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn locator(config: &StorefrontConfig) -> Box<dyn GeoLocator> {
    let timeout = std::time::Duration::from_secs(config.api.timeout_seconds);
    if let Some(endpoint) = &config.currency.geo_endpoint {
        match IpGeoLocator::new(endpoint, timeout) {
            Ok(ip) => return Box::new(ip),
            Err(e) => tracing::warn!("IP geolocation unavailable: {}", e),
        }
    }
    Box::new(LocaleLocator::from_env().unwrap_or_else(|| LocaleLocator::new("en-US")))
}

/// Best-effort: a failed lookup leaves the default currency in place.
async fn detect_currency(config: &StorefrontConfig, storefront: &Storefront<LocalStorage>) {
    if !config.currency.detect {
        return;
    }
    let locator = locator(config);
    let _ = storefront.detect_currency(locator.as_ref()).await;
}

async fn run(
    cli: &Cli,
    config: &StorefrontConfig,
    storefront: &mut Storefront<LocalStorage>,
) -> car_storefront::Result<()> {
    match &cli.command {
        Command::Cars(args) => {
            // listing fetch does not wait on the lookup
            let filter = args.filter();
            let (_, cars) = tokio::join!(
                detect_currency(config, storefront),
                storefront.browse(&filter, args.sort.map(Into::into))
            );
            let cars = cars?;
            if cars.is_empty() {
                println!("No cars match these filters.");
            }
            for car in &cars {
                let status = car
                    .import_status
                    .map(|s| format!(" [{}]", s))
                    .unwrap_or_default();
                println!(
                    "{:<12} {:<32} {:>16} {:>9} km  {}{}",
                    car.id,
                    car.label(),
                    storefront.price_label(car).await,
                    car.mileage,
                    car.stock_type,
                    status
                );
            }
        }
        Command::Show { id } => {
            let car = storefront.api().get_car(id).await?;
            println!("{}", car.label());
            println!("  Price:     {}", storefront.price_label(&car).await);
            println!("  Mileage:   {} km", car.mileage);
            println!("  Condition: {}", car.condition);
            println!("  Stock:     {}", car.stock_type);
            if let Some(status) = car.import_status {
                println!("  Import:    {}", status);
            }
            if let Some(rating) = car.rating {
                println!("  Rating:    {:.1}", rating);
            }
            for image in &car.images {
                println!("  Image:     {}", image);
            }
        }
        Command::Compare { ids, output } => {
            let table = storefront.compare(ids).await?;
            let prices = PriceDisplay::for_cars(storefront.comparison().cars());
            let csv = to_csv(&table, prices)?;

            match output {
                Some(path) => {
                    std::fs::write(path, &csv)?;
                    println!("📁 Comparison saved to: {}", path.display());
                }
                None => print!("{}", csv),
            }

            let summary = &table.summary;
            println!(
                "Price range: {} - {}",
                summary.price_range.min, summary.price_range.max
            );
            println!(
                "Years: {} - {}",
                summary.year_range.min, summary.year_range.max
            );
            if let Some(id) = &summary.top_rated {
                println!("Top rated: {}", id);
            }
            match &summary.best_value {
                Some(id) => println!("Best value: {}", id),
                None => println!("Best value: n/a"),
            }
        }
        Command::Currency(CurrencyCommand::Detect) => {
            let code = storefront
                .detect_currency(locator(config).as_ref())
                .await
                .unwrap_or_else(|_| currency::DEFAULT_CURRENCY);
            let snapshot = storefront.currency().snapshot().await;
            if let CurrencyStatus::Failed(reason) = &snapshot.status {
                println!("Detection failed ({}), using {}", reason, snapshot.code);
            } else {
                println!("{}", code);
            }
        }
        Command::Currency(CurrencyCommand::Format { amount, code }) => {
            println!("{}", currency::format_amount(*amount, code));
        }
        Command::Login { email, password } => {
            let user = storefront
                .login(&Credentials {
                    email: email.clone(),
                    password: password.clone(),
                })
                .await?;
            println!("✅ Signed in as {}", user.name.as_deref().unwrap_or(&user.email));
        }
        Command::Logout => {
            storefront.logout().await?;
            println!("Signed out");
        }
        Command::Favorites(FavoritesCommand::List) => {
            for car in storefront.api().list_favorites().await? {
                println!("{:<12} {}", car.id, car.label());
            }
        }
        Command::Favorites(FavoritesCommand::Add { id }) => {
            storefront.api().add_favorite(id).await?;
            println!("★ Added {}", id);
        }
        Command::Favorites(FavoritesCommand::Remove { id }) => {
            storefront.api().remove_favorite(id).await?;
            println!("Removed {}", id);
        }
        Command::Import {
            make,
            model,
            year,
            vin,
            budget,
            notes,
        } => {
            let receipt = storefront
                .api()
                .create_import_request(&ImportRequest {
                    make: make.clone(),
                    model: model.clone(),
                    year: *year,
                    vin: vin.clone(),
                    budget: *budget,
                    notes: notes.clone(),
                })
                .await?;
            println!(
                "✅ Import request {} ({})",
                receipt.id,
                receipt.status.as_deref().unwrap_or("submitted")
            );
        }
        Command::Upload {
            application,
            document_type,
            file,
        } => {
            let document = FinancingDocument {
                document_type: document_type.clone(),
                file_name: file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                content: std::fs::read(file)?,
            };
            let uploaded = storefront
                .api()
                .upload_financing_document(application, &document)
                .await?;
            println!("✅ Uploaded document {}", uploaded.id);
        }
    }

    Ok(())
}
