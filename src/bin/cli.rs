use clap::Parser;
use landmass::{GenerationParams, generate_world, render};
use std::fs;
use std::path::PathBuf;

/// Генератор материков: рост суши, берега, горы и реки
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (по умолчанию — встроенные параметры)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Переопределить сид из конфигурации
    #[arg(long)]
    seed: Option<u64>,

    /// Переопределить целевое число клеток суши
    #[arg(long)]
    size: Option<usize>,

    /// Путь для сохранения карты (по умолчанию: ./world.png)
    #[arg(short, long, default_value = "world.png")]
    output: PathBuf,

    /// Размер клетки в пикселях
    #[arg(long, default_value_t = 4)]
    scale: u32,

    /// Сохранить сводку по материкам в JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut params = match &cli.config {
        Some(path) => {
            log::info!("🔍 Загрузка конфигурации из {}", path.display());
            GenerationParams::from_toml_file(path)?
        }
        None => GenerationParams::default(),
    };
    if let Some(seed) = cli.seed {
        params.seed = seed;
    }
    if let Some(size) = cli.size {
        params.target_size = size;
    }
    params.validate()?;

    log::info!(
        "Генерация мира (сид: {}, размер: {})...",
        params.seed,
        params.target_size
    );
    let world = generate_world(&params)?;

    log::info!("Сохранение в {:?}", cli.output);
    render::save_as_png(&world, &cli.output, cli.scale)?;

    if let Some(path) = &cli.summary {
        let json = serde_json::to_string_pretty(&world.summary())?;
        fs::write(path, json)?;
        log::info!("Сводка сохранена в {:?}", path);
    }

    println!("\nГотово! Материков: {}.", world.landmasses().len());
    Ok(())
}
