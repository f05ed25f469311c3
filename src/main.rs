use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use std::path::PathBuf;
use tai_xiu::{
    app::{
        self,
        AppConfig,
        DiceMode,
    },
    config::GameConfig,
    dice::ScriptedDice,
    logging,
};

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: tai-xiu [--config <path>] [--seed <u64> | --rig <rolls>] [--log-dir <path>] [--mute]\n\
         \n\
         Flags:\n\
           --config <path>   Load table settings from a JSON file\n\
           --seed <u64>      Seed the dice for a reproducible session\n\
           --rig <rolls>     Replay fixed rolls, e.g. \"4,5,6;2,2,2\"\n\
           --log-dir <path>  Directory for log files (default ./{})\n\
           --mute            Start with sound off\n\
           --help            Show this message",
        app::DEFAULT_LOG_DIR,
    );
    std::process::exit(0);
}

fn parse_cli_args() -> Result<AppConfig> {
    let mut args = std::env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;
    let mut rig: Option<ScriptedDice> = None;
    let mut log_dir: Option<PathBuf> = None;
    let mut sound = true;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| eyre!("--config requires a path argument"))?;
                if config_path.is_some() {
                    return Err(eyre!("--config may only be specified once"));
                }
                config_path = Some(PathBuf::from(path));
            }
            "--seed" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--seed requires a number"))?;
                if seed.is_some() || rig.is_some() {
                    return Err(eyre!("choose one of --seed or --rig, once"));
                }
                seed = Some(
                    raw.parse()
                        .wrap_err_with(|| format!("--seed expects a u64, got {raw}"))?,
                );
            }
            "--rig" => {
                let script = args
                    .next()
                    .ok_or_else(|| eyre!("--rig requires a list of rolls"))?;
                if seed.is_some() || rig.is_some() {
                    return Err(eyre!("choose one of --seed or --rig, once"));
                }
                rig = Some(
                    ScriptedDice::parse(&script)
                        .wrap_err_with(|| format!("invalid --rig script {script:?}"))?,
                );
            }
            "--log-dir" => {
                let dir = args
                    .next()
                    .ok_or_else(|| eyre!("--log-dir requires a path argument"))?;
                if log_dir.is_some() {
                    return Err(eyre!("--log-dir may only be specified once"));
                }
                log_dir = Some(PathBuf::from(dir));
            }
            "--mute" => sound = false,
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown argument: {other}")),
        }
    }

    let game = match config_path {
        Some(path) => GameConfig::load(&path)
            .wrap_err_with(|| format!("loading {}", path.display()))?,
        None => GameConfig::default(),
    };
    let dice = match rig {
        Some(script) => DiceMode::Rigged(script),
        None => DiceMode::Random { seed },
    };

    Ok(AppConfig {
        game,
        dice,
        log_dir: log_dir.unwrap_or_else(|| PathBuf::from(app::DEFAULT_LOG_DIR)),
        sound,
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let app_config = parse_cli_args()?;
    let _log_guard = logging::init_tracing(&app_config.log_dir);
    tracing::info!(dice = ?app_config.dice, "starting tai-xiu");
    app::run_app(app_config).await
}
