use std::{backtrace::Backtrace, num::NonZeroUsize, panic, path::PathBuf, sync::Arc};

use clap::Parser;
use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, LogSpecBuilder, Logger, Naming};
use log::{debug, error, info};
use terraflow_core::{
    ModuleContext,
    adapters::hyprland_client::HyprlandClient,
    config::{get_config, load_stylesheet},
    event_bus::{DEFAULT_CAPACITY, EventBus},
    services::{
        ServicePorts, audio::PulseAudioClient, battery::SysfsBattery, brightness::Brightnessctl,
        mpris::MprisClient, power_profile::PowerProfilesCtl,
    },
};
use terraflow_gui::{App, get_log_spec};
use tokio::runtime::Handle;

const LOG_DIRECTORY: &str = "/tmp/terraflow";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> iced::Result {
    let args = Args::parse();
    debug!("args: {args:?}");

    let logger = Logger::with(LogSpecBuilder::new().default(log::LevelFilter::Info).build())
        .log_to_file(FileSpec::default().directory(LOG_DIRECTORY))
        .duplicate_to_stdout(Duplicate::All)
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(7),
        );
    let logger = match logger.start() {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("Failed to start logger: {err}");
            std::process::exit(1);
        }
    };
    panic::set_hook(Box::new(|info| {
        let b = Backtrace::capture();
        error!("Panic: {info} \n {b}");
    }));

    let (config, config_path) = get_config(args.config_path).unwrap_or_else(|err| {
        error!("Failed to read config: {err}");

        std::process::exit(1);
    });
    info!("Using config {config_path:?}");

    logger.set_new_spec(get_log_spec(&config.log_level));

    let stylesheet = load_stylesheet(&config.stylesheet);

    let runtime = Handle::current();
    let ports = ServicePorts {
        hyprland: Arc::new(HyprlandClient::new()),
        audio: Arc::new(PulseAudioClient::spawn(&runtime)),
        media: Arc::new(MprisClient::new()),
        power_profile: Arc::new(PowerProfilesCtl::new()),
        brightness: Arc::new(Brightnessctl::new()),
        battery: SysfsBattery::new(),
    };

    let capacity = NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN);
    let bus = EventBus::new(capacity);
    let ctx = ModuleContext::new(bus.sender(), runtime);

    iced::daemon(App::title, App::update, App::view)
        .subscription(App::subscription)
        .theme(App::theme)
        .style(App::style)
        .run_with(App::new((config, stylesheet, ports, ctx, bus.receiver())))
}
