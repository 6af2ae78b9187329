use clap::Parser;
use eframe::egui;

use sdraw::app::SdrawApp;
use sdraw::cli::{self, CliArgs};
use sdraw::settings::Settings;
use sdraw::{log_info, logger};

fn main() -> Result<(), eframe::Error> {
    let args = CliArgs::parse();

    logger::init();

    let settings = match Settings::settings_path() {
        Some(path) if !path.exists() => {
            // First run: leave an editable template behind.
            let defaults = Settings::default();
            defaults.save_to(&path);
            defaults
        }
        _ => Settings::load(),
    };

    if args.is_headless() {
        let ok = cli::run(&args, &settings);
        std::process::exit(if ok { 0 } else { 1 });
    }

    let size = args.canvas_size(&settings);
    log_info!("Starting with a {}x{} canvas", size.0, size.1);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([size.0 as f32 + 40.0, size.1 as f32 + 110.0])
            .with_title("sdraw"),
        ..Default::default()
    };

    let open = args.open.clone();
    eframe::run_native(
        "sdraw",
        options,
        Box::new(move |cc| Box::new(SdrawApp::new(cc, settings, size, open))),
    )
}
