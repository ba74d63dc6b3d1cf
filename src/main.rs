use tracing_subscriber::EnvFilter;
use word2md_uploader::app::Word2MdUploader;
use word2md_uploader::error::StartupError;
use word2md_uploader::UploaderConfig;

fn main() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = UploaderConfig::load()?;
    let app = Word2MdUploader::new(config)?;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 680.0])
            .with_min_inner_size([420.0, 520.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Word2MD Uploader",
        options,
        Box::new(move |_cc: &eframe::CreationContext| Box::new(app)),
    )
    .map_err(|e| StartupError::Ui(e.to_string()))
}
