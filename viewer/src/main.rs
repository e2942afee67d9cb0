mod app;
mod io;
mod model;

use app::ViewerApp;
use std::path::PathBuf;

fn main() -> eframe::Result<()> {
    let initial = std::env::args_os().nth(1).map(PathBuf::from);
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Trademark Screening Report Viewer",
        options,
        Box::new(move |_cc| Box::new(ViewerApp::new(initial))),
    )
}
