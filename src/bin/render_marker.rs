use marker_scale::config::render;
use marker_scale::dictionary::ARUCO_4X4_50;
use marker_scale::image::io::save_rgb;
use marker_scale::synthetic::render_scene;
use std::env;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "render_marker".to_string());
    let config = render::parse_cli(&program)?;

    let scene = render_scene(&config.scene)?;
    save_rgb(&scene, &config.output)?;
    let corners = config.scene.marker_corners();
    println!(
        "Scene {}x{} with marker id={} ({} px, {:.1} deg) written to {}",
        config.scene.width,
        config.scene.height,
        config.scene.marker_id,
        config.scene.marker_px,
        config.scene.rotation_deg,
        config.output.display()
    );
    println!("  ideal corners: {corners:?}");

    if let Some(sheet) = &config.marker_sheet {
        let marker = ARUCO_4X4_50
            .draw_marker(sheet.id, sheet.cell_px)
            .ok_or_else(|| format!("Unknown marker id {} in {}", sheet.id, ARUCO_4X4_50.name))?;
        let rgb = image::DynamicImage::ImageLuma8(marker).into_rgb8();
        save_rgb(&rgb, &sheet.path)?;
        println!("Marker sheet written to {}", sheet.path.display());
    }
    Ok(())
}
