use clap::{ArgAction, Command, arg};
use log::{error, info, warn};
use shadenodes::prelude::*;
use std::path::PathBuf;
use std::time::Instant;

fn cli() -> Command {
    Command::new("snr")
        .about("Renders a shader node scene to a PNG.")
        .version("0.1.0")
        .arg(arg!([FILE] "Input '.toml' scene file").default_value("scene.toml"))
        .arg(arg!(-r --resolution <RES> "Output resolution (WIDTHxHEIGHT)"))
        .arg(arg!(-s --shader <NAME> "Shader to render instead of the scene's output shader"))
        .arg(arg!(-o --output <PNG> "Output image, defaults to the scene file with a .png extension"))
        .arg(arg!(--kinds "List the available node kinds and exit").action(ArgAction::SetTrue))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let matches = cli().get_matches();

    if matches.get_flag("kinds") {
        let registry = NodeRegistry::new();
        println!("scalars: {}", registry.scalar_kinds().collect::<Vec<_>>().join(", "));
        println!("shaders: {}", registry.shader_kinds().collect::<Vec<_>>().join(", "));
        return;
    }

    let path = PathBuf::from(
        matches
            .get_one::<String>("FILE")
            .map(String::as_str)
            .unwrap_or("scene.toml"),
    );

    let loaded = match SceneFile::load(&path).and_then(|scene| scene.build()) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{}: {e}", path.display());
            eprintln!("Error loading scene: {e}");
            std::process::exit(1);
        }
    };
    for warning in &loaded.warnings {
        warn!("{warning}");
    }

    let mut settings = loaded.output.clone();
    if let Some((width, height)) = matches.get_one::<String>("resolution").and_then(|r| {
        r.split_once('x')
            .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)))
    }) {
        settings.width = width;
        settings.height = height;
    }
    if let Some(shader) = matches.get_one::<String>("shader") {
        settings.shader = shader.clone();
    }

    let t0 = Instant::now();
    let buffer = match render_plane(&loaded.registry, &settings) {
        Ok(buffer) => buffer,
        Err(e) => {
            eprintln!("Error rendering: {e}");
            std::process::exit(1);
        }
    };
    println!("Rendered in {}ms", t0.elapsed().as_millis());

    let png_path = match matches.get_one::<String>("output") {
        Some(output) => PathBuf::from(output),
        None => path.with_extension("png"),
    };
    if let Err(e) = image::save_buffer(
        &png_path,
        &buffer,
        settings.width.max(1) as u32,
        settings.height.max(1) as u32,
        image::ExtendedColorType::Rgba8,
    ) {
        eprintln!("Error writing {}: {e}", png_path.display());
        std::process::exit(1);
    }
    info!("wrote {}", png_path.display());
}
