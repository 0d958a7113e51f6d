use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use foundation::math::GeoPoint;
use mapplot::{MapConfig, MapPlot, PickMode, PickTarget};
use projection::{Projection, ProjectionKind, View};
use tools::SceneFile;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mapplot", version, about = "Render and query map plots described in JSON")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Overrides applied on top of the scene's own config.
#[derive(clap::Args)]
struct ViewArgs {
    /// Projection name, e.g. `mercator` or `azimuthal-equidistant`
    #[arg(long)]
    projection: Option<String>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Rotation pole longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pole_lon: Option<f64>,
    /// Rotation pole latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pole_lat: Option<f64>,
    /// Active cell for `utm-near`, e.g. `33T`
    #[arg(long)]
    utm_cell: Option<String>,
}

impl ViewArgs {
    fn apply(&self, config: &mut MapConfig) -> Result<(), String> {
        if let Some(name) = &self.projection {
            config.projection.kind = name.parse::<ProjectionKind>().map_err(|e| e.to_string())?;
        }
        if let Some(w) = self.width {
            config.width = w;
        }
        if let Some(h) = self.height {
            config.height = h;
        }
        if let Some(lon) = self.pole_lon {
            config.projection.pole[0] = lon;
        }
        if let Some(lat) = self.pole_lat {
            config.projection.pole[1] = lat;
        }
        if let Some(cell) = &self.utm_cell {
            config.projection.utm_cell = Some(cell.clone());
        }
        if config.width == 0 || config.height == 0 {
            return Err("width and height must be positive".to_string());
        }
        Ok(())
    }
}

#[derive(Subcommand)]
enum Command {
    /// Render a scene to a PNG image
    Render {
        scene: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Print renderer counters after the pass
        #[arg(long)]
        stats: bool,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Print plane and device coordinates of a geographic point
    #[command(allow_negative_numbers = true)]
    Project {
        lat: f64,
        lon: f64,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Print the geographic point under a device pixel
    #[command(allow_negative_numbers = true)]
    Unproject {
        x: f64,
        y: f64,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Report what a click at a device pixel would pick
    Pick {
        scene: PathBuf,
        x: f64,
        y: f64,
        /// Use the wider selection tolerance instead of the hover one
        #[arg(long)]
        select: bool,
        #[command(flatten)]
        view: ViewArgs,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    match Cli::parse().command {
        Command::Render {
            scene,
            output,
            stats,
            view,
        } => cmd_render(&scene, &output, stats, &view),
        Command::Project { lat, lon, view } => cmd_project(lat, lon, &view),
        Command::Unproject { x, y, view } => cmd_unproject(x, y, &view),
        Command::Pick {
            scene,
            x,
            y,
            select,
            view,
        } => cmd_pick(&scene, x, y, select, &view),
    }
}

fn load_plot(path: &Path, view: &ViewArgs) -> Result<MapPlot, String> {
    let file = SceneFile::load(path).map_err(|e| e.to_string())?;
    let mut config = file.config.clone();
    view.apply(&mut config)?;
    let mut plot = MapPlot::new(config).map_err(|e| e.to_string())?;
    let added = file.populate(plot.world_mut()).map_err(|e| e.to_string())?;
    info!(scene = %path.display(), added, "scene loaded");
    Ok(plot)
}

fn bare_view(view: &ViewArgs) -> Result<(Projection, View), String> {
    let mut config = MapConfig::default();
    view.apply(&mut config)?;
    let projection = Projection::from_params(&config.projection).map_err(|e| e.to_string())?;
    let fitted = View::fit(projection.plane_extent(), config.width, config.height);
    Ok((projection, fitted))
}

fn cmd_render(scene: &Path, output: &Path, stats: bool, view: &ViewArgs) -> Result<(), String> {
    let mut plot = load_plot(scene, view)?;
    let summary = plot.render().map_err(|e| e.to_string())?;
    let (width, height) = (plot.view().width(), plot.view().height());
    let img = image::RgbaImage::from_raw(width, height, plot.pixels().as_raw().to_vec())
        .ok_or_else(|| format!("pixel buffer does not match {width}x{height}"))?;
    img.save(output)
        .map_err(|e| format!("write {}: {e}", output.display()))?;
    info!(
        spans = summary.spans,
        segments = summary.segments,
        symbols = summary.symbols,
        skipped = summary.shapes_skipped,
        "rendered"
    );
    println!(
        "Wrote {} ({width}x{height}, {} labels left for the host)",
        output.display(),
        plot.pixels().texts.len()
    );
    if stats {
        print!("{}", plot.metrics().summary());
    }
    Ok(())
}

fn cmd_project(lat: f64, lon: f64, view: &ViewArgs) -> Result<(), String> {
    let (projection, fitted) = bare_view(view)?;
    let q = projection.project(GeoPoint::new(lat, lon));
    if !q.visible {
        println!("({lat}, {lon}) is not visible under {}", projection.kind());
        return Ok(());
    }
    let d = fitted.to_device(q.x, q.y);
    println!("plane  {:.6} {:.6}", q.x, q.y);
    println!("device {:.2} {:.2}", d.x, d.y);
    Ok(())
}

fn cmd_unproject(x: f64, y: f64, view: &ViewArgs) -> Result<(), String> {
    let (projection, fitted) = bare_view(view)?;
    let p = fitted.to_plane(x, y);
    match projection.unproject(p.x, p.y) {
        Some(g) => println!("lat {:.6} lon {:.6}", g.lat, g.lon),
        None => println!("({x}, {y}) is off the map"),
    }
    Ok(())
}

fn cmd_pick(scene: &Path, x: f64, y: f64, select: bool, view: &ViewArgs) -> Result<(), String> {
    let mut plot = load_plot(scene, view)?;
    let mode = if select {
        PickMode::Select
    } else {
        PickMode::Hover
    };
    let picked = plot.pick(x, y, mode).map_err(|e| e.to_string())?;
    match picked {
        Some(pick) => println!(
            "picked {} at {:.1}px",
            describe(&plot, pick.target),
            pick.distance_px
        ),
        None => println!("nothing picked"),
    }

    let info = plot.cursor_info(x, y);
    if let Some(p) = info.point {
        println!("cursor lat {:.4} lon {:.4}", p.lat, p.lon);
    }
    if let Some(cell) = info.utm_cell {
        println!("utm cell {}", cell.label());
    }
    if let Some(v) = info.value {
        println!("value {v}");
    }
    Ok(())
}

fn describe(plot: &MapPlot, target: PickTarget) -> String {
    let world = plot.world();
    match target {
        PickTarget::Object(r) => {
            let label = world
                .station(r.id)
                .map(|s| s.spec.label.as_str())
                .or_else(|| world.source(r.id).map(|s| s.spec.label.as_str()))
                .unwrap_or("");
            if label.is_empty() {
                r.to_string()
            } else {
                format!("{r} {label:?}")
            }
        }
        PickTarget::Symbol { group, index } => format!("symbol {index} of group {group}"),
        PickTarget::ThemeShape { theme, index } => format!("shape {index} of theme {theme}"),
        PickTarget::ThemeImage { theme, row, col } => {
            format!("cell ({row}, {col}) of image theme {theme}")
        }
        PickTarget::PolarHandle(h) => format!("polar handle {h:?}"),
    }
}
